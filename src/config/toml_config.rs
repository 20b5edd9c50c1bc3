use crate::core::inventory::Inventory;
use crate::domain::model::StockSheet;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{CutError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub pipeline: PipelineConfig,
    pub source: SourceConfig,
    pub extract: ExtractConfig,
    pub pack: Option<PackConfig>,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
    /// Extra stock sheet sizes, merged over the default catalog
    #[serde(default)]
    pub stock: Vec<StockConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    pub description: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub r#type: String,
    pub endpoint: Option<String>,
    pub csv_path: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractConfig {
    pub max_rows: Option<usize>,
    /// Raw item code -> glass code overrides, applied before
    /// CL-normalization
    pub item_map: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackConfig {
    pub allow_rotation: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub output_formats: Vec<String>,
    pub compression: Option<CompressionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockConfig {
    pub code: String,
    pub thickness_mm: u32,
    pub width_mm: f64,
    pub height_mm: f64,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CutError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| CutError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replace `${VAR_NAME}` references with environment values; unknown
    /// variables are left as-is so validation can point at them.
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").expect("static regex");

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }

    pub fn validate_config(&self) -> Result<()> {
        match self.source.r#type.as_str() {
            "api" => {
                let endpoint =
                    self.source
                        .endpoint
                        .as_deref()
                        .ok_or_else(|| CutError::MissingConfigError {
                            field: "source.endpoint".to_string(),
                        })?;
                validation::validate_url("source.endpoint", endpoint)?;
            }
            "csv" => {
                let csv_path =
                    self.source
                        .csv_path
                        .as_deref()
                        .ok_or_else(|| CutError::MissingConfigError {
                            field: "source.csv_path".to_string(),
                        })?;
                validation::validate_path("source.csv_path", csv_path)?;
            }
            other => {
                return Err(CutError::InvalidConfigValueError {
                    field: "source.type".to_string(),
                    value: other.to_string(),
                    reason: "Supported source types: api, csv".to_string(),
                })
            }
        }

        validation::validate_path("load.output_path", &self.load.output_path)?;
        validation::validate_output_formats("load.output_formats", &self.load.output_formats)?;

        for stock in &self.stock {
            validation::validate_non_empty_string("stock.code", &stock.code)?;
            validation::validate_positive_dimension("stock.width_mm", stock.width_mm)?;
            validation::validate_positive_dimension("stock.height_mm", stock.height_mm)?;
            if stock.thickness_mm == 0 {
                return Err(CutError::InvalidConfigValueError {
                    field: "stock.thickness_mm".to_string(),
                    value: "0".to_string(),
                    reason: "Thickness must be positive".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Default catalog plus any `[[stock]]` overrides.
    pub fn build_inventory(&self) -> Result<Inventory> {
        let mut inventory = Inventory::default();
        for stock in &self.stock {
            let sheet = StockSheet::new(stock.thickness_mm, stock.width_mm, stock.height_mm)?;
            inventory.add(&stock.code, sheet);
        }
        Ok(inventory)
    }

    pub fn allow_rotation(&self) -> bool {
        self.pack
            .as_ref()
            .and_then(|p| p.allow_rotation)
            .unwrap_or(true)
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn compression_enabled(&self) -> bool {
        self.load
            .compression
            .as_ref()
            .map(|c| c.enabled)
            .unwrap_or(false)
    }

    pub fn max_rows(&self) -> Option<usize> {
        self.extract.max_rows
    }
}

impl ConfigProvider for TomlConfig {
    fn api_endpoint(&self) -> &str {
        self.source.endpoint.as_deref().unwrap_or("")
    }

    fn input_csv(&self) -> Option<&str> {
        if self.source.r#type == "csv" {
            self.source.csv_path.as_deref()
        } else {
            None
        }
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn compress_output(&self) -> bool {
        self.compression_enabled()
    }

    fn max_rows(&self) -> Option<usize> {
        self.extract.max_rows
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
