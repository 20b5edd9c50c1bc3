pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::domain::ports::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "glasscut")]
#[command(about = "Generate cutting plans from glass production lists")]
pub struct CliConfig {
    /// Report endpoint returning cutting rows as a JSON array
    #[arg(long, default_value = "http://localhost:8766/reports/produccion")]
    pub api_endpoint: String,

    /// Read the cutting list from a CSV file instead of the endpoint
    #[arg(long)]
    pub input_csv: Option<String>,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    /// Bundle the report and cut lists into a single ZIP
    #[arg(long)]
    pub compress: bool,

    /// Disable 90-degree piece rotation during packing
    #[arg(long)]
    pub no_rotation: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU/memory usage per phase")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn api_endpoint(&self) -> &str {
        &self.api_endpoint
    }

    fn input_csv(&self) -> Option<&str> {
        self.input_csv.as_deref()
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn compress_output(&self) -> bool {
        self.compress
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        // The endpoint is only used when no CSV input is given
        if self.input_csv.is_none() {
            validation::validate_url("api_endpoint", &self.api_endpoint)?;
        }
        if let Some(csv_path) = &self.input_csv {
            validation::validate_path("input_csv", csv_path)?;
        }
        validation::validate_path("output_path", &self.output_path)?;
        Ok(())
    }
}
