use crate::core::inventory::Inventory;
use crate::core::normalize;
use crate::core::packer::Packer;
use crate::domain::model::{CutPlan, PlanReport, PlanResult, ProductionRow};
use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
use crate::utils::error::{CutError, Result};
use reqwest::Client;
use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub struct CuttingPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    client: Client,
    inventory: Inventory,
    packer: Packer,
    item_map: Option<HashMap<String, String>>,
}

impl<S: Storage, C: ConfigProvider> CuttingPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self {
            storage,
            config,
            client: Client::new(),
            inventory: Inventory::default(),
            packer: Packer::default(),
            item_map: None,
        }
    }

    pub fn with_inventory(mut self, inventory: Inventory) -> Self {
        self.inventory = inventory;
        self
    }

    pub fn with_packer(mut self, packer: Packer) -> Self {
        self.packer = packer;
        self
    }

    pub fn with_item_map(mut self, item_map: HashMap<String, String>) -> Self {
        self.item_map = Some(item_map);
        self
    }

    async fn extract_from_csv(&self, path: &str) -> Result<Vec<ProductionRow>> {
        tracing::debug!("Reading cutting list from CSV: {}", path);
        let bytes = self.storage.read_file(path).await?;

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(bytes.as_slice());

        let mut rows = Vec::new();
        for record in reader.deserialize::<CsvRow>() {
            let raw = match record {
                Ok(raw) => raw,
                Err(e) => {
                    tracing::warn!("Skipping malformed CSV row: {}", e);
                    continue;
                }
            };
            match raw.into_row() {
                Some(row) => rows.push(row),
                None => tracing::warn!("Skipping CSV row with unparseable numbers"),
            }
        }

        Ok(rows)
    }

    async fn extract_from_api(&self) -> Result<Vec<ProductionRow>> {
        tracing::debug!("Requesting report from: {}", self.config.api_endpoint());
        let response = self.client.get(self.config.api_endpoint()).send().await?;

        tracing::debug!("Report response status: {}", response.status());
        if !response.status().is_success() {
            return Err(CutError::ProcessingError {
                message: format!("Report endpoint returned HTTP {}", response.status()),
            });
        }

        let json: serde_json::Value = response.json().await?;
        let items = match json {
            serde_json::Value::Array(items) => items,
            other => {
                return Err(CutError::ProcessingError {
                    message: format!(
                        "Expected a JSON array of report rows, got {}",
                        value_kind(&other)
                    ),
                })
            }
        };

        let mut rows = Vec::new();
        for item in &items {
            match parse_json_row(item) {
                Some(row) => rows.push(row),
                None => tracing::warn!("Skipping malformed report row: {}", item),
            }
        }

        Ok(rows)
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for CuttingPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<ProductionRow>> {
        let mut rows = match self.config.input_csv() {
            Some(path) => self.extract_from_csv(path).await?,
            None => self.extract_from_api().await?,
        };

        if let Some(max) = self.config.max_rows() {
            if rows.len() > max {
                tracing::info!("Truncating {} rows to the configured {}", rows.len(), max);
                rows.truncate(max);
            }
        }

        if rows.is_empty() {
            return Err(CutError::ProcessingError {
                message: "No usable cutting rows in the source data".to_string(),
            });
        }

        Ok(rows)
    }

    async fn transform(&self, rows: Vec<ProductionRow>) -> Result<PlanResult> {
        let groups = normalize::group_rows(&rows, self.item_map.as_ref());
        if groups.is_empty() {
            return Err(CutError::ProcessingError {
                message: "All rows were rejected during grouping".to_string(),
            });
        }

        let mut plans = BTreeMap::new();
        let mut cut_lists = BTreeMap::new();

        for group in &groups {
            tracing::info!(
                "Processing {}: {} sizes, {} pieces",
                group.code,
                group.unique_sizes(),
                group.total_pieces()
            );

            let stock = self.inventory.get(&group.code)?;
            if stock.thickness_mm != group.thickness_mm {
                tracing::warn!(
                    "Thickness mismatch for {}: rows say {}mm, stock sheet is {}mm",
                    group.code,
                    group.thickness_mm,
                    stock.thickness_mm
                );
            }

            let sheets = self.packer.pack(&group.code, &stock, &group.demands)?;
            let plan = CutPlan {
                code: group.code.clone(),
                stock,
                sheets,
            };
            tracing::info!(
                "{}: {} sheets, {:.1}% efficiency",
                plan.code,
                plan.total_sheets(),
                plan.overall_efficiency_percent()
            );

            cut_lists.insert(group.code.clone(), cut_list_csv(group)?);
            plans.insert(group.code.clone(), plan);
        }

        let report = PlanReport::from_plans(&plans);
        let report_json = serde_json::to_string_pretty(&report)?;

        Ok(PlanResult {
            plans,
            report_json,
            cut_lists,
        })
    }

    async fn load(&self, result: PlanResult) -> Result<String> {
        if self.config.compress_output() {
            let zip_data = {
                let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

                zip.start_file::<_, ()>("cut_plan.json", FileOptions::default())?;
                zip.write_all(result.report_json.as_bytes())?;

                for (code, csv_text) in &result.cut_lists {
                    zip.start_file::<_, ()>(
                        format!("cut_list_{}.csv", code),
                        FileOptions::default(),
                    )?;
                    zip.write_all(csv_text.as_bytes())?;
                }

                let cursor = zip.finish()?;
                cursor.into_inner()
            };

            tracing::debug!("Writing ZIP bundle ({} bytes)", zip_data.len());
            self.storage.write_file("cut_plan.zip", &zip_data).await?;
            Ok(format!("{}/cut_plan.zip", self.config.output_path()))
        } else {
            self.storage
                .write_file("cut_plan.json", result.report_json.as_bytes())
                .await?;

            for (code, csv_text) in &result.cut_lists {
                self.storage
                    .write_file(&format!("cut_list_{}.csv", code), csv_text.as_bytes())
                    .await?;
            }

            Ok(format!("{}/cut_plan.json", self.config.output_path()))
        }
    }
}

/// Raw CSV row in the upstream report layout.
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "ITEM")]
    item: String,
    #[serde(rename = "Esp", default)]
    esp: Option<String>,
    #[serde(rename = "Largo")]
    largo: String,
    #[serde(rename = "Ancho")]
    ancho: String,
    #[serde(rename = "Pzs.")]
    pzs: String,
}

impl CsvRow {
    fn into_row(self) -> Option<ProductionRow> {
        let thickness_mm = match self.esp.as_deref() {
            Some(s) if !s.is_empty() => Some(s.parse::<u32>().ok()?),
            _ => None,
        };
        Some(ProductionRow {
            item: self.item,
            thickness_mm,
            length_mm: self.largo.parse().ok()?,
            width_mm: self.ancho.parse().ok()?,
            quantity: self.pzs.parse().ok()?,
        })
    }
}

fn value_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

// The report export is inconsistent about number formatting; quantities
// and dimensions show up both as JSON numbers and as strings.
fn value_as_f64(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn value_as_u32(value: &serde_json::Value) -> Option<u32> {
    match value {
        serde_json::Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_json_row(item: &serde_json::Value) -> Option<ProductionRow> {
    let obj = item.as_object()?;
    Some(ProductionRow {
        item: obj.get("ITEM")?.as_str()?.to_string(),
        thickness_mm: obj.get("Esp").and_then(value_as_u32),
        length_mm: obj.get("Largo").and_then(value_as_f64)?,
        width_mm: obj.get("Ancho").and_then(value_as_f64)?,
        quantity: obj.get("Pzs.").and_then(value_as_u32)?,
    })
}

fn cut_list_csv(group: &crate::domain::model::GlassGroup) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["code", "thickness_mm", "width_mm", "height_mm", "quantity"])?;
    for demand in &group.demands {
        writer.write_record([
            group.code.as_str(),
            &group.thickness_mm.to_string(),
            &demand.width_mm.to_string(),
            &demand.height_mm.to_string(),
            &demand.quantity.to_string(),
        ])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| CutError::ProcessingError {
            message: format!("CSV writer error: {}", e),
        })?;
    String::from_utf8(bytes).map_err(|e| CutError::ProcessingError {
        message: format!("Cut list is not valid UTF-8: {}", e),
    })
}
