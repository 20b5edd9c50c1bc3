use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::utils::error::{CutError, Result};

/// One raw row from the production report (API or CSV).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionRow {
    /// Raw item code as it appears upstream, e.g. "CC06T"
    pub item: String,
    /// Thickness column when the report carries one; otherwise derived
    /// from the item code during normalization
    pub thickness_mm: Option<u32>,
    /// "Largo" column
    pub length_mm: f64,
    /// "Ancho" column
    pub width_mm: f64,
    /// "Pzs." column
    pub quantity: u32,
}

/// Demand for one panel size within a glass group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PieceDemand {
    pub width_mm: f64,
    pub height_mm: f64,
    pub quantity: u32,
}

impl PieceDemand {
    pub fn area(&self) -> f64 {
        self.width_mm * self.height_mm
    }
}

/// All demanded panels of one normalized glass code, quantities merged
/// per size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlassGroup {
    pub code: String,
    pub thickness_mm: u32,
    pub demands: Vec<PieceDemand>,
}

impl GlassGroup {
    pub fn total_pieces(&self) -> u32 {
        self.demands.iter().map(|d| d.quantity).sum()
    }

    pub fn unique_sizes(&self) -> usize {
        self.demands.len()
    }
}

/// A purchasable stock sheet size. Dimensions are strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StockSheet {
    pub thickness_mm: u32,
    pub width_mm: f64,
    pub height_mm: f64,
}

impl StockSheet {
    pub fn new(thickness_mm: u32, width_mm: f64, height_mm: f64) -> Result<Self> {
        if thickness_mm == 0 {
            return Err(CutError::InvalidDimension {
                what: "stock sheet thickness".to_string(),
                value: 0.0,
            });
        }
        if !width_mm.is_finite() || width_mm <= 0.0 {
            return Err(CutError::InvalidDimension {
                what: "stock sheet width".to_string(),
                value: width_mm,
            });
        }
        if !height_mm.is_finite() || height_mm <= 0.0 {
            return Err(CutError::InvalidDimension {
                what: "stock sheet height".to_string(),
                value: height_mm,
            });
        }
        Ok(Self {
            thickness_mm,
            width_mm,
            height_mm,
        })
    }

    pub fn area(&self) -> f64 {
        self.width_mm * self.height_mm
    }
}

/// A piece placed on a sheet. `width_mm`/`height_mm` are the piece's
/// original dimensions; `dimensions()` gives the footprint after rotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub width_mm: f64,
    pub height_mm: f64,
    pub x: f64,
    pub y: f64,
    pub rotated: bool,
}

impl Placement {
    pub fn dimensions(&self) -> (f64, f64) {
        if self.rotated {
            (self.height_mm, self.width_mm)
        } else {
            (self.width_mm, self.height_mm)
        }
    }

    pub fn area(&self) -> f64 {
        self.width_mm * self.height_mm
    }
}

/// One opened stock sheet with everything placed on it.
#[derive(Debug, Clone)]
pub struct SheetLayout {
    pub stock: StockSheet,
    pub placements: Vec<Placement>,
}

impl SheetLayout {
    pub fn new(stock: StockSheet) -> Self {
        Self {
            stock,
            placements: Vec::new(),
        }
    }

    pub fn total_area(&self) -> f64 {
        self.stock.area()
    }

    pub fn used_area(&self) -> f64 {
        self.placements.iter().map(|p| p.area()).sum()
    }

    pub fn efficiency_percent(&self) -> f64 {
        let total = self.total_area();
        if total > 0.0 {
            self.used_area() / total * 100.0
        } else {
            0.0
        }
    }
}

/// All sheets required for one glass code.
#[derive(Debug, Clone)]
pub struct CutPlan {
    pub code: String,
    pub stock: StockSheet,
    pub sheets: Vec<SheetLayout>,
}

impl CutPlan {
    pub fn total_sheets(&self) -> usize {
        self.sheets.len()
    }

    pub fn total_pieces(&self) -> usize {
        self.sheets.iter().map(|s| s.placements.len()).sum()
    }

    pub fn total_area(&self) -> f64 {
        self.sheets.iter().map(|s| s.total_area()).sum()
    }

    pub fn used_area(&self) -> f64 {
        self.sheets.iter().map(|s| s.used_area()).sum()
    }

    pub fn overall_efficiency_percent(&self) -> f64 {
        let total = self.total_area();
        if total > 0.0 {
            self.used_area() / total * 100.0
        } else {
            0.0
        }
    }
}

/// Transform-phase output handed to the load phase.
#[derive(Debug, Clone)]
pub struct PlanResult {
    pub plans: BTreeMap<String, CutPlan>,
    /// Serialized `PlanReport`
    pub report_json: String,
    /// Per-code cut list CSVs, keyed by glass code
    pub cut_lists: BTreeMap<String, String>,
}

// ---------------------------------------------------------------------------
// Report shapes (serialized to cut_plan.json)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanReport {
    pub generated_at: DateTime<Utc>,
    pub glass: BTreeMap<String, CodeReport>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeReport {
    pub summary: PlanSummary,
    pub sheets: Vec<SheetReport>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanSummary {
    pub total_sheets: usize,
    pub total_pieces: usize,
    pub overall_efficiency: f64,
    pub total_area: f64,
    pub used_area: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetReport {
    pub dimensions: SheetDimensions,
    pub efficiency: f64,
    pub total_area: f64,
    pub used_area: f64,
    pub pieces: Vec<PieceReport>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetDimensions {
    pub width: f64,
    pub height: f64,
    pub thickness: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PieceReport {
    pub width: f64,
    pub height: f64,
    pub position: PiecePosition,
    pub rotated: bool,
    pub dimensions_after_rotation: RotatedDimensions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PiecePosition {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotatedDimensions {
    pub width: f64,
    pub height: f64,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl From<&Placement> for PieceReport {
    fn from(p: &Placement) -> Self {
        let (w, h) = p.dimensions();
        Self {
            width: p.width_mm,
            height: p.height_mm,
            position: PiecePosition { x: p.x, y: p.y },
            rotated: p.rotated,
            dimensions_after_rotation: RotatedDimensions {
                width: w,
                height: h,
            },
        }
    }
}

impl From<&SheetLayout> for SheetReport {
    fn from(sheet: &SheetLayout) -> Self {
        Self {
            dimensions: SheetDimensions {
                width: sheet.stock.width_mm,
                height: sheet.stock.height_mm,
                thickness: sheet.stock.thickness_mm,
            },
            efficiency: round2(sheet.efficiency_percent()),
            total_area: sheet.total_area(),
            used_area: sheet.used_area(),
            pieces: sheet.placements.iter().map(PieceReport::from).collect(),
        }
    }
}

impl From<&CutPlan> for CodeReport {
    fn from(plan: &CutPlan) -> Self {
        Self {
            summary: PlanSummary {
                total_sheets: plan.total_sheets(),
                total_pieces: plan.total_pieces(),
                overall_efficiency: round2(plan.overall_efficiency_percent()),
                total_area: plan.total_area(),
                used_area: plan.used_area(),
            },
            sheets: plan.sheets.iter().map(SheetReport::from).collect(),
        }
    }
}

impl PlanReport {
    pub fn from_plans(plans: &BTreeMap<String, CutPlan>) -> Self {
        Self {
            generated_at: Utc::now(),
            glass: plans
                .iter()
                .map(|(code, plan)| (code.clone(), CodeReport::from(plan)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_sheet_rejects_non_positive_dimensions() {
        assert!(StockSheet::new(6, 3300.0, 2600.0).is_ok());
        assert!(StockSheet::new(0, 3300.0, 2600.0).is_err());
        assert!(StockSheet::new(6, 0.0, 2600.0).is_err());
        assert!(StockSheet::new(6, 3300.0, -1.0).is_err());
    }

    #[test]
    fn test_placement_dimensions_swap_when_rotated() {
        let placement = Placement {
            width_mm: 800.0,
            height_mm: 1200.0,
            x: 0.0,
            y: 0.0,
            rotated: true,
        };
        assert_eq!(placement.dimensions(), (1200.0, 800.0));
        assert_eq!(placement.area(), 800.0 * 1200.0);
    }

    #[test]
    fn test_sheet_efficiency() {
        let stock = StockSheet::new(6, 1000.0, 1000.0).unwrap();
        let mut sheet = SheetLayout::new(stock);
        sheet.placements.push(Placement {
            width_mm: 500.0,
            height_mm: 1000.0,
            x: 0.0,
            y: 0.0,
            rotated: false,
        });
        assert!((sheet.efficiency_percent() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_report_shape_round_trips() {
        let stock = StockSheet::new(10, 3600.0, 2600.0).unwrap();
        let mut sheet = SheetLayout::new(stock);
        sheet.placements.push(Placement {
            width_mm: 1167.0,
            height_mm: 2180.0,
            x: 0.0,
            y: 0.0,
            rotated: false,
        });

        let mut plans = BTreeMap::new();
        plans.insert(
            "CL10".to_string(),
            CutPlan {
                code: "CL10".to_string(),
                stock,
                sheets: vec![sheet],
            },
        );

        let report = PlanReport::from_plans(&plans);
        let json = serde_json::to_string_pretty(&report).unwrap();
        let parsed: PlanReport = serde_json::from_str(&json).unwrap();

        let code = parsed.glass.get("CL10").unwrap();
        assert_eq!(code.summary.total_sheets, 1);
        assert_eq!(code.summary.total_pieces, 1);
        assert_eq!(code.sheets[0].pieces[0].position.x, 0.0);
        assert!(!code.sheets[0].pieces[0].rotated);
    }
}
