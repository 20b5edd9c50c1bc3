use crate::domain::model::StockSheet;
use crate::utils::error::{CutError, Result};
use std::collections::BTreeMap;

/// Stock sheet catalog keyed by glass code.
#[derive(Debug, Clone)]
pub struct Inventory {
    sheets: BTreeMap<String, StockSheet>,
}

impl Inventory {
    /// Empty catalog; use `Inventory::default()` for the standard one.
    pub fn empty() -> Self {
        Self {
            sheets: BTreeMap::new(),
        }
    }

    pub fn get(&self, code: &str) -> Result<StockSheet> {
        self.sheets
            .get(code)
            .copied()
            .ok_or_else(|| CutError::UnknownGlassCode {
                code: code.to_string(),
            })
    }

    pub fn add(&mut self, code: &str, sheet: StockSheet) {
        self.sheets.insert(code.to_string(), sheet);
    }

    pub fn contains(&self, code: &str) -> bool {
        self.sheets.contains_key(code)
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.sheets.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

impl Default for Inventory {
    /// The supplier's standard sheet sizes.
    fn default() -> Self {
        let mut inv = Self::empty();
        let catalog: [(&str, u32, f64, f64); 6] = [
            ("CL3", 3, 2440.0, 1830.0),  // 3mm standard sheet
            ("CL4", 4, 2440.0, 1830.0),  // 4mm standard sheet
            ("CL6", 6, 3300.0, 2600.0),  // 6mm large sheet
            ("CL10", 10, 3600.0, 2600.0),
            ("HN6", 6, 3300.0, 2600.0),
            ("FIL6", 6, 3600.0, 2600.0),
        ];
        for (code, thickness, width, height) in catalog {
            // Catalog constants are known-positive
            let sheet = StockSheet {
                thickness_mm: thickness,
                width_mm: width,
                height_mm: height,
            };
            inv.add(code, sheet);
        }
        inv
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog() {
        let inv = Inventory::default();
        assert_eq!(inv.len(), 6);

        let cl10 = inv.get("CL10").unwrap();
        assert_eq!(cl10.thickness_mm, 10);
        assert_eq!(cl10.width_mm, 3600.0);
        assert_eq!(cl10.height_mm, 2600.0);
    }

    #[test]
    fn test_unknown_code() {
        let inv = Inventory::default();
        let err = inv.get("XX9").unwrap_err();
        assert!(matches!(err, CutError::UnknownGlassCode { .. }));
    }

    #[test]
    fn test_add_overrides() {
        let mut inv = Inventory::default();
        inv.add("CL6", StockSheet::new(6, 3210.0, 2250.0).unwrap());
        let cl6 = inv.get("CL6").unwrap();
        assert_eq!(cl6.width_mm, 3210.0);
    }
}
