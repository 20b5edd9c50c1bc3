//! Item code normalization and grouping of production rows.
//!
//! Upstream item codes encode the thickness with assorted prefixes and a
//! trailing "T" for tempered glass ("CC06T", "CMTB6T", "CSLCL06T"). All of
//! them collapse to a normalized "CL<thickness>" code so identical glass
//! can be cut from the same stock.

use crate::domain::model::{GlassGroup, PieceDemand, ProductionRow};
use std::collections::{BTreeMap, HashMap};

/// Extract the thickness in mm from an item code.
///
/// "CC06T" -> Some(6), "CC10T" -> Some(10), "CMTB6T" -> Some(6),
/// codes without digits -> None.
pub fn extract_thickness(item: &str) -> Option<u32> {
    let stripped = item.trim().trim_end_matches('T');

    let digits: String = stripped.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Normalize an item code to the "CL<thickness>" form. Codes that carry no
/// thickness pass through unchanged.
pub fn normalize_item_code(item: &str) -> String {
    match extract_thickness(item) {
        Some(thickness) => format!("CL{}", thickness),
        None => item.trim().to_string(),
    }
}

/// Group production rows by glass code, merging equal panel sizes by
/// summing quantities. An explicit `item_map` entry wins over
/// CL-normalization, so catalog codes like "HN6" or "FIL6" can be kept
/// apart from plain clear glass. Rows without a usable thickness, with
/// non-positive dimensions, or with zero quantity are skipped with a
/// warning.
pub fn group_rows(
    rows: &[ProductionRow],
    item_map: Option<&HashMap<String, String>>,
) -> Vec<GlassGroup> {
    let mut groups: BTreeMap<String, (u32, Vec<PieceDemand>)> = BTreeMap::new();
    let mut skipped = 0usize;

    for row in rows {
        let thickness = match row.thickness_mm.or_else(|| extract_thickness(&row.item)) {
            Some(t) if t > 0 => t,
            _ => {
                tracing::warn!("Skipping row with unknown thickness: item '{}'", row.item);
                skipped += 1;
                continue;
            }
        };

        if row.length_mm <= 0.0
            || row.width_mm <= 0.0
            || !row.length_mm.is_finite()
            || !row.width_mm.is_finite()
        {
            tracing::warn!(
                "Skipping row with invalid dimensions: {}x{} for '{}'",
                row.length_mm,
                row.width_mm,
                row.item
            );
            skipped += 1;
            continue;
        }

        if row.quantity == 0 {
            skipped += 1;
            continue;
        }

        let code = item_map
            .and_then(|map| map.get(row.item.trim()).cloned())
            .unwrap_or_else(|| normalize_item_code(&row.item));
        let entry = groups.entry(code).or_insert_with(|| (thickness, Vec::new()));

        // Largo is the piece width, Ancho the height, matching the
        // upstream "Measures" column order
        let width = row.length_mm;
        let height = row.width_mm;

        match entry
            .1
            .iter_mut()
            .find(|d| d.width_mm == width && d.height_mm == height)
        {
            Some(existing) => existing.quantity += row.quantity,
            None => entry.1.push(PieceDemand {
                width_mm: width,
                height_mm: height,
                quantity: row.quantity,
            }),
        }
    }

    if skipped > 0 {
        tracing::warn!("Skipped {} unusable rows during grouping", skipped);
    }

    groups
        .into_iter()
        .map(|(code, (thickness_mm, mut demands))| {
            // Largest pieces first; stable tiebreak on width for
            // deterministic output
            demands.sort_by(|a, b| {
                b.area()
                    .partial_cmp(&a.area())
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(
                        b.width_mm
                            .partial_cmp(&a.width_mm)
                            .unwrap_or(std::cmp::Ordering::Equal),
                    )
            });
            GlassGroup {
                code,
                thickness_mm,
                demands,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(item: &str, largo: f64, ancho: f64, qty: u32) -> ProductionRow {
        ProductionRow {
            item: item.to_string(),
            thickness_mm: None,
            length_mm: largo,
            width_mm: ancho,
            quantity: qty,
        }
    }

    #[test]
    fn test_extract_thickness() {
        assert_eq!(extract_thickness("CC06T"), Some(6));
        assert_eq!(extract_thickness("CC10T"), Some(10));
        assert_eq!(extract_thickness("CMTB6T"), Some(6));
        assert_eq!(extract_thickness("CSLCL06T"), Some(6));
        assert_eq!(extract_thickness("CC06"), Some(6));
        assert_eq!(extract_thickness("ABC"), None);
        assert_eq!(extract_thickness(""), None);
    }

    #[test]
    fn test_normalize_item_code() {
        assert_eq!(normalize_item_code("CC06T"), "CL6");
        assert_eq!(normalize_item_code("CC10T"), "CL10");
        assert_eq!(normalize_item_code("CSLCL06T"), "CL6");
        assert_eq!(normalize_item_code("ABC"), "ABC");
    }

    #[test]
    fn test_group_rows_merges_equal_sizes() {
        let rows = vec![
            row("CC06T", 800.0, 1200.0, 2),
            row("CMTB6T", 800.0, 1200.0, 3),
            row("CC06T", 500.0, 500.0, 1),
        ];

        let groups = group_rows(&rows, None);
        assert_eq!(groups.len(), 1);

        let group = &groups[0];
        assert_eq!(group.code, "CL6");
        assert_eq!(group.thickness_mm, 6);
        assert_eq!(group.unique_sizes(), 2);
        assert_eq!(group.total_pieces(), 6);

        // Sorted largest-area first
        assert_eq!(group.demands[0].width_mm, 800.0);
        assert_eq!(group.demands[0].quantity, 5);
    }

    #[test]
    fn test_group_rows_separates_thicknesses() {
        let rows = vec![
            row("CC06T", 800.0, 1200.0, 1),
            row("CC10T", 800.0, 1200.0, 1),
        ];

        let groups = group_rows(&rows, None);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].code, "CL10");
        assert_eq!(groups[1].code, "CL6");
    }

    #[test]
    fn test_group_rows_skips_bad_rows() {
        let rows = vec![
            row("NODIGITS", 800.0, 1200.0, 1),
            row("CC06T", -5.0, 1200.0, 1),
            row("CC06T", 800.0, 1200.0, 0),
            row("CC06T", 800.0, 1200.0, 2),
        ];

        let groups = group_rows(&rows, None);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].total_pieces(), 2);
    }

    #[test]
    fn test_explicit_thickness_column_wins() {
        let rows = vec![ProductionRow {
            item: "HN6".to_string(),
            thickness_mm: Some(6),
            length_mm: 700.0,
            width_mm: 900.0,
            quantity: 4,
        }];

        let groups = group_rows(&rows, None);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].code, "CL6");
        assert_eq!(groups[0].thickness_mm, 6);
    }

    #[test]
    fn test_item_map_overrides_normalization() {
        let mut map = HashMap::new();
        map.insert("HN6".to_string(), "HN6".to_string());

        let rows = vec![
            row("HN6", 700.0, 900.0, 2),
            row("CC06T", 800.0, 1200.0, 1),
        ];

        let groups = group_rows(&rows, Some(&map));
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].code, "CL6");
        assert_eq!(groups[1].code, "HN6");
    }
}
