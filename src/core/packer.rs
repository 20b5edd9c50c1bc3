//! Guillotine packing of glass pieces onto stock sheets.
//!
//! Best-area-fit decreasing heuristic: pieces are expanded to units,
//! sorted largest first, and each is placed into the free rectangle that
//! leaves the least waste, trying both orientations. Placing a piece
//! splits its free rectangle into a right strip and a top strip. A new
//! sheet is opened only when nothing else fits on the current one.

use crate::domain::model::{PieceDemand, Placement, SheetLayout, StockSheet};
use crate::utils::error::{CutError, Result};

#[derive(Debug, Clone, Copy)]
struct FreeRect {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

impl FreeRect {
    fn area(&self) -> f64 {
        self.width * self.height
    }
}

#[derive(Debug, Clone, Copy)]
struct PendingPiece {
    width: f64,
    height: f64,
}

impl PendingPiece {
    fn area(&self) -> f64 {
        self.width * self.height
    }

    fn can_rotate(&self) -> bool {
        self.width != self.height
    }
}

#[derive(Debug, Clone)]
pub struct Packer {
    allow_rotation: bool,
}

impl Default for Packer {
    fn default() -> Self {
        Self {
            allow_rotation: true,
        }
    }
}

impl Packer {
    pub fn new(allow_rotation: bool) -> Self {
        Self { allow_rotation }
    }

    /// Pack every demanded piece onto as few sheets as the heuristic
    /// manages. Fails with `PieceTooLarge` when a piece exceeds the stock
    /// sheet in both orientations.
    pub fn pack(
        &self,
        code: &str,
        stock: &StockSheet,
        demands: &[PieceDemand],
    ) -> Result<Vec<SheetLayout>> {
        for demand in demands {
            if !self.fits_stock(stock, demand) {
                return Err(CutError::PieceTooLarge {
                    code: code.to_string(),
                    width: demand.width_mm,
                    height: demand.height_mm,
                });
            }
        }

        let mut pending: Vec<PendingPiece> = demands
            .iter()
            .flat_map(|d| {
                std::iter::repeat(PendingPiece {
                    width: d.width_mm,
                    height: d.height_mm,
                })
                .take(d.quantity as usize)
            })
            .collect();

        pending.sort_by(|a, b| {
            b.area()
                .partial_cmp(&a.area())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut layouts = Vec::new();

        while !pending.is_empty() {
            let mut layout = SheetLayout::new(*stock);
            let mut free = vec![FreeRect {
                x: 0.0,
                y: 0.0,
                width: stock.width_mm,
                height: stock.height_mm,
            }];

            // Keep sweeping the remaining pieces until a full pass places
            // nothing; smaller pieces can still fill gaps left by larger
            // ones.
            let mut placed_any = true;
            while placed_any {
                placed_any = false;
                let mut i = 0;
                while i < pending.len() {
                    match self.find_best_space(&free, pending[i]) {
                        Some((space_index, rotated)) => {
                            let piece = pending.remove(i);
                            Self::place(&mut layout, &mut free, space_index, piece, rotated);
                            placed_any = true;
                        }
                        None => i += 1,
                    }
                }
            }

            debug_assert!(!layout.placements.is_empty());
            layouts.push(layout);
        }

        Ok(layouts)
    }

    fn fits_stock(&self, stock: &StockSheet, demand: &PieceDemand) -> bool {
        let upright = demand.width_mm <= stock.width_mm && demand.height_mm <= stock.height_mm;
        let rotated = self.allow_rotation
            && demand.height_mm <= stock.width_mm
            && demand.width_mm <= stock.height_mm;
        upright || rotated
    }

    /// Free rectangle leaving the least waste for this piece, along with
    /// the orientation to use. Upright placement wins ties.
    fn find_best_space(&self, free: &[FreeRect], piece: PendingPiece) -> Option<(usize, bool)> {
        let mut best: Option<(usize, bool)> = None;
        let mut min_waste = f64::INFINITY;

        for (index, space) in free.iter().enumerate() {
            if piece.width <= space.width && piece.height <= space.height {
                let waste = space.area() - piece.area();
                if waste < min_waste {
                    min_waste = waste;
                    best = Some((index, false));
                }
            }

            if self.allow_rotation
                && piece.can_rotate()
                && piece.height <= space.width
                && piece.width <= space.height
            {
                let waste = space.area() - piece.area();
                if waste < min_waste {
                    min_waste = waste;
                    best = Some((index, true));
                }
            }
        }

        best
    }

    fn place(
        layout: &mut SheetLayout,
        free: &mut Vec<FreeRect>,
        space_index: usize,
        piece: PendingPiece,
        rotated: bool,
    ) {
        // Keep the remaining free rects in creation order so equal-waste
        // ties always resolve to the oldest rectangle
        let space = free.remove(space_index);
        let (w, h) = if rotated {
            (piece.height, piece.width)
        } else {
            (piece.width, piece.height)
        };

        // Guillotine split: right strip keeps the full space height, top
        // strip only the piece width
        if space.width > w {
            free.push(FreeRect {
                x: space.x + w,
                y: space.y,
                width: space.width - w,
                height: space.height,
            });
        }
        if space.height > h {
            free.push(FreeRect {
                x: space.x,
                y: space.y + h,
                width: w,
                height: space.height - h,
            });
        }

        layout.placements.push(Placement {
            width_mm: piece.width,
            height_mm: piece.height,
            x: space.x,
            y: space.y,
            rotated,
        });
    }
}
