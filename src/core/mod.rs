pub mod engine;
pub mod inventory;
pub mod normalize;
pub mod packer;
pub mod pipeline;

pub use crate::domain::model::{
    CutPlan, GlassGroup, PieceDemand, PlanResult, ProductionRow, StockSheet,
};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
