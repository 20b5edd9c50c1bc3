pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::cli::LocalStorage;
pub use config::toml_config::TomlConfig;

pub use crate::core::{
    engine::PlanEngine, inventory::Inventory, packer::Packer, pipeline::CuttingPipeline,
};
pub use utils::error::{CutError, Result};
