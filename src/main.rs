use clap::Parser;
use glasscut::utils::{logger, validation::Validate};
use glasscut::{CliConfig, CuttingPipeline, LocalStorage, Packer, PlanEngine};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting glasscut");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    // Relative CSV paths are resolved from the working directory, not the
    // output directory the storage is rooted at
    if let Some(csv_path) = &config.input_csv {
        if let Ok(absolute) = std::fs::canonicalize(csv_path) {
            config.input_csv = Some(absolute.to_string_lossy().into_owned());
        }
    }

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(config.output_path.clone());
    let packer = Packer::new(!config.no_rotation);
    let pipeline = CuttingPipeline::new(storage, config).with_packer(packer);

    let engine = PlanEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Cutting plan completed successfully!");
            tracing::info!("📁 Output saved to: {}", output_path);
            println!("✅ Cutting plan completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Cutting plan failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                glasscut::utils::error::ErrorSeverity::Low => 0,
                glasscut::utils::error::ErrorSeverity::Medium => 2,
                glasscut::utils::error::ErrorSeverity::High => 1,
                glasscut::utils::error::ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
