use clap::Parser;
use glasscut::core::ConfigProvider;
use glasscut::utils::{logger, validation::Validate};
use glasscut::{CuttingPipeline, LocalStorage, Packer, PlanEngine, TomlConfig};

#[derive(Parser)]
#[command(name = "toml_cut")]
#[command(about = "Cutting plan generator driven by a TOML configuration")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "glasscut.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON logs instead of the compact console format (cron, CI)
    #[arg(long)]
    json_logs: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Dry run - show what would be processed without executing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting TOML-driven cutting planner");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");

    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
        perform_dry_run(&config);
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(config.output_path().to_string());
    let inventory = config.build_inventory()?;
    let packer = Packer::new(config.allow_rotation());

    let mut pipeline = CuttingPipeline::new(storage, config.clone())
        .with_inventory(inventory)
        .with_packer(packer);
    if let Some(item_map) = config.extract.item_map.clone() {
        pipeline = pipeline.with_item_map(item_map);
    }

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

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!(
        "  Pipeline: {} v{}",
        config.pipeline.name, config.pipeline.version
    );
    match config.input_csv() {
        Some(path) => println!("  Source: CSV file {}", path),
        None => println!("  Source: {}", config.api_endpoint()),
    }
    println!("  Output: {}", config.output_path());
    println!("  Formats: {}", config.load.output_formats.join(", "));
    println!("  Rotation allowed: {}", config.allow_rotation());

    if let Some(max_rows) = config.max_rows() {
        println!("  Max Rows: {}", max_rows);
    }

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &TomlConfig) {
    println!("🔍 Dry Run Analysis:");
    println!();

    println!("📡 Data Source:");
    match config.input_csv() {
        Some(path) => println!("  CSV file: {}", path),
        None => {
            println!("  Endpoint: {}", config.api_endpoint());
            if let Some(timeout) = config.source.timeout_seconds {
                println!("  Timeout: {}s", timeout);
            }
        }
    }

    println!();
    println!("🏭 Stock Catalog:");
    match config.build_inventory() {
        Ok(inventory) => {
            for code in inventory.codes() {
                if let Ok(sheet) = inventory.get(code) {
                    println!(
                        "  {} - {}x{}mm, {}mm thick",
                        code, sheet.width_mm, sheet.height_mm, sheet.thickness_mm
                    );
                }
            }
        }
        Err(e) => println!("  ⚠️ Invalid stock configuration: {}", e),
    }

    if let Some(item_map) = &config.extract.item_map {
        println!();
        println!("🔄 Item Code Mapping:");
        for (from, to) in item_map {
            println!("  {} -> {}", from, to);
        }
    }

    println!();
    println!("💾 Output Configuration:");
    println!("  Path: {}", config.output_path());
    println!("  Formats: {}", config.load.output_formats.join(", "));
    if config.compression_enabled() {
        println!("  Compression: enabled (ZIP bundle)");
    }

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_logs_flag_parses() {
        let args = Args::try_parse_from(["toml_cut", "--json-logs"]).unwrap();
        assert!(args.json_logs);
        assert!(!args.dry_run);

        let args = Args::try_parse_from(["toml_cut", "-c", "custom.toml"]).unwrap();
        assert!(!args.json_logs);
        assert_eq!(args.config, "custom.toml");
    }
}
