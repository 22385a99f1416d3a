use clap::Parser;
use street_sections::core::ConfigProvider;
use street_sections::utils::error::ErrorSeverity;
use street_sections::utils::{logger, validation::Validate};
use street_sections::{
    AssignmentEngine, CliConfig, JsonStreetStore, NominatimGeocoder, SectionError, ZoneStore,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting street-sections");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if config.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    match run(&config).await {
        Ok(summary) => {
            println!();
            print!("{}", summary);

            if let Some(path) = &config.summary_path {
                std::fs::write(path, serde_json::to_vec_pretty(&summary)?)?;
                println!("\n📁 Summary saved to: {}", path);
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ Assignment failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

async fn run(
    config: &CliConfig,
) -> Result<street_sections::core::AssignmentSummary, SectionError> {
    let zones = ZoneStore::load(config.zones_path())?;
    tracing::info!("Loaded {} sections", zones.len());
    let repository = JsonStreetStore::new(config.streets_path());
    let geocoder = NominatimGeocoder::new(config.geocoder_settings())?;

    let engine = AssignmentEngine::new(
        repository,
        geocoder,
        zones,
        config.assignment_options(),
    )?
        .with_monitoring(config.monitor);
    engine.run().await
}
