use clap::Parser;
use street_sections::core::{ConfigProvider, StreetRepository};
use street_sections::utils::error::ErrorSeverity;
use street_sections::utils::{logger, validation::Validate};
use street_sections::{
    AssignmentEngine, JsonStreetStore, NominatimGeocoder, TomlConfig, ZoneStore,
};

#[derive(Parser)]
#[command(name = "toml-assign")]
#[command(about = "Street section assignment driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "street-sections.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Print the queries each unassigned street would send, without sending them
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    let verbose = args.verbose || config.debug_logging();
    if config.json_logs() {
        logger::init_json_logger(verbose);
    } else {
        logger::init_cli_logger(verbose);
    }
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    display_config_summary(&config, &args);

    let zones = ZoneStore::load(config.zones_path())?;
    let repository = JsonStreetStore::new(config.streets_path());

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - no geocoder requests will be sent");
        perform_dry_run(&config, &repository).await?;
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    let geocoder = NominatimGeocoder::new(config.geocoder_settings())?;
    let engine = AssignmentEngine::new(
        repository,
        geocoder,
        zones,
        config.assignment_options(),
    )?
        .with_monitoring(monitor_enabled);

    match engine.run().await {
        Ok(summary) => {
            println!();
            print!("{}", summary);
            if let Some(path) = &config.run.summary_path {
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

fn display_config_summary(config: &TomlConfig, args: &Args) {
    let settings = config.geocoder_settings();
    let options = config.assignment_options();

    println!("📋 Configuration Summary:");
    println!("  Run: {}", config.run.name);
    println!("  Streets: {}", config.streets_path());
    println!("  Zones: {}", config.zones_path().unwrap_or("(built-in)"));
    println!("  Geocoder: {}", settings.endpoint);
    println!("  Delay: {:?}", settings.delay);
    match &settings.viewbox {
        Some(bbox) => println!("  Bounded to: {}", bbox.to_viewbox()),
        None => println!("  Bounded to: (none)"),
    }
    println!("  Localities: {}", settings.localities.join(" | "));
    println!(
        "  Fallback: {} (window {}, default {})",
        if options.neighbour_fallback { "neighbour vote" } else { "off" },
        options.neighbour_window,
        options.default_section
    );

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

async fn perform_dry_run(
    config: &TomlConfig,
    repository: &JsonStreetStore,
) -> Result<(), Box<dyn std::error::Error>> {
    let settings = config.geocoder_settings();
    let streets = repository.list_streets().await?;
    let pending: Vec<_> = streets.iter().filter(|s| !s.is_assigned()).collect();

    println!("🔍 Dry Run Analysis:");
    println!("  {} of {} streets have no section", pending.len(), streets.len());
    println!();

    let mut worst_case = 0;
    for street in pending {
        let queries = settings.queries_for(&street.name);
        worst_case += queries.len();
        println!("  {} ({} queries)", street.name, queries.len());
        for q in queries {
            println!("    {}", q);
        }
    }

    println!();
    println!(
        "⏱️ Worst case: {} requests, at least {:?}",
        worst_case,
        settings.delay * worst_case as u32
    );

    Ok(())
}
