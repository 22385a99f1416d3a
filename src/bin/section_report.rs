use anyhow::{bail, Context};
use clap::Parser;
use street_sections::core::report::SectionReport;
use street_sections::core::StreetRepository;
use street_sections::utils::logger;
use street_sections::{JsonStreetStore, ZoneStore};

/// Street counts per section and the streets still waiting for one.
#[derive(Parser)]
#[command(name = "section-report")]
struct Args {
    #[arg(long, default_value = "./streets.json")]
    streets_path: String,

    #[arg(long)]
    zones_path: Option<String>,

    /// Also write the counts as CSV
    #[arg(long)]
    csv: Option<String>,

    /// List the streets in every section
    #[arg(long)]
    list: bool,

    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    let zones = ZoneStore::load(args.zones_path.as_deref()).context("loading zone table")?;
    if zones.is_empty() {
        bail!("zone table has no sections");
    }
    let streets = JsonStreetStore::new(&args.streets_path)
        .list_streets()
        .await
        .with_context(|| format!("reading {}", args.streets_path))?;

    let report = SectionReport::build(&streets, &zones);

    println!("Section street counts:");
    for s in &report.sections {
        println!("  {} ({}): {}", s.name, s.id, s.street_count);
        if args.list {
            for name in &s.streets {
                println!("      {}", name);
            }
        }
    }
    for (id, name) in &report.unknown {
        println!("  ⚠️ {} -> unknown section {}", name, id);
    }
    println!("  TOTAL: {}\n", report.total);

    println!("Unassigned streets ({}):", report.unassigned.len());
    for name in &report.unassigned {
        println!("  {}", name);
    }

    if let Some(path) = &args.csv {
        let file =
            std::fs::File::create(path).with_context(|| format!("creating {}", path))?;
        report.write_csv(file)?;
        println!("\n📁 CSV saved to: {}", path);
    }

    Ok(())
}
