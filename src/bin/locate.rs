use anyhow::{bail, Context};
use clap::Parser;
use street_sections::core::LatLng;
use street_sections::utils::logger;
use street_sections::{SpatialResolver, ZoneStore};

/// Which section contains a point; the nearest one when none does.
#[derive(Parser)]
#[command(name = "locate")]
struct Args {
    #[arg(long, allow_hyphen_values = true)]
    lat: f64,

    #[arg(long, allow_hyphen_values = true)]
    lng: f64,

    /// Zone table (TOML); the built-in table is used when omitted
    #[arg(long)]
    zones: Option<String>,

    /// Print the answer as JSON
    #[arg(long)]
    json: bool,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    let point = LatLng::new(args.lat, args.lng);
    if !point.is_finite() {
        bail!("coordinates must be finite numbers");
    }

    let zones = ZoneStore::load(args.zones.as_deref()).context("loading zone table")?;
    let resolver = SpatialResolver::new(&zones);
    let Some(placement) = resolver.locate(point) else {
        bail!("zone table has no polygons");
    };

    let name = zones.display_name(placement.section_id);
    if args.json {
        let out = serde_json::json!({
            "section": placement.section_id,
            "name": name,
            "exact": placement.exact,
        });
        println!("{}", out);
    } else if placement.exact {
        println!("{} ({})", name, placement.section_id);
    } else {
        println!("{} ({}) (nearest)", name, placement.section_id);
    }

    Ok(())
}
