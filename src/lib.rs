pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::{json_store::JsonStreetStore, toml_config::TomlConfig};
pub use core::{
    engine::AssignmentEngine,
    geocoder::{GeocoderSettings, NominatimGeocoder},
    spatial::SpatialResolver,
    zones::ZoneStore,
};
pub use utils::error::{Result, SectionError};
