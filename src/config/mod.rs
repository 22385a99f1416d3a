pub mod json_store;
pub mod toml_config;

use crate::core::geocoder::{self, BoundingBox, GeocoderSettings};
use crate::core::variants::VariantRule;
use crate::domain::ports::{AssignmentOptions, ConfigProvider};
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "street-sections")]
#[command(about = "Assign every street to a neighbourhood section by geocoding its name")]
pub struct CliConfig {
    /// JSON file holding the street records
    #[arg(long, default_value = "./streets.json")]
    pub streets_path: String,

    /// Zone table (TOML); the built-in table is used when omitted
    #[arg(long)]
    pub zones_path: Option<String>,

    #[arg(long, default_value = geocoder::DEFAULT_ENDPOINT)]
    pub endpoint: String,

    #[arg(long, default_value = geocoder::DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Minimum gap between geocoder requests, in milliseconds
    #[arg(long, default_value = "1100")]
    pub delay_ms: u64,

    #[arg(long, default_value = "30")]
    pub timeout_seconds: u64,

    /// Search outside the town's bounding box as well
    #[arg(long)]
    pub unbounded: bool,

    #[arg(long, default_value = "section-5")]
    pub default_section: String,

    #[arg(long, default_value = "5")]
    pub neighbour_window: usize,

    /// Leave streets that never geocode unassigned instead of voting
    #[arg(long)]
    pub no_neighbour_fallback: bool,

    /// Write the run summary as JSON to this path
    #[arg(long)]
    pub summary_path: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory after each phase")]
    pub monitor: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn streets_path(&self) -> &str {
        &self.streets_path
    }

    fn zones_path(&self) -> Option<&str> {
        self.zones_path.as_deref()
    }

    fn geocoder_settings(&self) -> GeocoderSettings {
        GeocoderSettings {
            endpoint: self.endpoint.clone(),
            user_agent: self.user_agent.clone(),
            localities: geocoder::default_localities(),
            rules: VariantRule::ALL.to_vec(),
            viewbox: (!self.unbounded).then_some(BoundingBox::PLUMSTEAD),
            delay: Duration::from_millis(self.delay_ms),
            timeout: Duration::from_secs(self.timeout_seconds),
        }
    }

    fn assignment_options(&self) -> AssignmentOptions {
        AssignmentOptions {
            default_section: self.default_section.clone(),
            neighbour_window: self.neighbour_window,
            neighbour_fallback: !self.no_neighbour_fallback,
        }
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("streets_path", &self.streets_path)?;
        if let Some(zones) = &self.zones_path {
            validation::validate_path("zones_path", zones)?;
        }
        validation::validate_url("endpoint", &self.endpoint)?;
        validation::validate_non_empty_string("user_agent", &self.user_agent)?;
        validation::validate_range("delay_ms", self.delay_ms, 1000, 60_000)?;
        validation::validate_positive_number(
            "timeout_seconds",
            self.timeout_seconds as usize,
            1,
        )?;
        validation::validate_non_empty_string("default_section", &self.default_section)?;
        validation::validate_range("neighbour_window", self.neighbour_window, 1, 50)?;
        Ok(())
    }
}
