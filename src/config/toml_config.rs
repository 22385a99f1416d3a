use crate::core::geocoder::{self, BoundingBox, GeocoderSettings};
use crate::core::variants::VariantRule;
use crate::domain::ports::{AssignmentOptions, ConfigProvider};
use crate::utils::error::{Result, SectionError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

static ENV_VAR: LazyLock<regex::Regex> =
    LazyLock::new(|| {
        regex::Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid")
    });

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub run: RunConfig,
    #[serde(default)]
    pub geocoder: GeocoderConfig,
    #[serde(default)]
    pub assignment: AssignmentConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub name: String,
    pub streets_path: String,
    pub zones_path: Option<String>,
    pub summary_path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeocoderConfig {
    pub endpoint: Option<String>,
    pub user_agent: Option<String>,
    pub delay_ms: Option<u64>,
    pub timeout_seconds: Option<u64>,
    /// Narrowest first; each is tried with every name variant before the next.
    pub localities: Option<Vec<String>>,
    pub viewbox: Option<BoundingBox>,
    pub bounded: Option<bool>,
    pub rules: Option<Vec<VariantRule>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssignmentConfig {
    pub default_section: Option<String>,
    pub neighbour_window: Option<usize>,
    pub neighbour_fallback: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_level: Option<String>,
    pub json_logs: Option<bool>,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content);

        toml::from_str(&processed).map_err(|e| SectionError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left as-is.
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("run.name", &self.run.name)?;
        validation::validate_path("run.streets_path", &self.run.streets_path)?;
        if let Some(zones) = &self.run.zones_path {
            validation::validate_path("run.zones_path", zones)?;
        }

        let settings = self.geocoder_settings();
        validation::validate_url("geocoder.endpoint", &settings.endpoint)?;
        validation::validate_non_empty_string("geocoder.user_agent", &settings.user_agent)?;
        validation::validate_range(
            "geocoder.delay_ms",
            settings.delay.as_millis() as u64,
            1000,
            60_000,
        )?;
        if settings.localities.is_empty() {
            return Err(SectionError::InvalidConfigValueError {
                field: "geocoder.localities".to_string(),
                value: "[]".to_string(),
                reason: "At least one locality qualifier is required".to_string(),
            });
        }
        if let Some(bbox) = &settings.viewbox {
            if bbox.min_lng >= bbox.max_lng || bbox.min_lat >= bbox.max_lat {
                return Err(SectionError::InvalidConfigValueError {
                    field: "geocoder.viewbox".to_string(),
                    value: bbox.to_viewbox(),
                    reason: "min must be below max on both axes".to_string(),
                });
            }
        }

        let options = self.assignment_options();
        validation::validate_non_empty_string(
            "assignment.default_section",
            &options.default_section,
        )?;
        validation::validate_range(
            "assignment.neighbour_window",
            options.neighbour_window,
            1,
            50,
        )?;

        Ok(())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    /// `log_level = "debug"` (or `"trace"`) turns on debug output like `--verbose`.
    pub fn debug_logging(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.log_level.as_deref())
            .map(|level| matches!(level.to_ascii_lowercase().as_str(), "debug" | "trace"))
            .unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.json_logs)
            .unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn streets_path(&self) -> &str {
        &self.run.streets_path
    }

    fn zones_path(&self) -> Option<&str> {
        self.run.zones_path.as_deref()
    }

    fn geocoder_settings(&self) -> GeocoderSettings {
        let g = &self.geocoder;
        let defaults = GeocoderSettings::default();
        let viewbox = if g.bounded.unwrap_or(true) {
            g.viewbox.or(defaults.viewbox)
        } else {
            None
        };

        GeocoderSettings {
            endpoint: g.endpoint.clone().unwrap_or(defaults.endpoint),
            user_agent: g.user_agent.clone().unwrap_or(defaults.user_agent),
            localities: g.localities.clone().unwrap_or_else(geocoder::default_localities),
            rules: g.rules.clone().unwrap_or(defaults.rules),
            viewbox,
            delay: g.delay_ms.map(Duration::from_millis).unwrap_or(defaults.delay),
            timeout: g
                .timeout_seconds
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        }
    }

    fn assignment_options(&self) -> AssignmentOptions {
        let a = &self.assignment;
        let defaults = AssignmentOptions::default();
        AssignmentOptions {
            default_section: a.default_section.clone().unwrap_or(defaults.default_section),
            neighbour_window: a.neighbour_window.unwrap_or(defaults.neighbour_window),
            neighbour_fallback: a.neighbour_fallback.unwrap_or(defaults.neighbour_fallback),
        }
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
