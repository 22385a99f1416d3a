use thiserror::Error;

#[derive(Error, Debug)]
pub enum SectionError {
    #[error("Geocoder request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Zone store has no sections with geometry")]
    EmptyZoneStore,

    #[error("Invalid geometry for {section_id}: {reason}")]
    InvalidGeometry { section_id: String, reason: String },

    #[error("Unknown section: {section_id}")]
    UnknownSection { section_id: String },

    #[error("Malformed geocoder response: {message}")]
    MalformedResponse { message: String },

    #[error("Failed to persist section for street {street_id}: {message}")]
    PersistenceError { street_id: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Geometry,
    Persistence,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SectionError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SectionError::HttpError(_) | SectionError::MalformedResponse { .. } => {
                ErrorCategory::Network
            }
            SectionError::MissingConfigError { .. }
            | SectionError::InvalidConfigValueError { .. }
            | SectionError::ConfigValidationError { .. }
            | SectionError::TomlError(_) => ErrorCategory::Configuration,
            SectionError::EmptyZoneStore
            | SectionError::InvalidGeometry { .. }
            | SectionError::UnknownSection { .. } => ErrorCategory::Geometry,
            SectionError::IoError(_) | SectionError::PersistenceError { .. } => {
                ErrorCategory::Persistence
            }
            SectionError::SerializationError(_) | SectionError::CsvError(_) => {
                ErrorCategory::Data
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            SectionError::MalformedResponse { .. } => ErrorSeverity::Low,
            SectionError::HttpError(_) | SectionError::PersistenceError { .. } => {
                ErrorSeverity::Medium
            }
            SectionError::EmptyZoneStore | SectionError::InvalidGeometry { .. } => {
                ErrorSeverity::Critical
            }
            _ => ErrorSeverity::High,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            SectionError::HttpError(_) => "Could not reach the geocoding service".to_string(),
            SectionError::IoError(e) => format!("Could not read or write a file: {}", e),
            SectionError::EmptyZoneStore => {
                "No section polygons are available, nothing can be assigned".to_string()
            }
            SectionError::UnknownSection { section_id } => {
                format!("Section '{}' does not exist in the zone table", section_id)
            }
            SectionError::PersistenceError { street_id, .. } => {
                format!("Street {} could not be saved", street_id)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check connectivity and the geocoder endpoint, then re-run",
            ErrorCategory::Configuration => "Fix the flag or config file value and try again",
            ErrorCategory::Geometry => "Check the zone table has valid polygons and section ids",
            ErrorCategory::Persistence => {
                "Check the streets file is writable; unassigned streets are picked up on re-run"
            }
            ErrorCategory::Data => "Check the input file is well-formed",
        }
    }
}

pub type Result<T> = std::result::Result<T, SectionError>;
