pub mod engine;
pub mod geocoder;
pub mod report;
pub mod spatial;
pub mod variants;
pub mod zones;

pub use crate::domain::model::{AssignmentSummary, LatLng, Outcome, Section, StreetRecord};
pub use crate::domain::ports::{AssignmentOptions, ConfigProvider, Geocode, StreetRepository};
pub use crate::utils::error::Result;
