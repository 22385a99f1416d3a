use crate::core::geocoder::GeocoderSettings;
use crate::domain::model::{LatLng, StreetRecord};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Whatever storage layer owns the streets.
pub trait StreetRepository: Send + Sync {
    fn list_streets(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<StreetRecord>>> + Send;
    fn update_section(
        &self,
        street_id: &str,
        section_id: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

#[async_trait]
pub trait Geocode: Send + Sync {
    /// Resolves a free-text street name. Absent means every attempt came back empty.
    async fn resolve(&self, street_name: &str) -> Option<LatLng>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentOptions {
    pub default_section: String,
    pub neighbour_window: usize,
    pub neighbour_fallback: bool,
}

impl Default for AssignmentOptions {
    fn default() -> Self {
        Self {
            default_section: "section-5".to_string(),
            neighbour_window: 5,
            neighbour_fallback: true,
        }
    }
}

pub trait ConfigProvider: Send + Sync {
    fn streets_path(&self) -> &str;
    fn zones_path(&self) -> Option<&str>;
    fn geocoder_settings(&self) -> GeocoderSettings;
    fn assignment_options(&self) -> AssignmentOptions;
}
