use crate::core::variants::{self, VariantRule};
use crate::domain::model::LatLng;
use crate::domain::ports::Geocode;
use crate::utils::error::{Result, SectionError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

pub const DEFAULT_ENDPOINT: &str = "https://nominatim.openstreetmap.org/search";
pub const DEFAULT_USER_AGENT: &str = "PNW-StreetMapper/1.0 (info@plumsteadwatch.org.za)";
pub const DEFAULT_DELAY: Duration = Duration::from_millis(1100);

/// Narrowest qualifier first.
pub fn default_localities() -> Vec<String> {
    vec![
        "Plumstead, Cape Town, South Africa".to_string(),
        "Plumstead, Cape Town".to_string(),
        "Cape Town, South Africa".to_string(),
    ]
}

/// Search area as min/max longitude and latitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lng: f64,
    pub min_lat: f64,
    pub max_lng: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    pub const PLUMSTEAD: BoundingBox = BoundingBox {
        min_lng: 18.45,
        min_lat: -34.045,
        max_lng: 18.495,
        max_lat: -34.005,
    };

    /// `x1,y1,x2,y2` as the search API expects it.
    pub fn to_viewbox(&self) -> String {
        format!(
            "{},{},{},{}",
            self.min_lng, self.min_lat, self.max_lng, self.max_lat
        )
    }
}

#[derive(Debug, Clone)]
pub struct GeocoderSettings {
    pub endpoint: String,
    pub user_agent: String,
    pub localities: Vec<String>,
    pub rules: Vec<VariantRule>,
    pub viewbox: Option<BoundingBox>,
    /// Minimum gap between two requests, whatever the outcome of the first.
    pub delay: Duration,
    pub timeout: Duration,
}

impl Default for GeocoderSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            localities: default_localities(),
            rules: VariantRule::ALL.to_vec(),
            viewbox: Some(BoundingBox::PLUMSTEAD),
            delay: DEFAULT_DELAY,
            timeout: Duration::from_secs(30),
        }
    }
}

impl GeocoderSettings {
    /// Every query that `resolve` may send, in the order it sends them.
    pub fn queries_for(&self, street_name: &str) -> Vec<String> {
        let names = variants::expand(street_name, &self.rules);
        self.localities
            .iter()
            .flat_map(|locality| names.iter().map(move |v| format!("{}, {}", v, locality)))
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

/// Client for a Nominatim-compatible `/search` endpoint.
pub struct NominatimGeocoder {
    settings: GeocoderSettings,
    client: Client,
    last_request: Mutex<Option<Instant>>,
}

impl NominatimGeocoder {
    pub fn new(settings: GeocoderSettings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(settings.timeout)
            .build()?;
        Ok(Self {
            settings,
            client,
            last_request: Mutex::new(None),
        })
    }

    pub fn settings(&self) -> &GeocoderSettings {
        &self.settings
    }

    /// Waits out the remaining delay since the previous request, then stamps
    /// the current one.
    async fn throttle(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.settings.delay {
                tokio::time::sleep(self.settings.delay - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    /// One search request. `Ok(None)` when the service has no match or answers
    /// with a non-success status.
    pub async fn search(&self, query: &str) -> Result<Option<LatLng>> {
        self.throttle().await;

        let mut params: Vec<(&str, String)> = vec![
            ("q", query.to_string()),
            ("format", "json".to_string()),
            ("limit", "1".to_string()),
        ];
        if let Some(bbox) = &self.settings.viewbox {
            params.push(("viewbox", bbox.to_viewbox()));
            params.push(("bounded", "1".to_string()));
        }

        tracing::debug!("Geocoding query: {}", query);
        let response = self
            .client
            .get(&self.settings.endpoint)
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("Geocoder answered {} for '{}'", status, query);
            return Ok(None);
        }

        let places: Vec<Place> = response.json().await?;
        let Some(place) = places.into_iter().next() else {
            return Ok(None);
        };

        let parse = |field: &str, value: &str| {
            value
                .trim()
                .parse::<f64>()
                .map_err(|e| SectionError::MalformedResponse {
                    message: format!("{} '{}': {}", field, value, e),
                })
        };
        let point = LatLng::new(parse("lat", &place.lat)?, parse("lon", &place.lon)?);
        if !point.is_finite() {
            return Err(SectionError::MalformedResponse {
                message: format!("non-finite coordinates for '{}'", query),
            });
        }
        Ok(Some(point))
    }
}

#[async_trait]
impl Geocode for NominatimGeocoder {
    async fn resolve(&self, street_name: &str) -> Option<LatLng> {
        for query in self.settings.queries_for(street_name) {
            match self.search(&query).await {
                Ok(Some(point)) => {
                    tracing::debug!("'{}' -> ({}, {})", query, point.lat, point.lng);
                    return Some(point);
                }
                Ok(None) => {}
                Err(e) => tracing::warn!("Geocoding '{}' failed: {}", query, e),
            }
        }
        None
    }
}
