use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A latitude/longitude pair, treated as a point on a flat plane.
///
/// Serialized as a `[lat, lng]` pair so zone tables stay compact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

impl From<[f64; 2]> for LatLng {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

impl From<LatLng> for [f64; 2] {
    fn from(p: LatLng) -> Self {
        [p.lat, p.lng]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: String,
    /// Implicitly closed ring; the last vertex connects back to the first.
    #[serde(default)]
    pub polygon: Option<Vec<LatLng>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreetRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub order: i64,
}

impl StreetRecord {
    pub fn is_assigned(&self) -> bool {
        self.section.is_some()
    }
}

/// How a street got its section in this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome {
    Exact,
    Nearest,
    Neighbour,
    FallbackDefault,
    Skipped,
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Exact => "exact",
            Outcome::Nearest => "nearest",
            Outcome::Neighbour => "neighbour",
            Outcome::FallbackDefault => "fallback-default",
            Outcome::Skipped => "skipped",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersistFailure {
    pub street_id: String,
    pub street_name: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssignmentSummary {
    pub generated_at: DateTime<Utc>,
    pub total: usize,
    pub skipped: usize,
    pub exact: usize,
    pub nearest: usize,
    pub neighbour: usize,
    pub fallback_default: usize,
    pub still_unassigned: usize,
    /// Names that exhausted every variant and locality qualifier.
    pub failed_geocode: Vec<String>,
    pub persist_failures: Vec<PersistFailure>,
}

impl AssignmentSummary {
    pub fn new(total: usize) -> Self {
        Self {
            generated_at: Utc::now(),
            total,
            skipped: 0,
            exact: 0,
            nearest: 0,
            neighbour: 0,
            fallback_default: 0,
            still_unassigned: 0,
            failed_geocode: Vec::new(),
            persist_failures: Vec::new(),
        }
    }

    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Exact => self.exact += 1,
            Outcome::Nearest => self.nearest += 1,
            Outcome::Neighbour => self.neighbour += 1,
            Outcome::FallbackDefault => self.fallback_default += 1,
            Outcome::Skipped => self.skipped += 1,
        }
    }

    /// Records changed by this run.
    pub fn assigned(&self) -> usize {
        self.exact + self.nearest + self.neighbour + self.fallback_default
    }
}

impl std::fmt::Display for AssignmentSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "--- Results ---")?;
        writeln!(f, "Assigned (exact): {}", self.exact)?;
        writeln!(f, "Assigned (nearest): {}", self.nearest)?;
        writeln!(f, "Assigned (neighbour): {}", self.neighbour)?;
        writeln!(f, "Assigned (fallback): {}", self.fallback_default)?;
        writeln!(f, "Skipped (already assigned): {}", self.skipped)?;
        writeln!(f, "Still unassigned: {}", self.still_unassigned)?;

        if !self.failed_geocode.is_empty() {
            writeln!(f, "\nFailed to geocode:")?;
            for name in &self.failed_geocode {
                writeln!(f, "  - {}", name)?;
            }
        }
        if !self.persist_failures.is_empty() {
            writeln!(f, "\nNot saved:")?;
            for p in &self.persist_failures {
                writeln!(f, "  - {} ({}): {}", p.street_name, p.street_id, p.message)?;
            }
        }
        Ok(())
    }
}
