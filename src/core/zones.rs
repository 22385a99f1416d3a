use crate::domain::model::{LatLng, Section};
use crate::utils::error::{Result, SectionError};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

static EMBEDDED_ZONES: &str = include_str!("../../data/zones.toml");

#[derive(Debug, Deserialize)]
struct ZoneFile {
    #[serde(default)]
    sections: Vec<Section>,
}

/// Read-only table of sections and their polygons. Iteration order is the
/// order sections were authored in, and it breaks ties in the resolver.
#[derive(Debug, Clone)]
pub struct ZoneStore {
    sections: Vec<Section>,
}

impl ZoneStore {
    pub fn new(sections: Vec<Section>) -> Result<Self> {
        let mut seen = HashSet::new();
        for section in &sections {
            if !seen.insert(section.id.as_str()) {
                return Err(SectionError::InvalidGeometry {
                    section_id: section.id.clone(),
                    reason: "duplicate section id".to_string(),
                });
            }
            if let Some(ring) = &section.polygon {
                if ring.len() < 3 {
                    return Err(SectionError::InvalidGeometry {
                        section_id: section.id.clone(),
                        reason: format!(
                            "polygon needs at least 3 vertices, got {}",
                            ring.len()
                        ),
                    });
                }
                if !ring.iter().all(LatLng::is_finite) {
                    return Err(SectionError::InvalidGeometry {
                        section_id: section.id.clone(),
                        reason: "polygon has non-finite coordinates".to_string(),
                    });
                }
            }
        }
        Ok(Self { sections })
    }

    /// The table shipped with the crate.
    pub fn embedded() -> Result<Self> {
        Self::from_toml_str(EMBEDDED_ZONES)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ZoneFile = toml::from_str(content)?;
        Self::new(file.sections)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Loads `path` when given, otherwise the embedded table.
    pub fn load(path: Option<&str>) -> Result<Self> {
        match path {
            Some(p) => {
                tracing::debug!("Loading zone table from {}", p);
                Self::from_file(p)
            }
            None => Self::embedded(),
        }
    }

    pub fn all_sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, section_id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == section_id)
    }

    pub fn polygon_for(&self, section_id: &str) -> Option<&[LatLng]> {
        self.section(section_id)?.polygon.as_deref()
    }

    /// Display name for a section id, falling back to the id itself.
    pub fn display_name<'a>(&'a self, section_id: &'a str) -> &'a str {
        self.section(section_id)
            .map(|s| s.name.as_str())
            .unwrap_or(section_id)
    }

    pub fn has_geometry(&self) -> bool {
        self.sections.iter().any(|s| s.polygon.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_table_loads_in_order() {
        let store = ZoneStore::embedded().unwrap();
        let ids: Vec<&str> = store.all_sections().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids.first(), Some(&"section-1"));
        assert!(ids.contains(&"section-5"));
        assert!(store.has_geometry());
    }

    #[test]
    fn section_without_polygon_has_no_ring() {
        let store = ZoneStore::embedded().unwrap();
        assert!(store.section("section-10").is_some());
        assert!(store.polygon_for("section-10").is_none());
        assert!(store.polygon_for("section-3").is_some());
        assert!(store.polygon_for("section-404").is_none());
    }

    #[test]
    fn rejects_degenerate_polygon() {
        let toml = r##"
[[sections]]
id = "a"
name = "A"
polygon = [[0.0, 0.0], [1.0, 1.0]]
"##;
        assert!(matches!(
            ZoneStore::from_toml_str(toml),
            Err(SectionError::InvalidGeometry { .. })
        ));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let toml = r##"
[[sections]]
id = "a"
name = "A"

[[sections]]
id = "a"
name = "Again"
"##;
        assert!(ZoneStore::from_toml_str(toml).is_err());
    }

    #[test]
    fn display_name_falls_back_to_id() {
        let store = ZoneStore::embedded().unwrap();
        assert_eq!(store.display_name("section-3"), "Section 3");
        assert_eq!(store.display_name("nowhere"), "nowhere");
    }
}
