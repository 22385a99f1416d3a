use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use street_sections::core::{
    AssignmentOptions, Geocode, LatLng, Section, StreetRecord, StreetRepository,
};
use street_sections::{AssignmentEngine, Result, SectionError, ZoneStore};
use tokio::sync::Mutex;

#[derive(Clone, Default)]
struct MemoryStore {
    streets: Arc<Mutex<Vec<StreetRecord>>>,
    failing_ids: Vec<String>,
    writes: Arc<Mutex<usize>>,
}

impl MemoryStore {
    fn new(streets: Vec<StreetRecord>) -> Self {
        Self {
            streets: Arc::new(Mutex::new(streets)),
            ..Default::default()
        }
    }

    async fn section_of(&self, id: &str) -> Option<String> {
        let streets = self.streets.lock().await;
        streets.iter().find(|s| s.id == id).and_then(|s| s.section.clone())
    }
}

impl StreetRepository for MemoryStore {
    async fn list_streets(&self) -> Result<Vec<StreetRecord>> {
        Ok(self.streets.lock().await.clone())
    }

    async fn update_section(&self, street_id: &str, section_id: &str) -> Result<()> {
        if self.failing_ids.iter().any(|id| id == street_id) {
            return Err(SectionError::PersistenceError {
                street_id: street_id.to_string(),
                message: "database unavailable".to_string(),
            });
        }
        *self.writes.lock().await += 1;
        let mut streets = self.streets.lock().await;
        if let Some(s) = streets.iter_mut().find(|s| s.id == street_id) {
            s.section = Some(section_id.to_string());
        }
        Ok(())
    }
}

/// Answers from a fixed table; anything else fails to geocode.
struct TableGeocoder(HashMap<String, LatLng>);

#[async_trait]
impl Geocode for TableGeocoder {
    async fn resolve(&self, street_name: &str) -> Option<LatLng> {
        self.0.get(street_name).copied()
    }
}

fn nothing_resolves() -> TableGeocoder {
    TableGeocoder(HashMap::new())
}

fn street(i: usize, section: Option<&str>) -> StreetRecord {
    StreetRecord {
        id: format!("s{:02}", i),
        name: format!("Street {}", i),
        section: section.map(str::to_string),
        order: i as i64,
    }
}

#[tokio::test]
async fn test_neighbour_majority_beats_outlier() {
    let mut streets: Vec<StreetRecord> =
        (0..11).map(|i| street(i, Some("section-2"))).collect();
    streets[5].section = None;
    streets[9].section = Some("section-9".to_string());
    let store = MemoryStore::new(streets);

    let engine = AssignmentEngine::new(
        store.clone(),
        nothing_resolves(),
        ZoneStore::embedded().unwrap(),
        AssignmentOptions::default(),
    )
    .unwrap();
    let summary = engine.run().await.unwrap();

    assert_eq!(summary.neighbour, 1);
    assert_eq!(store.section_of("s05").await.as_deref(), Some("section-2"));
}

#[tokio::test]
async fn test_isolated_street_gets_default_section() {
    let streets: Vec<StreetRecord> = (0..3).map(|i| street(i, None)).collect();
    let store = MemoryStore::new(streets);

    let engine = AssignmentEngine::new(
        store.clone(),
        nothing_resolves(),
        ZoneStore::embedded().unwrap(),
        AssignmentOptions::default(),
    )
    .unwrap();
    let summary = engine.run().await.unwrap();

    // votes use the state before the fallback pass, so none of them sees a section
    assert_eq!(summary.fallback_default, 3);
    assert_eq!(summary.neighbour, 0);
    for id in ["s00", "s01", "s02"] {
        assert_eq!(store.section_of(id).await.as_deref(), Some("section-5"));
    }
}

#[tokio::test]
async fn test_processing_follows_order_key_not_input_position() {
    // stored out of order; adjacency must follow `order`
    let streets = vec![
        street(2, Some("section-4")),
        street(0, Some("section-8")),
        street(1, None),
    ];
    let store = MemoryStore::new(streets);

    let engine = AssignmentEngine::new(
        store.clone(),
        nothing_resolves(),
        ZoneStore::embedded().unwrap(),
        AssignmentOptions::default(),
    )
    .unwrap();
    engine.run().await.unwrap();

    // s00 (one before) is seen first and wins the 1-1 tie
    assert_eq!(store.section_of("s01").await.as_deref(), Some("section-8"));
}

#[tokio::test]
async fn test_disabled_fallback_leaves_street_unassigned() {
    let store = MemoryStore::new(vec![street(0, Some("section-1")), street(1, None)]);

    let engine = AssignmentEngine::new(
        store.clone(),
        nothing_resolves(),
        ZoneStore::embedded().unwrap(),
        AssignmentOptions {
            neighbour_fallback: false,
            ..AssignmentOptions::default()
        },
    )
    .unwrap();
    let summary = engine.run().await.unwrap();

    assert_eq!(summary.still_unassigned, 1);
    assert_eq!(summary.failed_geocode, vec!["Street 1"]);
    assert_eq!(store.section_of("s01").await, None);
}

#[tokio::test]
async fn test_persistence_failure_does_not_abort_batch() {
    let mut geo = HashMap::new();
    geo.insert("Street 0".to_string(), LatLng::new(-34.0130, 18.4840));
    geo.insert("Street 1".to_string(), LatLng::new(-34.0240, 18.4720));

    let mut store = MemoryStore::new(vec![street(0, None), street(1, None)]);
    store.failing_ids = vec!["s00".to_string()];

    let engine = AssignmentEngine::new(
        store.clone(),
        TableGeocoder(geo),
        ZoneStore::embedded().unwrap(),
        AssignmentOptions::default(),
    )
    .unwrap();
    let summary = engine.run().await.unwrap();

    assert_eq!(summary.exact, 1);
    assert!(!summary.persist_failures.is_empty());
    assert!(summary.persist_failures.iter().all(|p| p.street_id == "s00"));
    assert_eq!(store.section_of("s00").await, None);
    assert_eq!(store.section_of("s01").await.as_deref(), Some("section-5"));
}

#[tokio::test]
async fn test_already_assigned_streets_are_not_written() {
    let store = MemoryStore::new(vec![
        street(0, Some("section-1")),
        street(1, Some("section-2")),
    ]);

    let engine = AssignmentEngine::new(
        store.clone(),
        nothing_resolves(),
        ZoneStore::embedded().unwrap(),
        AssignmentOptions::default(),
    )
    .unwrap();
    let summary = engine.run().await.unwrap();

    assert_eq!(summary.skipped, 2);
    assert_eq!(*store.writes.lock().await, 0);
}

#[test]
fn test_zone_store_without_polygons_refuses_to_start() {
    let zones = ZoneStore::new(vec![Section {
        id: "section-5".to_string(),
        name: "Section 5".to_string(),
        color: String::new(),
        polygon: None,
    }])
    .unwrap();

    let result = AssignmentEngine::new(
        MemoryStore::default(),
        nothing_resolves(),
        zones,
        AssignmentOptions::default(),
    );
    assert!(matches!(result, Err(SectionError::EmptyZoneStore)));
}

#[test]
fn test_unknown_default_section_refuses_to_start() {
    let result = AssignmentEngine::new(
        MemoryStore::default(),
        nothing_resolves(),
        ZoneStore::embedded().unwrap(),
        AssignmentOptions {
            default_section: "section-404".to_string(),
            ..AssignmentOptions::default()
        },
    );
    assert!(matches!(result, Err(SectionError::UnknownSection { .. })));
}
