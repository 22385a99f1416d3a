use crate::core::zones::ZoneStore;
use crate::domain::model::LatLng;

/// Even-odd ray casting. A horizontal ray from the point is tested against every
/// edge of the implicitly closed ring. Points on an edge or vertex may land on
/// either side.
pub fn point_in_polygon(point: LatLng, ring: &[LatLng]) -> bool {
    let mut inside = false;
    let mut j = match ring.len() {
        0 => return false,
        n => n - 1,
    };
    for i in 0..ring.len() {
        let (a, b) = (ring[i], ring[j]);
        if (a.lat > point.lat) != (b.lat > point.lat)
            && point.lng < (b.lng - a.lng) * (point.lat - a.lat) / (b.lat - a.lat) + a.lng
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Vertex mean, not the area-weighted centroid.
pub fn centroid(ring: &[LatLng]) -> Option<LatLng> {
    if ring.is_empty() {
        return None;
    }
    let n = ring.len() as f64;
    let (lat, lng) = ring
        .iter()
        .fold((0.0, 0.0), |(la, lo), p| (la + p.lat, lo + p.lng));
    Some(LatLng::new(lat / n, lng / n))
}

pub fn distance_sq(a: LatLng, b: LatLng) -> f64 {
    (a.lat - b.lat).powi(2) + (a.lng - b.lng).powi(2)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement<'a> {
    pub section_id: &'a str,
    /// `true` when a polygon contains the point, `false` for the centroid fallback.
    pub exact: bool,
}

/// Resolves points against a [`ZoneStore`]. Coordinates are treated as a flat
/// plane, which holds over an area a few kilometres across.
pub struct SpatialResolver<'a> {
    zones: &'a ZoneStore,
}

impl<'a> SpatialResolver<'a> {
    pub fn new(zones: &'a ZoneStore) -> Self {
        Self { zones }
    }

    /// First section in store order whose polygon contains the point.
    pub fn containing_section(&self, point: LatLng) -> Option<&'a str> {
        self.zones
            .all_sections()
            .iter()
            .find(|s| matches!(&s.polygon, Some(ring) if point_in_polygon(point, ring)))
            .map(|s| s.id.as_str())
    }

    /// Section whose centroid is closest. Only `None` when no section has a polygon.
    pub fn nearest_section(&self, point: LatLng) -> Option<&'a str> {
        let mut best: Option<(&'a str, f64)> = None;
        for section in self.zones.all_sections() {
            let Some(c) = section.polygon.as_deref().and_then(centroid) else {
                continue;
            };
            let d = distance_sq(point, c);
            // strict comparison keeps the first minimum
            if best.map_or(true, |(_, bd)| d < bd) {
                best = Some((section.id.as_str(), d));
            }
        }
        best.map(|(id, _)| id)
    }

    pub fn locate(&self, point: LatLng) -> Option<Placement<'a>> {
        if let Some(section_id) = self.containing_section(point) {
            return Some(Placement {
                section_id,
                exact: true,
            });
        }
        self.nearest_section(point).map(|section_id| Placement {
            section_id,
            exact: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Section;

    fn square(id: &str, lat0: f64, lng0: f64, size: f64) -> Section {
        Section {
            id: id.to_string(),
            name: id.to_uppercase(),
            color: String::new(),
            polygon: Some(vec![
                LatLng::new(lat0, lng0),
                LatLng::new(lat0, lng0 + size),
                LatLng::new(lat0 + size, lng0 + size),
                LatLng::new(lat0 + size, lng0),
            ]),
        }
    }

    fn unit_square() -> Vec<LatLng> {
        vec![
            LatLng::new(0.0, 0.0),
            LatLng::new(0.0, 1.0),
            LatLng::new(1.0, 1.0),
            LatLng::new(1.0, 0.0),
        ]
    }

    #[test]
    fn unit_square_containment() {
        let ring = unit_square();
        assert!(point_in_polygon(LatLng::new(0.5, 0.5), &ring));
        assert!(!point_in_polygon(LatLng::new(2.0, 2.0), &ring));
        assert!(!point_in_polygon(LatLng::new(-0.5, 0.5), &ring));
    }

    #[test]
    fn concave_ring_excludes_notch() {
        // U shape opening north
        let ring = vec![
            LatLng::new(0.0, 0.0),
            LatLng::new(0.0, 3.0),
            LatLng::new(3.0, 3.0),
            LatLng::new(3.0, 2.0),
            LatLng::new(1.0, 2.0),
            LatLng::new(1.0, 1.0),
            LatLng::new(3.0, 1.0),
            LatLng::new(3.0, 0.0),
        ];
        assert!(point_in_polygon(LatLng::new(0.5, 1.5), &ring));
        assert!(!point_in_polygon(LatLng::new(2.0, 1.5), &ring));
        assert!(point_in_polygon(LatLng::new(2.0, 0.5), &ring));
    }

    #[test]
    fn empty_ring_contains_nothing() {
        assert!(!point_in_polygon(LatLng::new(0.0, 0.0), &[]));
    }

    #[test]
    fn centroid_is_vertex_mean() {
        let c = centroid(&unit_square()).unwrap();
        assert_eq!(c, LatLng::new(0.5, 0.5));
        assert!(centroid(&[]).is_none());
    }

    #[test]
    fn containing_section_uses_store_order() {
        let zones = ZoneStore::new(vec![
            square("first", 0.0, 0.0, 2.0),
            square("second", 0.0, 0.0, 1.0),
        ])
        .unwrap();
        let resolver = SpatialResolver::new(&zones);
        assert_eq!(resolver.containing_section(LatLng::new(0.5, 0.5)), Some("first"));
        assert_eq!(resolver.containing_section(LatLng::new(5.0, 5.0)), None);
    }

    #[test]
    fn nearest_section_always_answers_far_away() {
        let zones = ZoneStore::new(vec![
            square("west", 0.0, 0.0, 1.0),
            square("east", 0.0, 10.0, 1.0),
        ])
        .unwrap();
        let resolver = SpatialResolver::new(&zones);
        assert_eq!(resolver.nearest_section(LatLng::new(500.0, -800.0)), Some("west"));
        assert_eq!(resolver.nearest_section(LatLng::new(0.0, 9.0)), Some("east"));
    }

    #[test]
    fn nearest_section_tie_goes_to_first() {
        let zones = ZoneStore::new(vec![
            square("a", 0.0, 0.0, 1.0),
            square("b", 0.0, 2.0, 1.0),
        ])
        .unwrap();
        let resolver = SpatialResolver::new(&zones);
        // equidistant from both centroids
        assert_eq!(resolver.nearest_section(LatLng::new(0.5, 1.5)), Some("a"));
    }

    #[test]
    fn sections_without_polygons_are_skipped() {
        let zones = ZoneStore::new(vec![
            Section {
                id: "bare".to_string(),
                name: "Bare".to_string(),
                color: String::new(),
                polygon: None,
            },
            square("shaped", 0.0, 0.0, 1.0),
        ])
        .unwrap();
        let resolver = SpatialResolver::new(&zones);
        assert_eq!(resolver.nearest_section(LatLng::new(9.0, 9.0)), Some("shaped"));

        let bare_only = ZoneStore::new(vec![Section {
            id: "bare".to_string(),
            name: "Bare".to_string(),
            color: String::new(),
            polygon: None,
        }])
        .unwrap();
        let resolver = SpatialResolver::new(&bare_only);
        assert_eq!(resolver.nearest_section(LatLng::new(0.0, 0.0)), None);
    }

    #[test]
    fn locate_prefers_containment() {
        let zones = ZoneStore::embedded().unwrap();
        let resolver = SpatialResolver::new(&zones);

        let inside = resolver.locate(LatLng::new(-34.0130, 18.4840)).unwrap();
        assert_eq!(
            inside,
            Placement {
                section_id: "section-3",
                exact: true
            }
        );

        let outside = resolver.locate(LatLng::new(-33.9000, 18.6000)).unwrap();
        assert!(!outside.exact);
    }
}
