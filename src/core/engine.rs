use crate::core::spatial::SpatialResolver;
use crate::core::zones::ZoneStore;
use crate::domain::model::{AssignmentSummary, Outcome, PersistFailure, StreetRecord};
use crate::domain::ports::{AssignmentOptions, Geocode, StreetRepository};
use crate::utils::error::{Result, SectionError};
use crate::utils::monitor::SystemMonitor;
use std::collections::HashMap;

/// Most common section among the assigned records around `index`, looking up
/// to `window` records away on each side. Neighbours are visited nearest first,
/// before then after, and a frequency tie goes to whichever section was seen first.
pub fn neighbour_vote(records: &[StreetRecord], index: usize, window: usize) -> Option<String> {
    let mut seen: Vec<&str> = Vec::new();
    for d in 1..=window {
        if let Some(before) = index.checked_sub(d).and_then(|i| records.get(i)) {
            seen.extend(before.section.as_deref());
        }
        if let Some(after) = records.get(index + d) {
            seen.extend(after.section.as_deref());
        }
    }

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for s in &seen {
        *counts.entry(*s).or_default() += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for s in seen {
        let n = counts[s];
        if best.map_or(true, |(_, bn)| n > bn) {
            best = Some((s, n));
        }
    }
    best.map(|(s, _)| s.to_string())
}

/// Drives geocoding, spatial resolution and the fallbacks over every street.
pub struct AssignmentEngine<R: StreetRepository, G: Geocode> {
    repository: R,
    geocoder: G,
    zones: ZoneStore,
    options: AssignmentOptions,
    monitor: SystemMonitor,
}

impl<R: StreetRepository, G: Geocode> AssignmentEngine<R, G> {
    /// Fails when no section has a polygon, since nothing could ever be
    /// placed, or when the default section is not in the table.
    pub fn new(
        repository: R,
        geocoder: G,
        zones: ZoneStore,
        options: AssignmentOptions,
    ) -> Result<Self> {
        if !zones.has_geometry() {
            return Err(SectionError::EmptyZoneStore);
        }
        if zones.section(&options.default_section).is_none() {
            return Err(SectionError::UnknownSection {
                section_id: options.default_section.clone(),
            });
        }
        Ok(Self {
            repository,
            geocoder,
            zones,
            options,
            monitor: SystemMonitor::new(false),
        })
    }

    pub fn with_monitoring(mut self, enabled: bool) -> Self {
        self.monitor = SystemMonitor::new(enabled);
        self
    }

    pub async fn run(&self) -> Result<AssignmentSummary> {
        let mut streets = self.repository.list_streets().await?;
        streets.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));

        let pending = streets.iter().filter(|s| !s.is_assigned()).count();
        tracing::info!(
            "Found {} streets, {} without a section",
            streets.len(),
            pending
        );

        let mut summary = AssignmentSummary::new(streets.len());

        self.geocode_pass(&mut streets, &mut summary).await;
        self.monitor.log_stats("Geocode pass");

        if self.options.neighbour_fallback {
            self.neighbour_pass(&mut streets, &mut summary).await;
            self.monitor.log_stats("Neighbour pass");
        }
        summary.still_unassigned = streets.iter().filter(|s| !s.is_assigned()).count();

        tracing::info!(
            "Assignment finished: {} exact, {} nearest, {} neighbour, {} fallback, {} unassigned",
            summary.exact,
            summary.nearest,
            summary.neighbour,
            summary.fallback_default,
            summary.still_unassigned
        );
        Ok(summary)
    }

    async fn geocode_pass(
        &self,
        streets: &mut [StreetRecord],
        summary: &mut AssignmentSummary,
    ) {
        let resolver = SpatialResolver::new(&self.zones);
        let total = streets.len();

        for (i, street) in streets.iter_mut().enumerate() {
            if street.is_assigned() {
                summary.record(Outcome::Skipped);
                continue;
            }

            let Some(point) = self.geocoder.resolve(&street.name).await else {
                tracing::info!("[{}/{}] {} -> FAILED", i + 1, total, street.name);
                summary.failed_geocode.push(street.name.clone());
                continue;
            };

            // has_geometry() was checked at construction
            let Some(placement) = resolver.locate(point) else {
                continue;
            };
            let outcome = if placement.exact {
                Outcome::Exact
            } else {
                Outcome::Nearest
            };

            if self.persist(street, placement.section_id, summary).await {
                let suffix = if placement.exact { "" } else { " (nearest)" };
                tracing::info!(
                    "[{}/{}] {} -> {}{}",
                    i + 1,
                    total,
                    street.name,
                    self.zones.display_name(placement.section_id),
                    suffix
                );
                summary.record(outcome);
            }
        }
    }

    /// Votes are taken against the state after the geocode pass, so a street
    /// placed here never influences another one.
    async fn neighbour_pass(
        &self,
        streets: &mut [StreetRecord],
        summary: &mut AssignmentSummary,
    ) {
        let remaining: Vec<usize> = (0..streets.len())
            .filter(|&i| !streets[i].is_assigned())
            .collect();
        if remaining.is_empty() {
            return;
        }
        tracing::info!(
            "Assigning {} remaining streets by neighbour proximity",
            remaining.len()
        );

        let decisions: Vec<(usize, String, Outcome)> = remaining
            .into_iter()
            .map(|i| match neighbour_vote(&*streets, i, self.options.neighbour_window) {
                Some(section) => (i, section, Outcome::Neighbour),
                None => (i, self.options.default_section.clone(), Outcome::FallbackDefault),
            })
            .collect();

        for (i, section, outcome) in decisions {
            let street = &mut streets[i];
            if self.persist(street, &section, summary).await {
                tracing::info!(
                    "  {} -> {} ({})",
                    street.name,
                    self.zones.display_name(&section),
                    outcome.label()
                );
                summary.record(outcome);
            }
        }
    }

    /// Writes one street's section. A failed write leaves the street
    /// unassigned for the next run and is reported in the summary.
    async fn persist(
        &self,
        street: &mut StreetRecord,
        section_id: &str,
        summary: &mut AssignmentSummary,
    ) -> bool {
        match self.repository.update_section(&street.id, section_id).await {
            Ok(()) => {
                street.section = Some(section_id.to_string());
                true
            }
            Err(e) => {
                tracing::error!("Could not save {} ({}): {}", street.name, street.id, e);
                summary.persist_failures.push(PersistFailure {
                    street_id: street.id.clone(),
                    street_name: street.name.clone(),
                    message: e.to_string(),
                });
                false
            }
        }
    }
}
