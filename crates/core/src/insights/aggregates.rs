//! Corpus-wide statistics derived from one merged snapshot.

use std::collections::{HashMap, HashSet};

use crate::domain::{ClientId, Snapshot, VenueId};

/// Running {total, count} over shift earnings.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EarningsAggregate {
    pub total: f64,
    pub count: u64,
}

impl EarningsAggregate {
    fn add(&mut self, earnings: f64) {
        self.total += earnings;
        self.count += 1;
    }

    pub fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total / self.count as f64
        }
    }
}

/// Divide by a corpus maximum, clamped to [0, 1]. A zero or negative
/// maximum normalizes to 0, never NaN or infinity.
pub fn normalize(value: f64, max: f64) -> f64 {
    if max > 0.0 {
        (value.max(0.0) / max).min(1.0)
    } else {
        0.0
    }
}

/// Earning totals, per-pair history, event flags and normalization
/// maxima computed in a single pass over the snapshot's shifts.
#[derive(Clone, Debug, Default)]
pub struct SnapshotAggregates {
    by_venue: HashMap<VenueId, EarningsAggregate>,
    by_client: HashMap<ClientId, EarningsAggregate>,
    by_client_venue: HashMap<(ClientId, VenueId), EarningsAggregate>,
    event_venues: HashSet<VenueId>,
    pub venue_max_avg: f64,
    pub client_max_avg: f64,
    pub client_venue_max_avg: f64,
    pub max_capacity: f64,
}

impl SnapshotAggregates {
    pub fn compute(snapshot: &Snapshot) -> Self {
        let mut aggregates = Self::default();

        for shift in &snapshot.shifts {
            let Some(venue_id) = shift.venue_id.as_ref() else {
                continue;
            };
            aggregates.by_venue.entry(venue_id.clone()).or_default().add(shift.earnings);

            // Weak signal inherited from the source data model: any
            // mention of "event" in the notes flags the venue, even a
            // note saying "no event".
            if shift
                .notes
                .as_deref()
                .is_some_and(|notes| notes.to_lowercase().contains("event"))
            {
                aggregates.event_venues.insert(venue_id.clone());
            }

            if let Some(client_id) = shift.client_id.as_ref() {
                aggregates.by_client.entry(client_id.clone()).or_default().add(shift.earnings);
                aggregates
                    .by_client_venue
                    .entry((client_id.clone(), venue_id.clone()))
                    .or_default()
                    .add(shift.earnings);
            }
        }

        // Explicit cloud events only ever turn the flag on.
        for event in &snapshot.events {
            if let Some(venue_id) = event.venue_ref() {
                aggregates.event_venues.insert(venue_id.clone());
            }
        }

        aggregates.venue_max_avg =
            aggregates.by_venue.values().map(EarningsAggregate::average).fold(0.0, f64::max);
        aggregates.client_max_avg =
            aggregates.by_client.values().map(EarningsAggregate::average).fold(0.0, f64::max);
        aggregates.client_venue_max_avg = aggregates
            .by_client_venue
            .values()
            .map(EarningsAggregate::average)
            .fold(0.0, f64::max);
        aggregates.max_capacity =
            snapshot.venues.iter().map(|venue| venue.capacity_or_zero()).fold(0.0, f64::max);

        aggregates
    }

    pub fn venue(&self, venue_id: &VenueId) -> EarningsAggregate {
        self.by_venue.get(venue_id).copied().unwrap_or_default()
    }

    pub fn client(&self, client_id: &ClientId) -> EarningsAggregate {
        self.by_client.get(client_id).copied().unwrap_or_default()
    }

    pub fn pair(&self, client_id: &ClientId, venue_id: &VenueId) -> EarningsAggregate {
        self.by_client_venue
            .get(&(client_id.clone(), venue_id.clone()))
            .copied()
            .unwrap_or_default()
    }

    pub fn has_event(&self, venue_id: &VenueId) -> bool {
        self.event_venues.contains(venue_id)
    }

    /// (venue id, average earnings) for every venue with recorded
    /// shifts, in unspecified order.
    pub fn venue_averages(&self) -> impl Iterator<Item = (&VenueId, f64)> + '_ {
        self.by_venue.iter().map(|(id, aggregate)| (id, aggregate.average()))
    }
}
