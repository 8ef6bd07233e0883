//! Compatibility scoring between one client and one venue.

use std::collections::HashSet;

use super::aggregates::{normalize, SnapshotAggregates};
use super::types::{Compatibility, ScoringWeights};
use crate::domain::{Client, Venue};
use crate::stores::PerformanceSummary;

const DOW_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Short label for a 0=Sunday..6=Saturday day index.
pub fn dow_label(dow: u8) -> &'static str {
    DOW_LABELS[(dow % 7) as usize]
}

/// Day-of-week alignment: 1.0 for the same day, 0.6 for adjacent days
/// (Saturday and Sunday wrap around), 0.25 otherwise, 0 when either
/// side has no best day.
pub fn adjacent_dow_score(a: Option<u8>, b: Option<u8>) -> f64 {
    let (Some(a), Some(b)) = (a, b) else {
        return 0.0;
    };
    let diff = i16::from(a).abs_diff(i16::from(b));
    match diff {
        0 => 1.0,
        1 | 6 => 0.6,
        _ => 0.25,
    }
}

fn contains_ci(haystack: Option<&str>, needle: &str) -> bool {
    let Some(haystack) = haystack else {
        return false;
    };
    if haystack.is_empty() || needle.is_empty() {
        return false;
    }
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Tag overlap when both sides carry tags, with a notes-mention
/// fallback when either side has none.
fn tag_relevance_score(client: &Client, venue: &Venue) -> f64 {
    if !client.tags.is_empty() && !venue.tags.is_empty() {
        let client_tags: HashSet<String> =
            client.tags.iter().map(|tag| tag.to_lowercase()).collect();
        let venue_tags: HashSet<String> =
            venue.tags.iter().map(|tag| tag.to_lowercase()).collect();
        let intersection = client_tags.intersection(&venue_tags).count();
        let denom = client_tags.len().min(venue_tags.len()).max(1);
        return intersection as f64 / denom as f64;
    }

    // The tag fallback reads free-form location before city; only the
    // proximity signal prefers city.
    let venue_locality = venue
        .location
        .as_deref()
        .filter(|value| !value.is_empty())
        .or_else(|| venue.city.as_deref().filter(|value| !value.is_empty()));
    let notes = client.notes.as_deref();
    let mentions_venue = contains_ci(notes, &venue.name)
        || venue_locality.is_some_and(|locality| contains_ci(notes, locality));
    if mentions_venue {
        1.0
    } else {
        0.0
    }
}

/// Bidirectional substring city match, with a notes fallback when only
/// the venue has a known locality.
fn city_proximity_score(client: &Client, venue: &Venue) -> f64 {
    match (client.locality(), venue.locality()) {
        (Some(client_city), Some(venue_city)) => {
            if contains_ci(Some(client_city), venue_city)
                || contains_ci(Some(venue_city), client_city)
            {
                1.0
            } else {
                0.0
            }
        }
        (None, Some(venue_city)) => {
            if contains_ci(client.notes.as_deref(), venue_city) {
                1.0
            } else {
                0.0
            }
        }
        _ => 0.0,
    }
}

/// Combines normalized signals into a weighted score plus rationale.
/// Pure: all snapshot-derived and metrics inputs are passed in.
#[derive(Clone, Copy, Debug)]
pub struct CompatibilityScorer {
    weights: ScoringWeights,
}

impl CompatibilityScorer {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn score(
        &self,
        client: &Client,
        venue: &Venue,
        aggregates: &SnapshotAggregates,
        client_perf: &PerformanceSummary,
        venue_perf: &PerformanceSummary,
    ) -> Compatibility {
        let client_venue_avg = match (client.id.as_ref(), venue.id.as_ref()) {
            (Some(client_id), Some(venue_id)) => {
                aggregates.pair(client_id, venue_id).average()
            }
            _ => 0.0,
        };
        let venue_avg =
            venue.id.as_ref().map(|id| aggregates.venue(id).average()).unwrap_or(0.0);

        let dow_match = adjacent_dow_score(client_perf.best_day, venue_perf.best_day);
        let tag_score = tag_relevance_score(client, venue);
        let city_score = city_proximity_score(client, venue);
        let capacity_norm = normalize(venue.capacity_or_zero(), aggregates.max_capacity);
        let has_event =
            venue.id.as_ref().map(|id| aggregates.has_event(id)).unwrap_or(false);
        let event_score = if has_event { 1.0 } else { 0.0 };

        let w = &self.weights;
        let score = w.history * normalize(client_venue_avg, aggregates.client_venue_max_avg)
            + w.venue_avg * normalize(venue_avg, aggregates.venue_max_avg)
            + w.dow * dow_match
            + w.tag * tag_score
            + w.city * city_score
            + w.capacity * capacity_norm
            + w.event * event_score;

        // Fixed signal order; zero signals are skipped, never reordered.
        let mut rationale = Vec::new();
        if client_venue_avg > 0.0 {
            rationale.push(format!("Strong personal earnings at {}", venue.name));
        }
        if venue_avg > 0.0 {
            rationale.push(format!("Venue averages {venue_avg:.0} per shift"));
        }
        if let (Some(client_day), Some(venue_day)) =
            (client_perf.best_day, venue_perf.best_day)
        {
            rationale.push(format!(
                "Best day alignment: {} vs {}",
                dow_label(client_day),
                dow_label(venue_day)
            ));
        }
        if tag_score > 0.0 {
            rationale.push("Tag relevance matched".to_owned());
        }
        if city_score > 0.0 {
            rationale.push(format!("City proximity: {}", venue.locality().unwrap_or("local")));
        }
        if capacity_norm > 0.0 {
            rationale.push("Capacity factor considered".to_owned());
        }
        if event_score > 0.0 {
            rationale.push("Special event impact detected".to_owned());
        }

        Compatibility {
            score,
            rationale,
            client_venue_avg,
            venue_avg,
            client_best_day: client_perf.best_day,
            venue_best_day: venue_perf.best_day,
        }
    }
}
