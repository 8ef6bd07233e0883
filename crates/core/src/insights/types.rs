//! Types for the insights engine.

use serde::{Deserialize, Serialize};

use crate::domain::{Client, Venue};

/// Weights for the seven compatibility signals.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    /// Weight for the client's own history at the venue (default 0.35).
    pub history: f64,
    /// Weight for the venue-wide earnings average (default 0.20).
    pub venue_avg: f64,
    /// Weight for day-of-week alignment (default 0.15).
    pub dow: f64,
    /// Weight for tag relevance (default 0.15).
    pub tag: f64,
    /// Weight for city proximity (default 0.10).
    pub city: f64,
    /// Weight for venue capacity (default 0.10).
    pub capacity: f64,
    /// Weight for the special-event flag (default 0.15).
    pub event: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        super::DEFAULT_WEIGHTS
    }
}

impl ScoringWeights {
    /// Apply a partial override: keys left unset keep their current
    /// value.
    pub fn merged(mut self, overrides: &WeightsOverride) -> Self {
        if let Some(value) = overrides.history {
            self.history = value;
        }
        if let Some(value) = overrides.venue_avg {
            self.venue_avg = value;
        }
        if let Some(value) = overrides.dow {
            self.dow = value;
        }
        if let Some(value) = overrides.tag {
            self.tag = value;
        }
        if let Some(value) = overrides.city {
            self.city = value;
        }
        if let Some(value) = overrides.capacity {
            self.capacity = value;
        }
        if let Some(value) = overrides.event {
            self.event = value;
        }
        self
    }
}

/// Partial weights update. Each field is independent; unset fields
/// leave the corresponding weight untouched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightsOverride {
    pub history: Option<f64>,
    pub venue_avg: Option<f64>,
    pub dow: Option<f64>,
    pub tag: Option<f64>,
    pub city: Option<f64>,
    pub capacity: Option<f64>,
    pub event: Option<f64>,
}

/// Scored compatibility between one client and one venue.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Compatibility {
    /// Weighted sum of the signal scores. Only comparable within a
    /// single run using the same weights.
    pub score: f64,
    /// One short line per signal that contributed, in fixed order.
    pub rationale: Vec<String>,
    /// Raw (unnormalized) average earnings for this client at this
    /// venue.
    pub client_venue_avg: f64,
    /// Raw average earnings at the venue across all clients.
    pub venue_avg: f64,
    pub client_best_day: Option<u8>,
    pub venue_best_day: Option<u8>,
}

/// One recommended venue for a client.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VenueRecommendation {
    pub venue: Venue,
    #[serde(flatten)]
    pub compatibility: Compatibility,
}

/// A client with their ranked venue recommendations.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientAssignments {
    pub client: Client,
    pub recommendations: Vec<VenueRecommendation>,
}

impl ClientAssignments {
    pub fn best_score(&self) -> f64 {
        self.recommendations.first().map(|rec| rec.compatibility.score).unwrap_or(0.0)
    }
}

/// A weekly scheduling suggestion for one client.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSuggestion {
    pub client: Client,
    pub venue: Venue,
    pub best_day: u8,
    pub text: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionPriority {
    High,
    Medium,
}

/// A prioritized, human-readable action item.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionItem {
    pub priority: ActionPriority,
    pub title: String,
    pub description: String,
}

/// A flattened (client, venue) pair from the recommendation matrix.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityPair {
    pub client: Client,
    pub venue: Venue,
    pub score: f64,
    pub rationale: Vec<String>,
}

/// Composed output of one full insights run.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiInsights {
    pub assignments: Vec<ClientAssignments>,
    pub schedule: Vec<ScheduleSuggestion>,
    pub actions: Vec<ActionItem>,
    pub compatibility_top: Vec<CompatibilityPair>,
}

/// Options for free-text queries.
#[derive(Clone, Copy, Debug, Default)]
pub struct QueryOptions {
    /// Lookback window; defaults to [`super::DEFAULT_PERIOD_DAYS`].
    pub period_days: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::DEFAULT_WEIGHTS;

    #[test]
    fn merged_override_changes_only_named_keys() {
        let weights = ScoringWeights::default()
            .merged(&WeightsOverride { tag: Some(0.5), ..WeightsOverride::default() });
        assert_eq!(weights.tag, 0.5);
        assert_eq!(weights.history, DEFAULT_WEIGHTS.history);
        assert_eq!(weights.venue_avg, DEFAULT_WEIGHTS.venue_avg);
        assert_eq!(weights.dow, DEFAULT_WEIGHTS.dow);
        assert_eq!(weights.city, DEFAULT_WEIGHTS.city);
        assert_eq!(weights.capacity, DEFAULT_WEIGHTS.capacity);
        assert_eq!(weights.event, DEFAULT_WEIGHTS.event);
    }

    #[test]
    fn empty_override_is_a_no_op() {
        let weights = ScoringWeights::default().merged(&WeightsOverride::default());
        assert_eq!(weights, DEFAULT_WEIGHTS);
    }
}
