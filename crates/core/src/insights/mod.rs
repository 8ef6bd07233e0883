//! Client–venue compatibility scoring, recommendations, and query
//! answering over merged snapshots.

mod aggregates;
mod engine;
mod query;
mod scoring;
mod types;

pub use aggregates::{normalize, EarningsAggregate, SnapshotAggregates};
pub use engine::InsightsEngine;
pub use query::QueryIntent;
pub use scoring::{adjacent_dow_score, dow_label, CompatibilityScorer};
pub use types::{
    ActionItem, ActionPriority, AiInsights, ClientAssignments, Compatibility, CompatibilityPair,
    QueryOptions, ScheduleSuggestion, ScoringWeights, VenueRecommendation, WeightsOverride,
};

use crate::errors::EngineError;

/// Result type for engine entry points.
pub type InsightResult<T> = Result<T, EngineError>;

/// Design defaults. Independent weights, deliberately not required to
/// sum to one; scores are only compared within a single run.
pub const DEFAULT_WEIGHTS: ScoringWeights = ScoringWeights {
    history: 0.35,
    venue_avg: 0.20,
    dow: 0.15,
    tag: 0.15,
    city: 0.10,
    capacity: 0.10,
    event: 0.15,
};

/// Default lookback window for performance metrics, in days.
pub const DEFAULT_PERIOD_DAYS: u32 = 120;

/// Default number of venue recommendations kept per client.
pub const DEFAULT_TOP_N: usize = 3;

/// Default horizon for schedule suggestions, in weeks.
pub const DEFAULT_SCHEDULE_WEEKS: u32 = 4;

/// Size of the flattened top compatibility-pair list in insights.
pub const COMPATIBILITY_TOP_PAIRS: usize = 10;

/// Scheduling falls back to Friday when neither side has a best day.
pub const FALLBACK_DOW: u8 = 5;
