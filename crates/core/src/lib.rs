pub mod config;
pub mod domain;
pub mod errors;
pub mod insights;
pub mod merge;
pub mod stores;

pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use domain::{
    Client, ClientId, CloudEvent, Outfit, Shift, Snapshot, Transaction, Venue, VenueId,
};
pub use errors::EngineError;
pub use insights::{
    ActionItem, ActionPriority, AiInsights, ClientAssignments, Compatibility, CompatibilityPair,
    CompatibilityScorer, InsightsEngine, QueryOptions, ScheduleSuggestion, ScoringWeights,
    SnapshotAggregates, VenueRecommendation, WeightsOverride, DEFAULT_WEIGHTS,
};
pub use merge::{merge_snapshots, MergeKey, SnapshotService};
pub use stores::{
    CloudFetcher, FetchError, PerformanceStore, PerformanceSummary, SnapshotStore, StoreError,
};
