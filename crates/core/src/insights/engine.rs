//! The insights engine: recommendation generation and query answering
//! over merged snapshots.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::aggregates::SnapshotAggregates;
use super::query::{self, QueryIntent};
use super::scoring::{dow_label, CompatibilityScorer};
use super::types::{
    ActionItem, ActionPriority, AiInsights, ClientAssignments, CompatibilityPair, QueryOptions,
    ScheduleSuggestion, ScoringWeights, VenueRecommendation, WeightsOverride,
};
use super::{
    InsightResult, COMPATIBILITY_TOP_PAIRS, DEFAULT_PERIOD_DAYS, DEFAULT_TOP_N, FALLBACK_DOW,
};
use crate::domain::{Client, ClientId, Snapshot, VenueId};
use crate::merge::SnapshotService;
use crate::stores::{PerformanceStore, PerformanceSummary};

/// Everything one scoring run needs: the merged snapshot, its
/// aggregates, per-venue performance and a scorer built from the
/// weights in force at the start of the run.
struct ScoringContext {
    snapshot: Snapshot,
    aggregates: SnapshotAggregates,
    venue_perfs: HashMap<VenueId, PerformanceSummary>,
    scorer: CompatibilityScorer,
    period_days: u32,
}

/// Engine over the snapshot service and metrics store. The weights are
/// instance state behind a lock rather than a process-wide global, so
/// two engines never interfere.
pub struct InsightsEngine {
    snapshots: SnapshotService,
    performance: Arc<dyn PerformanceStore>,
    weights: RwLock<ScoringWeights>,
    use_cloud: bool,
}

impl InsightsEngine {
    pub fn new(snapshots: SnapshotService, performance: Arc<dyn PerformanceStore>) -> Self {
        Self {
            snapshots,
            performance,
            weights: RwLock::new(ScoringWeights::default()),
            use_cloud: true,
        }
    }

    /// Disable (or re-enable) cloud merging for every call on this
    /// engine.
    pub fn with_use_cloud(mut self, use_cloud: bool) -> Self {
        self.use_cloud = use_cloud;
        self
    }

    /// Partial weights update; unset keys keep their current values.
    pub async fn set_weights(&self, overrides: &WeightsOverride) {
        let mut weights = self.weights.write().await;
        *weights = weights.merged(overrides);
    }

    /// Defensive copy of the weights currently in force.
    pub async fn weights(&self) -> ScoringWeights {
        *self.weights.read().await
    }

    /// Score every venue for every client and keep the `top_n` best
    /// per client. Clients are ordered by their best score; ties among
    /// venues keep snapshot order.
    pub async fn generate_client_assignments(
        &self,
        period_days: u32,
        top_n: usize,
    ) -> InsightResult<Vec<ClientAssignments>> {
        let ctx = self.scoring_context(period_days).await?;
        let mut results = Vec::with_capacity(ctx.snapshot.clients.len());

        for client in &ctx.snapshot.clients {
            let mut recommendations = self.rank_venues_for_client(client, &ctx).await;
            recommendations.truncate(top_n);
            results.push(ClientAssignments { client: client.clone(), recommendations });
        }

        results.sort_by(|a, b| {
            b.best_score().partial_cmp(&a.best_score()).unwrap_or(Ordering::Equal)
        });
        Ok(results)
    }

    /// One suggestion per client: their best venue on their best day,
    /// falling back to the venue's best day, then Friday.
    pub async fn generate_schedule_suggestions(
        &self,
        period_days: u32,
        weeks: u32,
    ) -> InsightResult<Vec<ScheduleSuggestion>> {
        let ctx = self.scoring_context(period_days).await?;
        let mut suggestions = Vec::new();

        for client in &ctx.snapshot.clients {
            let ranked = self.rank_venues_for_client(client, &ctx).await;
            let Some(best) = ranked.into_iter().next() else {
                continue;
            };
            let best_day = best
                .compatibility
                .client_best_day
                .or(best.compatibility.venue_best_day)
                .unwrap_or(FALLBACK_DOW);
            let text = format!(
                "Schedule {} at {} on {} for the next {} weeks",
                client.name,
                best.venue.name,
                dow_label(best_day),
                weeks
            );
            suggestions.push(ScheduleSuggestion {
                client: client.clone(),
                venue: best.venue,
                best_day,
                text,
            });
        }

        Ok(suggestions)
    }

    /// Two independent rules: high-value clients who are under-booked,
    /// and venues with strong averages but few recorded shifts.
    pub async fn generate_action_items(
        &self,
        period_days: u32,
    ) -> InsightResult<Vec<ActionItem>> {
        let ctx = self.scoring_context(period_days).await?;
        let mut items = Vec::new();

        for client in &ctx.snapshot.clients {
            let perf = self.client_performance(client.id.as_ref(), period_days).await;
            let under_booked = perf.shift_count < 3;
            let high_value = client.value_score >= 8.0 || client.is_vip();
            if !(high_value && under_booked) {
                continue;
            }
            let best = self.rank_venues_for_client(client, &ctx).await.into_iter().next();
            let best_day = best
                .as_ref()
                .and_then(|rec| {
                    rec.compatibility.client_best_day.or(rec.compatibility.venue_best_day)
                })
                .unwrap_or(FALLBACK_DOW);
            let venue_name = best
                .as_ref()
                .map(|rec| rec.venue.name.clone())
                .unwrap_or_else(|| "top venue".to_owned());
            items.push(ActionItem {
                priority: ActionPriority::High,
                title: format!("Book {} on {} at {}", client.name, dow_label(best_day), venue_name),
                description: "High-value client with low recent shifts. Boost retention and revenue."
                    .to_owned(),
            });
        }

        for venue in &ctx.snapshot.venues {
            let Some(venue_id) = venue.id.as_ref() else {
                continue;
            };
            let aggregate = ctx.aggregates.venue(venue_id);
            if aggregate.average() > ctx.aggregates.venue_max_avg * 0.75 && aggregate.count < 3 {
                items.push(ActionItem {
                    priority: ActionPriority::Medium,
                    title: format!("Underutilized high-earning venue: {}", venue.name),
                    description:
                        "Increase scheduling at this venue to capitalize on strong averages."
                            .to_owned(),
                });
            }
        }

        Ok(items)
    }

    /// Full composed run: assignments, schedule, action items, and the
    /// flattened top compatibility pairs. An override, when given, is
    /// merged into the engine's weights before scoring.
    pub async fn build_insights(
        &self,
        period_days: u32,
        weights_override: Option<&WeightsOverride>,
    ) -> InsightResult<AiInsights> {
        if let Some(overrides) = weights_override {
            self.set_weights(overrides).await;
        }

        let assignments = self.generate_client_assignments(period_days, DEFAULT_TOP_N).await?;
        let schedule =
            self.generate_schedule_suggestions(period_days, super::DEFAULT_SCHEDULE_WEEKS).await?;
        let actions = self.generate_action_items(period_days).await?;

        let mut pairs: Vec<CompatibilityPair> = assignments
            .iter()
            .flat_map(|row| {
                row.recommendations.iter().map(|rec| CompatibilityPair {
                    client: row.client.clone(),
                    venue: rec.venue.clone(),
                    score: rec.compatibility.score,
                    rationale: rec.compatibility.rationale.clone(),
                })
            })
            .collect();
        pairs.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        pairs.truncate(COMPATIBILITY_TOP_PAIRS);

        Ok(AiInsights { assignments, schedule, actions, compatibility_top: pairs })
    }

    /// Answer a free-text question by classifying it into one of the
    /// fixed intents. Every branch degrades to an explanatory string
    /// when no matching data exists.
    pub async fn answer_query(
        &self,
        question: &str,
        opts: QueryOptions,
    ) -> InsightResult<String> {
        let period_days = opts.period_days.unwrap_or(DEFAULT_PERIOD_DAYS);
        let insights = self.build_insights(period_days, None).await?;
        let ctx = self.scoring_context(period_days).await?;

        let answer = match query::classify(question) {
            QueryIntent::TopVenues { criterion } => {
                let by_earnings = criterion
                    .as_deref()
                    .is_some_and(|c| c.contains("earning") || c.contains("revenue"));
                let names = if by_earnings {
                    query::top_venues_by_earnings(&ctx.snapshot, &ctx.aggregates)
                } else {
                    query::top_venues_by_compatibility(&insights.assignments)
                };
                format!("Top 3 venues: {}", names.join(", "))
            }
            QueryIntent::WeeklyPlan { days, period_label } => {
                let plan = self.generate_schedule_suggestions(days, 1).await?;
                query::render_weekly_plan(&period_label, &plan)
            }
            QueryIntent::FocusClients => query::render_focus_clients(&insights.assignments),
            QueryIntent::UnderperformingVenues { threshold } => {
                query::render_underperforming_venues(&ctx.snapshot, &ctx.aggregates, threshold)
            }
            QueryIntent::QuickPlan => query::render_quick_plan(&insights.assignments),
        };
        Ok(answer)
    }

    async fn scoring_context(&self, period_days: u32) -> InsightResult<ScoringContext> {
        let snapshot = self.snapshots.merged(self.use_cloud).await?;
        let aggregates = SnapshotAggregates::compute(&snapshot);
        let scorer = CompatibilityScorer::new(self.weights().await);

        // Metrics lookups are per-entity, so fetch each venue once per
        // run instead of once per (client, venue) pair.
        let mut venue_perfs = HashMap::new();
        for venue in &snapshot.venues {
            if let Some(venue_id) = venue.id.as_ref() {
                let perf = self.venue_performance(venue_id, period_days).await;
                venue_perfs.insert(venue_id.clone(), perf);
            }
        }

        Ok(ScoringContext { snapshot, aggregates, venue_perfs, scorer, period_days })
    }

    /// Score every venue for one client, sorted descending. The sort
    /// is stable, so equal scores keep snapshot venue order.
    async fn rank_venues_for_client(
        &self,
        client: &Client,
        ctx: &ScoringContext,
    ) -> Vec<VenueRecommendation> {
        let client_perf = self.client_performance(client.id.as_ref(), ctx.period_days).await;
        let neutral = PerformanceSummary::default();

        let mut ranked: Vec<VenueRecommendation> = ctx
            .snapshot
            .venues
            .iter()
            .map(|venue| {
                let venue_perf = venue
                    .id
                    .as_ref()
                    .and_then(|id| ctx.venue_perfs.get(id))
                    .unwrap_or(&neutral);
                let compatibility = ctx.scorer.score(
                    client,
                    venue,
                    &ctx.aggregates,
                    &client_perf,
                    venue_perf,
                );
                VenueRecommendation { venue: venue.clone(), compatibility }
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.compatibility
                .score
                .partial_cmp(&a.compatibility.score)
                .unwrap_or(Ordering::Equal)
        });
        ranked
    }

    /// A failed metrics lookup is treated as "no history", never as an
    /// error for the whole run.
    async fn client_performance(
        &self,
        client_id: Option<&ClientId>,
        period_days: u32,
    ) -> PerformanceSummary {
        let Some(client_id) = client_id else {
            return PerformanceSummary::default();
        };
        match self.performance.client_performance(client_id, period_days).await {
            Ok(summary) => summary,
            Err(error) => {
                tracing::warn!(%error, client_id = %client_id, "client metrics lookup failed, treating as no history");
                PerformanceSummary::default()
            }
        }
    }

    async fn venue_performance(&self, venue_id: &VenueId, period_days: u32) -> PerformanceSummary {
        match self.performance.venue_performance(venue_id, period_days).await {
            Ok(summary) => summary,
            Err(error) => {
                tracing::warn!(%error, venue_id = %venue_id, "venue metrics lookup failed, treating as no history");
                PerformanceSummary::default()
            }
        }
    }
}
