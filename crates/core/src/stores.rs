//! Collaborator seams: the engine consumes persisted records and
//! remote snapshots exclusively through these traits.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::domain::{ClientId, Shift, Snapshot, VenueId};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),
    #[error("decode error: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("unexpected response status {0}")]
    Status(u16),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("cloud sync is not configured")]
    NotConfigured,
}

/// Windowed performance metrics for a single client or venue.
/// Day-of-week indexes follow the source data: 0 = Sunday through
/// 6 = Saturday. `best_day` is None when the window holds no shifts.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSummary {
    pub shift_count: usize,
    pub total_earnings: f64,
    pub avg_earnings: f64,
    pub best_day: Option<u8>,
    pub best_day_avg: f64,
}

impl PerformanceSummary {
    /// Summarize shifts over a lookback window ending at `now`. Shifts
    /// without any timestamp fall outside every window. The best day is
    /// the weekday with the highest average earnings; ties keep the
    /// earliest weekday.
    pub fn from_shifts<'a, I>(shifts: I, period_days: u32, now: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = &'a Shift>,
    {
        let window_start = now - Duration::days(i64::from(period_days));

        let mut shift_count = 0usize;
        let mut total_earnings = 0.0f64;
        let mut by_dow: HashMap<u8, (f64, usize)> = HashMap::new();

        for shift in shifts {
            let Some(occurred_at) = shift.occurred_at() else {
                continue;
            };
            if occurred_at < window_start || occurred_at > now {
                continue;
            }
            shift_count += 1;
            total_earnings += shift.earnings;
            let dow = occurred_at.weekday().num_days_from_sunday() as u8;
            let entry = by_dow.entry(dow).or_insert((0.0, 0));
            entry.0 += shift.earnings;
            entry.1 += 1;
        }

        let avg_earnings =
            if shift_count > 0 { total_earnings / shift_count as f64 } else { 0.0 };

        let mut best_day = None;
        let mut best_day_avg = 0.0f64;
        for dow in 0u8..7 {
            if let Some((total, count)) = by_dow.get(&dow) {
                let avg = if *count > 0 { total / *count as f64 } else { 0.0 };
                if avg > best_day_avg {
                    best_day_avg = avg;
                    best_day = Some(dow);
                }
            }
        }

        Self { shift_count, total_earnings, avg_earnings, best_day, best_day_avg }
    }
}

/// Local persisted records.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn snapshot(&self) -> Result<Snapshot, StoreError>;
}

/// Remote snapshot source. Implementations must fail fast rather than
/// hang; callers treat any error as "no remote data".
#[async_trait]
pub trait CloudFetcher: Send + Sync {
    async fn fetch_snapshot(&self) -> Result<Snapshot, FetchError>;
}

/// Windowed performance metrics per entity.
#[async_trait]
pub trait PerformanceStore: Send + Sync {
    async fn client_performance(
        &self,
        client_id: &ClientId,
        period_days: u32,
    ) -> Result<PerformanceSummary, StoreError>;

    async fn venue_performance(
        &self,
        venue_id: &VenueId,
        period_days: u32,
    ) -> Result<PerformanceSummary, StoreError>;
}
