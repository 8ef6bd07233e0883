//! In-memory store used by tests and ephemeral runs.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use venuefit_core::domain::{ClientId, Snapshot, VenueId};
use venuefit_core::stores::{
    PerformanceStore, PerformanceSummary, SnapshotStore, StoreError,
};

#[derive(Default)]
pub struct InMemoryDataStore {
    snapshot: RwLock<Snapshot>,
}

impl InMemoryDataStore {
    pub fn new(snapshot: Snapshot) -> Self {
        Self { snapshot: RwLock::new(snapshot) }
    }

    pub async fn replace(&self, snapshot: Snapshot) {
        *self.snapshot.write().await = snapshot;
    }
}

#[async_trait]
impl SnapshotStore for InMemoryDataStore {
    async fn snapshot(&self) -> Result<Snapshot, StoreError> {
        Ok(self.snapshot.read().await.clone())
    }
}

#[async_trait]
impl PerformanceStore for InMemoryDataStore {
    async fn client_performance(
        &self,
        client_id: &ClientId,
        period_days: u32,
    ) -> Result<PerformanceSummary, StoreError> {
        let snapshot = self.snapshot.read().await;
        let shifts: Vec<_> = snapshot
            .shifts
            .iter()
            .filter(|shift| shift.client_id.as_ref() == Some(client_id))
            .collect();
        Ok(PerformanceSummary::from_shifts(shifts.into_iter(), period_days, Utc::now()))
    }

    async fn venue_performance(
        &self,
        venue_id: &VenueId,
        period_days: u32,
    ) -> Result<PerformanceSummary, StoreError> {
        let snapshot = self.snapshot.read().await;
        let shifts: Vec<_> = snapshot
            .shifts
            .iter()
            .filter(|shift| shift.venue_id.as_ref() == Some(venue_id))
            .collect();
        Ok(PerformanceSummary::from_shifts(shifts.into_iter(), period_days, Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use venuefit_core::domain::Shift;

    #[tokio::test]
    async fn performance_is_scoped_to_the_requested_entity() {
        let now = Utc::now();
        let store = InMemoryDataStore::new(Snapshot {
            shifts: vec![
                Shift {
                    client_id: Some(ClientId("c1".to_owned())),
                    venue_id: Some(VenueId("v1".to_owned())),
                    start: Some(now - Duration::days(2)),
                    earnings: 250.0,
                    ..Shift::default()
                },
                Shift {
                    client_id: Some(ClientId("c2".to_owned())),
                    venue_id: Some(VenueId("v1".to_owned())),
                    start: Some(now - Duration::days(2)),
                    earnings: 100.0,
                    ..Shift::default()
                },
            ],
            ..Snapshot::default()
        });

        let client = store
            .client_performance(&ClientId("c1".to_owned()), 30)
            .await
            .expect("client performance");
        assert_eq!(client.shift_count, 1);
        assert_eq!(client.total_earnings, 250.0);

        let venue = store
            .venue_performance(&VenueId("v1".to_owned()), 30)
            .await
            .expect("venue performance");
        assert_eq!(venue.shift_count, 2);
        assert_eq!(venue.total_earnings, 350.0);
    }

    #[tokio::test]
    async fn replace_swaps_the_whole_snapshot() {
        let store = InMemoryDataStore::default();
        assert!(store.snapshot().await.expect("snapshot").is_empty());

        store
            .replace(Snapshot {
                shifts: vec![Shift { earnings: 50.0, ..Shift::default() }],
                ..Snapshot::default()
            })
            .await;
        assert_eq!(store.snapshot().await.expect("snapshot").shifts.len(), 1);
    }
}
