//! SQLite-backed snapshot and metrics store.

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use sqlx::Row;
use uuid::Uuid;

use venuefit_core::domain::{
    Client, ClientId, Outfit, Shift, Snapshot, Transaction, Venue, VenueId,
};
use venuefit_core::stores::{
    PerformanceStore, PerformanceSummary, SnapshotStore, StoreError,
};

use super::{db_error, decode_tags, decode_timestamp, encode_tags, encode_timestamp};
use crate::DbPool;

pub struct SqlDataStore {
    pool: DbPool,
}

/// Row counts written by one snapshot import.
#[derive(Clone, Copy, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportCounts {
    pub clients: usize,
    pub venues: usize,
    pub shifts: usize,
    pub outfits: usize,
    pub transactions: usize,
}

impl SqlDataStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Upsert every record in the snapshot. Records without an id get
    /// a generated one so they stay addressable across imports.
    pub async fn import_snapshot(&self, snapshot: &Snapshot) -> Result<ImportCounts, StoreError> {
        let mut counts = ImportCounts::default();

        for client in &snapshot.clients {
            let id = client
                .id
                .as_ref()
                .map(|id| id.to_string())
                .unwrap_or_else(|| Uuid::new_v4().to_string());
            sqlx::query(
                "INSERT OR REPLACE INTO clients (id, name, tags, city, location, value_score, notes)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )
            .bind(&id)
            .bind(&client.name)
            .bind(encode_tags(&client.tags)?)
            .bind(client.city.as_deref())
            .bind(client.location.as_deref())
            .bind(client.value_score)
            .bind(client.notes.as_deref())
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
            counts.clients += 1;
        }

        for venue in &snapshot.venues {
            let id = venue
                .id
                .as_ref()
                .map(|id| id.to_string())
                .unwrap_or_else(|| Uuid::new_v4().to_string());
            sqlx::query(
                "INSERT OR REPLACE INTO venues (id, name, city, location, capacity, tags)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )
            .bind(&id)
            .bind(&venue.name)
            .bind(venue.city.as_deref())
            .bind(venue.location.as_deref())
            .bind(venue.capacity)
            .bind(encode_tags(&venue.tags)?)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
            counts.venues += 1;
        }

        for shift in &snapshot.shifts {
            let id = shift.id.clone().unwrap_or_else(|| Uuid::new_v4().to_string());
            sqlx::query(
                "INSERT OR REPLACE INTO shifts (id, client_id, venue_id, start_at, end_at, earnings, notes)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )
            .bind(&id)
            .bind(shift.client_id.as_ref().map(|id| id.to_string()))
            .bind(shift.venue_id.as_ref().map(|id| id.to_string()))
            .bind(encode_timestamp(shift.start))
            .bind(encode_timestamp(shift.end))
            .bind(shift.earnings)
            .bind(shift.notes.as_deref())
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
            counts.shifts += 1;
        }

        for outfit in &snapshot.outfits {
            let id = outfit.id.clone().unwrap_or_else(|| Uuid::new_v4().to_string());
            sqlx::query("INSERT OR REPLACE INTO outfits (id, name, notes) VALUES (?1, ?2, ?3)")
                .bind(&id)
                .bind(&outfit.name)
                .bind(outfit.notes.as_deref())
                .execute(&self.pool)
                .await
                .map_err(db_error)?;
            counts.outfits += 1;
        }

        for transaction in &snapshot.transactions {
            let id = transaction.id.clone().unwrap_or_else(|| Uuid::new_v4().to_string());
            sqlx::query(
                "INSERT OR REPLACE INTO transactions (id, client_id, occurred_at, amount, kind, notes)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )
            .bind(&id)
            .bind(transaction.client_id.as_ref().map(|id| id.to_string()))
            .bind(encode_timestamp(transaction.date))
            .bind(transaction.amount)
            .bind(transaction.kind.as_deref())
            .bind(transaction.notes.as_deref())
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
            counts.transactions += 1;
        }

        tracing::debug!(
            clients = counts.clients,
            venues = counts.venues,
            shifts = counts.shifts,
            "snapshot import complete"
        );
        Ok(counts)
    }

    async fn load_shifts_for_client(&self, client_id: &ClientId) -> Result<Vec<Shift>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, client_id, venue_id, start_at, end_at, earnings, notes
             FROM shifts WHERE client_id = ?1",
        )
        .bind(client_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        rows.iter().map(decode_shift).collect()
    }

    async fn load_shifts_for_venue(&self, venue_id: &VenueId) -> Result<Vec<Shift>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, client_id, venue_id, start_at, end_at, earnings, notes
             FROM shifts WHERE venue_id = ?1",
        )
        .bind(venue_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        rows.iter().map(decode_shift).collect()
    }
}

fn decode_client(row: &sqlx::sqlite::SqliteRow) -> Result<Client, StoreError> {
    Ok(Client {
        id: row.try_get::<String, _>("id").map(ClientId).map(Some).map_err(db_error)?,
        name: row.try_get("name").map_err(db_error)?,
        tags: decode_tags(&row.try_get::<String, _>("tags").map_err(db_error)?)?,
        city: row.try_get("city").map_err(db_error)?,
        location: row.try_get("location").map_err(db_error)?,
        value_score: row.try_get("value_score").map_err(db_error)?,
        notes: row.try_get("notes").map_err(db_error)?,
    })
}

fn decode_venue(row: &sqlx::sqlite::SqliteRow) -> Result<Venue, StoreError> {
    Ok(Venue {
        id: row.try_get::<String, _>("id").map(VenueId).map(Some).map_err(db_error)?,
        name: row.try_get("name").map_err(db_error)?,
        city: row.try_get("city").map_err(db_error)?,
        location: row.try_get("location").map_err(db_error)?,
        capacity: row.try_get("capacity").map_err(db_error)?,
        tags: decode_tags(&row.try_get::<String, _>("tags").map_err(db_error)?)?,
    })
}

fn decode_shift(row: &sqlx::sqlite::SqliteRow) -> Result<Shift, StoreError> {
    Ok(Shift {
        id: Some(row.try_get("id").map_err(db_error)?),
        client_id: row
            .try_get::<Option<String>, _>("client_id")
            .map_err(db_error)?
            .map(ClientId),
        venue_id: row
            .try_get::<Option<String>, _>("venue_id")
            .map_err(db_error)?
            .map(VenueId),
        start: decode_timestamp(
            row.try_get::<Option<String>, _>("start_at").map_err(db_error)?.as_deref(),
        ),
        end: decode_timestamp(
            row.try_get::<Option<String>, _>("end_at").map_err(db_error)?.as_deref(),
        ),
        earnings: row.try_get("earnings").map_err(db_error)?,
        notes: row.try_get("notes").map_err(db_error)?,
    })
}

fn decode_outfit(row: &sqlx::sqlite::SqliteRow) -> Result<Outfit, StoreError> {
    Ok(Outfit {
        id: Some(row.try_get("id").map_err(db_error)?),
        name: row.try_get("name").map_err(db_error)?,
        notes: row.try_get("notes").map_err(db_error)?,
    })
}

fn decode_transaction(row: &sqlx::sqlite::SqliteRow) -> Result<Transaction, StoreError> {
    Ok(Transaction {
        id: Some(row.try_get("id").map_err(db_error)?),
        client_id: row
            .try_get::<Option<String>, _>("client_id")
            .map_err(db_error)?
            .map(ClientId),
        date: decode_timestamp(
            row.try_get::<Option<String>, _>("occurred_at").map_err(db_error)?.as_deref(),
        ),
        amount: row.try_get("amount").map_err(db_error)?,
        kind: row.try_get("kind").map_err(db_error)?,
        notes: row.try_get("notes").map_err(db_error)?,
    })
}

#[async_trait]
impl SnapshotStore for SqlDataStore {
    async fn snapshot(&self) -> Result<Snapshot, StoreError> {
        let clients = sqlx::query(
            "SELECT id, name, tags, city, location, value_score, notes FROM clients ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?
        .iter()
        .map(decode_client)
        .collect::<Result<Vec<_>, _>>()?;

        let venues = sqlx::query(
            "SELECT id, name, city, location, capacity, tags FROM venues ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?
        .iter()
        .map(decode_venue)
        .collect::<Result<Vec<_>, _>>()?;

        let shifts = sqlx::query(
            "SELECT id, client_id, venue_id, start_at, end_at, earnings, notes
             FROM shifts ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?
        .iter()
        .map(decode_shift)
        .collect::<Result<Vec<_>, _>>()?;

        let outfits = sqlx::query("SELECT id, name, notes FROM outfits ORDER BY rowid")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?
            .iter()
            .map(decode_outfit)
            .collect::<Result<Vec<_>, _>>()?;

        let transactions = sqlx::query(
            "SELECT id, client_id, occurred_at, amount, kind, notes
             FROM transactions ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?
        .iter()
        .map(decode_transaction)
        .collect::<Result<Vec<_>, _>>()?;

        // Events only exist in cloud snapshots.
        Ok(Snapshot { clients, venues, shifts, outfits, transactions, events: Vec::new() })
    }
}

#[async_trait]
impl PerformanceStore for SqlDataStore {
    async fn client_performance(
        &self,
        client_id: &ClientId,
        period_days: u32,
    ) -> Result<PerformanceSummary, StoreError> {
        let shifts = self.load_shifts_for_client(client_id).await?;
        Ok(PerformanceSummary::from_shifts(&shifts, period_days, Utc::now()))
    }

    async fn venue_performance(
        &self,
        venue_id: &VenueId,
        period_days: u32,
    ) -> Result<PerformanceSummary, StoreError> {
        let shifts = self.load_shifts_for_venue(venue_id).await?;
        Ok(PerformanceSummary::from_shifts(&shifts, period_days, Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations::run_pending;
    use crate::{connect_in_memory, demo_snapshot};

    async fn store() -> SqlDataStore {
        let pool = connect_in_memory().await.expect("connect");
        run_pending(&pool).await.expect("run migrations");
        SqlDataStore::new(pool)
    }

    #[tokio::test]
    async fn import_then_snapshot_round_trips_demo_data() {
        let store = store().await;
        let demo = demo_snapshot();

        let counts = store.import_snapshot(&demo).await.expect("import");
        assert_eq!(counts.clients, demo.clients.len());
        assert_eq!(counts.venues, demo.venues.len());
        assert_eq!(counts.shifts, demo.shifts.len());

        let loaded = store.snapshot().await.expect("load snapshot");
        assert_eq!(loaded.clients.len(), demo.clients.len());
        assert_eq!(loaded.venues.len(), demo.venues.len());
        assert_eq!(loaded.shifts.len(), demo.shifts.len());
        assert!(loaded.events.is_empty());

        let gold_room = loaded
            .venues
            .iter()
            .find(|venue| venue.name == "Gold Room")
            .expect("demo venue present");
        assert!(gold_room.capacity > 0.0);
        assert!(!gold_room.tags.is_empty());
    }

    #[tokio::test]
    async fn import_is_idempotent_per_id() {
        let store = store().await;
        let demo = demo_snapshot();

        store.import_snapshot(&demo).await.expect("first import");
        store.import_snapshot(&demo).await.expect("second import");

        let loaded = store.snapshot().await.expect("load snapshot");
        assert_eq!(loaded.clients.len(), demo.clients.len());
        assert_eq!(loaded.shifts.len(), demo.shifts.len());
    }

    #[tokio::test]
    async fn client_performance_windows_by_period() {
        let store = store().await;
        let now = Utc::now();
        let snapshot = Snapshot {
            shifts: vec![
                Shift {
                    id: Some("s1".to_owned()),
                    client_id: Some(ClientId("c1".to_owned())),
                    venue_id: Some(VenueId("v1".to_owned())),
                    start: Some(now - chrono::Duration::days(3)),
                    earnings: 400.0,
                    ..Shift::default()
                },
                Shift {
                    id: Some("s2".to_owned()),
                    client_id: Some(ClientId("c1".to_owned())),
                    venue_id: Some(VenueId("v1".to_owned())),
                    start: Some(now - chrono::Duration::days(400)),
                    earnings: 1000.0,
                    ..Shift::default()
                },
            ],
            ..Snapshot::default()
        };
        store.import_snapshot(&snapshot).await.expect("import");

        let summary = store
            .client_performance(&ClientId("c1".to_owned()), 30)
            .await
            .expect("client performance");
        assert_eq!(summary.shift_count, 1);
        assert_eq!(summary.total_earnings, 400.0);
    }
}
