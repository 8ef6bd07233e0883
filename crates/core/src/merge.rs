//! Local/cloud snapshot merging with a single-slot, wall-clock cloud
//! cache. The local snapshot is never cached; external edits show up on
//! the next call.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use crate::domain::{Client, Outfit, Shift, Snapshot, Transaction, Venue};
use crate::stores::{CloudFetcher, SnapshotStore, StoreError};

/// How long a fetched cloud snapshot stays fresh.
pub const CLOUD_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Key under which a record participates in the id-keyed union.
/// Records without an id get a per-merge sequence number instead of a
/// random key, so they stay distinguishable and reproducible.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum MergeKey {
    Identified(String),
    Anonymous(u64),
}

pub(crate) trait Mergeable {
    fn merge_id(&self) -> Option<&str>;

    /// Right-biased shallow merge: remote values win where present,
    /// local-only values survive.
    fn merged_with(self, remote: Self) -> Self;
}

fn non_empty(remote: String, local: String) -> String {
    if remote.is_empty() {
        local
    } else {
        remote
    }
}

fn non_empty_vec<T>(remote: Vec<T>, local: Vec<T>) -> Vec<T> {
    if remote.is_empty() {
        local
    } else {
        remote
    }
}

impl Mergeable for Client {
    fn merge_id(&self) -> Option<&str> {
        self.id.as_ref().map(|id| id.0.as_str())
    }

    fn merged_with(self, remote: Self) -> Self {
        Self {
            id: remote.id.or(self.id),
            name: non_empty(remote.name, self.name),
            tags: non_empty_vec(remote.tags, self.tags),
            city: remote.city.or(self.city),
            location: remote.location.or(self.location),
            value_score: if remote.value_score != 0.0 { remote.value_score } else { self.value_score },
            notes: remote.notes.or(self.notes),
        }
    }
}

impl Mergeable for Venue {
    fn merge_id(&self) -> Option<&str> {
        self.id.as_ref().map(|id| id.0.as_str())
    }

    fn merged_with(self, remote: Self) -> Self {
        Self {
            id: remote.id.or(self.id),
            name: non_empty(remote.name, self.name),
            city: remote.city.or(self.city),
            location: remote.location.or(self.location),
            capacity: if remote.capacity != 0.0 { remote.capacity } else { self.capacity },
            tags: non_empty_vec(remote.tags, self.tags),
        }
    }
}

impl Mergeable for Shift {
    fn merge_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn merged_with(self, remote: Self) -> Self {
        Self {
            id: remote.id.or(self.id),
            client_id: remote.client_id.or(self.client_id),
            venue_id: remote.venue_id.or(self.venue_id),
            start: remote.start.or(self.start),
            end: remote.end.or(self.end),
            earnings: if remote.earnings != 0.0 { remote.earnings } else { self.earnings },
            notes: remote.notes.or(self.notes),
        }
    }
}

impl Mergeable for Outfit {
    fn merge_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn merged_with(self, remote: Self) -> Self {
        Self {
            id: remote.id.or(self.id),
            name: non_empty(remote.name, self.name),
            notes: remote.notes.or(self.notes),
        }
    }
}

impl Mergeable for Transaction {
    fn merge_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn merged_with(self, remote: Self) -> Self {
        Self {
            id: remote.id.or(self.id),
            client_id: remote.client_id.or(self.client_id),
            date: remote.date.or(self.date),
            amount: if remote.amount != 0.0 { remote.amount } else { self.amount },
            kind: remote.kind.or(self.kind),
            notes: remote.notes.or(self.notes),
        }
    }
}

/// Id-keyed union of one collection. Local entries contribute first
/// (first occurrence wins among local duplicates), then remote entries
/// overlay matching ids and append new ones. Output order is local
/// order followed by newly seen remote order.
fn merge_collection<T: Mergeable>(local: Vec<T>, remote: Vec<T>) -> Vec<T> {
    let mut order: Vec<MergeKey> = Vec::new();
    let mut entries: HashMap<MergeKey, T> = HashMap::new();
    let mut sequence = 0u64;

    let key_for = |item: &T, sequence: &mut u64| match item.merge_id() {
        Some(id) => MergeKey::Identified(id.to_owned()),
        None => {
            *sequence += 1;
            MergeKey::Anonymous(*sequence)
        }
    };

    for item in local {
        let key = key_for(&item, &mut sequence);
        if !entries.contains_key(&key) {
            order.push(key.clone());
            entries.insert(key, item);
        }
    }

    for item in remote {
        let key = key_for(&item, &mut sequence);
        match entries.remove(&key) {
            Some(existing) => {
                entries.insert(key, existing.merged_with(item));
            }
            None => {
                order.push(key.clone());
                entries.insert(key, item);
            }
        }
    }

    order.into_iter().filter_map(|key| entries.remove(&key)).collect()
}

/// Merge a local snapshot with a cloud snapshot. Events are cloud-only:
/// the merged `events` collection is taken straight from the remote
/// side.
pub fn merge_snapshots(local: Snapshot, cloud: Snapshot) -> Snapshot {
    Snapshot {
        clients: merge_collection(local.clients, cloud.clients),
        venues: merge_collection(local.venues, cloud.venues),
        shifts: merge_collection(local.shifts, cloud.shifts),
        outfits: merge_collection(local.outfits, cloud.outfits),
        transactions: merge_collection(local.transactions, cloud.transactions),
        events: cloud.events,
    }
}

struct CloudCacheSlot {
    snapshot: Snapshot,
    fetched_at: Instant,
}

/// Produces merged snapshots on demand. Holds the only cross-call
/// mutable state on the snapshot path: the single-slot cloud cache.
/// The mutex is held across the fetch so concurrent callers cannot
/// duplicate an in-flight refresh.
pub struct SnapshotService {
    local: Arc<dyn SnapshotStore>,
    cloud: Arc<dyn CloudFetcher>,
    cache: Mutex<Option<CloudCacheSlot>>,
}

impl SnapshotService {
    pub fn new(local: Arc<dyn SnapshotStore>, cloud: Arc<dyn CloudFetcher>) -> Self {
        Self { local, cloud, cache: Mutex::new(None) }
    }

    /// Local snapshot, optionally merged with a (possibly cached)
    /// cloud snapshot. A failed cloud fetch degrades to local-only and
    /// never surfaces to the caller.
    pub async fn merged(&self, use_cloud: bool) -> Result<Snapshot, StoreError> {
        let local = self.local.snapshot().await?;
        if !use_cloud {
            return Ok(local);
        }
        match self.cloud_snapshot().await {
            Some(cloud) => Ok(merge_snapshots(local, cloud)),
            None => Ok(local),
        }
    }

    async fn cloud_snapshot(&self) -> Option<Snapshot> {
        let mut slot = self.cache.lock().await;
        if let Some(cached) = slot.as_ref() {
            if cached.fetched_at.elapsed() < CLOUD_CACHE_TTL {
                return Some(cached.snapshot.clone());
            }
        }
        match self.cloud.fetch_snapshot().await {
            Ok(snapshot) => {
                *slot = Some(CloudCacheSlot {
                    snapshot: snapshot.clone(),
                    fetched_at: Instant::now(),
                });
                Some(snapshot)
            }
            Err(error) => {
                tracing::warn!(%error, "cloud snapshot fetch failed, continuing with local data");
                None
            }
        }
    }
}
