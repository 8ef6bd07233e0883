use serde::{Deserialize, Serialize};

use super::{Client, CloudEvent, Outfit, Shift, Transaction, Venue};

/// The full in-memory collection set at a point in time: local, remote,
/// or merged. Local snapshots never carry events; those are cloud-only.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snapshot {
    pub clients: Vec<Client>,
    pub venues: Vec<Venue>,
    pub shifts: Vec<Shift>,
    pub outfits: Vec<Outfit>,
    pub transactions: Vec<Transaction>,
    pub events: Vec<CloudEvent>,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
            && self.venues.is_empty()
            && self.shifts.is_empty()
            && self.outfits.is_empty()
            && self.transactions.is_empty()
            && self.events.is_empty()
    }
}
