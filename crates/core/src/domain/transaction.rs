use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ClientId;

/// Transactions are part of the merged snapshot contract but are not
/// consumed by the scoring engine itself.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Transaction {
    pub id: Option<String>,
    pub client_id: Option<ClientId>,
    pub date: Option<DateTime<Utc>>,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub notes: Option<String>,
}
