use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ClientId, VenueId};

/// A worked (or scheduled) shift. A shift without a venue id is
/// excluded from all venue aggregates; a shift without a client id
/// still counts toward its venue.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Shift {
    pub id: Option<String>,
    pub client_id: Option<ClientId>,
    pub venue_id: Option<VenueId>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub earnings: f64,
    pub notes: Option<String>,
}

impl Shift {
    /// Timestamp used for lookback windows and day-of-week math.
    pub fn occurred_at(&self) -> Option<DateTime<Utc>> {
        self.start.or(self.end)
    }
}
