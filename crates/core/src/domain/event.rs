use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::VenueId;

/// An explicit upcoming-event record. These only arrive via the cloud
/// snapshot; some backends send the venue reference under `venue`
/// instead of `venueId`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CloudEvent {
    pub id: Option<String>,
    pub venue_id: Option<VenueId>,
    pub venue: Option<VenueId>,
    pub title: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

impl CloudEvent {
    pub fn venue_ref(&self) -> Option<&VenueId> {
        self.venue_id.as_ref().or(self.venue.as_ref())
    }
}
