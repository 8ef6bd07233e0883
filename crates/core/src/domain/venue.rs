use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VenueId(pub String);

impl fmt::Display for VenueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A venue record. Capacity is clamped to zero when absent so a venue
/// with no recorded capacity contributes no capacity signal.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Venue {
    pub id: Option<VenueId>,
    pub name: String,
    pub city: Option<String>,
    pub location: Option<String>,
    pub capacity: f64,
    pub tags: Vec<String>,
}

impl Venue {
    pub fn locality(&self) -> Option<&str> {
        self.city
            .as_deref()
            .filter(|value| !value.is_empty())
            .or_else(|| self.location.as_deref().filter(|value| !value.is_empty()))
    }

    pub fn capacity_or_zero(&self) -> f64 {
        self.capacity.max(0.0)
    }
}
