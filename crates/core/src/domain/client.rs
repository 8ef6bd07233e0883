use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientId(pub String);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A client record owned by the surrounding application. The engine
/// only ever reads these; records synced from the mobile backend use
/// camelCase field names on the wire.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Client {
    pub id: Option<ClientId>,
    pub name: String,
    pub tags: Vec<String>,
    pub city: Option<String>,
    pub location: Option<String>,
    pub value_score: f64,
    pub notes: Option<String>,
}

impl Client {
    /// Preferred locality for proximity checks: explicit city first,
    /// free-form location second.
    pub fn locality(&self) -> Option<&str> {
        self.city
            .as_deref()
            .filter(|value| !value.is_empty())
            .or_else(|| self.location.as_deref().filter(|value| !value.is_empty()))
    }

    pub fn is_vip(&self) -> bool {
        self.tags.iter().any(|tag| tag == "VIP")
    }
}
