use serde::{Deserialize, Serialize};

/// Outfits ride along in the snapshot merge contract but carry no
/// scoring signal.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Outfit {
    pub id: Option<String>,
    pub name: String,
    pub notes: Option<String>,
}
