use chrono::{DateTime, Utc};
use venuefit_core::stores::StoreError;

pub mod memory;
pub mod sql;

pub use memory::InMemoryDataStore;
pub use sql::{ImportCounts, SqlDataStore};

pub(crate) fn db_error(error: sqlx::Error) -> StoreError {
    StoreError::Database(error.to_string())
}

/// JSON array column holding a tag list.
pub(crate) fn decode_tags(raw: &str) -> Result<Vec<String>, StoreError> {
    serde_json::from_str(raw)
        .map_err(|error| StoreError::Decode(format!("invalid tag list `{raw}`: {error}")))
}

pub(crate) fn encode_tags(tags: &[String]) -> Result<String, StoreError> {
    serde_json::to_string(tags)
        .map_err(|error| StoreError::Decode(format!("could not encode tag list: {error}")))
}

/// RFC 3339 timestamp column. Unparseable values decode to `None`
/// rather than failing the whole snapshot load.
pub(crate) fn decode_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|value| {
        DateTime::parse_from_rfc3339(value).ok().map(|parsed| parsed.with_timezone(&Utc))
    })
}

pub(crate) fn encode_timestamp(value: Option<DateTime<Utc>>) -> Option<String> {
    value.map(|timestamp| timestamp.to_rfc3339())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_round_trip() {
        let encoded = encode_tags(&["VIP".to_owned(), "late-night".to_owned()]).unwrap();
        assert_eq!(decode_tags(&encoded).unwrap(), vec!["VIP", "late-night"]);
        assert!(decode_tags("not json").is_err());
    }

    #[test]
    fn bad_timestamps_decode_to_none() {
        assert_eq!(decode_timestamp(Some("yesterday")), None);
        assert_eq!(decode_timestamp(None), None);
        assert!(decode_timestamp(Some("2026-08-01T12:00:00Z")).is_some());
    }
}
