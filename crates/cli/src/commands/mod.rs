pub mod actions;
pub mod ask;
pub mod assignments;
pub mod insights;
pub mod migrate;
pub mod schedule;
pub mod seed;
pub mod weights;

use std::sync::Arc;

use serde::Serialize;

use venuefit_core::config::{AppConfig, LoadOptions};
use venuefit_core::insights::{InsightsEngine, WeightsOverride};
use venuefit_core::merge::SnapshotService;
use venuefit_db::{connect, migrations, DbPool, SqlDataStore};
use venuefit_sync::fetcher_from_config;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

pub(crate) type CommandFailure = (&'static str, String, u8);

pub(crate) fn load_config(command: &'static str) -> Result<AppConfig, CommandResult> {
    AppConfig::load(LoadOptions::default()).map_err(|error| {
        CommandResult::failure(
            command,
            "config_validation",
            format!("configuration issue: {error}"),
            2,
        )
    })
}

pub(crate) fn build_runtime(
    command: &'static str,
) -> Result<tokio::runtime::Runtime, CommandResult> {
    tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(|error| {
        CommandResult::failure(
            command,
            "runtime_init",
            format!("failed to initialize async runtime: {error}"),
            3,
        )
    })
}

/// Connect, migrate, and wire the engine over the local store plus the
/// configured cloud fetcher. The pool is returned so callers can close
/// it once the work is done.
pub(crate) async fn build_engine(
    config: &AppConfig,
) -> Result<(DbPool, InsightsEngine), CommandFailure> {
    let pool = connect(&config.database)
        .await
        .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;

    migrations::run_pending(&pool)
        .await
        .map_err(|error| ("migration", error.to_string(), 5u8))?;

    let store = Arc::new(SqlDataStore::new(pool.clone()));
    let fetcher = fetcher_from_config(&config.sync)
        .map_err(|error| ("sync_setup", error.to_string(), 4u8))?;
    let service = SnapshotService::new(store.clone(), fetcher);
    let engine =
        InsightsEngine::new(service, store).with_use_cloud(config.engine.use_cloud);

    Ok((pool, engine))
}

/// Parse repeated `key=value` weight overrides. Keys match the scoring
/// signal names: history, venue_avg, dow, tag, city, capacity, event.
pub(crate) fn parse_weight_overrides(values: &[String]) -> Result<WeightsOverride, String> {
    let mut overrides = WeightsOverride::default();
    for entry in values {
        let (key, raw_value) = entry
            .split_once('=')
            .ok_or_else(|| format!("expected KEY=VALUE, got `{entry}`"))?;
        let value: f64 = raw_value
            .trim()
            .parse()
            .map_err(|_| format!("invalid weight value `{raw_value}` for `{key}`"))?;
        match key.trim() {
            "history" => overrides.history = Some(value),
            "venue_avg" => overrides.venue_avg = Some(value),
            "dow" => overrides.dow = Some(value),
            "tag" => overrides.tag = Some(value),
            "city" => overrides.city = Some(value),
            "capacity" => overrides.capacity = Some(value),
            "event" => overrides.event = Some(value),
            other => {
                return Err(format!(
                    "unknown weight key `{other}` (expected history|venue_avg|dow|tag|city|capacity|event)"
                ));
            }
        }
    }
    Ok(overrides)
}

pub(crate) fn to_pretty_json<T: Serialize>(
    command: &'static str,
    value: &T,
) -> Result<String, CommandResult> {
    serde_json::to_string_pretty(value).map_err(|error| {
        CommandResult::failure(
            command,
            "serialization",
            format!("could not serialize output: {error}"),
            7,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::parse_weight_overrides;

    #[test]
    fn weight_overrides_parse_known_keys() {
        let overrides = parse_weight_overrides(&[
            "history=0.5".to_owned(),
            "event = 0.25".to_owned(),
        ])
        .expect("valid overrides");
        assert_eq!(overrides.history, Some(0.5));
        assert_eq!(overrides.event, Some(0.25));
        assert_eq!(overrides.tag, None);
    }

    #[test]
    fn weight_overrides_reject_unknown_keys_and_bad_values() {
        assert!(parse_weight_overrides(&["sparkle=1.0".to_owned()]).is_err());
        assert!(parse_weight_overrides(&["history=a lot".to_owned()]).is_err());
        assert!(parse_weight_overrides(&["history".to_owned()]).is_err());
    }
}
