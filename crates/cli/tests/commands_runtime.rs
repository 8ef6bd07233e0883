use std::env;
use std::sync::{Mutex, OnceLock};

use serde_json::Value;
use venuefit_cli::commands::{ask, migrate, seed, weights};

#[test]
fn migrate_returns_success_with_valid_env() {
    with_env(&[("VENUEFIT_DATABASE_URL", "sqlite::memory:")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 0, "expected successful migrate run");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "ok");
    });
}

#[test]
fn migrate_returns_config_failure_with_bad_database_url() {
    with_env(&[("VENUEFIT_DATABASE_URL", "postgres://nope")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn seed_reports_imported_counts() {
    with_env(&[("VENUEFIT_DATABASE_URL", "sqlite::memory:")], || {
        let result = seed::run();
        assert_eq!(result.exit_code, 0, "expected successful seed run");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "seed");
        assert_eq!(payload["status"], "ok");

        let message = payload["message"].as_str().unwrap_or("");
        assert!(message.contains("3 clients"));
        assert!(message.contains("3 venues"));
    });
}

#[test]
fn seed_is_idempotent_across_runs() {
    with_env(&[("VENUEFIT_DATABASE_URL", "sqlite::memory:")], || {
        let first = seed::run();
        assert_eq!(first.exit_code, 0, "expected first seed invocation success");

        let second = seed::run();
        assert_eq!(second.exit_code, 0, "expected second seed invocation success");

        let first_payload = parse_payload(&first.output);
        let second_payload = parse_payload(&second.output);
        assert_eq!(first_payload["message"], second_payload["message"]);
    });
}

#[test]
fn ask_answers_against_an_empty_database() {
    with_env(
        &[
            ("VENUEFIT_DATABASE_URL", "sqlite::memory:"),
            ("VENUEFIT_ENGINE_USE_CLOUD", "false"),
        ],
        || {
            let result = ask::run("what should I do tonight", None);
            assert_eq!(result.exit_code, 0, "expected successful ask run");

            let payload = parse_payload(&result.output);
            assert_eq!(payload["command"], "ask");
            assert_eq!(payload["status"], "ok");

            let message = payload["message"].as_str().unwrap_or("");
            assert!(message.starts_with("Here's the quick plan:"));
        },
    );
}

#[test]
fn weights_preview_applies_overrides() {
    with_env(&[], || {
        let result = weights::run(&["history=0.5".to_owned()]);
        assert_eq!(result.exit_code, 0, "expected successful weights preview");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["history"], 0.5);
        assert_eq!(payload["tag"], 0.15);
    });
}

#[test]
fn weights_preview_rejects_unknown_keys() {
    with_env(&[], || {
        let result = weights::run(&["glitter=0.5".to_owned()]);
        assert_eq!(result.exit_code, 2, "expected invalid argument failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "weights");
        assert_eq!(payload["error_class"], "invalid_argument");
    });
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "VENUEFIT_DATABASE_URL",
        "VENUEFIT_DATABASE_MAX_CONNECTIONS",
        "VENUEFIT_DATABASE_TIMEOUT_SECS",
        "VENUEFIT_SYNC_BASE_URL",
        "VENUEFIT_SYNC_AUTH_TOKEN",
        "VENUEFIT_SYNC_TIMEOUT_SECS",
        "VENUEFIT_ENGINE_PERIOD_DAYS",
        "VENUEFIT_ENGINE_TOP_N",
        "VENUEFIT_ENGINE_SCHEDULE_WEEKS",
        "VENUEFIT_ENGINE_USE_CLOUD",
        "VENUEFIT_LOGGING_LEVEL",
        "VENUEFIT_LOGGING_FORMAT",
        "VENUEFIT_LOG_LEVEL",
        "VENUEFIT_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
