use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub sync: SyncConfig,
    pub engine: EngineConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

/// Cloud sync endpoint. Without a base URL the engine runs on local
/// data only.
#[derive(Clone, Debug)]
pub struct SyncConfig {
    pub base_url: Option<String>,
    pub auth_token: Option<SecretString>,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub period_days: u32,
    pub top_n: usize,
    pub schedule_weeks: u32,
    pub use_cloud: bool,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub log_level: Option<String>,
    pub sync_base_url: Option<String>,
    pub use_cloud: Option<bool>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://venuefit.db".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            sync: SyncConfig { base_url: None, auth_token: None, timeout_secs: 10 },
            engine: EngineConfig {
                period_days: 120,
                top_n: 3,
                schedule_weeks: 4,
                use_cloud: true,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigPatch {
    database: Option<DatabasePatch>,
    sync: Option<SyncPatch>,
    engine: Option<EnginePatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SyncPatch {
    base_url: Option<String>,
    auth_token: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EnginePatch {
    period_days: Option<u32>,
    top_n: Option<usize>,
    schedule_weeks: Option<u32>,
    use_cloud: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("venuefit.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(database) = patch.database {
            if let Some(url) = database.url {
                self.database.url = url;
            }
            if let Some(max_connections) = database.max_connections {
                self.database.max_connections = max_connections;
            }
            if let Some(timeout_secs) = database.timeout_secs {
                self.database.timeout_secs = timeout_secs;
            }
        }

        if let Some(sync) = patch.sync {
            if let Some(base_url) = sync.base_url {
                self.sync.base_url = Some(base_url);
            }
            if let Some(sync_auth_token_value) = sync.auth_token {
                self.sync.auth_token = Some(secret_value(sync_auth_token_value));
            }
            if let Some(timeout_secs) = sync.timeout_secs {
                self.sync.timeout_secs = timeout_secs;
            }
        }

        if let Some(engine) = patch.engine {
            if let Some(period_days) = engine.period_days {
                self.engine.period_days = period_days;
            }
            if let Some(top_n) = engine.top_n {
                self.engine.top_n = top_n;
            }
            if let Some(schedule_weeks) = engine.schedule_weeks {
                self.engine.schedule_weeks = schedule_weeks;
            }
            if let Some(use_cloud) = engine.use_cloud {
                self.engine.use_cloud = use_cloud;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("VENUEFIT_DATABASE_URL") {
            self.database.url = value;
        }
        if let Some(value) = read_env("VENUEFIT_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections =
                parse_u32("VENUEFIT_DATABASE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("VENUEFIT_DATABASE_TIMEOUT_SECS") {
            self.database.timeout_secs = parse_u64("VENUEFIT_DATABASE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("VENUEFIT_SYNC_BASE_URL") {
            self.sync.base_url = Some(value);
        }
        if let Some(value) = read_env("VENUEFIT_SYNC_AUTH_TOKEN") {
            self.sync.auth_token = Some(secret_value(value));
        }
        if let Some(value) = read_env("VENUEFIT_SYNC_TIMEOUT_SECS") {
            self.sync.timeout_secs = parse_u64("VENUEFIT_SYNC_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("VENUEFIT_ENGINE_PERIOD_DAYS") {
            self.engine.period_days = parse_u32("VENUEFIT_ENGINE_PERIOD_DAYS", &value)?;
        }
        if let Some(value) = read_env("VENUEFIT_ENGINE_TOP_N") {
            self.engine.top_n = parse_usize("VENUEFIT_ENGINE_TOP_N", &value)?;
        }
        if let Some(value) = read_env("VENUEFIT_ENGINE_SCHEDULE_WEEKS") {
            self.engine.schedule_weeks = parse_u32("VENUEFIT_ENGINE_SCHEDULE_WEEKS", &value)?;
        }
        if let Some(value) = read_env("VENUEFIT_ENGINE_USE_CLOUD") {
            self.engine.use_cloud = parse_bool("VENUEFIT_ENGINE_USE_CLOUD", &value)?;
        }

        let log_level =
            read_env("VENUEFIT_LOGGING_LEVEL").or_else(|| read_env("VENUEFIT_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("VENUEFIT_LOGGING_FORMAT").or_else(|| read_env("VENUEFIT_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(database_url) = overrides.database_url {
            self.database.url = database_url;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(sync_base_url) = overrides.sync_base_url {
            self.sync.base_url = Some(sync_base_url);
        }
        if let Some(use_cloud) = overrides.use_cloud {
            self.engine.use_cloud = use_cloud;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_database(&self.database)?;
        validate_sync(&self.sync)?;
        validate_engine(&self.engine)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("venuefit.toml"), PathBuf::from("config/venuefit.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_database(database: &DatabaseConfig) -> Result<(), ConfigError> {
    let url = database.url.trim();
    let sqlite_url =
        url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:";
    if !sqlite_url {
        return Err(ConfigError::Validation(
            "database.url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)"
                .to_string(),
        ));
    }

    if database.max_connections == 0 {
        return Err(ConfigError::Validation(
            "database.max_connections must be greater than zero".to_string(),
        ));
    }

    if database.timeout_secs == 0 || database.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "database.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_sync(sync: &SyncConfig) -> Result<(), ConfigError> {
    if let Some(base_url) = sync.base_url.as_deref() {
        let base_url = base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::Validation(
                "sync.base_url must start with http:// or https://".to_string(),
            ));
        }
    } else if sync.auth_token.is_some() {
        return Err(ConfigError::Validation(
            "sync.auth_token is set but sync.base_url is missing".to_string(),
        ));
    }

    if sync.timeout_secs == 0 || sync.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "sync.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_engine(engine: &EngineConfig) -> Result<(), ConfigError> {
    if engine.period_days == 0 || engine.period_days > 3650 {
        return Err(ConfigError::Validation(
            "engine.period_days must be in range 1..=3650".to_string(),
        ));
    }

    if engine.top_n == 0 {
        return Err(ConfigError::Validation(
            "engine.top_n must be greater than zero".to_string(),
        ));
    }

    if engine.schedule_weeks == 0 || engine.schedule_weeks > 52 {
        return Err(ConfigError::Validation(
            "engine.schedule_weeks must be in range 1..=52".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    if logging.level.trim().is_empty() {
        return Err(ConfigError::Validation("logging.level must not be empty".to_string()));
    }
    Ok(())
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidEnvOverride {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}
