use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::expansion::DEFAULT_PAGE_SIZE;
use crate::filter::{EntityFilter, ReviewFilters, MAX_THRESHOLD_PCT};
use crate::layout::LayoutKind;

pub const CONFIG_FILE_NAME: &str = "balview.toml";
pub const ENV_PREFIX: &str = "BALVIEW_";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub gateway: GatewayConfig,
    pub server: ServerConfig,
    pub review: ReviewConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct GatewayConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub fallback_to_fixtures: bool,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

/// Reviewer toolbar state plus drill-down presentation settings.
#[derive(Clone, Debug)]
pub struct ReviewConfig {
    pub entity: EntityFilter,
    pub as_of: NaiveDate,
    pub search: String,
    pub threshold_pct: u8,
    pub view: ViewMode,
    pub page_size: usize,
    pub layout: LayoutKind,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Table grouping. Display-only; both modes read the same rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    Account,
    Product,
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
    pub gateway_base_url: Option<String>,
    pub fallback_to_fixtures: Option<bool>,
    pub server_port: Option<u16>,
    pub entity: Option<EntityFilter>,
    pub search: Option<String>,
    pub threshold_pct: Option<u8>,
    pub layout: Option<LayoutKind>,
    pub log_level: Option<String>,
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
            gateway: GatewayConfig {
                base_url: "http://localhost:4000".to_string(),
                timeout_secs: 10,
                fallback_to_fixtures: true,
            },
            server: ServerConfig { bind_address: "127.0.0.1".to_string(), port: 4000 },
            review: ReviewConfig {
                entity: EntityFilter::All,
                as_of: NaiveDate::from_ymd_opt(2025, 9, 17).unwrap_or_default(),
                search: String::new(),
                threshold_pct: 0,
                view: ViewMode::Account,
                page_size: DEFAULT_PAGE_SIZE,
                layout: LayoutKind::Inline,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for ViewMode {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "account" => Ok(Self::Account),
            "product" => Ok(Self::Product),
            other => Err(ConfigError::Validation(format!(
                "unsupported view `{other}` (expected account|product)"
            ))),
        }
    }
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

impl ReviewConfig {
    pub fn filters(&self) -> ReviewFilters {
        ReviewFilters {
            entity: self.entity.clone(),
            search: self.search.clone(),
            threshold_pct: Decimal::from(self.threshold_pct),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch)?;
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) -> Result<(), ConfigError> {
        if let Some(gateway) = patch.gateway {
            if let Some(base_url) = gateway.base_url {
                self.gateway.base_url = base_url;
            }
            if let Some(timeout_secs) = gateway.timeout_secs {
                self.gateway.timeout_secs = timeout_secs;
            }
            if let Some(fallback) = gateway.fallback_to_fixtures {
                self.gateway.fallback_to_fixtures = fallback;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
        }

        if let Some(review) = patch.review {
            if let Some(entity) = review.entity {
                self.review.entity = parse_entity("review.entity", &entity)?;
            }
            if let Some(as_of) = review.as_of {
                self.review.as_of = as_of;
            }
            if let Some(search) = review.search {
                self.review.search = search;
            }
            if let Some(threshold_pct) = review.threshold_pct {
                self.review.threshold_pct = threshold_pct;
            }
            if let Some(view) = review.view {
                self.review.view = view;
            }
            if let Some(page_size) = review.page_size {
                self.review.page_size = page_size;
            }
            if let Some(layout) = review.layout {
                self.review.layout = layout;
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

        Ok(())
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("BALVIEW_GATEWAY_BASE_URL") {
            self.gateway.base_url = value;
        }
        if let Some(value) = read_env("BALVIEW_GATEWAY_TIMEOUT_SECS") {
            self.gateway.timeout_secs = parse_value("BALVIEW_GATEWAY_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("BALVIEW_GATEWAY_FALLBACK_TO_FIXTURES") {
            self.gateway.fallback_to_fixtures =
                parse_value("BALVIEW_GATEWAY_FALLBACK_TO_FIXTURES", &value)?;
        }

        if let Some(value) = read_env("BALVIEW_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("BALVIEW_SERVER_PORT") {
            self.server.port = parse_value("BALVIEW_SERVER_PORT", &value)?;
        }

        if let Some(value) = read_env("BALVIEW_REVIEW_ENTITY") {
            self.review.entity = parse_entity("BALVIEW_REVIEW_ENTITY", &value)?;
        }
        if let Some(value) = read_env("BALVIEW_REVIEW_SEARCH") {
            self.review.search = value;
        }
        if let Some(value) = read_env("BALVIEW_REVIEW_AS_OF") {
            self.review.as_of = parse_value("BALVIEW_REVIEW_AS_OF", &value)?;
        }
        if let Some(value) = read_env("BALVIEW_REVIEW_THRESHOLD_PCT") {
            self.review.threshold_pct = parse_value("BALVIEW_REVIEW_THRESHOLD_PCT", &value)?;
        }
        if let Some(value) = read_env("BALVIEW_REVIEW_VIEW") {
            self.review.view = parse_value("BALVIEW_REVIEW_VIEW", &value)?;
        }
        if let Some(value) = read_env("BALVIEW_REVIEW_PAGE_SIZE") {
            self.review.page_size = parse_value("BALVIEW_REVIEW_PAGE_SIZE", &value)?;
        }
        if let Some(value) = read_env("BALVIEW_REVIEW_LAYOUT") {
            self.review.layout = value.parse().map_err(|_| ConfigError::InvalidEnvOverride {
                key: "BALVIEW_REVIEW_LAYOUT".to_string(),
                value: value.clone(),
            })?;
        }

        let log_level = read_env("BALVIEW_LOGGING_LEVEL").or_else(|| read_env("BALVIEW_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("BALVIEW_LOGGING_FORMAT").or_else(|| read_env("BALVIEW_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(base_url) = overrides.gateway_base_url {
            self.gateway.base_url = base_url;
        }
        if let Some(fallback) = overrides.fallback_to_fixtures {
            self.gateway.fallback_to_fixtures = fallback;
        }
        if let Some(port) = overrides.server_port {
            self.server.port = port;
        }
        if let Some(entity) = overrides.entity {
            self.review.entity = entity;
        }
        if let Some(search) = overrides.search {
            self.review.search = search;
        }
        if let Some(threshold_pct) = overrides.threshold_pct {
            self.review.threshold_pct = threshold_pct;
        }
        if let Some(layout) = overrides.layout {
            self.review.layout = layout;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_gateway(&self.gateway)?;
        validate_server(&self.server)?;
        validate_review(&self.review)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from(CONFIG_FILE_NAME), PathBuf::from("config").join(CONFIG_FILE_NAME)]
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

fn validate_gateway(gateway: &GatewayConfig) -> Result<(), ConfigError> {
    let base_url = gateway.base_url.trim();
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "gateway.base_url must start with http:// or https://".to_string(),
        ));
    }

    if gateway.timeout_secs == 0 || gateway.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "gateway.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.bind_address.trim().is_empty() {
        return Err(ConfigError::Validation("server.bind_address must not be empty".to_string()));
    }

    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    Ok(())
}

fn validate_review(review: &ReviewConfig) -> Result<(), ConfigError> {
    if i64::from(review.threshold_pct) > MAX_THRESHOLD_PCT {
        return Err(ConfigError::Validation(format!(
            "review.threshold_pct must be in range 0..={MAX_THRESHOLD_PCT}"
        )));
    }

    if review.page_size == 0 {
        return Err(ConfigError::Validation(
            "review.page_size must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse::<T>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_entity(key: &str, value: &str) -> Result<EntityFilter, ConfigError> {
    value.parse::<EntityFilter>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    gateway: Option<GatewayPatch>,
    server: Option<ServerPatch>,
    review: Option<ReviewPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct GatewayPatch {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
    fallback_to_fixtures: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct ReviewPatch {
    entity: Option<String>,
    as_of: Option<NaiveDate>,
    search: Option<String>,
    threshold_pct: Option<u8>,
    view: Option<ViewMode>,
    page_size: Option<usize>,
    layout: Option<LayoutKind>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use chrono::NaiveDate;
    use tempfile::TempDir;

    use crate::filter::EntityFilter;
    use crate::layout::LayoutKind;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat, ViewMode};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn defaults_match_dashboard_initial_state() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let config = AppConfig::load(LoadOptions::default())
            .map_err(|err| format!("config load failed: {err}"))?;

        ensure(config.review.entity == EntityFilter::All, "entity defaults to ALL")?;
        ensure(
            Some(config.review.as_of) == NaiveDate::from_ymd_opt(2025, 9, 17),
            "as-of date defaults to 2025-09-17",
        )?;
        ensure(config.review.threshold_pct == 0, "threshold defaults to zero")?;
        ensure(config.review.view == ViewMode::Account, "view defaults to account")?;
        ensure(config.review.page_size == 8, "page size defaults to eight")?;
        ensure(config.server.port == 4000, "mock api port defaults to 4000")?;
        ensure(
            matches!(config.logging.format, LogFormat::Compact),
            "default logging format should be compact",
        )
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_BALVIEW_API_HOST", "https://variances.internal");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("balview.toml");
            fs::write(
                &path,
                r#"
[gateway]
base_url = "${TEST_BALVIEW_API_HOST}"

[review]
entity = "CH-ZRH-PB"
threshold_pct = 5
layout = "drawer"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.gateway.base_url == "https://variances.internal",
                "base url should be interpolated from environment",
            )?;
            ensure(
                config.review.entity == EntityFilter::Only("CH-ZRH-PB".to_string()),
                "entity should be loaded from file",
            )?;
            ensure(config.review.threshold_pct == 5, "threshold should be loaded from file")?;
            ensure(config.review.layout == LayoutKind::Drawer, "layout should be loaded from file")
        })();

        clear_vars(&["TEST_BALVIEW_API_HOST"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("BALVIEW_GATEWAY_BASE_URL", "http://from-env:4000");
        env::set_var("BALVIEW_REVIEW_THRESHOLD_PCT", "7");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("balview.toml");
            fs::write(
                &path,
                r#"
[gateway]
base_url = "http://from-file:4000"

[review]
threshold_pct = 3
search = "nostro"

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    threshold_pct: Some(12),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.gateway.base_url == "http://from-env:4000",
                "env base url should win over file",
            )?;
            ensure(config.review.threshold_pct == 12, "override threshold should win")?;
            ensure(config.review.search == "nostro", "file search should survive")?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")
        })();

        clear_vars(&["BALVIEW_GATEWAY_BASE_URL", "BALVIEW_REVIEW_THRESHOLD_PCT"]);
        result
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("BALVIEW_LOG_LEVEL", "warn");
        env::set_var("BALVIEW_LOG_FORMAT", "json");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Json),
                "json logging format should be set from env var",
            )
        })();

        clear_vars(&["BALVIEW_LOG_LEVEL", "BALVIEW_LOG_FORMAT"]);
        result
    }

    #[test]
    fn threshold_outside_slider_range_fails_validation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let error = match AppConfig::load(LoadOptions {
            overrides: ConfigOverrides { threshold_pct: Some(21), ..ConfigOverrides::default() },
            ..LoadOptions::default()
        }) {
            Ok(_) => {
                return Err("expected validation failure but config load succeeded".to_string())
            }
            Err(error) => error,
        };

        ensure(
            matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("review.threshold_pct")
            ),
            "validation failure should mention review.threshold_pct",
        )
    }

    #[test]
    fn invalid_env_override_is_reported_with_key() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("BALVIEW_SERVER_PORT", "not-a-port");
        let result = match AppConfig::load(LoadOptions::default()) {
            Ok(_) => Err("expected env override failure".to_string()),
            Err(ConfigError::InvalidEnvOverride { key, .. }) => {
                ensure(key == "BALVIEW_SERVER_PORT", "error should name the env key")
            }
            Err(other) => Err(format!("unexpected error: {other}")),
        };

        clear_vars(&["BALVIEW_SERVER_PORT"]);
        result
    }

    #[test]
    fn invalid_view_env_override_is_reported_with_key() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("BALVIEW_REVIEW_VIEW", "ledger");
        let result = match AppConfig::load(LoadOptions::default()) {
            Ok(_) => Err("expected env override failure".to_string()),
            Err(ConfigError::InvalidEnvOverride { key, value }) => {
                ensure(key == "BALVIEW_REVIEW_VIEW", "error should name the env key")?;
                ensure(value == "ledger", "error should carry the rejected value")
            }
            Err(other) => Err(format!("unexpected error: {other}")),
        };

        clear_vars(&["BALVIEW_REVIEW_VIEW"]);
        result
    }

    #[test]
    fn missing_required_file_is_an_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let result = AppConfig::load(LoadOptions {
            config_path: Some(dir.path().join("absent.toml")),
            require_file: true,
            ..LoadOptions::default()
        });

        ensure(
            matches!(result, Err(ConfigError::MissingConfigFile(_))),
            "missing file should be reported",
        )
    }
}
