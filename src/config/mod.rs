//! Configuration layer: typed settings with layered precedence (file → env → CLI).

mod cli;

use std::{fs, num::NonZeroU32, path::Path, str::FromStr, time::Duration};

use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

pub use cli::{
    CliArgs, Command, CriteriaArgs, GlobalOverrides, ListArgs, ModerationArgs, ModerationCmd,
    SelectionArgs, SortKeyArg, UsersArgs, UsersCmd,
};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "quire";
const DEFAULT_PATH_PREFIX: &str = "admin";
const DEFAULT_TIMEOUT_SECS: u64 = 15;
const DEFAULT_DISPATCH_CONCURRENCY: u32 = 4;
const DEFAULT_DISPATCH_MAX_ATTEMPTS: u32 = 2;
const DEFAULT_RETRY_BACKOFF_MS: u64 = 250;
const DEFAULT_TOAST_TTL_MS: u64 = 6000;

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub client: ClientSettings,
    pub dispatch: DispatchSettings,
    pub toasts: ToastSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Backend base URL; required only by commands that touch the network.
    pub base_url: Option<Url>,
    pub path_prefix: String,
    pub api_token: Option<String>,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct DispatchSettings {
    pub concurrency: NonZeroU32,
    pub max_attempts: NonZeroU32,
    pub retry_backoff: Duration,
}

#[derive(Debug, Clone)]
pub struct ToastSettings {
    pub ttl: Duration,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LevelFilter::INFO,
            format: LogFormat::Compact,
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("QUIRE").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_overrides(&cli.overrides)?;

    Settings::from_raw(raw)
}

/// Parse CLI arguments from the process and load settings.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    use clap::Parser;

    let cli = CliArgs::parse();
    let settings = load(&cli)?;
    Ok((cli, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    client: RawClientSettings,
    dispatch: RawDispatchSettings,
    toasts: RawToastSettings,
    logging: RawLoggingSettings,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawClientSettings {
    base_url: Option<String>,
    path_prefix: Option<String>,
    api_token: Option<String>,
    timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawDispatchSettings {
    concurrency: Option<u32>,
    max_attempts: Option<u32>,
    retry_backoff_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawToastSettings {
    ttl_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

impl RawSettings {
    fn apply_overrides(&mut self, overrides: &GlobalOverrides) -> Result<(), LoadError> {
        if let Some(site) = overrides.site.as_ref() {
            self.client.base_url = Some(site.clone());
        }
        if let Some(prefix) = overrides.path_prefix.as_ref() {
            self.client.path_prefix = Some(prefix.clone());
        }
        if let Some(path) = overrides.token_file.as_ref() {
            self.client.api_token = Some(read_token_file(path)?);
        }
        if let Some(seconds) = overrides.timeout_seconds {
            self.client.timeout_seconds = Some(seconds);
        }
        if let Some(value) = overrides.concurrency {
            self.dispatch.concurrency = Some(value);
        }
        if let Some(value) = overrides.max_attempts {
            self.dispatch.max_attempts = Some(value);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        Ok(())
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            client,
            dispatch,
            toasts,
            logging,
        } = raw;

        Ok(Self {
            client: build_client_settings(client)?,
            dispatch: build_dispatch_settings(dispatch)?,
            toasts: build_toast_settings(toasts)?,
            logging: build_logging_settings(logging)?,
        })
    }
}

fn build_client_settings(client: RawClientSettings) -> Result<ClientSettings, LoadError> {
    let base_url = match blank_to_none(client.base_url) {
        Some(value) => {
            let url = Url::parse(&value)
                .map_err(|err| LoadError::invalid("client.base_url", err.to_string()))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(LoadError::invalid(
                    "client.base_url",
                    "scheme must be http or https",
                ));
            }
            Some(url)
        }
        None => None,
    };

    let path_prefix = client
        .path_prefix
        .map(|prefix| prefix.trim().to_string())
        .unwrap_or_else(|| DEFAULT_PATH_PREFIX.to_string());

    let timeout_secs = client.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS);
    if timeout_secs == 0 {
        return Err(LoadError::invalid(
            "client.timeout_seconds",
            "must be greater than zero",
        ));
    }

    Ok(ClientSettings {
        base_url,
        path_prefix,
        api_token: blank_to_none(client.api_token),
        timeout: Duration::from_secs(timeout_secs),
    })
}

fn build_dispatch_settings(dispatch: RawDispatchSettings) -> Result<DispatchSettings, LoadError> {
    let concurrency = dispatch
        .concurrency
        .unwrap_or(DEFAULT_DISPATCH_CONCURRENCY);
    let max_attempts = dispatch
        .max_attempts
        .unwrap_or(DEFAULT_DISPATCH_MAX_ATTEMPTS);
    let backoff_ms = dispatch
        .retry_backoff_ms
        .unwrap_or(DEFAULT_RETRY_BACKOFF_MS);

    Ok(DispatchSettings {
        concurrency: non_zero_u32(concurrency, "dispatch.concurrency")?,
        max_attempts: non_zero_u32(max_attempts, "dispatch.max_attempts")?,
        retry_backoff: Duration::from_millis(backoff_ms),
    })
}

fn build_toast_settings(toasts: RawToastSettings) -> Result<ToastSettings, LoadError> {
    let ttl_ms = toasts.ttl_ms.unwrap_or(DEFAULT_TOAST_TTL_MS);
    if ttl_ms == 0 {
        return Err(LoadError::invalid("toasts.ttl_ms", "must be greater than zero"));
    }
    Ok(ToastSettings {
        ttl: Duration::from_millis(ttl_ms),
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn read_token_file(path: &Path) -> Result<String, LoadError> {
    let token = fs::read_to_string(path).map_err(|err| {
        LoadError::invalid(
            "client.api_token",
            format!("failed to read {}: {err}", path.display()),
        )
    })?;
    blank_to_none(Some(token))
        .ok_or_else(|| LoadError::invalid("client.api_token", "token file is empty"))
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

fn non_zero_u32(value: u32, key: &'static str) -> Result<NonZeroU32, LoadError> {
    NonZeroU32::new(value).ok_or_else(|| LoadError::invalid(key, "must be greater than zero"))
}
