//! Configuration layer: typed settings with layered precedence (file → env → CLI).

mod cli;

use std::{num::NonZeroUsize, str::FromStr, time::Duration};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

pub use cli::{CliArgs, Command, ReplayArgs, SettingsOverrides};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "objcache";
const ENV_PREFIX: &str = "OBJCACHE";
const DEFAULT_MEMORY_CAPACITY: usize = 10_000;

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub backend: BackendSettings,
    pub fragments: FragmentSettings,
    pub request: RequestSettings,
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

#[derive(Debug, Clone)]
pub struct BackendSettings {
    /// Whether the in-process backend may be selected.
    pub enabled: bool,
    pub memory_capacity: NonZeroUsize,
    /// Applied to writes that carry no explicit lifetime.
    pub default_ttl: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct FragmentSettings {
    pub nav_menu: bool,
    pub widgets: bool,
}

#[derive(Debug, Clone)]
pub struct RequestSettings {
    pub admin_override: bool,
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

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_overrides(&cli.overrides);

    Settings::from_raw(raw)
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    logging: RawLoggingSettings,
    backend: RawBackendSettings,
    fragments: RawFragmentSettings,
    request: RawRequestSettings,
}

impl RawSettings {
    fn apply_overrides(&mut self, overrides: &SettingsOverrides) {
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(enabled) = overrides.backend_enabled {
            self.backend.enabled = Some(enabled);
        }
        if let Some(capacity) = overrides.memory_capacity {
            self.backend.memory_capacity = Some(capacity);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            logging,
            backend,
            fragments,
            request,
        } = raw;

        Ok(Self {
            logging: build_logging_settings(logging)?,
            backend: build_backend_settings(backend)?,
            fragments: FragmentSettings {
                nav_menu: fragments.nav_menu.unwrap_or(true),
                widgets: fragments.widgets.unwrap_or(true),
            },
            request: RequestSettings {
                admin_override: request.admin_override.unwrap_or(false),
            },
        })
    }
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

fn build_backend_settings(backend: RawBackendSettings) -> Result<BackendSettings, LoadError> {
    let capacity = backend.memory_capacity.unwrap_or(DEFAULT_MEMORY_CAPACITY);
    let memory_capacity = NonZeroUsize::new(capacity).ok_or_else(|| {
        LoadError::invalid("backend.memory_capacity", "must be greater than zero")
    })?;

    let default_ttl = backend
        .default_ttl_seconds
        .filter(|seconds| *seconds > 0)
        .map(Duration::from_secs);

    Ok(BackendSettings {
        enabled: backend.enabled.unwrap_or(true),
        memory_capacity,
        default_ttl,
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawBackendSettings {
    enabled: Option<bool>,
    memory_capacity: Option<usize>,
    default_ttl_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawFragmentSettings {
    nav_menu: Option<bool>,
    widgets: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawRequestSettings {
    admin_override: Option<bool>,
}
