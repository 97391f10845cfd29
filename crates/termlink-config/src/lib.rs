//! Shared configuration for termlink.
//!
//! TOML file + environment layering via figment, config path resolution,
//! and translation of the `[refresh]` table into
//! `termlink_core::RefreshConfig`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use termlink_core::{CoreError, RefreshConfig, config as policy};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub terminal: TerminalConfig,

    #[serde(default)]
    pub records: RecordsConfig,

    #[serde(default)]
    pub refresh: RefreshSettings,
}

/// Presentation of the terminal overlay.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TerminalConfig {
    /// Operator name shown on the login gate and status bar.
    #[serde(default = "default_operator")]
    pub operator: String,

    /// Header banner text.
    #[serde(default = "default_title")]
    pub title: String,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            operator: default_operator(),
            title: default_title(),
        }
    }
}

fn default_operator() -> String {
    "OPERATOR".into()
}
fn default_title() -> String {
    "TERMLINK PERSONNEL TERMINAL".into()
}

/// Where records come from.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RecordsConfig {
    /// JSON export to poll. Without one, an in-memory demo set is used.
    pub path: Option<PathBuf>,
}

/// Refresh policy overrides, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RefreshSettings {
    #[serde(default = "default_normal_ms")]
    pub normal_ms: u64,

    #[serde(default = "default_degraded_ms")]
    pub degraded_ms: u64,

    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    #[serde(default = "default_watchdog_ms")]
    pub watchdog_ms: u64,

    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    #[serde(default = "default_error_threshold")]
    pub error_threshold: u32,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            normal_ms: default_normal_ms(),
            degraded_ms: default_degraded_ms(),
            debounce_ms: default_debounce_ms(),
            watchdog_ms: default_watchdog_ms(),
            max_entries: default_max_entries(),
            error_threshold: default_error_threshold(),
        }
    }
}

fn default_normal_ms() -> u64 {
    policy::NORMAL_MS
}
fn default_degraded_ms() -> u64 {
    policy::DEGRADED_MS
}
fn default_debounce_ms() -> u64 {
    policy::DEBOUNCE_MS
}
fn default_watchdog_ms() -> u64 {
    policy::WATCHDOG_MS
}
fn default_max_entries() -> usize {
    policy::MAX_ENTRIES
}
fn default_error_threshold() -> u32 {
    policy::ERROR_THRESHOLD
}

impl RefreshSettings {
    /// Build and validate the controller policy.
    pub fn to_refresh_config(&self) -> Result<RefreshConfig, ConfigError> {
        let cfg = RefreshConfig {
            normal: Duration::from_millis(self.normal_ms),
            degraded: Duration::from_millis(self.degraded_ms),
            debounce: Duration::from_millis(self.debounce_ms),
            watchdog: Duration::from_millis(self.watchdog_ms),
            max_entries: self.max_entries,
            error_threshold: self.error_threshold,
        };
        cfg.validate().map_err(|err| match err {
            CoreError::Config { message } => ConfigError::Validation {
                field: "refresh".into(),
                reason: message,
            },
            other => ConfigError::Validation {
                field: "refresh".into(),
                reason: other.to_string(),
            },
        })?;
        Ok(cfg)
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "termlink", "termlink").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("termlink");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file, then apply `TERMLINK_` environment
/// overrides (`TERMLINK_REFRESH__NORMAL_MS=750`). A missing file is not
/// an error; defaults fill every gap.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("TERMLINK_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}
