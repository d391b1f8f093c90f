//! Shared configuration for doorwarden tools.
//!
//! TOML file + environment layering (`DOORWARDEN_*` overrides) and
//! translation to `doorwarden_core::MonitorConfig`. The CLI adds
//! flag-level overrides on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use doorwarden_core::{MonitorConfig, TlsVerification};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config struct ──────────────────────────────────────────────

/// Top-level configuration shared by doorwarden binaries.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Dashboard base URL (e.g., "http://192.168.1.50:5000").
    pub url: Option<String>,

    /// Push channel URL override; derived from `url` when unset.
    #[serde(default)]
    pub events_url: Option<String>,

    /// Page name announced over the push channel.
    #[serde(default = "default_page")]
    pub page: String,

    /// Polling period in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Push connect failures tolerated before permanent polling fallback.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay between push reconnect attempts, in milliseconds.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Whether to attempt the push channel at all.
    #[serde(default = "default_websocket_enabled")]
    pub websocket_enabled: bool,

    /// Accept self-signed TLS certificates.
    #[serde(default)]
    pub insecure: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: None,
            events_url: None,
            page: default_page(),
            poll_interval_ms: default_poll_interval_ms(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            timeout_secs: default_timeout_secs(),
            websocket_enabled: default_websocket_enabled(),
            insecure: false,
        }
    }
}

fn default_page() -> String {
    "dashboard".into()
}
fn default_poll_interval_ms() -> u64 {
    5000
}
fn default_max_retries() -> u32 {
    5
}
fn default_retry_delay_ms() -> u64 {
    1000
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_websocket_enabled() -> bool {
    true
}

// ── Config path ─────────────────────────────────────────────────────

/// Default config file location.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "doorwarden", "doorwarden").map_or_else(
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
    p.push("doorwarden");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load configuration: defaults, then the default config file, then
/// `DOORWARDEN_*` environment variables.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Same layering against an explicit config file path.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("DOORWARDEN_"))
        .extract()?;
    Ok(config)
}

/// Write a config file, creating parent directories as needed.
pub fn save_config(config: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, toml::to_string_pretty(config)?)?;
    Ok(())
}

// ── Translation to MonitorConfig ────────────────────────────────────

impl Config {
    /// Build a `MonitorConfig`, with an optional URL override (CLI flag).
    pub fn monitor_config(&self, url_override: Option<&str>) -> Result<MonitorConfig, ConfigError> {
        let url_str = url_override
            .or(self.url.as_deref())
            .ok_or_else(|| ConfigError::Validation {
                field: "url".into(),
                reason: "no dashboard URL configured".into(),
            })?;

        let url: Url = url_str.parse().map_err(|e| ConfigError::Validation {
            field: "url".into(),
            reason: format!("{e}: {url_str}"),
        })?;

        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Validation {
                field: "poll_interval_ms".into(),
                reason: "must be greater than zero".into(),
            });
        }

        let events_url = self
            .events_url
            .as_deref()
            .map(|raw| {
                raw.parse::<Url>().map_err(|e| ConfigError::Validation {
                    field: "events_url".into(),
                    reason: format!("{e}: {raw}"),
                })
            })
            .transpose()?;

        let mut monitor = MonitorConfig::new(url);
        monitor.events_url = events_url;
        monitor.page = self.page.clone();
        monitor.poll_interval = Duration::from_millis(self.poll_interval_ms);
        monitor.max_retries = self.max_retries;
        monitor.retry_delay = Duration::from_millis(self.retry_delay_ms);
        monitor.timeout = Duration::from_secs(self.timeout_secs);
        monitor.websocket_enabled = self.websocket_enabled;
        monitor.tls = if self.insecure {
            TlsVerification::DangerAcceptInvalid
        } else {
            TlsVerification::System
        };
        Ok(monitor)
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_the_backend_client() {
        let config = Config::default();
        assert_eq!(config.page, "dashboard");
        assert_eq!(config.poll_interval_ms, 5000);
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.retry_delay_ms, 1000);
        assert!(config.websocket_enabled);
        assert!(!config.insecure);
    }

    #[test]
    fn load_from_toml_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
url = "http://192.168.1.50:5000"
poll_interval_ms = 2500
max_retries = 2
insecure = true
"#,
        )
        .expect("write config");

        let config = load_config_from(&path).expect("load");
        assert_eq!(config.url.as_deref(), Some("http://192.168.1.50:5000"));
        assert_eq!(config.poll_interval_ms, 2500);
        assert_eq!(config.max_retries, 2);
        assert!(config.insecure);
        // Untouched fields keep their defaults.
        assert_eq!(config.page, "dashboard");
        assert_eq!(config.retry_delay_ms, 1000);
    }

    #[test]
    fn save_then_load_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");

        let config = Config {
            url: Some("http://192.168.1.50:5000".into()),
            poll_interval_ms: 1234,
            ..Config::default()
        };
        save_config(&config, &path).expect("save");

        let loaded = load_config_from(&path).expect("load");
        assert_eq!(loaded.url.as_deref(), Some("http://192.168.1.50:5000"));
        assert_eq!(loaded.poll_interval_ms, 1234);
    }

    #[test]
    fn env_overrides_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
url = "http://from-file:5000"
poll_interval_ms = 2500
"#,
            )?;
            jail.set_env("DOORWARDEN_URL", "http://from-env:5000");

            let config = load_config_from(Path::new("config.toml")).expect("load");
            assert_eq!(config.url.as_deref(), Some("http://from-env:5000"));
            assert_eq!(config.poll_interval_ms, 2500);
            Ok(())
        });
    }

    #[test]
    fn monitor_config_translation() {
        let config = Config {
            url: Some("http://192.168.1.50:5000".into()),
            poll_interval_ms: 2500,
            insecure: true,
            ..Config::default()
        };

        let monitor = config.monitor_config(None).expect("translate");
        assert_eq!(monitor.url.as_str(), "http://192.168.1.50:5000/");
        assert_eq!(monitor.poll_interval, Duration::from_millis(2500));
        assert_eq!(monitor.tls, TlsVerification::DangerAcceptInvalid);
        assert_eq!(monitor.page, "dashboard");
    }

    #[test]
    fn monitor_config_url_override_wins() {
        let config = Config {
            url: Some("http://configured:5000".into()),
            ..Config::default()
        };

        let monitor = config
            .monitor_config(Some("http://flag:5000"))
            .expect("translate");
        assert_eq!(monitor.url.as_str(), "http://flag:5000/");
    }

    #[test]
    fn monitor_config_requires_a_url() {
        let result = Config::default().monitor_config(None);
        assert!(matches!(
            result,
            Err(ConfigError::Validation { ref field, .. }) if field == "url"
        ));
    }

    #[test]
    fn monitor_config_rejects_zero_poll_interval() {
        let config = Config {
            url: Some("http://localhost:5000".into()),
            poll_interval_ms: 0,
            ..Config::default()
        };
        assert!(matches!(
            config.monitor_config(None),
            Err(ConfigError::Validation { ref field, .. }) if field == "poll_interval_ms"
        ));
    }
}
