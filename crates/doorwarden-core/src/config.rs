//! Monitor configuration.

use std::time::Duration;

use url::Url;

use doorwarden_api::transport::{TlsMode, TransportConfig};

use crate::error::CoreError;

/// TLS verification mode (core-level mirror of the api crate's `TlsMode`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TlsVerification {
    /// Use the system certificate store.
    #[default]
    System,
    /// Accept any certificate (self-signed backends).
    DangerAcceptInvalid,
}

/// Configuration for a [`Monitor`](crate::Monitor).
///
/// Defaults match the backend's browser client: 5 s polling, 5 push
/// retries spaced 1 s apart.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Dashboard base URL, e.g. `http://192.168.1.50:5000`.
    pub url: Url,

    /// Push channel URL override. When unset, derived from `url` by
    /// swapping the scheme to ws/wss and appending `/events`.
    pub events_url: Option<Url>,

    /// Page name announced in the `client_ready` signal.
    pub page: String,

    /// Fixed polling period.
    pub poll_interval: Duration,

    /// Push connect failures tolerated before permanent polling fallback.
    pub max_retries: u32,

    /// Delay between push reconnect attempts.
    pub retry_delay: Duration,

    /// HTTP request timeout.
    pub timeout: Duration,

    /// Whether to attempt the push channel at all. When disabled, the
    /// monitor runs polling-only from the start.
    pub websocket_enabled: bool,

    pub tls: TlsVerification,
}

impl MonitorConfig {
    /// Config with default timings for the backend at `url`.
    pub fn new(url: Url) -> Self {
        Self {
            url,
            events_url: None,
            page: "dashboard".into(),
            poll_interval: Duration::from_millis(5000),
            max_retries: 5,
            retry_delay: Duration::from_millis(1000),
            timeout: Duration::from_secs(10),
            websocket_enabled: true,
            tls: TlsVerification::System,
        }
    }

    /// Resolve the push channel URL.
    pub fn events_url(&self) -> Result<Url, CoreError> {
        if let Some(ref url) = self.events_url {
            return Ok(url.clone());
        }

        let scheme = if self.url.scheme() == "https" {
            "wss"
        } else {
            "ws"
        };
        let host = self.url.host_str().ok_or_else(|| CoreError::Config {
            message: format!("dashboard URL has no host: {}", self.url),
        })?;
        let url_str = match self.url.port() {
            Some(port) => format!("{scheme}://{host}:{port}/events"),
            None => format!("{scheme}://{host}/events"),
        };

        Url::parse(&url_str).map_err(|e| CoreError::Config {
            message: format!("invalid push channel URL {url_str}: {e}"),
        })
    }

    /// Build the transport config for HTTP clients.
    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: match self.tls {
                TlsVerification::System => TlsMode::System,
                TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
            },
            timeout: self.timeout,
        }
    }
}
