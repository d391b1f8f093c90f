// ── Core error types ──
//
// Consumer-facing errors from doorwarden-core. Transport details stay in
// `doorwarden_api::Error`; the From impl below translates them into
// domain-appropriate variants. Nothing here is fatal to a running monitor:
// these errors only surface from lifecycle calls (`start`, `refresh_now`,
// `reset_push`), never from inside the background loops.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Cannot reach dashboard at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Monitor is not running")]
    NotRunning,

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Backend error: {message}")]
    Backend { message: String },
}

impl From<doorwarden_api::Error> for CoreError {
    fn from(err: doorwarden_api::Error) -> Self {
        match err {
            doorwarden_api::Error::InvalidUrl(e) => Self::Config {
                message: format!("invalid URL: {e}"),
            },
            doorwarden_api::Error::Tls(message) => Self::Config { message },
            doorwarden_api::Error::Status { status } => Self::Backend {
                message: format!("dashboard endpoint returned HTTP {status}"),
            },
            other => Self::Backend {
                message: other.to_string(),
            },
        }
    }
}
