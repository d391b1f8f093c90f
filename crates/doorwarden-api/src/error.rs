use thiserror::Error;

/// Top-level error type for the `doorwarden-api` crate.
///
/// Covers every failure mode across both transports: HTTP polling and the
/// WebSocket push channel. `doorwarden-core` maps these into state
/// transitions and diagnostics -- none of them is fatal to the monitor.
#[derive(Debug, Error)]
pub enum Error {
    // ── HTTP transport ──────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Poll endpoint answered with a non-success status.
    #[error("dashboard endpoint returned HTTP {status}")]
    Status { status: u16 },

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or client construction error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── WebSocket ───────────────────────────────────────────────────
    /// WebSocket handshake failed.
    #[error("WebSocket connection failed: {0}")]
    WebSocketConnect(String),

    /// WebSocket connection dropped mid-stream.
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Status { status } => *status >= 500,
            Self::WebSocketConnect(_) | Self::WebSocket(_) => true,
            _ => false,
        }
    }
}
