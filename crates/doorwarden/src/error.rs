//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use doorwarden_config::ConfigError;
use doorwarden_core::CoreError;

/// Exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error("Could not reach the dashboard at {url}: {reason}")]
    #[diagnostic(
        code(doorwarden::connection_failed),
        help(
            "Check that the backend is running and accessible.\n\
             URL: {url}\n\
             Try: doorwarden status --insecure"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(doorwarden::validation))]
    Validation { field: String, reason: String },

    #[error("No dashboard URL configured")]
    #[diagnostic(
        code(doorwarden::no_config),
        help(
            "Pass --url, set DOORWARDEN_URL, or write a config file with:\n\
             doorwarden config init\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Backend error: {message}")]
    #[diagnostic(code(doorwarden::backend))]
    Backend { message: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(doorwarden::config))]
    Config { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Validation { .. } | Self::NoConfig { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed { url, reason },
            CoreError::Config { message } => Self::Config { message },
            CoreError::Backend { message } => Self::Backend { message },
            CoreError::NotRunning => Self::Backend {
                message: "monitor is not running".into(),
            },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => {
                if reason.contains("no dashboard URL") {
                    Self::NoConfig {
                        path: doorwarden_config::config_path().display().to_string(),
                    }
                } else {
                    Self::Validation { field, reason }
                }
            }
            other => Self::Config {
                message: other.to_string(),
            },
        }
    }
}
