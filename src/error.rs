//! Error types for jules-sync.
//!
//! Every failure mode is a variant of [`JulesError`] so the CLI layer can
//! render them uniformly. Nothing in the library swallows an error.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum JulesError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("missing configuration: {0}")]
    MissingConfig(String),

    #[error("invalid session reference: {0}")]
    InvalidSession(String),

    /// 429/503 responses outlasted the retry budget.
    #[error("max retries reached after {attempts} attempts (last status {status})")]
    RetriesExhausted { status: u16, attempts: u32 },

    /// Non-retriable, non-2xx response.
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    /// Only produced by the wait loop.
    #[error("timeout reached waiting for activity after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl JulesError {
    /// Stable machine-readable code used in robot output.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::MissingConfig(_) => "missing_config",
            Self::InvalidSession(_) => "invalid_session",
            Self::RetriesExhausted { .. } => "retries_exhausted",
            Self::Api { .. } => "api_error",
            Self::Transport(_) => "transport",
            Self::Timeout(_) => "timeout",
            Self::Io(_) => "io",
            Self::Serialization(_) => "serialization",
        }
    }

    /// HTTP status carried by the error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::RetriesExhausted { status, .. } | Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

pub type Result<T> = std::result::Result<T, JulesError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct_for_transport_failures() {
        let exhausted = JulesError::RetriesExhausted {
            status: 503,
            attempts: 5,
        };
        let fatal = JulesError::Api {
            status: 404,
            body: "not found".to_string(),
        };
        assert_eq!(exhausted.code(), "retries_exhausted");
        assert_eq!(fatal.code(), "api_error");
        assert_eq!(exhausted.status(), Some(503));
        assert_eq!(fatal.status(), Some(404));
    }

    #[test]
    fn timeout_is_distinguished() {
        let err = JulesError::Timeout(Duration::from_secs(2));
        assert!(err.is_timeout());
        assert_eq!(err.status(), None);
        assert!(err.to_string().contains("2s"));
        assert!(!JulesError::Transport("reset".to_string()).is_timeout());
    }
}
