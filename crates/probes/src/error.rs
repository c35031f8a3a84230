//! Error types for probe runs

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse classification of a probe failure, as reported to the runner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The system under test (or the automation endpoint) could not be reached
    Infrastructure,
    /// A bounded wait expired before its condition held
    Timeout,
    /// An observed value did not match the expected one
    Assertion,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Infrastructure => "infrastructure",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Assertion => "assertion",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown probe: {0}")]
    UnknownProbe(String),

    #[error("Session not created: {0}")]
    SessionNotCreated(String),

    #[error("WebDriver error: {error} - {message}")]
    WebDriver { error: String, message: String },

    #[error("Timeout waiting for {what} after {after:?}")]
    Timeout { what: String, after: Duration },

    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    #[error("Unexpected status: expected {expected}, got {actual}")]
    UnexpectedStatus { expected: u16, actual: u16 },

    #[error("Unexpected payload: {0}")]
    Payload(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ProbeError {
    /// Classify this error for reporting
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProbeError::Timeout { .. } => ErrorKind::Timeout,
            ProbeError::AssertionFailed(_)
            | ProbeError::UnexpectedStatus { .. }
            | ProbeError::Payload(_) => ErrorKind::Assertion,
            ProbeError::InvalidConfig(_)
            | ProbeError::UnknownProbe(_)
            | ProbeError::SessionNotCreated(_)
            | ProbeError::WebDriver { .. }
            | ProbeError::Json(_)
            | ProbeError::Http(_) => ErrorKind::Infrastructure,
        }
    }

    /// True for the W3C "no such element" error, which waits keep polling on
    pub fn is_no_such_element(&self) -> bool {
        matches!(self, ProbeError::WebDriver { error, .. } if error == "no such element")
    }
}

pub type ProbeResult<T> = Result<T, ProbeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        let timeout = ProbeError::Timeout {
            what: "title".to_string(),
            after: Duration::from_secs(10),
        };
        assert_eq!(timeout.kind(), ErrorKind::Timeout);

        let status = ProbeError::UnexpectedStatus { expected: 200, actual: 500 };
        assert_eq!(status.kind(), ErrorKind::Assertion);
        assert!(status.to_string().contains("500"));

        let refused = ProbeError::SessionNotCreated("connection refused".to_string());
        assert_eq!(refused.kind(), ErrorKind::Infrastructure);
    }

    #[test]
    fn test_no_such_element() {
        let missing = ProbeError::WebDriver {
            error: "no such element".to_string(),
            message: "Unable to locate element".to_string(),
        };
        assert!(missing.is_no_such_element());

        let stale = ProbeError::WebDriver {
            error: "invalid session id".to_string(),
            message: String::new(),
        };
        assert!(!stale.is_no_such_element());
        assert_eq!(ErrorKind::Infrastructure.to_string(), "infrastructure");
    }
}
