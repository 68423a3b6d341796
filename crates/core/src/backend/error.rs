//! Error types for calls to the inference backend.

use thiserror::Error;

/// Errors that can occur when calling the inference backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The network call could not complete (connection refused, DNS failure).
    #[error("request failed: {0}")]
    Transport(String),

    /// The call exceeded its timeout.
    #[error("request timed out")]
    Timeout,

    /// The backend answered with a non-200 status.
    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },

    /// A 200 response whose body was not JSON.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Discovery finished without finding a backend address.
    #[error("no inference backend address could be resolved; set VLLM_URL")]
    Unresolved,
}

impl BackendError {
    /// Upstream HTTP status, when the backend answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the backend could not be reached at all
    pub fn is_transport(&self) -> bool {
        matches!(self, BackendError::Transport(_) | BackendError::Timeout)
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BackendError::Timeout
        } else {
            BackendError::Transport(err.to_string())
        }
    }
}

/// A convenience type alias for backend operations.
pub type Result<T> = std::result::Result<T, BackendError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_status_includes_body() {
        let err = BackendError::Status {
            status: 503,
            body: "model loading".into(),
        };
        assert_eq!(err.to_string(), "backend returned 503: model loading");
        assert_eq!(err.status(), Some(503));
        assert!(!err.is_transport());
    }

    #[test]
    fn transport_and_timeout_are_transport() {
        assert!(BackendError::Transport("connection refused".into()).is_transport());
        assert!(BackendError::Timeout.is_transport());
        assert_eq!(BackendError::Timeout.status(), None);
    }

    #[test]
    fn display_unresolved_mentions_override() {
        assert!(BackendError::Unresolved.to_string().contains("VLLM_URL"));
    }
}
