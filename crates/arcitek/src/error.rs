//! Studio error taxonomy.
//!
//! Two shapes of error live here:
//!
//! - [`StudioError`] is returned from operations that the caller invoked
//!   incorrectly: an empty prompt, `play()` before anything is loaded, an
//!   export format that does not exist yet.
//! - [`ErrorInfo`] is the record a session carries once a generation attempt
//!   has failed. Service failures never surface as `Err` from `submit()`;
//!   they are part of the session's resolved state.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Category of a failure, shared by [`StudioError`] and [`ErrorInfo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Input rejected before any session was created.
    #[serde(rename = "validation_error")]
    Validation,
    /// Non-success response or transport failure from the generation service.
    #[serde(rename = "service_error")]
    Service,
    /// Operation invoked outside its legal state. A defect in the caller.
    #[serde(rename = "invalid_state_error")]
    InvalidState,
    /// In-flight request released by a reset or shutdown.
    #[serde(rename = "cancelled")]
    Cancelled,
    /// Declared capability that is not implemented.
    #[serde(rename = "unsupported")]
    Unsupported,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation_error",
            ErrorKind::Service => "service_error",
            ErrorKind::InvalidState => "invalid_state_error",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::Unsupported => "unsupported",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure recorded on a session, surfaced to whatever renders it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{kind}: {message}")]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn service(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Service, message)
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cancelled, message)
    }
}

/// Errors returned directly by studio operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StudioError {
    /// Input failed validation. No session was created, nothing was sent.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The operation is not legal in the current state.
    #[error("{operation} is not valid while {state}")]
    InvalidState {
        operation: &'static str,
        state: String,
    },

    /// The capability is declared but not available.
    #[error("unsupported: {0}")]
    Unsupported(String),
}

impl StudioError {
    pub fn validation(message: impl Into<String>) -> Self {
        StudioError::Validation(message.into())
    }

    pub fn invalid_state(operation: &'static str, state: impl std::fmt::Display) -> Self {
        StudioError::InvalidState {
            operation,
            state: state.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            StudioError::Validation(_) => ErrorKind::Validation,
            StudioError::InvalidState { .. } => ErrorKind::InvalidState,
            StudioError::Unsupported(_) => ErrorKind::Unsupported,
        }
    }
}

impl From<&StudioError> for ErrorInfo {
    fn from(err: &StudioError) -> Self {
        ErrorInfo::new(err.kind(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_info_display() {
        let info = ErrorInfo::service("backend returned 500");
        assert_eq!(info.to_string(), "service_error: backend returned 500");
    }

    #[test]
    fn test_invalid_state_message() {
        let err = StudioError::invalid_state("play", "unloaded");
        assert_eq!(err.to_string(), "play is not valid while unloaded");
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn test_error_info_serializes_kind_wire_name() {
        let info = ErrorInfo::new(ErrorKind::InvalidState, "nope");
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["kind"], "invalid_state_error");
        assert_eq!(json["message"], "nope");
    }

    #[test]
    fn test_kind_serde_matches_display() {
        for kind in [
            ErrorKind::Validation,
            ErrorKind::Service,
            ErrorKind::InvalidState,
            ErrorKind::Cancelled,
            ErrorKind::Unsupported,
        ] {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, kind.to_string());
            let back: ErrorKind = serde_json::from_value(json).unwrap();
            assert_eq!(back, kind);
        }
    }
}
