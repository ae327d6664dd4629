//! Lifecycle of a single generation attempt.

use crate::error::{ErrorInfo, StudioError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Identifier of one generation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    #[default]
    Idle,
    Pending,
    Fulfilled,
    Failed,
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Fulfilled | SessionStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Idle => "idle",
            SessionStatus::Pending => "pending",
            SessionStatus::Fulfilled => "fulfilled",
            SessionStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One attempt at producing an `R` from parameters `P`.
///
/// `result` is present only when fulfilled and `error` only when failed.
/// A session settles exactly once; settling it again is an
/// [`StudioError::InvalidState`].
#[derive(Debug, Clone)]
pub struct RequestSession<P, R> {
    id: SessionId,
    parameters: P,
    status: SessionStatus,
    result: Option<R>,
    error: Option<ErrorInfo>,
    created_at: DateTime<Utc>,
    settled_at: Option<DateTime<Utc>>,
}

impl<P, R> RequestSession<P, R> {
    /// Create a session that is already pending on `parameters`.
    pub fn start(parameters: P) -> Self {
        Self {
            id: SessionId::generate(),
            parameters,
            status: SessionStatus::Pending,
            result: None,
            error: None,
            created_at: Utc::now(),
            settled_at: None,
        }
    }

    pub fn resolve(&mut self, result: R) -> Result<(), StudioError> {
        self.ensure_pending("resolve")?;
        self.status = SessionStatus::Fulfilled;
        self.result = Some(result);
        self.settled_at = Some(Utc::now());
        Ok(())
    }

    pub fn reject(&mut self, error: ErrorInfo) -> Result<(), StudioError> {
        self.ensure_pending("reject")?;
        self.status = SessionStatus::Failed;
        self.error = Some(error);
        self.settled_at = Some(Utc::now());
        Ok(())
    }

    fn ensure_pending(&self, operation: &'static str) -> Result<(), StudioError> {
        if self.status != SessionStatus::Pending {
            return Err(StudioError::invalid_state(operation, self.status));
        }
        Ok(())
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn parameters(&self) -> &P {
        &self.parameters
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn result(&self) -> Option<&R> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&ErrorInfo> {
        self.error.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        self.status == SessionStatus::Pending
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Time from start to settlement, if settled.
    pub fn duration(&self) -> Option<Duration> {
        self.settled_at
            .and_then(|settled| (settled - self.created_at).to_std().ok())
    }
}

impl<P: Clone, R: Clone> RequestSession<P, R> {
    pub fn snapshot(&self) -> SessionSnapshot<P, R> {
        SessionSnapshot {
            session_id: Some(self.id.clone()),
            status: self.status,
            parameters: Some(self.parameters.clone()),
            result: self.result.clone(),
            error: self.error.clone(),
        }
    }
}

/// Read-only view of a domain's current session, published on every change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot<P, R> {
    pub session_id: Option<SessionId>,
    pub status: SessionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<P>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<R>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

impl<P, R> SessionSnapshot<P, R> {
    /// No session has been started since the last reset.
    pub fn idle() -> Self {
        Self {
            session_id: None,
            status: SessionStatus::Idle,
            parameters: None,
            result: None,
            error: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == SessionStatus::Pending
    }
}

impl<P, R> Default for SessionSnapshot<P, R> {
    fn default() -> Self {
        Self::idle()
    }
}
