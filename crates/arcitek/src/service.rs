//! The generation service seam.
//!
//! Everything that talks to a backend goes through [`GenerationService`].
//! The studio only ever sees this trait, which is how tests substitute a
//! scripted service for the HTTP one.

use crate::domain::{
    GeneratedImage, ImageRequest, MusicRequest, MusicTrack, NarrationAudio, NarrationRequest,
    Story, StoryRequest,
};
use crate::error::ErrorInfo;
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A generation backend. One call, one outcome.
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate_music(&self, request: &MusicRequest) -> Result<MusicTrack, ServiceError>;

    async fn generate_image(&self, request: &ImageRequest)
        -> Result<GeneratedImage, ServiceError>;

    async fn generate_story(&self, request: &StoryRequest) -> Result<Story, ServiceError>;

    async fn narrate_story(
        &self,
        request: &NarrationRequest,
    ) -> Result<NarrationAudio, ServiceError>;

    /// Liveness probe.
    async fn health(&self) -> Result<HealthStatus, ServiceError>;

    /// Download the bytes behind an artifact locator, for export.
    async fn fetch_artifact(&self, url: &str) -> Result<Bytes, ServiceError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        ["online", "healthy", "ok"]
            .iter()
            .any(|s| self.status.eq_ignore_ascii_case(s))
    }
}

/// Failure reported by (or while reaching) the generation service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// Non-success status. `message` is the backend's own error text when it
    /// sent one.
    #[error("{endpoint} returned {status}: {message}")]
    Status {
        endpoint: String,
        status: u16,
        message: String,
    },

    #[error("unexpected response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    #[error("invalid url '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// Anything else a non-HTTP backend wants to report.
    #[error("{0}")]
    Other(String),
}

impl ServiceError {
    pub fn other(message: impl Into<String>) -> Self {
        ServiceError::Other(message.into())
    }

    /// HTTP status, when the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ServiceError::Status { status, .. } => Some(*status),
            ServiceError::Transport { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<ServiceError> for ErrorInfo {
    fn from(err: ServiceError) -> Self {
        // Surface the backend's message verbatim when it gave one
        match err {
            ServiceError::Status { message, .. } if !message.is_empty() => {
                ErrorInfo::service(message)
            }
            other => ErrorInfo::service(other.to_string()),
        }
    }
}
