//! HTTP implementation of [`GenerationService`].

use crate::domain::{
    ArtifactRef, GeneratedImage, ImageRequest, MusicRequest, MusicTrack, NarrationAudio,
    NarrationRequest, Story, StoryRequest,
};
use crate::service::{GenerationService, HealthStatus, ServiceError};
use anyhow::{Context, Result};
use arcitekconf::ServiceConfig;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

const MUSIC_ENDPOINT: &str = "api/generate-music";
const IMAGE_ENDPOINT: &str = "api/generate-image";
const STORY_ENDPOINT: &str = "api/generate-story";
const NARRATE_ENDPOINT: &str = "api/narrate-story";
const HEALTH_ENDPOINT: &str = "api/health";

/// Talks to the ArciTEK backend over HTTP/JSON.
///
/// Every call is a single attempt bounded by the configured timeout.
#[derive(Debug, Clone)]
pub struct HttpGenerationService {
    base_url: Url,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct StoryEnvelope {
    story: Story,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl HttpGenerationService {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        // Url::join drops the last segment unless the base ends with '/'
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url = Url::parse(&normalized)
            .with_context(|| format!("Invalid generation service url: {}", base_url))?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { base_url, client })
    }

    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        Self::new(&config.base_url, Duration::from_millis(config.timeout_ms))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ServiceError> {
        self.base_url
            .join(path)
            .map_err(|e| ServiceError::InvalidUrl {
                url: path.to_string(),
                message: e.to_string(),
            })
    }

    /// Backends hand out server-relative artifact paths. Make them absolute
    /// so the artifact stays usable outside this client.
    fn resolve_artifact(&self, url: &ArtifactRef) -> Result<ArtifactRef, ServiceError> {
        self.base_url
            .join(url.as_str())
            .map(|u| ArtifactRef::new(u.to_string()))
            .map_err(|e| ServiceError::InvalidUrl {
                url: url.to_string(),
                message: e.to_string(),
            })
    }

    // Helper to inject traceparent header for distributed tracing
    fn inject_trace_context(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        use opentelemetry::trace::TraceContextExt;
        use tracing_opentelemetry::OpenTelemetrySpanExt;

        let context = tracing::Span::current().context();
        let span = context.span();
        let span_context = span.span_context();

        if span_context.is_valid() {
            let flags = if span_context.is_sampled() { "01" } else { "00" };
            let traceparent = format!(
                "00-{}-{}-{}",
                span_context.trace_id(),
                span_context.span_id(),
                flags
            );
            builder.header("traceparent", traceparent)
        } else {
            builder
        }
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ServiceError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        let request = self.inject_trace_context(self.client.post(url).json(body));
        self.execute(path, request).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ServiceError> {
        let url = self.endpoint(path)?;
        let request = self.inject_trace_context(self.client.get(url));
        self.execute(path, request).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ServiceError> {
        let response = send(endpoint, request).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|source| ServiceError::Transport {
                endpoint: endpoint.to_string(),
                source,
            })?;

        serde_json::from_slice(&bytes).map_err(|e| ServiceError::Decode {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })
    }
}

/// Send a request and turn a non-success status into [`ServiceError::Status`].
async fn send(
    endpoint: &str,
    request: reqwest::RequestBuilder,
) -> Result<reqwest::Response, ServiceError> {
    let response = request.send().await.map_err(|source| ServiceError::Transport {
        endpoint: endpoint.to_string(),
        source,
    })?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.error)
        .unwrap_or(text);
    warn!(endpoint, status = status.as_u16(), %message, "generation service error");

    Err(ServiceError::Status {
        endpoint: endpoint.to_string(),
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl GenerationService for HttpGenerationService {
    #[instrument(skip(self, request), fields(genre = %request.genre, duration = request.duration_seconds))]
    async fn generate_music(&self, request: &MusicRequest) -> Result<MusicTrack, ServiceError> {
        let mut track: MusicTrack = self.post_json(MUSIC_ENDPOINT, request).await?;
        track.url = self.resolve_artifact(&track.url)?;
        debug!(url = %track.url, "music generated");
        Ok(track)
    }

    #[instrument(skip(self, request), fields(style = %request.style, resolution = %request.resolution))]
    async fn generate_image(
        &self,
        request: &ImageRequest,
    ) -> Result<GeneratedImage, ServiceError> {
        let mut image: GeneratedImage = self.post_json(IMAGE_ENDPOINT, request).await?;
        image.url = self.resolve_artifact(&image.url)?;
        debug!(url = %image.url, "image generated");
        Ok(image)
    }

    #[instrument(skip(self, request), fields(genre = %request.genre, length = %request.length))]
    async fn generate_story(&self, request: &StoryRequest) -> Result<Story, ServiceError> {
        let envelope: StoryEnvelope = self.post_json(STORY_ENDPOINT, request).await?;
        debug!(title = %envelope.story.title, "story generated");
        Ok(envelope.story)
    }

    #[instrument(skip(self, request), fields(voice = %request.voice, speed = request.speed, chars = request.text.len()))]
    async fn narrate_story(
        &self,
        request: &NarrationRequest,
    ) -> Result<NarrationAudio, ServiceError> {
        let mut audio: NarrationAudio = self.post_json(NARRATE_ENDPOINT, request).await?;
        audio.url = self.resolve_artifact(&audio.url)?;
        debug!(url = %audio.url, "narration generated");
        Ok(audio)
    }

    #[instrument(skip(self))]
    async fn health(&self) -> Result<HealthStatus, ServiceError> {
        self.get_json(HEALTH_ENDPOINT).await
    }

    #[instrument(skip(self))]
    async fn fetch_artifact(&self, url: &str) -> Result<Bytes, ServiceError> {
        let resolved = self.resolve_artifact(&ArtifactRef::new(url))?;
        let request = self.inject_trace_context(self.client.get(resolved.as_str()));
        let response = send(url, request).await?;
        response
            .bytes()
            .await
            .map_err(|source| ServiceError::Transport {
                endpoint: url.to_string(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let service =
            HttpGenerationService::new("http://localhost:5000", Duration::from_secs(1)).unwrap();
        assert_eq!(service.base_url().as_str(), "http://localhost:5000/");
        assert_eq!(
            service.endpoint(MUSIC_ENDPOINT).unwrap().as_str(),
            "http://localhost:5000/api/generate-music"
        );
    }

    #[test]
    fn test_base_url_with_prefix_keeps_prefix() {
        let service =
            HttpGenerationService::new("http://studio.local/backend", Duration::from_secs(1))
                .unwrap();
        assert_eq!(
            service.endpoint(HEALTH_ENDPOINT).unwrap().as_str(),
            "http://studio.local/backend/api/health"
        );
    }

    #[test]
    fn test_relative_artifact_resolves_against_host() {
        let service =
            HttpGenerationService::new("http://localhost:5000", Duration::from_secs(1)).unwrap();
        let resolved = service
            .resolve_artifact(&ArtifactRef::new("/api/outputs/music/music_1.wav"))
            .unwrap();
        assert_eq!(
            resolved.as_str(),
            "http://localhost:5000/api/outputs/music/music_1.wav"
        );

        let absolute = service
            .resolve_artifact(&ArtifactRef::new("https://cdn.example/a.png"))
            .unwrap();
        assert_eq!(absolute.as_str(), "https://cdn.example/a.png");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(HttpGenerationService::new("not a url", Duration::from_secs(1)).is_err());
    }

    #[test]
    fn test_from_config() {
        let config = ServiceConfig::default();
        let service = HttpGenerationService::from_config(&config).unwrap();
        assert_eq!(service.base_url().as_str(), "http://localhost:5000/");
    }
}
