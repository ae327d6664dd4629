//! The studio: three independent domains, one of them active.

use crate::domain::{
    DomainKind, ImageDomain, ImageRequest, MusicDomain, MusicRequest, StoryDomain, StoryRequest,
    Validate,
};
use crate::error::StudioError;
use crate::narration::NarrationController;
use crate::orchestrator::{lock, DomainSnapshot, GenerationOrchestrator, SubmitOutcome};
use crate::playback::PlaybackState;
use crate::service::GenerationService;
use crate::session::SessionStatus;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Everything a renderer needs, in one serializable value.
#[derive(Debug, Clone, Serialize)]
pub struct StudioSnapshot {
    pub active: DomainKind,
    pub music: DomainSnapshot<MusicDomain>,
    pub image: DomainSnapshot<ImageDomain>,
    pub story: DomainSnapshot<StoryDomain>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playback: Option<PlaybackState>,
}

/// Routes requests to the per-domain orchestrators.
///
/// Domains never share state. Selecting a domain only changes which one is
/// active; in-flight work elsewhere keeps running.
pub struct StudioCoordinator {
    service: Arc<dyn GenerationService>,
    shutdown: CancellationToken,
    music: GenerationOrchestrator<MusicDomain>,
    image: GenerationOrchestrator<ImageDomain>,
    story: GenerationOrchestrator<StoryDomain>,
    active: Mutex<DomainKind>,
    narration: Mutex<Option<NarrationController>>,
}

impl StudioCoordinator {
    pub fn new(service: Arc<dyn GenerationService>) -> Self {
        let shutdown = CancellationToken::new();
        Self {
            music: GenerationOrchestrator::with_shutdown(Arc::clone(&service), shutdown.clone()),
            image: GenerationOrchestrator::with_shutdown(Arc::clone(&service), shutdown.clone()),
            story: GenerationOrchestrator::with_shutdown(Arc::clone(&service), shutdown.clone()),
            service,
            shutdown,
            active: Mutex::new(DomainKind::default()),
            narration: Mutex::new(None),
        }
    }

    pub fn select_domain(&self, domain: DomainKind) {
        let mut active = lock(&self.active);
        let previous = *active;
        if previous != domain {
            *active = domain;
            debug!(from = %previous, to = %domain, "domain selected");
        }
    }

    pub fn active_domain(&self) -> DomainKind {
        *lock(&self.active)
    }

    pub fn music(&self) -> &GenerationOrchestrator<MusicDomain> {
        &self.music
    }

    pub fn image(&self) -> &GenerationOrchestrator<ImageDomain> {
        &self.image
    }

    pub fn story(&self) -> &GenerationOrchestrator<StoryDomain> {
        &self.story
    }

    pub async fn submit_music(
        &self,
        request: MusicRequest,
    ) -> Result<SubmitOutcome<MusicDomain>, StudioError> {
        self.music.submit(request).await
    }

    pub async fn submit_image(
        &self,
        request: ImageRequest,
    ) -> Result<SubmitOutcome<ImageDomain>, StudioError> {
        self.image.submit(request).await
    }

    /// Submit a story. A story that actually starts makes any existing
    /// narration obsolete, so it is discarded.
    pub async fn submit_story(
        &self,
        request: StoryRequest,
    ) -> Result<SubmitOutcome<StoryDomain>, StudioError> {
        request.validate()?;
        if !self.story.is_pending() {
            self.discard_narration();
        }
        self.story.submit(request).await
    }

    /// "New Story": back to an empty story domain without narration.
    pub fn new_story(&self) {
        self.story.reset();
        self.discard_narration();
    }

    /// Narration for the current story, created on first use.
    ///
    /// Fails with [`StudioError::InvalidState`] unless the story domain holds
    /// a fulfilled session.
    pub fn narration(&self) -> Result<NarrationController, StudioError> {
        let story = self.story.snapshot();
        if story.status != SessionStatus::Fulfilled {
            return Err(StudioError::invalid_state("narrate", story.status));
        }

        let mut narration = lock(&self.narration);
        if let Some(existing) = narration.as_ref() {
            if Some(existing.story_session()) == story.session_id.as_ref() {
                return Ok(existing.clone());
            }
        }

        let controller = NarrationController::from_snapshot(
            Arc::clone(&self.service),
            self.shutdown.child_token(),
            &story,
        )?;
        info!(story.session = %controller.story_session(), "narration controller created");
        *narration = Some(controller.clone());
        Ok(controller)
    }

    /// Existing narration controller, without creating one.
    pub fn current_narration(&self) -> Option<NarrationController> {
        lock(&self.narration).clone()
    }

    fn discard_narration(&self) {
        if let Some(controller) = lock(&self.narration).take() {
            controller.cancel();
            debug!(story.session = %controller.story_session(), "narration discarded");
        }
    }

    pub fn snapshot(&self) -> StudioSnapshot {
        StudioSnapshot {
            active: self.active_domain(),
            music: self.music.snapshot(),
            image: self.image.snapshot(),
            story: self.story.snapshot(),
            playback: self.current_narration().map(|n| n.playback_state()),
        }
    }

    /// Cancel every in-flight call across all domains.
    pub fn shutdown(&self) {
        info!("studio shutting down");
        self.shutdown.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        GeneratedImage, ImageStyle, MusicTrack, NarrationAudio, NarrationRequest, Resolution,
        Story, StoryGenre, StoryLength, Voice,
    };
    use crate::service::{HealthStatus, ServiceError};
    use async_trait::async_trait;
    use bytes::Bytes;

    struct Echo;

    #[async_trait]
    impl GenerationService for Echo {
        async fn generate_music(&self, _: &MusicRequest) -> Result<MusicTrack, ServiceError> {
            Ok(MusicTrack {
                url: "https://x/a.wav".into(),
                filename: None,
                format: None,
                quality: None,
            })
        }

        async fn generate_image(&self, _: &ImageRequest) -> Result<GeneratedImage, ServiceError> {
            Err(ServiceError::other("gpu busy"))
        }

        async fn generate_story(&self, request: &StoryRequest) -> Result<Story, ServiceError> {
            Ok(Story {
                title: request.prompt.clone(),
                content: format!("Once, {}.", request.prompt),
                word_count: None,
            })
        }

        async fn narrate_story(&self, _: &NarrationRequest) -> Result<NarrationAudio, ServiceError> {
            Ok(NarrationAudio {
                url: "https://x/n.mp3".into(),
                filename: None,
                duration: None,
            })
        }

        async fn health(&self) -> Result<HealthStatus, ServiceError> {
            unreachable!()
        }

        async fn fetch_artifact(&self, _: &str) -> Result<Bytes, ServiceError> {
            unreachable!()
        }
    }

    fn story(prompt: &str) -> StoryRequest {
        StoryRequest::new(prompt, StoryGenre::Adventure, StoryLength::Short)
    }

    #[test]
    fn test_select_domain() {
        let studio = StudioCoordinator::new(Arc::new(Echo));
        assert_eq!(studio.active_domain(), DomainKind::Music);
        studio.select_domain(DomainKind::Story);
        assert_eq!(studio.active_domain(), DomainKind::Story);
    }

    #[tokio::test]
    async fn test_domains_are_independent() {
        let studio = StudioCoordinator::new(Arc::new(Echo));
        studio
            .submit_music(MusicRequest::new("drums", crate::domain::MusicGenre::Rock, 20))
            .await
            .unwrap();
        studio
            .submit_image(ImageRequest::new("city", ImageStyle::Cyberpunk, Resolution::FourK))
            .await
            .unwrap();

        let snapshot = studio.snapshot();
        assert_eq!(snapshot.music.status, SessionStatus::Fulfilled);
        assert_eq!(snapshot.image.status, SessionStatus::Failed);
        assert_eq!(snapshot.story.status, SessionStatus::Idle);
        assert!(snapshot.playback.is_none());
    }

    #[tokio::test]
    async fn test_narration_requires_story() {
        let studio = StudioCoordinator::new(Arc::new(Echo));
        assert!(studio.narration().is_err());

        studio.submit_story(story("a fox")).await.unwrap();
        let first = studio.narration().unwrap();
        let again = studio.narration().unwrap();
        assert_eq!(first.story_session(), again.story_session());
    }

    #[tokio::test]
    async fn test_new_story_discards_narration() {
        let studio = StudioCoordinator::new(Arc::new(Echo));
        studio.submit_story(story("a fox")).await.unwrap();
        let narration = studio.narration().unwrap();
        narration.narrate_story(Voice::Alloy, 1.0).await.unwrap();
        assert!(studio.snapshot().playback.is_some());

        studio.new_story();
        assert!(studio.current_narration().is_none());
        assert_eq!(studio.story().status(), SessionStatus::Idle);
        assert!(studio.narration().is_err());
    }

    #[tokio::test]
    async fn test_second_story_gets_fresh_narration() {
        let studio = StudioCoordinator::new(Arc::new(Echo));
        studio.submit_story(story("a fox")).await.unwrap();
        let first = studio.narration().unwrap();
        first.narrate_story(Voice::Alloy, 1.0).await.unwrap();

        studio.submit_story(story("a hound")).await.unwrap();
        let second = studio.narration().unwrap();
        assert_ne!(first.story_session(), second.story_session());
        assert_eq!(second.playback_state(), PlaybackState::Unloaded);
        assert_eq!(second.story().title, "a hound");
    }

    #[tokio::test]
    async fn test_invalid_story_keeps_narration() {
        let studio = StudioCoordinator::new(Arc::new(Echo));
        studio.submit_story(story("a fox")).await.unwrap();
        studio.narration().unwrap();

        assert!(studio.submit_story(story("")).await.is_err());
        assert!(studio.current_narration().is_some());
    }

    #[test]
    fn test_snapshot_serializes() {
        let studio = StudioCoordinator::new(Arc::new(Echo));
        let json = serde_json::to_value(studio.snapshot()).unwrap();
        assert_eq!(json["active"], "music");
        assert_eq!(json["story"]["status"], "idle");
        assert!(json.get("playback").is_none());
    }
}
