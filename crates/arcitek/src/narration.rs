//! Text-to-speech narration of a fulfilled story.

use crate::domain::{ArtifactRef, NarrationDomain, NarrationRequest, Story, StoryDomain, Voice};
use crate::error::StudioError;
use crate::orchestrator::{lock, DomainSnapshot, GenerationOrchestrator, SubmitOutcome};
use crate::playback::{Playback, PlaybackState};
use crate::service::GenerationService;
use crate::session::{SessionId, SessionStatus};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Chains a narration session onto a fulfilled story and drives playback of
/// the resulting audio.
///
/// A controller belongs to exactly one story session. Starting a new story
/// discards it.
#[derive(Clone)]
pub struct NarrationController {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    story_session: SessionId,
    story: Arc<Story>,
    orchestrator: GenerationOrchestrator<NarrationDomain>,
    playback: Mutex<Playback>,
    states: watch::Sender<PlaybackState>,
}

impl NarrationController {
    /// Build a controller for `story`, which must be a fulfilled story session.
    pub fn from_snapshot(
        service: Arc<dyn GenerationService>,
        shutdown: CancellationToken,
        story: &DomainSnapshot<StoryDomain>,
    ) -> Result<Self, StudioError> {
        let (Some(session_id), Some(result), SessionStatus::Fulfilled) =
            (&story.session_id, &story.result, story.status)
        else {
            return Err(StudioError::invalid_state("narrate", story.status));
        };

        let (states, _) = watch::channel(PlaybackState::Unloaded);
        Ok(Self {
            inner: Arc::new(ControllerInner {
                story_session: session_id.clone(),
                story: Arc::new(result.clone()),
                orchestrator: GenerationOrchestrator::with_shutdown(service, shutdown),
                playback: Mutex::new(Playback::default()),
                states,
            }),
        })
    }

    /// Story session this controller narrates.
    pub fn story_session(&self) -> &SessionId {
        &self.inner.story_session
    }

    pub fn story(&self) -> &Story {
        &self.inner.story
    }

    /// Request narration of `text`. On success the audio is loaded, replacing
    /// whatever was loaded before. On failure playback is left untouched.
    pub async fn narrate(
        &self,
        text: impl Into<String>,
        voice: Voice,
        speed: f32,
    ) -> Result<SubmitOutcome<NarrationDomain>, StudioError> {
        let request = NarrationRequest::new(text, voice, speed);
        let outcome = self.inner.orchestrator.submit(request).await?;

        if let SubmitOutcome::Fulfilled(snapshot) = &outcome {
            if let Some(audio) = &snapshot.result {
                self.load(audio.url.clone());
            }
        }
        Ok(outcome)
    }

    /// Narrate the story's own content.
    pub async fn narrate_story(
        &self,
        voice: Voice,
        speed: f32,
    ) -> Result<SubmitOutcome<NarrationDomain>, StudioError> {
        let content = self.inner.story.content.clone();
        self.narrate(content, voice, speed).await
    }

    fn load(&self, artifact: ArtifactRef) {
        let mut playback = lock(&self.inner.playback);
        info!(
            story.session = %self.inner.story_session,
            artifact = %artifact,
            "narration loaded"
        );
        playback.load(artifact);
        self.inner.states.send_replace(playback.state().clone());
    }

    pub fn play(&self) -> Result<(), StudioError> {
        self.transition(Playback::play)
    }

    pub fn pause(&self) -> Result<(), StudioError> {
        self.transition(Playback::pause)
    }

    /// Pause when playing, otherwise play. Fails while nothing is loaded.
    pub fn toggle(&self) -> Result<(), StudioError> {
        self.transition(Playback::toggle)
    }

    /// Called by the audio sink when playback reaches the end.
    pub fn on_playback_ended(&self) {
        let mut playback = lock(&self.inner.playback);
        if playback.ended() {
            debug!(story.session = %self.inner.story_session, "playback ended");
            self.inner.states.send_replace(playback.state().clone());
        }
    }

    fn transition(
        &self,
        op: impl FnOnce(&mut Playback) -> Result<(), StudioError>,
    ) -> Result<(), StudioError> {
        let mut playback = lock(&self.inner.playback);
        op(&mut playback)?;
        debug!(
            story.session = %self.inner.story_session,
            playback.state = %playback.state(),
            "playback transition"
        );
        self.inner.states.send_replace(playback.state().clone());
        Ok(())
    }

    pub fn playback_state(&self) -> PlaybackState {
        lock(&self.inner.playback).state().clone()
    }

    /// Audio currently loaded, regardless of whether it is playing.
    pub fn artifact(&self) -> Option<ArtifactRef> {
        lock(&self.inner.playback).artifact().cloned()
    }

    /// Current narration session.
    pub fn narration(&self) -> DomainSnapshot<NarrationDomain> {
        self.inner.orchestrator.snapshot()
    }

    pub fn is_generating(&self) -> bool {
        self.inner.orchestrator.is_pending()
    }

    pub fn subscribe_playback(&self) -> watch::Receiver<PlaybackState> {
        self.inner.states.subscribe()
    }

    pub fn subscribe_narration(&self) -> watch::Receiver<DomainSnapshot<NarrationDomain>> {
        self.inner.orchestrator.subscribe()
    }

    /// Cancel an in-flight narration request, if any.
    pub(crate) fn cancel(&self) -> bool {
        self.inner.orchestrator.cancel()
    }
}

impl std::fmt::Debug for NarrationController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NarrationController")
            .field("story_session", &self.inner.story_session)
            .field("playback", &self.playback_state())
            .finish()
    }
}
