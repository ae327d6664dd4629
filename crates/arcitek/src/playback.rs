//! Playback state machine for narration audio.
//!
//! ```text
//! Unloaded --load--> Loaded --play--> Playing --pause--> Paused
//!                                        |  ^               |
//!                                      ended +----play------+
//!                                        v  |
//!                                      Ended
//! ```
//!
//! `load` is legal from any state and replaces the artifact wholesale.

use crate::domain::ArtifactRef;
use crate::error::StudioError;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "artifact", rename_all = "lowercase")]
pub enum PlaybackState {
    #[default]
    Unloaded,
    Loaded(ArtifactRef),
    Playing,
    Paused,
    Ended,
}

impl PlaybackState {
    pub fn name(&self) -> &'static str {
        match self {
            PlaybackState::Unloaded => "unloaded",
            PlaybackState::Loaded(_) => "loaded",
            PlaybackState::Playing => "playing",
            PlaybackState::Paused => "paused",
            PlaybackState::Ended => "ended",
        }
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Current state plus the artifact it applies to.
///
/// The artifact outlives the `Loaded` state: once playing, paused or ended,
/// the same artifact is still the one being played.
#[derive(Debug, Clone, Default)]
pub struct Playback {
    state: PlaybackState,
    artifact: Option<ArtifactRef>,
}

impl Playback {
    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn artifact(&self) -> Option<&ArtifactRef> {
        self.artifact.as_ref()
    }

    pub fn load(&mut self, artifact: ArtifactRef) {
        self.state = PlaybackState::Loaded(artifact.clone());
        self.artifact = Some(artifact);
    }

    pub fn play(&mut self) -> Result<(), StudioError> {
        match self.state {
            PlaybackState::Loaded(_) | PlaybackState::Paused | PlaybackState::Ended => {
                self.state = PlaybackState::Playing;
                Ok(())
            }
            PlaybackState::Playing | PlaybackState::Unloaded => {
                Err(StudioError::invalid_state("play", &self.state))
            }
        }
    }

    pub fn pause(&mut self) -> Result<(), StudioError> {
        match self.state {
            PlaybackState::Playing => {
                self.state = PlaybackState::Paused;
                Ok(())
            }
            _ => Err(StudioError::invalid_state("pause", &self.state)),
        }
    }

    /// Pause when playing, otherwise play. Nothing to toggle while unloaded.
    pub fn toggle(&mut self) -> Result<(), StudioError> {
        match self.state {
            PlaybackState::Unloaded => Err(StudioError::invalid_state("toggle", &self.state)),
            PlaybackState::Playing => self.pause(),
            _ => self.play(),
        }
    }

    /// The audio reached its end. Only meaningful while playing; returns
    /// whether the state changed.
    pub fn ended(&mut self) -> bool {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Ended;
            true
        } else {
            false
        }
    }
}
