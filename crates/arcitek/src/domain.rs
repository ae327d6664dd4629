//! Generation domains and the data they exchange with the service.
//!
//! Each domain is a zero-sized marker implementing [`GenerationDomain`]. The
//! orchestrator is generic over the marker, so music, image, story and
//! narration sessions share one state machine while keeping their request
//! and result types distinct.

mod params;
mod requests;

pub use params::{
    DomainKind, ImageStyle, MusicGenre, Resolution, StoryGenre, StoryLength, Voice,
};
pub use requests::{
    ArtifactRef, GeneratedImage, ImageRequest, MusicRequest, MusicTrack, NarrationAudio,
    NarrationRequest, Story, StoryRequest, Validate, MUSIC_DURATION_SECONDS, NARRATION_SPEED,
};

use crate::service::{GenerationService, ServiceError};
use futures::future::BoxFuture;
use serde::Serialize;
use std::fmt::Debug;

/// Binds a request type and a result type to one generation endpoint.
pub trait GenerationDomain: Send + Sync + 'static {
    /// Short name used in logs and snapshots.
    const NAME: &'static str;

    type Request: Validate + Clone + Debug + Serialize + Send + Sync + 'static;
    type Output: Clone + Debug + Serialize + Send + Sync + 'static;

    fn dispatch<'a>(
        service: &'a dyn GenerationService,
        request: &'a Self::Request,
    ) -> BoxFuture<'a, Result<Self::Output, ServiceError>>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MusicDomain;

#[derive(Debug, Clone, Copy, Default)]
pub struct ImageDomain;

#[derive(Debug, Clone, Copy, Default)]
pub struct StoryDomain;

/// Narration of a fulfilled story. Not a studio tab of its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct NarrationDomain;

impl GenerationDomain for MusicDomain {
    const NAME: &'static str = "music";
    type Request = MusicRequest;
    type Output = MusicTrack;

    fn dispatch<'a>(
        service: &'a dyn GenerationService,
        request: &'a MusicRequest,
    ) -> BoxFuture<'a, Result<MusicTrack, ServiceError>> {
        service.generate_music(request)
    }
}

impl GenerationDomain for ImageDomain {
    const NAME: &'static str = "image";
    type Request = ImageRequest;
    type Output = GeneratedImage;

    fn dispatch<'a>(
        service: &'a dyn GenerationService,
        request: &'a ImageRequest,
    ) -> BoxFuture<'a, Result<GeneratedImage, ServiceError>> {
        service.generate_image(request)
    }
}

impl GenerationDomain for StoryDomain {
    const NAME: &'static str = "story";
    type Request = StoryRequest;
    type Output = Story;

    fn dispatch<'a>(
        service: &'a dyn GenerationService,
        request: &'a StoryRequest,
    ) -> BoxFuture<'a, Result<Story, ServiceError>> {
        service.generate_story(request)
    }
}

impl GenerationDomain for NarrationDomain {
    const NAME: &'static str = "narration";
    type Request = NarrationRequest;
    type Output = NarrationAudio;

    fn dispatch<'a>(
        service: &'a dyn GenerationService,
        request: &'a NarrationRequest,
    ) -> BoxFuture<'a, Result<NarrationAudio, ServiceError>> {
        service.narrate_story(request)
    }
}
