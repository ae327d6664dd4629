//! Scripted generation service shared by the integration tests.
//!
//! Each endpoint answers from a queue of replies. A reply can be gated on a
//! `Notify` so a test can hold a request in flight and release it later.

#![allow(dead_code)]

use arcitek::domain::{
    GeneratedImage, ImageRequest, MusicRequest, MusicTrack, NarrationAudio, NarrationRequest,
    Story, StoryRequest,
};
use arcitek::{GenerationService, HealthStatus, ServiceError};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub struct Reply<T> {
    result: Result<T, String>,
    gate: Option<Arc<Notify>>,
}

impl<T> Reply<T> {
    pub fn ok(value: T) -> Self {
        Self {
            result: Ok(value),
            gate: None,
        }
    }

    pub fn err(message: &str) -> Self {
        Self {
            result: Err(message.to_string()),
            gate: None,
        }
    }

    /// Hold the reply until `gate` is notified.
    pub fn gated(mut self, gate: &Arc<Notify>) -> Self {
        self.gate = Some(Arc::clone(gate));
        self
    }
}

pub struct Script<T> {
    endpoint: &'static str,
    replies: Mutex<VecDeque<Reply<T>>>,
    calls: AtomicUsize,
}

impl<T> Script<T> {
    fn new(endpoint: &'static str) -> Self {
        Self {
            endpoint,
            replies: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn push(&self, reply: Reply<T>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn next(&self) -> Result<T, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("unscripted call to {}", self.endpoint));

        if let Some(gate) = reply.gate {
            gate.notified().await;
        }

        reply.result.map_err(|message| ServiceError::Status {
            endpoint: self.endpoint.to_string(),
            status: 500,
            message,
        })
    }
}

pub struct ScriptedService {
    pub music: Script<MusicTrack>,
    pub image: Script<GeneratedImage>,
    pub story: Script<Story>,
    pub narration: Script<NarrationAudio>,
}

impl ScriptedService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            music: Script::new("api/generate-music"),
            image: Script::new("api/generate-image"),
            story: Script::new("api/generate-story"),
            narration: Script::new("api/narrate-story"),
        })
    }

    pub fn total_calls(&self) -> usize {
        self.music.calls() + self.image.calls() + self.story.calls() + self.narration.calls()
    }
}

#[async_trait]
impl GenerationService for ScriptedService {
    async fn generate_music(&self, _: &MusicRequest) -> Result<MusicTrack, ServiceError> {
        self.music.next().await
    }

    async fn generate_image(&self, _: &ImageRequest) -> Result<GeneratedImage, ServiceError> {
        self.image.next().await
    }

    async fn generate_story(&self, _: &StoryRequest) -> Result<Story, ServiceError> {
        self.story.next().await
    }

    async fn narrate_story(&self, _: &NarrationRequest) -> Result<NarrationAudio, ServiceError> {
        self.narration.next().await
    }

    async fn health(&self) -> Result<HealthStatus, ServiceError> {
        Ok(HealthStatus {
            status: "online".to_string(),
            service: Some("scripted".to_string()),
            version: None,
        })
    }

    async fn fetch_artifact(&self, url: &str) -> Result<Bytes, ServiceError> {
        Ok(Bytes::from(format!("bytes of {}", url)))
    }
}

pub fn track(url: &str) -> MusicTrack {
    MusicTrack {
        url: url.into(),
        filename: None,
        format: Some("WAV".to_string()),
        quality: None,
    }
}

pub fn image(url: &str) -> GeneratedImage {
    GeneratedImage {
        url: url.into(),
        filename: None,
        resolution: None,
        megapixels: None,
    }
}

pub fn story(title: &str, content: &str) -> Story {
    Story {
        title: title.to_string(),
        content: content.to_string(),
        word_count: None,
    }
}

pub fn audio(url: &str) -> NarrationAudio {
    NarrationAudio {
        url: url.into(),
        filename: None,
        duration: None,
    }
}

/// Yield to other tasks until `condition` holds.
pub async fn wait_until(condition: impl Fn() -> bool) {
    for _ in 0..1_000 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition never became true");
}
