//! Generation requests and the results the service hands back.

use super::params::{ImageStyle, MusicGenre, Resolution, StoryGenre, StoryLength, Voice};
use crate::error::StudioError;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Allowed track length in seconds.
pub const MUSIC_DURATION_SECONDS: RangeInclusive<u32> = 10..=180;

/// Allowed narration speed multiplier.
pub const NARRATION_SPEED: RangeInclusive<f32> = 0.5..=2.0;

/// Checked before a session is created. A failure means nothing is sent.
pub trait Validate {
    fn validate(&self) -> Result<(), StudioError>;
}

fn require_prompt(prompt: &str) -> Result<(), StudioError> {
    if prompt.trim().is_empty() {
        return Err(StudioError::validation("prompt is required"));
    }
    Ok(())
}

/// Locator of a generated media object. The studio references artifacts, it
/// never copies them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactRef(String);

impl ArtifactRef {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path segment, without query or fragment.
    pub fn file_name(&self) -> Option<&str> {
        let path = self.0.split(['?', '#']).next().unwrap_or_default();
        path.rsplit('/').next().filter(|s| !s.is_empty())
    }
}

impl std::fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ArtifactRef {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ArtifactRef {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// --- Requests ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MusicRequest {
    pub prompt: String,
    pub genre: MusicGenre,
    #[serde(rename = "duration")]
    pub duration_seconds: u32,
}

impl MusicRequest {
    /// Build a request the way the input surface does, clamping the duration.
    pub fn new(prompt: impl Into<String>, genre: MusicGenre, duration_seconds: u32) -> Self {
        Self {
            prompt: prompt.into(),
            genre,
            duration_seconds: duration_seconds
                .clamp(*MUSIC_DURATION_SECONDS.start(), *MUSIC_DURATION_SECONDS.end()),
        }
    }
}

impl Validate for MusicRequest {
    fn validate(&self) -> Result<(), StudioError> {
        require_prompt(&self.prompt)?;
        if !MUSIC_DURATION_SECONDS.contains(&self.duration_seconds) {
            return Err(StudioError::validation(format!(
                "duration {}s outside {}..={}s",
                self.duration_seconds,
                MUSIC_DURATION_SECONDS.start(),
                MUSIC_DURATION_SECONDS.end()
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRequest {
    pub prompt: String,
    pub style: ImageStyle,
    pub resolution: Resolution,
}

impl ImageRequest {
    pub fn new(prompt: impl Into<String>, style: ImageStyle, resolution: Resolution) -> Self {
        Self {
            prompt: prompt.into(),
            style,
            resolution,
        }
    }
}

impl Validate for ImageRequest {
    fn validate(&self) -> Result<(), StudioError> {
        require_prompt(&self.prompt)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryRequest {
    pub prompt: String,
    pub genre: StoryGenre,
    pub length: StoryLength,
}

impl StoryRequest {
    pub fn new(prompt: impl Into<String>, genre: StoryGenre, length: StoryLength) -> Self {
        Self {
            prompt: prompt.into(),
            genre,
            length,
        }
    }
}

impl Validate for StoryRequest {
    fn validate(&self) -> Result<(), StudioError> {
        require_prompt(&self.prompt)
    }
}

/// Text-to-speech request for a fulfilled story.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrationRequest {
    pub text: String,
    pub voice: Voice,
    pub speed: f32,
}

impl NarrationRequest {
    /// Build a request the way the speed slider does, clamping the speed.
    pub fn new(text: impl Into<String>, voice: Voice, speed: f32) -> Self {
        Self {
            text: text.into(),
            voice,
            speed: speed.clamp(*NARRATION_SPEED.start(), *NARRATION_SPEED.end()),
        }
    }
}

impl Validate for NarrationRequest {
    fn validate(&self) -> Result<(), StudioError> {
        if self.text.trim().is_empty() {
            return Err(StudioError::validation("text is required"));
        }
        if !self.speed.is_finite() || !NARRATION_SPEED.contains(&self.speed) {
            return Err(StudioError::validation(format!(
                "speed {} outside {}..={}",
                self.speed,
                NARRATION_SPEED.start(),
                NARRATION_SPEED.end()
            )));
        }
        Ok(())
    }
}

// --- Results ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MusicTrack {
    pub url: ArtifactRef,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub quality: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedImage {
    pub url: ArtifactRef,
    #[serde(default)]
    pub filename: Option<String>,
    /// Actual pixel size reported by the backend, e.g. "3840x2160".
    #[serde(default)]
    pub resolution: Option<String>,
    #[serde(default)]
    pub megapixels: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub word_count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrationAudio {
    pub url: ArtifactRef,
    #[serde(default)]
    pub filename: Option<String>,
    /// Length of the audio in seconds, when the backend reports it.
    #[serde(default)]
    pub duration: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_music_request_clamps_duration() {
        assert_eq!(MusicRequest::new("x", MusicGenre::Jazz, 5).duration_seconds, 10);
        assert_eq!(MusicRequest::new("x", MusicGenre::Jazz, 600).duration_seconds, 180);
        assert_eq!(MusicRequest::new("x", MusicGenre::Jazz, 45).duration_seconds, 45);
    }

    #[test]
    fn test_empty_prompt_rejected() {
        let request = ImageRequest::new("   ", ImageStyle::Anime, Resolution::Hd);
        let err = request.validate().unwrap_err();
        assert!(matches!(err, StudioError::Validation(_)));
    }

    #[test]
    fn test_unclamped_duration_rejected() {
        let request = MusicRequest {
            prompt: "drums".to_string(),
            genre: MusicGenre::Rock,
            duration_seconds: 181,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_narration_speed_validation() {
        assert!(NarrationRequest::new("once upon", Voice::Nova, 3.0).validate().is_ok());

        let nan = NarrationRequest {
            text: "once upon".to_string(),
            voice: Voice::Nova,
            speed: f32::NAN,
        };
        assert!(nan.validate().is_err());

        let empty = NarrationRequest::new("", Voice::Nova, 1.0);
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_music_request_wire_shape() {
        let request = MusicRequest::new("epic drums", MusicGenre::Orchestral, 30);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"prompt": "epic drums", "genre": "orchestral", "duration": 30})
        );
    }

    #[test]
    fn test_results_tolerate_missing_extras() {
        let track: MusicTrack = serde_json::from_str(r#"{"url": "https://x/a.wav"}"#).unwrap();
        assert_eq!(track.url.as_str(), "https://x/a.wav");
        assert!(track.filename.is_none());
    }

    #[test]
    fn test_artifact_file_name() {
        let artifact = ArtifactRef::new("http://localhost:5000/api/outputs/music/music_1.wav?v=2");
        assert_eq!(artifact.file_name(), Some("music_1.wav"));
        assert_eq!(ArtifactRef::new("http://host/").file_name(), None);
    }
}
