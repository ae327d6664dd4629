//! Bootstrap configuration - seeds the input surface, then the user owns it.
//!
//! Values are kept as plain strings and numbers so this crate does not need to
//! know the studio's domain enums. The studio parses them at startup.

use serde::{Deserialize, Serialize};

/// Form defaults for each generation domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Default music genre.
    #[serde(default = "DefaultsConfig::default_music_genre")]
    pub music_genre: String,

    /// Default track length in seconds.
    #[serde(default = "DefaultsConfig::default_music_duration")]
    pub music_duration: u32,

    /// Default image style.
    #[serde(default = "DefaultsConfig::default_image_style")]
    pub image_style: String,

    /// Default image resolution (hd, 2k, 4k, 8k).
    #[serde(default = "DefaultsConfig::default_image_resolution")]
    pub image_resolution: String,

    /// Default story genre.
    #[serde(default = "DefaultsConfig::default_story_genre")]
    pub story_genre: String,

    /// Default story length (flash, short, medium, long).
    #[serde(default = "DefaultsConfig::default_story_length")]
    pub story_length: String,

    /// Default narrator voice.
    #[serde(default = "DefaultsConfig::default_voice")]
    pub voice: String,

    /// Default narration speed multiplier.
    #[serde(default = "DefaultsConfig::default_speed")]
    pub speed: f32,
}

impl DefaultsConfig {
    fn default_music_genre() -> String {
        "electronic".to_string()
    }

    fn default_music_duration() -> u32 {
        30
    }

    fn default_image_style() -> String {
        "photorealistic".to_string()
    }

    fn default_image_resolution() -> String {
        "4k".to_string()
    }

    fn default_story_genre() -> String {
        "sci-fi".to_string()
    }

    fn default_story_length() -> String {
        "short".to_string()
    }

    fn default_voice() -> String {
        "alloy".to_string()
    }

    fn default_speed() -> f32 {
        1.0
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            music_genre: Self::default_music_genre(),
            music_duration: Self::default_music_duration(),
            image_style: Self::default_image_style(),
            image_resolution: Self::default_image_resolution(),
            story_genre: Self::default_story_genre(),
            story_length: Self::default_story_length(),
            voice: Self::default_voice(),
            speed: Self::default_speed(),
        }
    }
}

/// Bootstrap configuration - initial values for the input surface.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BootstrapConfig {
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_studio_forms() {
        let defaults = DefaultsConfig::default();
        assert_eq!(defaults.music_genre, "electronic");
        assert_eq!(defaults.music_duration, 30);
        assert_eq!(defaults.image_resolution, "4k");
        assert_eq!(defaults.story_length, "short");
        assert_eq!(defaults.voice, "alloy");
        assert_eq!(defaults.speed, 1.0);
    }
}
