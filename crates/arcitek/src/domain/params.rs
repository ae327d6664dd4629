//! Closed vocabularies offered by the studio forms.
//!
//! Every enum round-trips through its wire name (`"sci-fi"`, `"3d-render"`,
//! `"2k"`), which is what the generation service expects in request bodies.

use crate::error::StudioError;
use serde::{Deserialize, Serialize};

/// Declares a wire-named enum with `ALL`, `as_str`, `label`, `Display` and `FromStr`.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $what:literal {
            $($(#[$vmeta:meta])* $variant:ident => $wire:literal, $label:literal;)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $wire)] $variant,)+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Name used on the wire and on the command line.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }

            /// Human-readable label.
            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = StudioError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let needle = s.trim().to_ascii_lowercase();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == needle)
                    .ok_or_else(|| {
                        let expected: Vec<&str> = Self::ALL.iter().map(|v| v.as_str()).collect();
                        StudioError::validation(format!(
                            "unknown {} '{}', expected one of: {}",
                            $what,
                            s,
                            expected.join(", ")
                        ))
                    })
            }
        }
    };
}

wire_enum! {
    /// The three content domains. Exactly one is active in the studio at a time.
    DomainKind, "domain" {
        Music => "music", "Music Studio";
        Image => "image", "Image Lab";
        Story => "story", "Story Writer";
    }
}

impl Default for DomainKind {
    fn default() -> Self {
        DomainKind::Music
    }
}

wire_enum! {
    MusicGenre, "music genre" {
        Electronic => "electronic", "Electronic";
        Orchestral => "orchestral", "Orchestral";
        Jazz => "jazz", "Jazz";
        Rock => "rock", "Rock";
        HipHop => "hiphop", "Hip Hop";
        Ambient => "ambient", "Ambient";
        Classical => "classical", "Classical";
        Reggae => "reggae", "Reggae";
    }
}

wire_enum! {
    ImageStyle, "image style" {
        Photorealistic => "photorealistic", "Photorealistic";
        Artistic => "artistic", "Artistic";
        ConceptArt => "concept-art", "Concept Art";
        Anime => "anime", "Anime";
        Render3d => "3d-render", "3D Render";
        OilPainting => "oil-painting", "Oil Painting";
        Cyberpunk => "cyberpunk", "Cyberpunk";
        Fantasy => "fantasy", "Fantasy";
    }
}

wire_enum! {
    Resolution, "resolution" {
        Hd => "hd", "HD (1920x1080)";
        TwoK => "2k", "2K (2560x1440)";
        FourK => "4k", "4K (3840x2160)";
        EightK => "8k", "8K (7680x4320)";
    }
}

impl Resolution {
    /// Pixel dimensions as (width, height).
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Resolution::Hd => (1920, 1080),
            Resolution::TwoK => (2560, 1440),
            Resolution::FourK => (3840, 2160),
            Resolution::EightK => (7680, 4320),
        }
    }
}

wire_enum! {
    StoryGenre, "story genre" {
        SciFi => "sci-fi", "Science Fiction";
        Fantasy => "fantasy", "Fantasy";
        Mystery => "mystery", "Mystery";
        Thriller => "thriller", "Thriller";
        Romance => "romance", "Romance";
        Horror => "horror", "Horror";
        Adventure => "adventure", "Adventure";
        Literary => "literary", "Literary Fiction";
    }
}

wire_enum! {
    StoryLength, "story length" {
        Flash => "flash", "Flash Fiction";
        Short => "short", "Short Story";
        Medium => "medium", "Novelette";
        Long => "long", "Novella";
    }
}

impl StoryLength {
    /// Approximate word count the backend aims for.
    pub fn target_words(&self) -> u32 {
        match self {
            StoryLength::Flash => 500,
            StoryLength::Short => 2_000,
            StoryLength::Medium => 10_000,
            StoryLength::Long => 25_000,
        }
    }
}

wire_enum! {
    /// Narrator voices offered by the text-to-speech backend.
    Voice, "voice" {
        Alloy => "alloy", "Alloy (Neutral)";
        Echo => "echo", "Echo (Male)";
        Fable => "fable", "Fable (British Male)";
        Onyx => "onyx", "Onyx (Deep Male)";
        Nova => "nova", "Nova (Female)";
        Shimmer => "shimmer", "Shimmer (Soft Female)";
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_vocabulary_sizes() {
        assert_eq!(MusicGenre::ALL.len(), 8);
        assert_eq!(ImageStyle::ALL.len(), 8);
        assert_eq!(StoryGenre::ALL.len(), 8);
        assert_eq!(Resolution::ALL.len(), 4);
        assert_eq!(StoryLength::ALL.len(), 4);
        assert_eq!(Voice::ALL.len(), 6);
    }

    #[test]
    fn test_parse_wire_names() {
        assert_eq!(ImageStyle::from_str("3d-render").unwrap(), ImageStyle::Render3d);
        assert_eq!(StoryGenre::from_str(" Sci-Fi ").unwrap(), StoryGenre::SciFi);
        assert_eq!(Resolution::from_str("2K").unwrap(), Resolution::TwoK);
        assert_eq!(MusicGenre::from_str("hiphop").unwrap(), MusicGenre::HipHop);
    }

    #[test]
    fn test_parse_unknown_lists_choices() {
        let err = Voice::from_str("robot").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("unknown voice 'robot'"));
        assert!(message.contains("shimmer"));
    }

    #[test]
    fn test_serde_uses_wire_names() {
        let json = serde_json::to_string(&ImageStyle::OilPainting).unwrap();
        assert_eq!(json, "\"oil-painting\"");
        let style: ImageStyle = serde_json::from_str("\"concept-art\"").unwrap();
        assert_eq!(style, ImageStyle::ConceptArt);
    }

    #[test]
    fn test_resolution_dimensions() {
        assert_eq!(Resolution::EightK.dimensions(), (7680, 4320));
        assert_eq!(StoryLength::Medium.target_words(), 10_000);
    }
}
