//! Export descriptors and a directory-backed exporter.
//!
//! The studio itself only names what to save and under which filename. How
//! it is saved belongs to the caller; [`DirectoryExporter`] is the one the
//! CLI uses.

use crate::domain::{ArtifactRef, GeneratedImage, MusicTrack, NarrationAudio, Story};
use crate::error::StudioError;
use crate::service::GenerationService;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

pub const MUSIC_FILENAME: &str = "arcitekAI-music.wav";
pub const IMAGE_FILENAME: &str = "arcitekAI-image.png";
pub const NARRATION_FILENAME: &str = "arcitekAI-narration.mp3";

const UNTITLED: &str = "untitled";

#[derive(Debug, Clone, PartialEq)]
pub enum ExportSource {
    /// Remote artifact to be fetched.
    Artifact(ArtifactRef),
    /// Inline content.
    Text(String),
}

/// A `(source, suggested filename)` pair handed to whatever saves files.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportItem {
    pub source: ExportSource,
    pub suggested_filename: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoryFormat {
    Txt,
    Pdf,
}

impl ExportItem {
    pub fn music(track: &MusicTrack) -> Self {
        Self::artifact(&track.url, MUSIC_FILENAME)
    }

    pub fn image(image: &GeneratedImage) -> Self {
        Self::artifact(&image.url, IMAGE_FILENAME)
    }

    pub fn narration(audio: &NarrationAudio) -> Self {
        Self::artifact(&audio.url, NARRATION_FILENAME)
    }

    pub fn story(story: &Story, format: StoryFormat) -> Result<Self, StudioError> {
        match format {
            StoryFormat::Txt => Ok(Self {
                source: ExportSource::Text(story.content.clone()),
                suggested_filename: format!("{}.txt", sanitize_filename(&story.title)),
            }),
            StoryFormat::Pdf => Err(StudioError::Unsupported(
                "PDF export is not available".to_string(),
            )),
        }
    }

    fn artifact(url: &ArtifactRef, filename: &str) -> Self {
        Self {
            source: ExportSource::Artifact(url.clone()),
            suggested_filename: filename.to_string(),
        }
    }
}

/// Make a story title safe to use as a file name on any platform.
pub fn sanitize_filename(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let trimmed = cleaned.trim().trim_matches('.');
    if trimmed.is_empty() {
        UNTITLED.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Saves export items into a directory, never overwriting existing files.
pub struct DirectoryExporter {
    dir: PathBuf,
    service: Arc<dyn GenerationService>,
}

impl DirectoryExporter {
    pub fn new(dir: impl Into<PathBuf>, service: Arc<dyn GenerationService>) -> Self {
        Self {
            dir: dir.into(),
            service,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `item` and return the path it landed at.
    pub async fn save(&self, item: &ExportItem) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create output dir {}", self.dir.display()))?;

        let bytes = match &item.source {
            ExportSource::Artifact(url) => self
                .service
                .fetch_artifact(url.as_str())
                .await
                .with_context(|| format!("Failed to fetch {}", url))?
                .to_vec(),
            ExportSource::Text(text) => text.clone().into_bytes(),
        };

        let path = unique_path(&self.dir, &item.suggested_filename).await;
        tokio::fs::write(&path, &bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;

        info!(path = %path.display(), bytes = bytes.len(), "export saved");
        Ok(path)
    }
}

/// `name`, or `name-1`, `name-2`, ... keeping the extension.
async fn unique_path(dir: &Path, filename: &str) -> PathBuf {
    let candidate = dir.join(filename);
    if !tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
        return candidate;
    }

    let (stem, ext) = match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (filename, None),
    };

    let mut n = 1u32;
    loop {
        let name = match ext {
            Some(ext) => format!("{}-{}.{}", stem, n, ext),
            None => format!("{}-{}", stem, n),
        };
        let candidate = dir.join(name);
        if !tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
            return candidate;
        }
        n += 1;
    }
}
