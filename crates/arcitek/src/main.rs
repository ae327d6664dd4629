//! arcitek - command line front end for the ArciTEK studio
//!
//! Subcommands:
//! - `arcitek music --prompt <text>` - Generate a music track
//! - `arcitek image --prompt <text>` - Generate an image
//! - `arcitek story --prompt <text> [--narrate]` - Write a story, optionally narrated
//! - `arcitek health` - Check the generation service
//! - `arcitek config` - Print the effective configuration

use anyhow::{bail, Context, Result};
use arcitek::domain::{
    DomainKind, GenerationDomain, ImageRequest, ImageStyle, MusicGenre, MusicRequest, Resolution,
    StoryGenre, StoryLength, StoryRequest, Voice,
};
use arcitek::export::{DirectoryExporter, ExportItem, StoryFormat};
use arcitek::{
    telemetry, GenerationService, HttpGenerationService, StudioCoordinator, SubmitOutcome,
};
use arcitekconf::{ArcitekConfig, DefaultsConfig};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::future::Future;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "arcitek")]
#[command(about = "Generate music, images and narrated stories with ArciTEK")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./arcitek.toml when present)
    #[arg(long, global = true, env = "ARCITEK_CONFIG")]
    config: Option<PathBuf>,

    /// Generation service base URL, overriding config
    #[arg(long, global = true)]
    service_url: Option<String>,

    /// Save results into the configured output directory
    #[arg(long, global = true)]
    save: bool,

    /// Print the studio snapshot as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a music track
    Music {
        /// What the track should sound like
        #[arg(short, long)]
        prompt: String,

        #[arg(short, long)]
        genre: Option<MusicGenre>,

        /// Length in seconds (10-180)
        #[arg(short, long)]
        duration: Option<u32>,
    },

    /// Generate an image
    Image {
        /// What the image should show
        #[arg(short, long)]
        prompt: String,

        #[arg(short, long)]
        style: Option<ImageStyle>,

        /// hd, 2k, 4k or 8k
        #[arg(short, long)]
        resolution: Option<Resolution>,
    },

    /// Write a story
    Story {
        /// Premise of the story
        #[arg(short, long)]
        prompt: String,

        #[arg(short, long)]
        genre: Option<StoryGenre>,

        /// flash, short, medium or long
        #[arg(short, long)]
        length: Option<StoryLength>,

        /// Narrate the story once it is written
        #[arg(long)]
        narrate: bool,

        #[arg(long)]
        voice: Option<Voice>,

        /// Narration speed (0.5-2.0)
        #[arg(long)]
        speed: Option<f32>,
    },

    /// Check that the generation service is reachable
    Health,

    /// Print the effective configuration as TOML
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (mut config, sources) = ArcitekConfig::load_with_sources_from(cli.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(url) = &cli.service_url {
        config.infra.service.base_url = url.clone();
    }

    if let Commands::Config = cli.command {
        for file in &sources.files {
            println!("# loaded: {}", file.display());
        }
        for var in &sources.env_overrides {
            println!("# env: {}", var);
        }
        print!("{}", config.to_toml());
        return Ok(());
    }

    let _telemetry =
        telemetry::init(&config.infra.telemetry).context("Failed to initialize telemetry")?;

    let service = Arc::new(
        HttpGenerationService::from_config(&config.infra.service)
            .context("Failed to create generation service client")?,
    );
    let studio = Arc::new(StudioCoordinator::new(service.clone()));

    let shutdown = Arc::clone(&studio);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            shutdown.shutdown();
        }
    });

    let invocation = Invocation {
        studio: Arc::clone(&studio),
        exporter: DirectoryExporter::new(&config.infra.paths.output_dir, service.clone()),
        defaults: &config.bootstrap.defaults,
        save: cli.save,
        quiet: cli.json,
    };

    let result = match cli.command {
        Commands::Music {
            prompt,
            genre,
            duration,
        } => invocation.music(prompt, genre, duration).await,
        Commands::Image {
            prompt,
            style,
            resolution,
        } => invocation.image(prompt, style, resolution).await,
        Commands::Story {
            prompt,
            genre,
            length,
            narrate,
            voice,
            speed,
        } => {
            invocation
                .story(prompt, genre, length, narrate.then_some((voice, speed)))
                .await
        }
        Commands::Health => health(service.as_ref(), cli.json).await,
        Commands::Config => Ok(()),
    };

    if cli.json {
        let snapshot = serde_json::to_string_pretty(&studio.snapshot())?;
        println!("{}", snapshot);
    }

    result
}

/// One CLI invocation against the studio.
struct Invocation<'a> {
    studio: Arc<StudioCoordinator>,
    exporter: DirectoryExporter,
    defaults: &'a DefaultsConfig,
    save: bool,
    quiet: bool,
}

impl Invocation<'_> {
    async fn music(
        &self,
        prompt: String,
        genre: Option<MusicGenre>,
        duration: Option<u32>,
    ) -> Result<()> {
        let genre = or_default(genre, &self.defaults.music_genre, "music_genre")?;
        let duration = duration.unwrap_or(self.defaults.music_duration);

        self.studio.select_domain(DomainKind::Music);
        let request = MusicRequest::new(prompt, genre, duration);
        let outcome = self
            .spin("Composing", self.studio.submit_music(request))
            .await?;
        let track = fulfilled(outcome)?;

        self.say(format!("{} {}", "Track:".bright_green(), track.url));
        if let (Some(format), Some(quality)) = (&track.format, &track.quality) {
            self.say(format!("       {} {}", format, quality.dimmed()));
        }
        self.export(ExportItem::music(&track)).await
    }

    async fn image(
        &self,
        prompt: String,
        style: Option<ImageStyle>,
        resolution: Option<Resolution>,
    ) -> Result<()> {
        let style = or_default(style, &self.defaults.image_style, "image_style")?;
        let resolution =
            or_default(resolution, &self.defaults.image_resolution, "image_resolution")?;

        self.studio.select_domain(DomainKind::Image);
        let request = ImageRequest::new(prompt, style, resolution);
        let outcome = self
            .spin("Painting", self.studio.submit_image(request))
            .await?;
        let image = fulfilled(outcome)?;

        self.say(format!("{} {}", "Image:".bright_green(), image.url));
        if let Some(size) = &image.resolution {
            self.say(format!("       {}", size.dimmed()));
        }
        self.export(ExportItem::image(&image)).await
    }

    async fn story(
        &self,
        prompt: String,
        genre: Option<StoryGenre>,
        length: Option<StoryLength>,
        narrate: Option<(Option<Voice>, Option<f32>)>,
    ) -> Result<()> {
        let genre = or_default(genre, &self.defaults.story_genre, "story_genre")?;
        let length = or_default(length, &self.defaults.story_length, "story_length")?;

        self.studio.select_domain(DomainKind::Story);
        let request = StoryRequest::new(prompt, genre, length);
        let outcome = self
            .spin("Writing", self.studio.submit_story(request))
            .await?;
        let story = fulfilled(outcome)?;

        self.say(format!("{}\n", story.title.bold()));
        self.say(story.content.clone());
        if let Some(words) = story.word_count {
            self.say(format!("\n{}", format!("{} words", words).dimmed()));
        }
        self.export(ExportItem::story(&story, StoryFormat::Txt)?)
            .await?;

        let Some((voice, speed)) = narrate else {
            return Ok(());
        };
        let voice = or_default(voice, &self.defaults.voice, "voice")?;
        let speed = speed.unwrap_or(self.defaults.speed);

        let narration = self.studio.narration()?;
        let outcome = self
            .spin("Narrating", narration.narrate_story(voice, speed))
            .await?;
        let audio = fulfilled(outcome)?;

        self.say(format!("{} {}", "Narration:".bright_green(), audio.url));
        self.export(ExportItem::narration(&audio)).await
    }

    async fn spin<F: Future>(&self, message: &'static str, fut: F) -> F::Output {
        if self.quiet {
            return fut.await;
        }

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg} {elapsed:.dim}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(message);
        spinner.enable_steady_tick(Duration::from_millis(80));
        let output = fut.await;
        spinner.finish_and_clear();
        output
    }

    fn say(&self, line: String) {
        if !self.quiet {
            println!("{}", line);
        }
    }

    async fn export(&self, item: ExportItem) -> Result<()> {
        if !self.save {
            return Ok(());
        }
        let path = self.exporter.save(&item).await?;
        self.say(format!("{} {}", "Saved".bright_cyan(), path.display()));
        Ok(())
    }
}

/// Flag value, or the configured default parsed from its wire name.
fn or_default<T: FromStr>(value: Option<T>, default: &str, key: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match value {
        Some(v) => Ok(v),
        None => T::from_str(default)
            .map_err(|e| anyhow::anyhow!("Invalid bootstrap.defaults.{}: {}", key, e)),
    }
}

fn fulfilled<D: GenerationDomain>(outcome: SubmitOutcome<D>) -> Result<D::Output> {
    match outcome {
        SubmitOutcome::Fulfilled(snapshot) => snapshot
            .result
            .with_context(|| format!("{} session fulfilled without a result", D::NAME)),
        SubmitOutcome::Failed(snapshot) => {
            let message = snapshot
                .error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown error".to_string());
            bail!("{} generation failed: {}", D::NAME, message)
        }
        other => bail!(
            "{} session ended as {}",
            D::NAME,
            other.snapshot().status
        ),
    }
}

async fn health(service: &dyn GenerationService, quiet: bool) -> Result<()> {
    let health = service.health().await?;
    if !quiet {
        let status = if health.is_healthy() {
            health.status.bright_green().to_string()
        } else {
            health.status.bright_red().to_string()
        };
        println!(
            "{} {} {}",
            status,
            health.service.as_deref().unwrap_or("generation service"),
            health.version.as_deref().unwrap_or_default().dimmed()
        );
    }
    if !health.is_healthy() {
        bail!("generation service reports '{}'", health.status);
    }
    Ok(())
}
