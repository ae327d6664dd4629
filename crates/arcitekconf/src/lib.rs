//! Minimal configuration loading for the ArciTEK studio.
//!
//! Configuration is split into two categories:
//!
//! - **Infrastructure** (`InfraConfig`): things that cannot change while the
//!   studio runs - paths, the generation service endpoint, telemetry.
//!
//! - **Bootstrap** (`BootstrapConfig`): initial values that seed the input
//!   surface (default genre, voice, ...). After startup the user owns them.
//!
//! # Usage
//!
//! ```rust,no_run
//! use arcitekconf::ArcitekConfig;
//!
//! let config = ArcitekConfig::load().expect("Failed to load config");
//! println!("Service: {}", config.infra.service.base_url);
//! println!("Default voice: {}", config.bootstrap.defaults.voice);
//! ```
//!
//! # Config File Locations
//!
//! Files are loaded in order (later wins):
//! 1. `/etc/arcitek/config.toml` (system)
//! 2. `~/.config/arcitek/config.toml` (user)
//! 3. `./arcitek.toml` (local override, or the path given on the command line)
//! 4. Environment variables (`ARCITEK_*`)
//!
//! # Example Config
//!
//! ```toml
//! [paths]
//! output_dir = "~/Music/arcitek"
//!
//! [service]
//! base_url = "http://localhost:5000"
//! timeout_ms = 300000
//!
//! [telemetry]
//! otlp_endpoint = "127.0.0.1:4317"
//! log_level = "info"
//!
//! [bootstrap.defaults]
//! music_genre = "orchestral"
//! voice = "fable"
//! speed = 1.2
//! ```

pub mod bootstrap;
pub mod infra;
pub mod loader;

pub use bootstrap::{BootstrapConfig, DefaultsConfig};
pub use infra::{InfraConfig, PathsConfig, ServiceConfig, TelemetryConfig};
pub use loader::{discover_config_files_with_override, ConfigSources};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Complete studio configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArcitekConfig {
    /// Infrastructure - cannot change at runtime.
    #[serde(flatten)]
    pub infra: InfraConfig,

    /// Bootstrap - seeds the input surface.
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
}

impl ArcitekConfig {
    /// Load configuration from all sources.
    pub fn load() -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(None)?;
        Ok(config)
    }

    /// Load configuration from a specific file path, then apply env overrides.
    ///
    /// If `config_path` is provided, it takes precedence over the local
    /// `./arcitek.toml` override. System and user configs still load first.
    pub fn load_from(config_path: Option<&std::path::Path>) -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(config_path)?;
        Ok(config)
    }

    /// Load configuration from optional path and return information about sources.
    pub fn load_with_sources_from(
        config_path: Option<&std::path::Path>,
    ) -> Result<(Self, ConfigSources), ConfigError> {
        let mut sources = ConfigSources::default();
        let mut config = ArcitekConfig::default();

        for path in loader::discover_config_files_with_override(config_path) {
            let file_config = loader::load_from_file(&path)?;
            config = loader::merge_configs(config, file_config);
            sources.files.push(path);
        }

        loader::apply_env_overrides(&mut config, &mut sources);

        Ok((config, sources))
    }

    /// Serialize config to TOML string.
    pub fn to_toml(&self) -> String {
        // Build TOML manually for nicer formatting
        let mut output = String::new();
        let paths = &self.infra.paths;
        let service = &self.infra.service;
        let telemetry = &self.infra.telemetry;
        let defaults = &self.bootstrap.defaults;

        output.push_str("# ArciTEK Studio Configuration\n\n");

        output.push_str("[paths]\n");
        push_str_key(&mut output, "state_dir", &paths.state_dir.to_string_lossy());
        push_str_key(&mut output, "output_dir", &paths.output_dir.to_string_lossy());

        output.push_str("\n[service]\n");
        push_str_key(&mut output, "base_url", &service.base_url);
        output.push_str(&format!("timeout_ms = {}\n", service.timeout_ms));

        output.push_str("\n[telemetry]\n");
        push_str_key(&mut output, "otlp_endpoint", &telemetry.otlp_endpoint);
        push_str_key(&mut output, "log_level", &telemetry.log_level);

        output.push_str("\n[bootstrap.defaults]\n");
        push_str_key(&mut output, "music_genre", &defaults.music_genre);
        output.push_str(&format!("music_duration = {}\n", defaults.music_duration));
        push_str_key(&mut output, "image_style", &defaults.image_style);
        push_str_key(&mut output, "image_resolution", &defaults.image_resolution);
        push_str_key(&mut output, "story_genre", &defaults.story_genre);
        push_str_key(&mut output, "story_length", &defaults.story_length);
        push_str_key(&mut output, "voice", &defaults.voice);
        output.push_str(&format!(
            "speed = {}\n",
            toml::Value::Float(f64::from(defaults.speed))
        ));

        output
    }
}

/// Append `key = "value"` with the value escaped as a TOML string.
fn push_str_key(output: &mut String, key: &str, value: &str) {
    output.push_str(&format!(
        "{} = {}\n",
        key,
        toml::Value::String(value.to_string())
    ));
}
