//! Infrastructure configuration - things that cannot change at runtime.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Filesystem paths for studio state and exported files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Base directory for runtime state.
    /// Default: ~/.local/share/arcitek
    #[serde(default = "PathsConfig::default_state_dir")]
    pub state_dir: PathBuf,

    /// Where exported artifacts and story text are written.
    /// Default: ~/.local/share/arcitek/outputs
    #[serde(default = "PathsConfig::default_output_dir")]
    pub output_dir: PathBuf,
}

impl PathsConfig {
    fn default_state_dir() -> PathBuf {
        directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(".local/share/arcitek"))
            .unwrap_or_else(|| PathBuf::from(".local/share/arcitek"))
    }

    fn default_output_dir() -> PathBuf {
        Self::default_state_dir().join("outputs")
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            state_dir: Self::default_state_dir(),
            output_dir: Self::default_output_dir(),
        }
    }
}

/// Remote generation service endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the generation backend.
    /// Default: http://localhost:5000
    #[serde(default = "ServiceConfig::default_base_url")]
    pub base_url: String,

    /// Per-request timeout in milliseconds. Requests are attempted once.
    /// Generation of long stories or 8k images is slow, so this is generous.
    /// Default: 300000 (5 minutes)
    #[serde(default = "ServiceConfig::default_timeout_ms")]
    pub timeout_ms: u64,
}

impl ServiceConfig {
    fn default_base_url() -> String {
        "http://localhost:5000".to_string()
    }

    fn default_timeout_ms() -> u64 {
        300_000
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            timeout_ms: Self::default_timeout_ms(),
        }
    }
}

/// Telemetry and observability configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// OTLP gRPC endpoint for OpenTelemetry.
    /// Empty disables OTLP export and logs to the console only.
    /// Default: ""
    #[serde(default)]
    pub otlp_endpoint: String,

    /// Log level (trace, debug, info, warn, error) or a full EnvFilter directive.
    /// Default: info
    #[serde(default = "TelemetryConfig::default_log_level")]
    pub log_level: String,
}

impl TelemetryConfig {
    fn default_log_level() -> String {
        "info".to_string()
    }

    /// True when traces and logs should be exported over OTLP.
    pub fn otlp_enabled(&self) -> bool {
        !self.otlp_endpoint.trim().is_empty()
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            otlp_endpoint: String::new(),
            log_level: Self::default_log_level(),
        }
    }
}

/// Infrastructure configuration - cannot change at runtime.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InfraConfig {
    /// Filesystem paths.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Generation backend.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Telemetry settings.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}
