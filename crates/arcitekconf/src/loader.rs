//! Config file discovery, loading, and environment variable overlay.

use crate::bootstrap::DefaultsConfig;
use crate::infra::{PathsConfig, ServiceConfig, TelemetryConfig};
use crate::{ArcitekConfig, BootstrapConfig, ConfigError, InfraConfig};
use std::env;
use std::path::{Path, PathBuf};

/// Information about where config values came from.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Config files that were loaded (in order)
    pub files: Vec<PathBuf>,
    /// Environment variables that overrode config values
    pub env_overrides: Vec<String>,
}

/// Discover config files in standard locations.
///
/// Returns paths in load order (system, user, local).
/// Only returns files that exist.
pub fn discover_config_files() -> Vec<PathBuf> {
    discover_config_files_with_override(None)
}

/// Discover config files, optionally with a CLI override path.
///
/// If `cli_path` is provided and exists, it replaces the local override.
pub fn discover_config_files_with_override(cli_path: Option<&Path>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let system = PathBuf::from("/etc/arcitek/config.toml");
    if system.exists() {
        files.push(system);
    }

    // User config (XDG_CONFIG_HOME or ~/.config)
    if let Some(config_dir) = directories::BaseDirs::new().map(|d| d.config_dir().to_path_buf()) {
        let user = config_dir.join("arcitek/config.toml");
        if user.exists() {
            files.push(user);
        }
    }

    if let Some(path) = cli_path {
        if path.exists() {
            files.push(path.to_path_buf());
            return files;
        }
    }

    let local = PathBuf::from("arcitek.toml");
    if local.exists() {
        files.push(local);
    }

    files
}

/// Load config from a TOML file.
pub fn load_from_file(path: &Path) -> Result<ArcitekConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_toml(&contents, path)
}

/// Parse config from a TOML string. Missing keys take compiled defaults.
pub(crate) fn parse_toml(contents: &str, path: &Path) -> Result<ArcitekConfig, ConfigError> {
    let mut config: ArcitekConfig =
        toml::from_str(contents).map_err(|e: toml::de::Error| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    config.infra.paths.state_dir = expand_path(&config.infra.paths.state_dir.to_string_lossy());
    config.infra.paths.output_dir = expand_path(&config.infra.paths.output_dir.to_string_lossy());

    Ok(config)
}

/// Keep `overlay` when it differs from the compiled default, else keep `base`.
fn pick<T: PartialEq>(base: T, overlay: T, default: &T) -> T {
    if &overlay != default {
        overlay
    } else {
        base
    }
}

/// Merge two configs, with `overlay` taking precedence field by field.
///
/// A field in `overlay` only wins if it differs from the compiled default, so a
/// later file that omits a key does not reset what an earlier file set.
pub fn merge_configs(base: ArcitekConfig, overlay: ArcitekConfig) -> ArcitekConfig {
    let paths = PathsConfig::default();
    let service = ServiceConfig::default();
    let telemetry = TelemetryConfig::default();
    let defaults = DefaultsConfig::default();

    let b = base.infra;
    let o = overlay.infra;
    let bd = base.bootstrap.defaults;
    let od = overlay.bootstrap.defaults;

    ArcitekConfig {
        infra: InfraConfig {
            paths: PathsConfig {
                state_dir: pick(b.paths.state_dir, o.paths.state_dir, &paths.state_dir),
                output_dir: pick(b.paths.output_dir, o.paths.output_dir, &paths.output_dir),
            },
            service: ServiceConfig {
                base_url: pick(b.service.base_url, o.service.base_url, &service.base_url),
                timeout_ms: pick(b.service.timeout_ms, o.service.timeout_ms, &service.timeout_ms),
            },
            telemetry: TelemetryConfig {
                otlp_endpoint: pick(
                    b.telemetry.otlp_endpoint,
                    o.telemetry.otlp_endpoint,
                    &telemetry.otlp_endpoint,
                ),
                log_level: pick(b.telemetry.log_level, o.telemetry.log_level, &telemetry.log_level),
            },
        },
        bootstrap: BootstrapConfig {
            defaults: DefaultsConfig {
                music_genre: pick(bd.music_genre, od.music_genre, &defaults.music_genre),
                music_duration: pick(bd.music_duration, od.music_duration, &defaults.music_duration),
                image_style: pick(bd.image_style, od.image_style, &defaults.image_style),
                image_resolution: pick(
                    bd.image_resolution,
                    od.image_resolution,
                    &defaults.image_resolution,
                ),
                story_genre: pick(bd.story_genre, od.story_genre, &defaults.story_genre),
                story_length: pick(bd.story_length, od.story_length, &defaults.story_length),
                voice: pick(bd.voice, od.voice, &defaults.voice),
                speed: pick(bd.speed, od.speed, &defaults.speed),
            },
        },
    }
}

/// Apply environment variable overrides to config.
pub fn apply_env_overrides(config: &mut ArcitekConfig, sources: &mut ConfigSources) {
    apply_overrides_from(config, sources, |key| env::var(key).ok());
}

/// Apply overrides from an arbitrary variable lookup.
///
/// Split out from [`apply_env_overrides`] so tests do not have to mutate the
/// process environment.
pub fn apply_overrides_from<F>(config: &mut ArcitekConfig, sources: &mut ConfigSources, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let take = |key: &str, sources: &mut ConfigSources| {
        let value = lookup(key);
        if value.is_some() {
            sources.env_overrides.push(key.to_string());
        }
        value
    };

    if let Some(v) = take("ARCITEK_STATE_DIR", sources) {
        config.infra.paths.state_dir = expand_path(&v);
    }
    if let Some(v) = take("ARCITEK_OUTPUT_DIR", sources) {
        config.infra.paths.output_dir = expand_path(&v);
    }

    if let Some(v) = take("ARCITEK_SERVICE_URL", sources) {
        config.infra.service.base_url = v;
    }
    if let Some(v) = lookup("ARCITEK_TIMEOUT_MS") {
        if let Ok(ms) = v.parse() {
            config.infra.service.timeout_ms = ms;
            sources.env_overrides.push("ARCITEK_TIMEOUT_MS".to_string());
        }
    }

    if let Some(v) = take("ARCITEK_OTLP_ENDPOINT", sources) {
        config.infra.telemetry.otlp_endpoint = v;
    }
    // Also support standard OTEL env var
    if let Some(v) = take("OTEL_EXPORTER_OTLP_ENDPOINT", sources) {
        config.infra.telemetry.otlp_endpoint = v;
    }
    if let Some(v) = take("ARCITEK_LOG_LEVEL", sources) {
        config.infra.telemetry.log_level = v;
    }
    if let Some(v) = take("RUST_LOG", sources) {
        config.infra.telemetry.log_level = v;
    }
}

/// Expand ~ and environment variables in a path.
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf()) {
            home.join(stripped)
        } else {
            PathBuf::from(path)
        }
    } else if let Some(stripped) = path.strip_prefix('$') {
        // Handle $VAR/rest/of/path
        if let Some(slash_pos) = stripped.find('/') {
            let var_name = &stripped[..slash_pos];
            if let Ok(var_value) = env::var(var_name) {
                PathBuf::from(var_value).join(&stripped[slash_pos + 1..])
            } else {
                PathBuf::from(path)
            }
        } else {
            env::var(stripped)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(path))
        }
    } else {
        PathBuf::from(path)
    }
}
