//! Bootstrap configuration loading
//!
//! Settings sources, highest priority first:
//! 1. Command-line arguments (handled by the binary)
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Built-in defaults (code constants)
//!
//! Every TOML field is optional; a missing file is the same as an empty one.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default HTTP port for the generator service
pub const DEFAULT_PORT: u16 = 5730;

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TomlConfig {
    /// Bind address for the HTTP server
    #[serde(default)]
    pub host: Option<String>,

    /// HTTP server port
    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Text-to-speech provider (ElevenLabs)
    #[serde(default)]
    pub elevenlabs: ProviderSection,

    /// Text-to-video provider (Kling AI)
    #[serde(default)]
    pub kling: ProviderSection,

    #[serde(default)]
    pub polling: PollingSection,

    #[serde(default)]
    pub pipeline: PipelineSection,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Credentials and endpoint for one remote provider
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProviderSection {
    #[serde(default)]
    pub api_key: Option<String>,

    /// Override for the provider's API root (e.g. a local stand-in)
    #[serde(default)]
    pub base_url: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

/// Video status polling budget
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PollingSection {
    #[serde(default)]
    pub max_attempts: Option<u32>,

    #[serde(default)]
    pub interval_ms: Option<u64>,
}

/// Stage delays and stub behaviour
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PipelineSection {
    /// Pause after each step, in step order (script, voice, video, lip-sync,
    /// captions, finalize)
    #[serde(default)]
    pub pacing_ms: Option<Vec<u64>>,

    #[serde(default)]
    pub lip_sync_delay_ms: Option<u64>,

    #[serde(default)]
    pub caption_delay_ms: Option<u64>,

    /// Return the incoming video from the caption stage instead of the demo URL
    #[serde(default)]
    pub caption_pass_through: Option<bool>,
}

/// Default configuration file path for the platform
///
/// `<config_dir>/reelgen/<module_name>.toml`, e.g.
/// `~/.config/reelgen/reel-gen.toml` on Linux.
pub fn default_config_path(module_name: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("reelgen").join(format!("{}.toml", module_name)))
}

/// Load TOML configuration from `path`
///
/// A missing file yields the default (empty) configuration. A file that
/// exists but cannot be read or parsed is an error.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        debug!("Config file {} not found, using defaults", path.display());
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed ({}): {}", path.display(), e)))?;

    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))?;

    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Resolve an optional credential
///
/// **Priority:** ENV → TOML. Blank values count as absent. Absence is not
/// an error; callers degrade to placeholder output.
pub fn resolve_credential(
    label: &str,
    env_var_name: &str,
    toml_value: Option<&str>,
) -> Option<String> {
    let env_key = std::env::var(env_var_name).ok().filter(|k| is_valid_key(k));
    let toml_key = toml_value.filter(|k| is_valid_key(k));

    if env_key.is_some() && toml_key.is_some() {
        warn!(
            "{} API key found in both environment and TOML. Using environment ({}).",
            label, env_var_name
        );
    }

    if let Some(key) = env_key {
        info!("{} API key loaded from environment variable", label);
        return Some(key.trim().to_string());
    }

    if let Some(key) = toml_key {
        info!("{} API key loaded from TOML config", label);
        return Some(key.trim().to_string());
    }

    info!("{} API key not configured, placeholder output will be used", label);
    None
}
