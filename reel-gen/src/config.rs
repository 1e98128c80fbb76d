//! Configuration resolution for reel-gen
//!
//! Resolves a [`GeneratorConfig`] once at startup from the TOML bootstrap
//! file, environment variables and command-line overrides. The result is
//! immutable and handed explicitly to every stage; nothing reads ambient
//! environment state after startup.

use crate::pipeline::StageTiming;
use crate::services::elevenlabs_client::ELEVENLABS_BASE_URL;
use crate::services::kling_client::KLING_BASE_URL;
use crate::services::PollPolicy;
use reel_common::config::{resolve_credential, ProviderSection, TomlConfig, DEFAULT_PORT};
use reel_common::{Error, Result};
use std::time::Duration;

pub const ELEVENLABS_API_KEY_ENV: &str = "ELEVENLABS_API_KEY";
pub const KLING_API_KEY_ENV: &str = "KLING_API_KEY";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Remote provider settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// `None` puts the provider's stage in placeholder mode
    pub api_key: Option<String>,
    pub base_url: String,
    pub request_timeout: Duration,
}

impl ProviderConfig {
    fn unconfigured(base_url: &str) -> Self {
        Self {
            api_key: None,
            base_url: base_url.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    fn resolve(label: &str, env_var: &str, section: &ProviderSection, default_base_url: &str) -> Self {
        Self {
            api_key: resolve_credential(label, env_var, section.api_key.as_deref()),
            base_url: section
                .base_url
                .clone()
                .unwrap_or_else(|| default_base_url.to_string()),
            request_timeout: section
                .request_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub host: String,
    pub port: u16,
    pub elevenlabs: ProviderConfig,
    pub kling: ProviderConfig,
    pub poll_policy: PollPolicy,
    pub timing: StageTiming,
    pub caption_pass_through: bool,
}

impl Default for GeneratorConfig {
    /// Built-in defaults, no credentials
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            elevenlabs: ProviderConfig::unconfigured(ELEVENLABS_BASE_URL),
            kling: ProviderConfig::unconfigured(KLING_BASE_URL),
            poll_policy: PollPolicy::default(),
            timing: StageTiming::default(),
            caption_pass_through: false,
        }
    }
}

impl GeneratorConfig {
    /// Resolve from TOML plus environment
    ///
    /// Credentials: ENV (`ELEVENLABS_API_KEY`, `KLING_API_KEY`) → TOML.
    pub fn resolve(toml: &TomlConfig) -> Result<Self> {
        let defaults = Self::default();

        let poll_policy = PollPolicy {
            max_attempts: toml
                .polling
                .max_attempts
                .unwrap_or(defaults.poll_policy.max_attempts),
            interval: toml
                .polling
                .interval_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.poll_policy.interval),
        };
        if poll_policy.max_attempts == 0 {
            return Err(Error::Config(
                "polling.max_attempts must be at least 1".to_string(),
            ));
        }

        let mut timing = defaults.timing.clone();
        if let Some(pacing_ms) = &toml.pipeline.pacing_ms {
            let pacing: [u64; 6] = pacing_ms.as_slice().try_into().map_err(|_| {
                Error::Config(format!(
                    "pipeline.pacing_ms needs exactly 6 entries (one per step), got {}",
                    pacing_ms.len()
                ))
            })?;
            timing.pacing = pacing.map(Duration::from_millis);
        }
        if let Some(ms) = toml.pipeline.lip_sync_delay_ms {
            timing.lip_sync_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = toml.pipeline.caption_delay_ms {
            timing.caption_delay = Duration::from_millis(ms);
        }

        Ok(Self {
            host: toml.host.clone().unwrap_or(defaults.host),
            port: toml.port.unwrap_or(defaults.port),
            elevenlabs: ProviderConfig::resolve(
                "ElevenLabs",
                ELEVENLABS_API_KEY_ENV,
                &toml.elevenlabs,
                ELEVENLABS_BASE_URL,
            ),
            kling: ProviderConfig::resolve("Kling", KLING_API_KEY_ENV, &toml.kling, KLING_BASE_URL),
            poll_policy,
            timing,
            caption_pass_through: toml.pipeline.caption_pass_through.unwrap_or(false),
        })
    }

    /// Defaults with every delay removed and no credentials
    pub fn offline_immediate() -> Self {
        Self {
            poll_policy: PollPolicy {
                max_attempts: PollPolicy::default().max_attempts,
                interval: Duration::ZERO,
            },
            timing: StageTiming::immediate(),
            ..Self::default()
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
