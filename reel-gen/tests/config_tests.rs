//! Service configuration resolution tests
//!
//! Environment-mutating tests run under #[serial] since both provider keys
//! are process-wide.

use reel_common::config::{load_toml_config, TomlConfig};
use reel_common::Error;
use reel_gen::config::{GeneratorConfig, ELEVENLABS_API_KEY_ENV, KLING_API_KEY_ENV};
use reel_gen::services::PollPolicy;
use serial_test::serial;
use std::env;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

fn toml_from(contents: &str) -> TomlConfig {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    load_toml_config(file.path()).unwrap()
}

fn clear_provider_env() {
    env::remove_var(ELEVENLABS_API_KEY_ENV);
    env::remove_var(KLING_API_KEY_ENV);
}

#[test]
#[serial]
fn test_empty_toml_resolves_to_defaults() {
    clear_provider_env();

    let config = GeneratorConfig::resolve(&TomlConfig::default()).unwrap();

    assert_eq!(config.bind_address(), "127.0.0.1:5730");
    assert_eq!(config.poll_policy, PollPolicy::default());
    assert_eq!(config.poll_policy.budget(), Duration::from_secs(60));
    assert_eq!(config.timing.pacing[2], Duration::from_millis(2000));
    assert!(!config.elevenlabs.is_configured());
    assert!(!config.kling.is_configured());
}

#[test]
#[serial]
fn test_toml_overrides_every_section() {
    clear_provider_env();

    let config = GeneratorConfig::resolve(&toml_from(
        r#"
host = "0.0.0.0"
port = 9000

[logging]
level = "debug"

[kling]
api_key = "kling-from-toml"
base_url = "http://localhost:7000"
request_timeout_secs = 10

[polling]
max_attempts = 5
interval_ms = 250

[pipeline]
pacing_ms = [0, 0, 0, 0, 0, 100]
lip_sync_delay_ms = 0
caption_delay_ms = 50
caption_pass_through = true
"#,
    ))
    .unwrap();

    assert_eq!(config.bind_address(), "0.0.0.0:9000");
    assert_eq!(config.kling.api_key.as_deref(), Some("kling-from-toml"));
    assert_eq!(config.kling.base_url, "http://localhost:7000");
    assert_eq!(config.kling.request_timeout, Duration::from_secs(10));
    assert!(!config.elevenlabs.is_configured());
    assert_eq!(
        config.poll_policy,
        PollPolicy {
            max_attempts: 5,
            interval: Duration::from_millis(250),
        }
    );
    assert_eq!(config.timing.pacing[5], Duration::from_millis(100));
    assert_eq!(config.timing.lip_sync_delay, Duration::ZERO);
    assert_eq!(config.timing.caption_delay, Duration::from_millis(50));
    assert!(config.caption_pass_through);
}

#[test]
#[serial]
fn test_env_credentials_take_priority_over_toml() {
    env::set_var(ELEVENLABS_API_KEY_ENV, "el-from-env");
    env::set_var(KLING_API_KEY_ENV, "kling-from-env");

    let config = GeneratorConfig::resolve(&toml_from(
        r#"
[elevenlabs]
api_key = "el-from-toml"

[kling]
api_key = "kling-from-toml"
"#,
    ))
    .unwrap();

    clear_provider_env();

    assert_eq!(config.elevenlabs.api_key.as_deref(), Some("el-from-env"));
    assert_eq!(config.kling.api_key.as_deref(), Some("kling-from-env"));
}

#[test]
#[serial]
fn test_blank_env_credential_falls_back_to_toml() {
    env::set_var(KLING_API_KEY_ENV, "  ");

    let config = GeneratorConfig::resolve(&toml_from(
        r#"
[kling]
api_key = "kling-from-toml"
"#,
    ))
    .unwrap();

    clear_provider_env();

    assert_eq!(config.kling.api_key.as_deref(), Some("kling-from-toml"));
}

#[test]
#[serial]
fn test_zero_poll_attempts_is_rejected() {
    clear_provider_env();

    let result = GeneratorConfig::resolve(&toml_from("[polling]\nmax_attempts = 0\n"));

    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_wrong_pacing_length_is_rejected() {
    clear_provider_env();

    let result = GeneratorConfig::resolve(&toml_from("[pipeline]\npacing_ms = [1, 2, 3]\n"));

    match result {
        Err(Error::Config(message)) => assert!(message.contains("got 3")),
        other => panic!("expected config error, got {:?}", other.map(|_| ())),
    }
}
