//! # Configuration Tests
//!
//! Layering of defaults, TOML file, environment and flags.

#![allow(clippy::unwrap_used, clippy::panic)]

use leapp_ready::{ConfigError, EnableVia, FileConfig, Overrides, Settings};
use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

fn write_config(text: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file
}

#[test]
fn file_values_are_used() {
    let file = write_config(
        r#"
server = "satellite.example.com"
username = "admin"
password = "changeme"
timeout_secs = 12
enable_via = "hammer"
hammer_path = "/usr/local/bin/hammer"
"#,
    );
    let config = FileConfig::load(file.path()).unwrap();

    let settings = Settings::resolve(config, &env_of(&[]), &Overrides::default()).unwrap();

    assert_eq!(settings.server, "https://satellite.example.com");
    assert_eq!(settings.username, "admin");
    assert_eq!(settings.timeout, Duration::from_secs(12));
    assert_eq!(settings.enable_via, EnableVia::Hammer);
    assert_eq!(settings.hammer_path, PathBuf::from("/usr/local/bin/hammer"));
}

#[test]
fn environment_beats_file_and_flags_beat_environment() {
    let config = FileConfig {
        server: Some("file.example.com".to_string()),
        username: Some("file-user".to_string()),
        password: Some("file-pass".to_string()),
        ..FileConfig::default()
    };
    let env = env_of(&[
        ("LEAPP_READY_SERVER", "env.example.com"),
        ("LEAPP_READY_USERNAME", "env-user"),
    ]);
    let flags = Overrides {
        username: Some("flag-user".to_string()),
        ..Overrides::default()
    };

    let settings = Settings::resolve(config, &env, &flags).unwrap();

    assert_eq!(settings.server, "https://env.example.com");
    assert_eq!(settings.username, "flag-user");
    assert_eq!(settings.password, "file-pass");
    assert_eq!(settings.enable_via, EnableVia::Api);
}

#[test]
fn server_falls_back_to_local_host_name() {
    let env = env_of(&[
        ("HOSTNAME", "satellite.lab"),
        ("LEAPP_READY_USERNAME", "admin"),
        ("LEAPP_READY_PASSWORD", "secret"),
    ]);

    let settings = Settings::resolve(FileConfig::default(), &env, &Overrides::default()).unwrap();

    assert_eq!(settings.server, "https://satellite.lab");
    assert_eq!(settings.timeout, Duration::from_secs(30));
}

#[test]
fn missing_password_is_reported() {
    let env = env_of(&[("LEAPP_READY_SERVER", "s"), ("LEAPP_READY_USERNAME", "admin")]);

    let err = Settings::resolve(FileConfig::default(), &env, &Overrides::default()).unwrap_err();

    assert!(matches!(err, ConfigError::Missing("password")));
}

#[test]
fn zero_timeout_is_invalid() {
    let flags = Overrides {
        server: Some("s".to_string()),
        username: Some("u".to_string()),
        password: Some("p".to_string()),
        timeout_secs: Some(0),
        ..Overrides::default()
    };

    let err = Settings::resolve(FileConfig::default(), &env_of(&[]), &flags).unwrap_err();

    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn unknown_keys_are_rejected() {
    let file = write_config("server = \"s\"\nverify_ssl = false\n");

    let err = FileConfig::load(file.path()).unwrap_err();

    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn explicit_config_must_exist() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");

    let err = FileConfig::discover(Some(&missing), &env_of(&[])).unwrap_err();

    assert!(matches!(err, ConfigError::Read { .. }));
}

#[test]
fn config_path_from_environment() {
    let file = write_config("username = \"from-env-file\"\n");
    let path = file.path().to_string_lossy().to_string();

    let config = FileConfig::discover(None, &env_of(&[("LEAPP_READY_CONFIG", path.as_str())])).unwrap();

    assert_eq!(config.username.as_deref(), Some("from-env-file"));
}
