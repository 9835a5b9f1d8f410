//! # Configuration
//!
//! Settings are layered, later layers winning:
//!
//! 1. built-in defaults
//! 2. TOML file: `--config`, else `$LEAPP_READY_CONFIG`, else
//!    `/etc/leapp-ready.toml` when it exists
//! 3. environment: `LEAPP_READY_SERVER`, `LEAPP_READY_USERNAME`,
//!    `LEAPP_READY_PASSWORD`, `LEAPP_READY_CA_CERT`
//! 4. command-line flags
//!
//! ```toml
//! server = "https://satellite.example.com"
//! username = "admin"
//! password = "changeme"
//! ca_cert = "/root/ssl-build/katello-server-ca.crt"
//! timeout_secs = 30
//! enable_via = "api"   # or "hammer"
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

// =============================================================================
// DEFAULTS
// =============================================================================

/// System-wide configuration file, read only if present.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/leapp-ready.toml";

/// CA bundle a Satellite installer leaves on the server itself.
pub const DEFAULT_CA_CERT: &str = "/root/ssl-build/katello-server-ca.crt";

/// Per-request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Command used by the `hammer` enable path.
pub const DEFAULT_HAMMER: &str = "hammer";

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("missing setting '{0}' (flag, environment or config file)")]
    Missing(&'static str),

    #[error("invalid setting: {0}")]
    Invalid(String),
}

// =============================================================================
// SOURCES
// =============================================================================

/// How enable actions reach the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EnableVia {
    /// Satellite REST API.
    #[default]
    Api,
    /// `hammer repository-set enable` on the local machine.
    Hammer,
}

/// Contents of a TOML configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub server: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub ca_cert: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
    pub enable_via: Option<EnableVia>,
    pub hammer_path: Option<PathBuf>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Find and load the config file. An explicit or `$LEAPP_READY_CONFIG`
    /// path must exist; the system default is optional.
    pub fn discover(
        explicit: Option<&Path>,
        env: &impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        if let Some(path) = env("LEAPP_READY_CONFIG") {
            return Self::load(Path::new(&path));
        }
        let system = Path::new(DEFAULT_CONFIG_PATH);
        if system.is_file() {
            tracing::debug!(path = DEFAULT_CONFIG_PATH, "using system config file");
            return Self::load(system);
        }
        Ok(Self::default())
    }
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub server: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub ca_cert: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
    pub enable_via: Option<EnableVia>,
}

// =============================================================================
// SETTINGS
// =============================================================================

/// Fully resolved connection settings.
#[derive(Clone, PartialEq, Eq)]
pub struct Settings {
    /// Base URL, with scheme and without a trailing slash.
    pub server: String,
    pub username: String,
    pub password: String,
    pub ca_cert: Option<PathBuf>,
    pub timeout: Duration,
    pub enable_via: EnableVia,
    pub hammer_path: PathBuf,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("server", &self.server)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("ca_cert", &self.ca_cert)
            .field("timeout", &self.timeout)
            .field("enable_via", &self.enable_via)
            .field("hammer_path", &self.hammer_path)
            .finish()
    }
}

impl Settings {
    /// Resolve from the process environment and the discovered config file.
    pub fn load(config_path: Option<&Path>, flags: &Overrides) -> Result<Self, ConfigError> {
        let env = |key: &str| std::env::var(key).ok().filter(|v| !v.is_empty());
        let file = FileConfig::discover(config_path, &env)?;
        Self::resolve(file, &env, flags)
    }

    /// Merge the layers. `env` is injected so tests need not touch the
    /// process environment.
    pub fn resolve(
        file: FileConfig,
        env: &impl Fn(&str) -> Option<String>,
        flags: &Overrides,
    ) -> Result<Self, ConfigError> {
        let server = flags
            .server
            .clone()
            .or_else(|| env("LEAPP_READY_SERVER"))
            .or(file.server)
            .or_else(|| env("HOSTNAME"))
            .ok_or(ConfigError::Missing("server"))?;
        let username = flags
            .username
            .clone()
            .or_else(|| env("LEAPP_READY_USERNAME"))
            .or(file.username)
            .ok_or(ConfigError::Missing("username"))?;
        let password = flags
            .password
            .clone()
            .or_else(|| env("LEAPP_READY_PASSWORD"))
            .or(file.password)
            .ok_or(ConfigError::Missing("password"))?;

        let ca_cert = flags
            .ca_cert
            .clone()
            .or_else(|| env("LEAPP_READY_CA_CERT").map(PathBuf::from))
            .or(file.ca_cert)
            .or_else(|| {
                let default = Path::new(DEFAULT_CA_CERT);
                default.is_file().then(|| default.to_path_buf())
            });

        let timeout_secs = flags
            .timeout_secs
            .or(file.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout must be at least one second".to_string()));
        }

        Ok(Self {
            server: normalize_server(&server)?,
            username,
            password,
            ca_cert,
            timeout: Duration::from_secs(timeout_secs),
            enable_via: flags.enable_via.or(file.enable_via).unwrap_or_default(),
            hammer_path: file
                .hammer_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_HAMMER)),
        })
    }
}

/// Add `https://` to bare host names and drop trailing slashes.
fn normalize_server(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid("server must not be empty".to_string()));
    }
    if trimmed.starts_with("https://") || trimmed.starts_with("http://") {
        Ok(trimmed.to_string())
    } else if trimmed.contains("://") {
        Err(ConfigError::Invalid(format!(
            "server '{}' must use http or https",
            trimmed
        )))
    } else {
        Ok(format!("https://{}", trimmed))
    }
}

// =============================================================================
// TESTS
// =============================================================================
