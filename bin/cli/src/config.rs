//! CLI configuration.
//!
//! Loaded via the `config` crate from an optional TOML file and
//! `LAWFIRM_PORTAL__*` environment variables, e.g.
//! `LAWFIRM_PORTAL__API__BASE_URL` or `LAWFIRM_PORTAL__SESSION__PATH`.
//!
//! See [`ApiConfig`] for the backend settings.

use lawfirm_portal_access::ApiConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "LAWFIRM_PORTAL";

/// CLI configuration composed from library configs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CliConfig {
    /// Backend API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Where the session is kept between runs.
    #[serde(default)]
    pub session: SessionConfig,
}

/// Session file configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Path of the JSON session file.
    /// Default: `$HOME/.lawfirm-portal/session.json`
    #[serde(default = "default_session_path")]
    pub path: PathBuf,
}

fn default_session_path() -> PathBuf {
    std::env::var_os("HOME").map_or_else(
        || PathBuf::from(".lawfirm-portal-session.json"),
        |home| PathBuf::from(home).join(".lawfirm-portal").join("session.json"),
    )
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            path: default_session_path(),
        }
    }
}

impl CliConfig {
    /// Loads configuration from `file` (if it exists) and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a source is present but malformed.
    pub fn load(file: &Path) -> Result<Self, config::ConfigError> {
        Self::from_sources(file, environment())
    }

    fn from_sources(
        file: &Path,
        env: config::Environment,
    ) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from(file).required(false))
            .add_source(env)
            .build()?
            .try_deserialize()
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}
