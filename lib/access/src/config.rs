//! Backend API location and authentication endpoint paths.
//!
//! All paths are relative to `base_url`. Fields with defaults can be omitted
//! when loading from a config file or environment variables.

use serde::{Deserialize, Serialize};

/// Where the backend lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API root, e.g. "https://portal.example.com/api".
    /// Default: "http://localhost:8000/api"
    #[serde(default = "default_base_url")]
    base_url: String,
    /// Per-request timeout in seconds. No timeout when unset.
    #[serde(default)]
    timeout_secs: Option<u64>,
    /// Authentication endpoint paths.
    #[serde(default)]
    endpoints: AuthEndpoints,
}

fn default_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: None,
            endpoints: AuthEndpoints::default(),
        }
    }
}

impl ApiConfig {
    /// Creates a configuration for the given API root with default endpoints.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn builder(base_url: impl Into<String>) -> ApiConfigBuilder {
        ApiConfigBuilder::new(base_url)
    }

    /// Returns the API root without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    #[must_use]
    pub fn timeout_secs(&self) -> Option<u64> {
        self.timeout_secs
    }

    #[must_use]
    pub fn endpoints(&self) -> &AuthEndpoints {
        &self.endpoints
    }

    /// Joins an endpoint path onto the API root.
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url(), path.trim_start_matches('/'))
    }
}

/// Paths of the five authentication endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthEndpoints {
    /// Credential exchange. Default: "/token/"
    #[serde(default = "default_token")]
    pub token: String,
    /// Refresh exchange. Default: "/token/refresh/"
    #[serde(default = "default_refresh")]
    pub refresh: String,
    /// Account creation. Default: "/register/"
    #[serde(default = "default_register")]
    pub register: String,
    /// Who am I. Default: "/user/"
    #[serde(default = "default_user")]
    pub user: String,
    /// Server-side logout. Default: "/logout/"
    #[serde(default = "default_logout")]
    pub logout: String,
}

fn default_token() -> String {
    "/token/".to_string()
}

fn default_refresh() -> String {
    "/token/refresh/".to_string()
}

fn default_register() -> String {
    "/register/".to_string()
}

fn default_user() -> String {
    "/user/".to_string()
}

fn default_logout() -> String {
    "/logout/".to_string()
}

impl Default for AuthEndpoints {
    fn default() -> Self {
        Self {
            token: default_token(),
            refresh: default_refresh(),
            register: default_register(),
            user: default_user(),
            logout: default_logout(),
        }
    }
}

/// Builder for `ApiConfig`.
#[derive(Debug)]
pub struct ApiConfigBuilder {
    config: ApiConfig,
}

impl ApiConfigBuilder {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            config: ApiConfig::new(base_url),
        }
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = Some(secs);
        self
    }

    /// Overrides the refresh endpoint path.
    #[must_use]
    pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
        self.config.endpoints.refresh = path.into();
        self
    }

    /// Replaces all endpoint paths.
    #[must_use]
    pub fn endpoints(mut self, endpoints: AuthEndpoints) -> Self {
        self.config.endpoints = endpoints;
        self
    }

    #[must_use]
    pub fn build(self) -> ApiConfig {
        self.config
    }
}
