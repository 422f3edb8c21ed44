//! Conductor client configuration.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

/// Default server API root.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080/api";

/// Default timeout for HTTP requests: 30 seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the Conductor HTTP client.
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct ConductorConfig {
    /// Conductor server API root, e.g. `http://localhost:8080/api`
    #[cfg_attr(
        feature = "config",
        arg(
            long = "server-url",
            env = "CONDUCTOR_SERVER_URL",
            default_value = DEFAULT_SERVER_URL
        )
    )]
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Application key id used to obtain an access token
    #[cfg_attr(feature = "config", arg(long = "auth-key", env = "CONDUCTOR_AUTH_KEY"))]
    #[serde(default)]
    pub auth_key: Option<String>,

    /// Application key secret used to obtain an access token
    #[cfg_attr(
        feature = "config",
        arg(long = "auth-secret", env = "CONDUCTOR_AUTH_SECRET", hide_env_values = true)
    )]
    #[serde(default)]
    pub auth_secret: Option<String>,

    /// HTTP request timeout in seconds
    #[cfg_attr(
        feature = "config",
        arg(long = "http-timeout", env = "CONDUCTOR_HTTP_TIMEOUT", default_value = "30")
    )]
    #[serde(default = "default_timeout_secs")]
    pub http_timeout: u64,

    /// User-Agent header to send with requests
    #[cfg_attr(
        feature = "config",
        arg(long = "http-user-agent", env = "CONDUCTOR_USER_AGENT")
    )]
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_owned()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl std::fmt::Debug for ConductorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConductorConfig")
            .field("server_url", &self.server_url)
            .field("auth_key", &self.auth_key)
            .field("auth_secret", &self.auth_secret.as_ref().map(|_| "<redacted>"))
            .field("http_timeout", &self.http_timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl Default for ConductorConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            auth_key: None,
            auth_secret: None,
            http_timeout: default_timeout_secs(),
            user_agent: None,
        }
    }
}

impl ConductorConfig {
    /// Create a new configuration for the given server.
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            ..Self::default()
        }
    }

    /// Returns the key id and secret when both are configured.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.auth_key, &self.auth_secret) {
            (Some(key), Some(secret)) => Some((key.as_str(), secret.as_str())),
            _ => None,
        }
    }

    /// Returns the effective timeout, using default if zero.
    pub fn effective_timeout(&self) -> Duration {
        if self.http_timeout == 0 {
            Duration::from_secs(DEFAULT_TIMEOUT_SECS)
        } else {
            Duration::from_secs(self.http_timeout)
        }
    }

    /// Returns the effective user agent, using default if not set.
    pub fn effective_user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(Self::default_user_agent)
    }

    /// Returns the default user agent string.
    fn default_user_agent() -> String {
        format!("conductor-rs/{}", env!("CARGO_PKG_VERSION"))
    }

    /// Set the server API root.
    #[must_use]
    pub fn with_server_url(mut self, server_url: impl Into<String>) -> Self {
        self.server_url = server_url.into();
        self
    }

    /// Set the application key id and secret.
    #[must_use]
    pub fn with_credentials(mut self, key: impl Into<String>, secret: impl Into<String>) -> Self {
        self.auth_key = Some(key.into());
        self.auth_secret = Some(secret.into());
        self
    }

    /// Set the timeout in seconds.
    #[must_use]
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.http_timeout = timeout_secs;
        self
    }

    /// Set the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}
