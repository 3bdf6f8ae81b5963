//! Settings schema for flowctl.toml

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::wait::WaitPolicy;

pub const DEFAULT_URL: &str = "http://localhost:8080/nifi-api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_INTERVAL_SECS: u64 = 2;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Root settings structure for flowctl.toml
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the engine REST API
    pub url: String,

    /// Maximum time to wait for a component to reach a requested state
    pub timeout_secs: u64,

    /// Delay between two state polls
    pub interval_secs: u64,

    /// HTTP connect timeout
    pub connect_timeout_secs: u64,

    /// Credentials exchanged for a bearer token on first use
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Pre-issued bearer token; takes precedence over credentials
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Skip TLS certificate verification
    pub accept_invalid_certs: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            interval_secs: DEFAULT_INTERVAL_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            username: None,
            password: None,
            token: None,
            accept_invalid_certs: false,
        }
    }
}

/// Values supplied on the command line, layered over the file.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverride {
    pub url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub interval_secs: Option<u64>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub accept_invalid_certs: bool,
}

impl Settings {
    pub fn validate(&self) -> anyhow::Result<()> {
        self.base_url()?;
        if self.interval_secs == 0 {
            anyhow::bail!("interval_secs must be greater than zero");
        }
        if self.timeout_secs < self.interval_secs {
            anyhow::bail!(
                "timeout_secs ({}) must not be shorter than interval_secs ({})",
                self.timeout_secs,
                self.interval_secs
            );
        }
        if self.username.is_some() != self.password.is_some() {
            anyhow::bail!("username and password must be set together");
        }
        Ok(())
    }

    pub fn base_url(&self) -> anyhow::Result<Url> {
        Url::parse(&self.url).map_err(|e| anyhow::anyhow!("Invalid url '{}': {}", self.url, e))
    }

    pub fn apply(mut self, overrides: SettingsOverride) -> Self {
        if let Some(url) = overrides.url {
            self.url = url;
        }
        if let Some(timeout) = overrides.timeout_secs {
            self.timeout_secs = timeout;
        }
        if let Some(interval) = overrides.interval_secs {
            self.interval_secs = interval;
        }
        if overrides.username.is_some() {
            self.username = overrides.username;
        }
        if overrides.password.is_some() {
            self.password = overrides.password;
        }
        if overrides.accept_invalid_certs {
            self.accept_invalid_certs = true;
        }
        self
    }

    pub fn wait_policy(&self) -> WaitPolicy {
        WaitPolicy::new(
            Duration::from_secs(self.timeout_secs),
            Duration::from_secs(self.interval_secs),
        )
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}
