//! Client configuration for connecting to the Ambra service.
//!
//! ```toml
//! url = "https://access.dicomgrid.com/api/v3"
//! storage_scheme = "https"
//! username = "user@example.com"
//! timeout = 30
//! page_size = 100
//! ```
//!
//! Every field is optional so that files can be layered; accessors fill
//! in defaults.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, Result};

/// Default service API base URL.
pub const DEFAULT_SERVICE_URL: &str = "https://access.dicomgrid.com/api/v3";

/// Default scheme for storage engine hosts.
const DEFAULT_STORAGE_SCHEME: &str = "https";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default number of rows requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

const ENV_URL: &str = "AMBRA_URL";
const ENV_USERNAME: &str = "AMBRA_USERNAME";
const ENV_PASSWORD: &str = "AMBRA_PASSWORD";
const ENV_SID: &str = "AMBRA_SID";

/// Root client configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Service API base URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Scheme used to reach storage engines (`http` or `https`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_scheme: Option<String>,

    /// Login used to obtain (and renew) a session id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Password paired with `username`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Pre-issued session id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,

    /// Request timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Rows requested per page by paginated queries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,

    /// Custom user agent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl ClientConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Overlay `other` on top of `self`; fields set in `other` win.
    pub fn merge(&mut self, other: ClientConfig) {
        if other.url.is_some() {
            self.url = other.url;
        }
        if other.storage_scheme.is_some() {
            self.storage_scheme = other.storage_scheme;
        }
        if other.username.is_some() {
            self.username = other.username;
        }
        if other.password.is_some() {
            self.password = other.password;
        }
        if other.sid.is_some() {
            self.sid = other.sid;
        }
        if other.timeout.is_some() {
            self.timeout = other.timeout;
        }
        if other.page_size.is_some() {
            self.page_size = other.page_size;
        }
        if other.user_agent.is_some() {
            self.user_agent = other.user_agent;
        }
    }

    /// Apply `AMBRA_*` overrides using a custom lookup. Empty values are ignored.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        if let Some(url) = get(ENV_URL) {
            self.url = Some(url);
        }
        if let Some(username) = get(ENV_USERNAME) {
            self.username = Some(username);
        }
        if let Some(password) = get(ENV_PASSWORD) {
            self.password = Some(password);
        }
        if let Some(sid) = get(ENV_SID) {
            self.sid = Some(sid);
        }
    }

    /// Check values that cannot be fixed up by defaults.
    pub fn validate(&self) -> Result<()> {
        if let Some(scheme) = &self.storage_scheme
            && scheme != "http"
            && scheme != "https"
        {
            return Err(ConfigError::InvalidValue {
                field: "storage_scheme".to_string(),
                reason: format!("expected 'http' or 'https', got '{}'", scheme),
            });
        }
        if self.timeout == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "timeout".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.page_size == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "page_size".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Effective service URL.
    pub fn service_url(&self) -> &str {
        self.url.as_deref().unwrap_or(DEFAULT_SERVICE_URL)
    }

    /// Effective storage scheme.
    pub fn storage_scheme(&self) -> &str {
        self.storage_scheme
            .as_deref()
            .unwrap_or(DEFAULT_STORAGE_SCHEME)
    }

    /// Effective request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    /// Effective page size.
    pub fn page_size(&self) -> u32 {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    /// Username and password, when both are set.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some((user.as_str(), pass.as_str())),
            _ => None,
        }
    }
}
