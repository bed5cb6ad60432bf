//! Configuration for the Google Secret Manager provider.
//!
//! Values come from the environment of the launcher (see the `*_VAR`
//! constants) or from any serde source the launcher already reads.

use secrets_init_core::{Error, Result, ResultExt};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use url::Url;

/// Explicit Google project ID
pub const GOOGLE_PROJECT_VAR: &str = "GOOGLE_PROJECT";
/// Fallback project ID variable used by Google client libraries
pub const GOOGLE_CLOUD_PROJECT_VAR: &str = "GOOGLE_CLOUD_PROJECT";
/// Override for the Secret Manager API endpoint
pub const SECRET_MANAGER_ENDPOINT_VAR: &str = "SECRETS_INIT_GCP_ENDPOINT";
/// Metadata server `host[:port]`, as understood by Google client libraries
pub const METADATA_HOST_VAR: &str = "GCE_METADATA_HOST";
/// Static OAuth access token, skips the metadata server token endpoint
pub const ACCESS_TOKEN_VAR: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";
/// Per-request HTTP timeout in seconds
pub const HTTP_TIMEOUT_VAR: &str = "SECRETS_INIT_HTTP_TIMEOUT_SECS";

pub const DEFAULT_SECRET_MANAGER_ENDPOINT: &str = "https://secretmanager.googleapis.com";
pub const DEFAULT_METADATA_ENDPOINT: &str = "http://metadata.google.internal";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Settings for [`GoogleSecretsProvider`](crate::GoogleSecretsProvider)
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GoogleProviderConfig {
    /// Project used for short secret names. Auto-detected when unset.
    pub project_id: Option<String>,

    /// Base URL of the Secret Manager REST API
    pub secret_manager_endpoint: String,

    /// Base URL of the metadata server
    pub metadata_endpoint: String,

    /// Static access token. When unset, tokens come from the metadata server.
    pub access_token: Option<String>,

    /// Transport timeout applied to every HTTP request
    pub request_timeout_secs: u64,
}

impl Default for GoogleProviderConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            secret_manager_endpoint: DEFAULT_SECRET_MANAGER_ENDPOINT.to_string(),
            metadata_endpoint: DEFAULT_METADATA_ENDPOINT.to_string(),
            access_token: None,
            request_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

// access tokens stay out of logs
impl fmt::Debug for GoogleProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleProviderConfig")
            .field("project_id", &self.project_id)
            .field("secret_manager_endpoint", &self.secret_manager_endpoint)
            .field("metadata_endpoint", &self.metadata_endpoint)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "<redacted>"),
            )
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl GoogleProviderConfig {
    /// Load from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` to read variables. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        config.project_id = get(GOOGLE_PROJECT_VAR).or_else(|| get(GOOGLE_CLOUD_PROJECT_VAR));

        if let Some(endpoint) = get(SECRET_MANAGER_ENDPOINT_VAR) {
            config.secret_manager_endpoint = endpoint;
        }

        if let Some(host) = get(METADATA_HOST_VAR) {
            let host = host.trim();
            config.metadata_endpoint = if host.contains("://") {
                host.to_string()
            } else {
                format!("http://{host}")
            };
        }

        config.access_token = get(ACCESS_TOKEN_VAR);

        if let Some(raw) = get(HTTP_TIMEOUT_VAR) {
            config.request_timeout_secs = raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("{HTTP_TIMEOUT_VAR} must be a whole number of seconds"))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Set the project explicitly
    #[must_use]
    pub fn with_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    /// Check endpoints and timeout
    pub fn validate(&self) -> Result<()> {
        parse_endpoint("secret_manager_endpoint", &self.secret_manager_endpoint)?;
        parse_endpoint("metadata_endpoint", &self.metadata_endpoint)?;
        if self.request_timeout_secs == 0 {
            return Err(Error::configuration(
                "request_timeout_secs must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Transport timeout as a `Duration`
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Parse an http(s) base URL and return it without a trailing slash
pub(crate) fn parse_endpoint(field: &str, raw: &str) -> Result<String> {
    let url = Url::parse(raw.trim())
        .with_context(|| format!("{field} '{raw}' is not a valid URL"))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::configuration(format!(
            "{field} '{raw}' must use http or https"
        )));
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}
