//! Google Secret Manager provider for `secrets-init`.
//!
//! Resolves values of the form `gcp:secretmanager:<locator>`, where the
//! locator is either a short secret name (`db-pass`, `db-pass/versions/3`)
//! resolved against the workload's project, or a fully-qualified
//! `projects/<id>/secrets/<name>[/versions/<v>]` name.
//!
//! ```no_run
//! use secrets_init_core::{entries_from, ResolveContext, SecretsProvider};
//! use secrets_init_gcp::{GoogleProviderConfig, GoogleSecretsProvider};
//!
//! # async fn run() -> secrets_init_core::Result<()> {
//! let ctx = ResolveContext::background();
//! let config = GoogleProviderConfig::from_env()?;
//! let provider = GoogleSecretsProvider::new(&ctx, &config).await?;
//! let env = provider
//!     .resolve_secrets(&ctx, &entries_from(["DB_PASS=gcp:secretmanager:db-pass"]))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod metadata;
pub mod provider;
pub mod reference;
pub mod store;

pub use config::GoogleProviderConfig;
pub use metadata::{MetadataClient, ScopeDiscovery, TokenSource};
pub use provider::{GoogleSecretsProvider, PROVIDER_NAME};
pub use reference::{normalize_locator, SecretLocator, SecretName};
pub use store::{SecretManagerClient, SecretStore};

use secrets_init_core::{Error, Result};

/// Shared HTTP client with the configured transport timeout
pub(crate) fn build_http_client(config: &GoogleProviderConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.request_timeout())
        .build()
        .map_err(|e| {
            Error::provider_init_with_source(PROVIDER_NAME, "failed to build HTTP client", e)
        })
}
