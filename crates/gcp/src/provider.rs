//! The Google Secret Manager provider

use crate::config::GoogleProviderConfig;
use crate::metadata::{MetadataClient, ScopeDiscovery, TokenSource};
use crate::reference::{SecretLocator, SecretName};
use crate::store::{SecretManagerClient, SecretStore};
use async_trait::async_trait;
use secrets_init_core::{
    Error, ResolveContext, Result, SecretsProvider, GCP_SECRET_MANAGER_SCHEME,
};
use std::fmt;
use std::sync::Arc;

/// Name used for this provider in logs and errors
pub const PROVIDER_NAME: &str = "google-secret-manager";

/// Resolves `gcp:secretmanager:` references against Google Secret Manager.
///
/// The project used for short secret names is fixed when the provider is
/// built and never changes afterwards.
pub struct GoogleSecretsProvider {
    store: Arc<dyn SecretStore>,
    project_id: Option<String>,
}

impl GoogleSecretsProvider {
    /// Build the provider from configuration.
    ///
    /// Fails with [`Error::ProviderInit`] when the Secret Manager client cannot
    /// be built. Failing to detect the project is not an error; short secret
    /// names are then unavailable.
    pub async fn new(ctx: &ResolveContext, config: &GoogleProviderConfig) -> Result<Self> {
        let (store, metadata) = build_clients(config).map_err(into_init_error)?;
        Ok(Self::from_parts(ctx, config.project_id.as_deref(), &metadata, Arc::new(store)).await)
    }

    /// Build the provider from its collaborators.
    ///
    /// A non-empty `explicit_project` is used as is; otherwise `discovery` is
    /// asked once.
    pub async fn from_parts(
        ctx: &ResolveContext,
        explicit_project: Option<&str>,
        discovery: &dyn ScopeDiscovery,
        store: Arc<dyn SecretStore>,
    ) -> Self {
        let project_id = match explicit_project.filter(|p| !p.is_empty()) {
            Some(project) => {
                tracing::debug!(project, "using configured Google project");
                Some(project.to_string())
            }
            None => match discovery.discover_ambient_scope(ctx).await {
                Ok(project) if !project.is_empty() => {
                    tracing::debug!(project = %project, "detected Google project");
                    Some(project)
                }
                Ok(_) => {
                    tracing::info!(
                        "the Google project cannot be detected, short secret names will not resolve"
                    );
                    None
                }
                Err(e) => {
                    tracing::info!(
                        error = %e,
                        "the Google project cannot be detected, short secret names will not resolve"
                    );
                    None
                }
            },
        };

        Self { store, project_id }
    }

    /// The project short secret names resolve against, if any
    #[must_use]
    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    /// Normalise a locator against this provider's project
    pub fn secret_name(&self, locator: &str) -> Result<SecretName> {
        SecretLocator::parse(locator).normalize(self.project_id())
    }
}

fn build_clients(config: &GoogleProviderConfig) -> Result<(SecretManagerClient, MetadataClient)> {
    config.validate()?;
    let http = crate::build_http_client(config)?;
    let metadata = MetadataClient::with_client(http.clone(), &config.metadata_endpoint)?;
    let tokens = match &config.access_token {
        Some(token) => TokenSource::Static(token.clone()),
        None => TokenSource::Metadata(metadata.clone()),
    };
    let store = SecretManagerClient::with_client(http, &config.secret_manager_endpoint, tokens)?;
    Ok((store, metadata))
}

// already-classified init failures keep their own message
fn into_init_error(e: Error) -> Error {
    match e {
        Error::ProviderInit { .. } => e,
        other => Error::provider_init_with_source(
            PROVIDER_NAME,
            "failed to initialize Google Cloud client",
            other,
        ),
    }
}

#[async_trait]
impl SecretsProvider for GoogleSecretsProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn scheme(&self) -> &str {
        GCP_SECRET_MANAGER_SCHEME
    }

    async fn resolve_reference(&self, ctx: &ResolveContext, locator: &str) -> Result<String> {
        let name = self.secret_name(locator)?;
        tracing::debug!(secret = %name, "fetching secret from Google Secret Manager");

        let payload = self
            .store
            .fetch_secret(ctx, &name)
            .await
            .map_err(|e| Error::secret_fetch(name.as_str(), e))?;

        String::from_utf8(payload).map_err(|e| {
            Error::secret_fetch(
                name.as_str(),
                Error::invalid_payload(format!("secret is not valid UTF-8 text: {e}")),
            )
        })
    }
}

impl fmt::Debug for GoogleSecretsProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleSecretsProvider")
            .field("project_id", &self.project_id)
            .finish_non_exhaustive()
    }
}
