//! Metadata server client: ambient project discovery and access tokens

use crate::config::parse_endpoint;
use async_trait::async_trait;
use secrets_init_core::{Error, ResolveContext, Result};
use serde::Deserialize;
use std::fmt;

const METADATA_FLAVOR_HEADER: &str = "Metadata-Flavor";
const METADATA_FLAVOR: &str = "Google";
const PROJECT_ID_PATH: &str = "/computeMetadata/v1/project/project-id";
const TOKEN_PATH: &str = "/computeMetadata/v1/instance/service-accounts/default/token";

/// Finds the default project a provider resolves short secret names against
#[async_trait]
pub trait ScopeDiscovery: Send + Sync {
    /// Look up the ambient project ID
    async fn discover_ambient_scope(&self, ctx: &ResolveContext) -> Result<String>;
}

/// HTTP client for the GCE/GKE/Cloud Run metadata server
#[derive(Clone)]
pub struct MetadataClient {
    http: reqwest::Client,
    endpoint: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl MetadataClient {
    /// Use an existing HTTP client
    pub fn with_client(http: reqwest::Client, endpoint: &str) -> Result<Self> {
        let endpoint = parse_endpoint("metadata_endpoint", endpoint)?;
        Ok(Self { http, endpoint })
    }

    /// The metadata server base URL
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn get(&self, ctx: &ResolveContext, path: &str) -> Result<reqwest::Response> {
        let url = format!("{}{path}", self.endpoint);
        ctx.run("metadata request", async {
            let response = self
                .http
                .get(&url)
                .header(METADATA_FLAVOR_HEADER, METADATA_FLAVOR)
                .send()
                .await
                .map_err(|e| Error::network(&url, e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(Error::network(&url, format!("metadata server returned HTTP {status}")));
            }
            // anything else answering on this address is not the metadata server
            let genuine = response
                .headers()
                .get(METADATA_FLAVOR_HEADER)
                .is_some_and(|v| v == METADATA_FLAVOR);
            if !genuine {
                return Err(Error::network(
                    &url,
                    "response is missing the Metadata-Flavor: Google header",
                ));
            }
            Ok(response)
        })
        .await
    }

    /// The project the workload runs in
    pub async fn project_id(&self, ctx: &ResolveContext) -> Result<String> {
        let response = self.get(ctx, PROJECT_ID_PATH).await?;
        let url = response.url().to_string();
        let body = ctx
            .run("metadata request", async {
                response
                    .text()
                    .await
                    .map_err(|e| Error::network(&url, e.to_string()))
            })
            .await?;

        let project = body.trim();
        if project.is_empty() {
            return Err(Error::network(url, "metadata server returned an empty project ID"));
        }
        Ok(project.to_string())
    }

    /// An OAuth access token for the default service account
    pub async fn access_token(&self, ctx: &ResolveContext) -> Result<String> {
        let response = self.get(ctx, TOKEN_PATH).await?;
        let url = response.url().to_string();
        let token: TokenResponse = ctx
            .run("metadata request", async {
                response
                    .json()
                    .await
                    .map_err(|e| Error::network(&url, format!("invalid token response: {e}")))
            })
            .await?;
        Ok(token.access_token)
    }
}

#[async_trait]
impl ScopeDiscovery for MetadataClient {
    async fn discover_ambient_scope(&self, ctx: &ResolveContext) -> Result<String> {
        self.project_id(ctx).await
    }
}

impl fmt::Debug for MetadataClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetadataClient")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Where Secret Manager requests get their bearer token
#[derive(Clone)]
pub enum TokenSource {
    /// A token supplied by configuration
    Static(String),
    /// A fresh token from the metadata server for every request
    Metadata(MetadataClient),
}

impl TokenSource {
    /// Get a bearer token
    pub async fn token(&self, ctx: &ResolveContext) -> Result<String> {
        match self {
            TokenSource::Static(token) => Ok(token.clone()),
            TokenSource::Metadata(client) => client.access_token(ctx).await,
        }
    }
}

impl fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenSource::Static(_) => f.write_str("Static(<redacted>)"),
            TokenSource::Metadata(client) => f.debug_tuple("Metadata").field(client).finish(),
        }
    }
}
