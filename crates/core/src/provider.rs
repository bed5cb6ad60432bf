//! The provider abstraction.
//!
//! A provider owns one scheme tag and knows how to turn the locator that
//! follows the tag into a secret value from its backing store. Everything
//! else about a resolution pass (splitting entries, passthrough, ordering)
//! is shared and lives here.

use crate::context::ResolveContext;
use crate::errors::Result;
use crate::types::EnvEntry;
use async_trait::async_trait;

/// Trait for secret stores that can substitute references in environment entries
#[async_trait]
pub trait SecretsProvider: Send + Sync {
    /// Display name for logging
    fn name(&self) -> &str;

    /// The scheme tag that marks values this provider resolves, e.g. `gcp:secretmanager:`
    fn scheme(&self) -> &str;

    /// Whether `value` carries this provider's scheme tag
    fn handles(&self, value: &str) -> bool {
        value.starts_with(self.scheme())
    }

    /// Resolve a single locator (the part of the value after the scheme tag).
    ///
    /// Implementations perform exactly one fetch against their backing store
    /// and pass `ctx` through to it unchanged.
    async fn resolve_reference(&self, ctx: &ResolveContext, locator: &str) -> Result<String>;

    /// Run a resolution pass over `entries`.
    ///
    /// Returns a new sequence of the same length and order, with every value
    /// carrying this provider's scheme tag replaced by the fetched secret.
    /// The first failure aborts the pass; no partially substituted output is
    /// ever returned.
    async fn resolve_secrets(
        &self,
        ctx: &ResolveContext,
        entries: &[EnvEntry],
    ) -> Result<Vec<EnvEntry>> {
        let mut resolved = Vec::with_capacity(entries.len());
        for entry in entries {
            resolved.push(substitute_entry(self, ctx, entry).await?);
        }
        Ok(resolved)
    }
}

/// Substitute one entry through `provider`, or return it unchanged when its
/// value does not carry the provider's scheme tag.
pub async fn substitute_entry<P>(
    provider: &P,
    ctx: &ResolveContext,
    entry: &EnvEntry,
) -> Result<EnvEntry>
where
    P: SecretsProvider + ?Sized,
{
    let Some((key, value)) = entry.split() else {
        return Ok(entry.clone());
    };
    let Some(locator) = value.strip_prefix(provider.scheme()) else {
        return Ok(entry.clone());
    };

    let secret = provider.resolve_reference(ctx, locator).await?;
    tracing::debug!(key = %key, provider = provider.name(), "substituted secret reference");
    Ok(EnvEntry::from_pair(key, &secret))
}
