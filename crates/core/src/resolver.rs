//! Resolution driver that dispatches entries across several providers

use crate::context::ResolveContext;
use crate::errors::{Error, Result};
use crate::provider::{substitute_entry, SecretsProvider};
use crate::types::EnvEntry;
use std::sync::Arc;

/// Holds the registered providers and runs resolution passes over them.
///
/// Each entry goes to the provider whose scheme tag prefixes its value. When
/// several tags match, the longest one wins. Entries no provider claims are
/// passed through unchanged.
#[derive(Default, Clone)]
pub struct SecretsResolver {
    providers: Vec<Arc<dyn SecretsProvider>>,
}

impl SecretsResolver {
    /// Create a resolver with no providers
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider. Scheme tags must be non-empty and unique.
    pub fn register(&mut self, provider: Arc<dyn SecretsProvider>) -> Result<()> {
        let scheme = provider.scheme();
        if scheme.is_empty() {
            return Err(Error::configuration(format!(
                "provider '{}' has an empty scheme tag",
                provider.name()
            )));
        }
        if self.providers.iter().any(|p| p.scheme() == scheme) {
            return Err(Error::duplicate_scheme(scheme));
        }
        tracing::debug!(provider = provider.name(), scheme, "registered secrets provider");
        self.providers.push(provider);
        Ok(())
    }

    /// Builder-style [`register`](Self::register)
    pub fn with_provider(mut self, provider: Arc<dyn SecretsProvider>) -> Result<Self> {
        self.register(provider)?;
        Ok(self)
    }

    /// Scheme tags of the registered providers, in registration order
    #[must_use]
    pub fn schemes(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.scheme()).collect()
    }

    /// Number of registered providers
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether no provider is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    fn provider_for(&self, value: &str) -> Option<&dyn SecretsProvider> {
        self.providers
            .iter()
            .filter(|p| p.handles(value))
            .max_by_key(|p| p.scheme().len())
            .map(|p| p.as_ref())
    }

    /// Run one resolution pass over `entries`.
    ///
    /// Entries are processed strictly in order, one fetch at a time. The
    /// first error aborts the pass and is returned as is.
    pub async fn resolve(
        &self,
        ctx: &ResolveContext,
        entries: &[EnvEntry],
    ) -> Result<Vec<EnvEntry>> {
        let mut resolved = Vec::with_capacity(entries.len());
        let mut substituted = 0usize;

        for entry in entries {
            let provider = entry.value().and_then(|value| self.provider_for(value));
            match provider {
                Some(provider) => {
                    let next = substitute_entry(provider, ctx, entry).await.map_err(|e| {
                        tracing::error!(
                            key = entry.key().unwrap_or_default(),
                            provider = provider.name(),
                            error = %e,
                            "secret resolution failed"
                        );
                        e
                    })?;
                    substituted += 1;
                    resolved.push(next);
                }
                None => resolved.push(entry.clone()),
            }
        }

        tracing::info!(
            entries = entries.len(),
            substituted,
            "secret resolution complete"
        );
        Ok(resolved)
    }

    /// [`resolve`](Self::resolve) for raw `KEY=VALUE` strings
    pub async fn resolve_strings(
        &self,
        ctx: &ResolveContext,
        entries: Vec<String>,
    ) -> Result<Vec<String>> {
        let entries = crate::types::entries_from(entries);
        let resolved = self.resolve(ctx, &entries).await?;
        Ok(crate::types::entries_into_strings(resolved))
    }
}

impl std::fmt::Debug for SecretsResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretsResolver")
            .field("schemes", &self.schemes())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use proptest::prelude::*;
    use std::sync::Mutex;

    /// Records every locator it sees and answers `<tag>-<locator>`
    struct RecordingProvider {
        tag: &'static str,
        scheme: &'static str,
        seen: Mutex<Vec<String>>,
        fail_on: Option<&'static str>,
    }

    impl RecordingProvider {
        fn new(tag: &'static str, scheme: &'static str) -> Self {
            Self {
                tag,
                scheme,
                seen: Mutex::new(Vec::new()),
                fail_on: None,
            }
        }

        fn failing_on(mut self, locator: &'static str) -> Self {
            self.fail_on = Some(locator);
            self
        }

        fn seen(&self) -> Vec<String> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SecretsProvider for RecordingProvider {
        fn name(&self) -> &str {
            self.tag
        }

        fn scheme(&self) -> &str {
            self.scheme
        }

        async fn resolve_reference(&self, _ctx: &ResolveContext, locator: &str) -> Result<String> {
            self.seen.lock().unwrap().push(locator.to_string());
            if self.fail_on == Some(locator) {
                return Err(Error::secret_fetch(locator, Error::network(self.tag, "unavailable")));
            }
            Ok(format!("{}-{locator}", self.tag))
        }
    }

    fn entries(raw: &[&str]) -> Vec<EnvEntry> {
        crate::types::entries_from(raw.iter().copied())
    }

    #[tokio::test]
    async fn dispatches_by_scheme_tag() {
        let gcp = Arc::new(RecordingProvider::new("gcp", "gcp:secretmanager:"));
        let vault = Arc::new(RecordingProvider::new("vault", "vault:"));
        let resolver = SecretsResolver::new()
            .with_provider(gcp.clone())
            .unwrap()
            .with_provider(vault.clone())
            .unwrap();

        let input = entries(&[
            "A=gcp:secretmanager:one",
            "B=plain",
            "C=vault:two",
            "D=gcp:secretmanager:one",
        ]);
        let output = resolver
            .resolve(&ResolveContext::background(), &input)
            .await
            .unwrap();

        let raw: Vec<&str> = output.iter().map(EnvEntry::as_str).collect();
        assert_eq!(raw, ["A=gcp-one", "B=plain", "C=vault-two", "D=gcp-one"]);
        // identical references are fetched once each, no dedup
        assert_eq!(gcp.seen(), ["one", "one"]);
        assert_eq!(vault.seen(), ["two"]);
    }

    #[tokio::test]
    async fn longest_matching_scheme_wins() {
        let broad = Arc::new(RecordingProvider::new("broad", "gcp:"));
        let narrow = Arc::new(RecordingProvider::new("narrow", "gcp:secretmanager:"));
        let resolver = SecretsResolver::new()
            .with_provider(broad.clone())
            .unwrap()
            .with_provider(narrow.clone())
            .unwrap();

        let output = resolver
            .resolve(
                &ResolveContext::background(),
                &entries(&["A=gcp:secretmanager:x", "B=gcp:other"]),
            )
            .await
            .unwrap();

        assert_eq!(output[0].as_str(), "A=narrow-x");
        assert_eq!(output[1].as_str(), "B=broad-other");
    }

    #[tokio::test]
    async fn atomic_failure_returns_no_output() {
        let provider = Arc::new(RecordingProvider::new("gcp", "gcp:").failing_on("three"));
        let resolver = SecretsResolver::new().with_provider(provider.clone()).unwrap();

        let input = entries(&["A=gcp:one", "B=gcp:two", "C=gcp:three", "D=gcp:four", "E=gcp:five"]);
        let result = resolver.resolve(&ResolveContext::background(), &input).await;

        assert!(matches!(result, Err(Error::SecretFetch { ref name, .. }) if name == "three"));
        assert_eq!(provider.seen(), ["one", "two", "three"]);
    }

    #[test]
    fn rejects_duplicate_and_empty_schemes() {
        let mut resolver = SecretsResolver::new();
        resolver
            .register(Arc::new(RecordingProvider::new("a", "dup:")))
            .unwrap();
        let err = resolver
            .register(Arc::new(RecordingProvider::new("b", "dup:")))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateScheme { ref scheme } if scheme == "dup:"));

        let err = resolver
            .register(Arc::new(RecordingProvider::new("c", "")))
            .unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
        assert_eq!(resolver.schemes(), ["dup:"]);
        assert_eq!(resolver.len(), 1);
    }

    #[tokio::test]
    async fn resolve_strings_keeps_first_equals_split() {
        let resolver = SecretsResolver::new()
            .with_provider(Arc::new(RecordingProvider::new("t", "t:")))
            .unwrap();
        let output = resolver
            .resolve_strings(
                &ResolveContext::background(),
                vec!["A=B=C".to_string(), "K=t:x=y".to_string()],
            )
            .await
            .unwrap();
        assert_eq!(output, ["A=B=C", "K=t-x=y"]);
    }

    #[tokio::test]
    async fn empty_resolver_passes_everything_through() {
        let resolver = SecretsResolver::new();
        assert!(resolver.is_empty());
        let input = entries(&["A=gcp:secretmanager:x", "B=1"]);
        let output = resolver
            .resolve(&ResolveContext::background(), &input)
            .await
            .unwrap();
        assert_eq!(output, input);
    }

    proptest! {
        #[test]
        fn untagged_entries_pass_through(raw in prop::collection::vec("[A-Z]{1,8}=[a-z0-9=/ ]{0,24}", 0..16)) {
            let resolver = SecretsResolver::new()
                .with_provider(Arc::new(RecordingProvider::new("gcp", "gcp:secretmanager:")))
                .unwrap();
            let input = crate::types::entries_from(raw);
            let rt = tokio::runtime::Runtime::new().unwrap();
            let output = rt
                .block_on(resolver.resolve(&ResolveContext::background(), &input))
                .unwrap();
            prop_assert_eq!(output, input);
        }
    }
}
