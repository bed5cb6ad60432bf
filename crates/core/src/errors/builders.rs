//! Builder methods for creating errors with context

use super::types::Error;

impl Error {
    /// Create a provider initialization error
    #[must_use]
    pub fn provider_init(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ProviderInit {
            provider: provider.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a provider initialization error with a source error
    #[must_use]
    pub fn provider_init_with_source(
        provider: impl Into<String>,
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Error::ProviderInit {
            provider: provider.into(),
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create an error for a short-form reference with no ambient scope
    #[must_use]
    pub fn unresolvable_scope(reference: impl Into<String>) -> Self {
        Error::UnresolvableScope {
            reference: reference.into(),
        }
    }

    /// Wrap a backing-store failure with the name that was being fetched
    #[must_use]
    pub fn secret_fetch(name: impl Into<String>, source: Error) -> Self {
        Error::SecretFetch {
            name: name.into(),
            source: Box::new(source),
        }
    }

    /// Create an invalid payload error
    #[must_use]
    pub fn invalid_payload(message: impl Into<String>) -> Self {
        Error::InvalidPayload {
            message: message.into(),
        }
    }

    /// Create a duplicate scheme registration error
    #[must_use]
    pub fn duplicate_scheme(scheme: impl Into<String>) -> Self {
        Error::DuplicateScheme {
            scheme: scheme.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    /// Create a network error
    #[must_use]
    pub fn network(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Network {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create a cancellation error
    #[must_use]
    pub fn cancelled(operation: impl Into<String>) -> Self {
        Error::Cancelled {
            operation: operation.into(),
        }
    }

    /// Create a timeout error
    #[must_use]
    pub fn timeout(operation: impl Into<String>, duration: std::time::Duration) -> Self {
        Error::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Whether this error, or the error it wraps, came from the driving context
    /// being cancelled or running past its deadline.
    #[must_use]
    pub fn is_interrupted(&self) -> bool {
        match self {
            Error::Cancelled { .. } | Error::Timeout { .. } => true,
            Error::SecretFetch { source, .. } => source.is_interrupted(),
            _ => false,
        }
    }
}
