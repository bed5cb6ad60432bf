//! Core error type definitions

/// Result type alias for secrets-init operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for secrets-init operations using thiserror
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A provider could not build its client for the backing store
    ProviderInit {
        provider: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A short-form reference was used but the provider has no ambient scope
    UnresolvableScope { reference: String },

    /// The backing store failed to return the named secret
    SecretFetch {
        name: String,
        #[source]
        source: Box<Error>,
    },

    /// The backing store returned a payload that cannot be used as a value
    InvalidPayload { message: String },

    /// Two providers were registered for the same scheme tag
    DuplicateScheme { scheme: String },

    /// Configuration errors
    Configuration { message: String },

    /// Network-related errors
    Network { endpoint: String, message: String },

    /// The driving context was cancelled
    Cancelled { operation: String },

    /// Operation timeout errors
    Timeout {
        operation: String,
        duration: std::time::Duration,
    },
}
