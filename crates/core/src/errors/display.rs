//! Display implementations for error types

use super::types::Error;
use std::fmt;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ProviderInit {
                provider, message, ..
            } => {
                write!(f, "failed to initialize {provider} provider: {message}")
            }
            Error::UnresolvableScope { reference } => {
                write!(
                    f,
                    "failed to resolve secret '{reference}': no project is configured or detectable for short secret names"
                )
            }
            Error::SecretFetch { name, source } => {
                write!(f, "failed to fetch secret '{name}': {source}")
            }
            Error::InvalidPayload { message } => {
                write!(f, "invalid secret payload: {message}")
            }
            Error::DuplicateScheme { scheme } => {
                write!(f, "a provider is already registered for scheme '{scheme}'")
            }
            Error::Configuration { message } => {
                write!(f, "configuration error: {message}")
            }
            Error::Network { endpoint, message } => {
                write!(f, "network error for '{endpoint}': {message}")
            }
            Error::Cancelled { operation } => {
                write!(f, "operation '{operation}' was cancelled")
            }
            Error::Timeout {
                operation,
                duration,
            } => {
                write!(f, "operation '{operation}' timed out after {duration:?}")
            }
        }
    }
}
