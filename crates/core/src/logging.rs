//! Tracing subscriber setup for the embedding launcher.
//!
//! Output goes to stderr so the wrapped process keeps stdout to itself. The
//! filter is read from `SECRETS_INIT_LOG` and uses `EnvFilter` syntax.

use crate::constants::{DEFAULT_LOG_FILTER, SECRETS_INIT_LOG_VAR};
use crate::errors::{Error, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the filter from a directive string, falling back to `info`
pub fn env_filter(directives: Option<&str>) -> Result<EnvFilter> {
    let directives = directives
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or(DEFAULT_LOG_FILTER);
    EnvFilter::try_new(directives)
        .map_err(|e| Error::configuration(format!("invalid log filter '{directives}': {e}")))
}

/// Install the global subscriber using `SECRETS_INIT_LOG`
pub fn init_tracing() -> Result<()> {
    let directives = std::env::var(SECRETS_INIT_LOG_VAR).ok();
    init_tracing_with(directives.as_deref())
}

/// Install the global subscriber with explicit filter directives.
///
/// Invalid directives are an error. If a global subscriber is already
/// installed it is left in place and this returns `Ok(())`.
pub fn init_tracing_with(directives: Option<&str>) -> Result<()> {
    let filter = env_filter(directives)?;
    let installed = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(filter)
        .try_init();
    if let Err(e) = installed {
        tracing::debug!(error = %e, "tracing subscriber already installed");
    }
    Ok(())
}
