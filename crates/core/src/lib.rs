//! Core types, errors, and the provider abstraction for `secrets-init`.
//!
//! `secrets-init` replaces secret references found in a process environment
//! (`KEY=gcp:secretmanager:db-pass`) with the secret values themselves, right
//! before the launcher starts the wrapped process.
//!
//! ## Key Components
//!
//! - **`errors`**: the `Error` enum and `Result` alias shared by every crate.
//! - **`types`**: `EnvEntry`, a `KEY=VALUE` entry split on its first `=`.
//! - **`context`**: `ResolveContext`, the deadline and cancellation signal
//!   threaded through every backing-store call.
//! - **`provider`**: the `SecretsProvider` trait implemented once per backing
//!   secret store.
//! - **`resolver`**: `SecretsResolver`, which dispatches entries to providers
//!   by scheme tag.
//! - **`logging`**: tracing subscriber setup for the embedding launcher.

pub mod constants;
pub mod context;
pub mod errors;
pub mod logging;
pub mod provider;
pub mod resolver;
pub mod types;

pub use self::{
    constants::*,
    context::{CancelHandle, ResolveContext},
    errors::{Error, Result, ResultExt},
    provider::{substitute_entry, SecretsProvider},
    resolver::SecretsResolver,
    types::*,
};
