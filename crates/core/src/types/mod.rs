//! Core domain types.
//!
//! - **`environment`**: the `KEY=VALUE` entry type resolution works on

pub mod environment;

pub use environment::*;
