//! Environment entry types

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single `KEY=VALUE` environment entry as handed over by the launcher.
///
/// The entry is kept verbatim. Splitting happens on the first `=` only, so the
/// value may itself contain `=`. Entries without a `=` or with an empty key
/// are still carried (and passed through resolution untouched), they simply
/// have no key/value view.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnvEntry(String);

impl EnvEntry {
    /// Wrap a raw `KEY=VALUE` string
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Build an entry from its parts
    #[must_use]
    pub fn from_pair(key: &str, value: &str) -> Self {
        Self(format!("{key}={value}"))
    }

    /// Split into key and value on the first `=`.
    ///
    /// Returns `None` when there is no `=` or the key is empty.
    #[must_use]
    pub fn split(&self) -> Option<(&str, &str)> {
        match self.0.split_once('=') {
            Some((key, value)) if !key.is_empty() => Some((key, value)),
            _ => None,
        }
    }

    /// The key, if the entry is well formed
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.split().map(|(key, _)| key)
    }

    /// The value, if the entry is well formed
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.split().map(|(_, value)| value)
    }

    /// A copy of this entry with the value replaced, keeping the key
    #[must_use]
    pub fn with_value(&self, value: &str) -> Self {
        match self.key() {
            Some(key) => Self::from_pair(key, value),
            None => self.clone(),
        }
    }

    /// Get the raw entry
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to the inner String
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for EnvEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for EnvEntry {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<&str> for EnvEntry {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl From<EnvEntry> for String {
    fn from(entry: EnvEntry) -> Self {
        entry.0
    }
}

/// Wrap a sequence of raw strings, keeping their order
pub fn entries_from<I, S>(raw: I) -> Vec<EnvEntry>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    raw.into_iter().map(EnvEntry::new).collect()
}

/// Unwrap entries back into raw strings, keeping their order
#[must_use]
pub fn entries_into_strings(entries: Vec<EnvEntry>) -> Vec<String> {
    entries.into_iter().map(EnvEntry::into_inner).collect()
}
