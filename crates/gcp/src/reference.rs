//! Secret Manager addressing: locator parsing and name normalisation.
//!
//! A locator is what follows the `gcp:secretmanager:` tag:
//!
//! ```text
//! secret-locator := short-name [ "/versions/" version ]
//!                 | "projects/" scope "/secrets/" short-name [ "/versions/" version ]
//! ```
//!
//! Classification is structural only. Anything that contains
//! `projects/<id>/secrets/<name>` anywhere is fully qualified, whatever its
//! components contain; everything else is a short name. A secret component
//! starting with `+` is not recognised as qualified.

use lazy_static::lazy_static;
use regex::Regex;
use secrets_init_core::{Error, Result, LATEST_VERSION};
use std::fmt;

/// Separator that marks an explicit version in a secret name
pub const VERSIONS_SEGMENT: &str = "/versions/";

lazy_static! {
    // projects/{id}/secrets/{name} anywhere in the locator
    static ref FULLY_QUALIFIED_REGEX: Regex = Regex::new(r"projects/[^/]+/secrets/[^/+]").unwrap();
}

/// A secret locator in one of its two addressing forms
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretLocator {
    /// Bare secret name, resolved against the provider's project
    Short(String),
    /// `projects/{id}/secrets/{name}...`, independent of any ambient project
    FullyQualified(String),
}

impl SecretLocator {
    /// Classify a raw locator
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if FULLY_QUALIFIED_REGEX.is_match(raw) {
            SecretLocator::FullyQualified(raw.to_string())
        } else {
            SecretLocator::Short(raw.to_string())
        }
    }

    /// Whether the locator carries its own project
    #[must_use]
    pub fn is_fully_qualified(&self) -> bool {
        matches!(self, SecretLocator::FullyQualified(_))
    }

    /// The locator as written
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            SecretLocator::Short(raw) | SecretLocator::FullyQualified(raw) => raw,
        }
    }

    /// Produce the fully-qualified, version-pinned name to fetch.
    ///
    /// Short names need `project`; without one this fails with
    /// [`Error::UnresolvableScope`]. A name that already contains a
    /// `/versions/` segment keeps it as is, even if the version is malformed.
    pub fn normalize(&self, project: Option<&str>) -> Result<SecretName> {
        let qualified = match self {
            SecretLocator::FullyQualified(name) => name.clone(),
            SecretLocator::Short(name) => match project.filter(|p| !p.is_empty()) {
                Some(project) => format!("projects/{project}/secrets/{name}"),
                None => return Err(Error::unresolvable_scope(name.as_str())),
            },
        };

        if qualified.contains(VERSIONS_SEGMENT) {
            Ok(SecretName(qualified))
        } else {
            Ok(SecretName(format!(
                "{qualified}{VERSIONS_SEGMENT}{LATEST_VERSION}"
            )))
        }
    }
}

impl fmt::Display for SecretLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A fully-qualified, version-pinned secret version name,
/// e.g. `projects/p1/secrets/db-pass/versions/latest`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SecretName(String);

impl SecretName {
    /// Get the name as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to inner String
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for SecretName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for SecretName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Parse and normalise a locator in one step
pub fn normalize_locator(raw: &str, project: Option<&str>) -> Result<SecretName> {
    SecretLocator::parse(raw).normalize(project)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalized(raw: &str, project: Option<&str>) -> String {
        normalize_locator(raw, project).unwrap().into_inner()
    }

    #[test]
    fn short_name_gets_project_and_latest() {
        assert_eq!(
            normalized("secretA", Some("p1")),
            "projects/p1/secrets/secretA/versions/latest"
        );
    }

    #[test]
    fn short_name_keeps_explicit_version() {
        assert_eq!(
            normalized("secretA/versions/3", Some("p1")),
            "projects/p1/secrets/secretA/versions/3"
        );
    }

    #[test]
    fn fully_qualified_ignores_ambient_project() {
        assert_eq!(
            normalized("projects/P/secrets/S/versions/7", Some("other")),
            "projects/P/secrets/S/versions/7"
        );
        assert_eq!(
            normalized("projects/P/secrets/S", Some("other")),
            "projects/P/secrets/S/versions/latest"
        );
    }

    #[test]
    fn fully_qualified_needs_no_project() {
        assert_eq!(
            normalized("projects/P/secrets/S", None),
            "projects/P/secrets/S/versions/latest"
        );
        assert_eq!(normalized("projects/P/secrets/S", Some("")), "projects/P/secrets/S/versions/latest");
    }

    #[test]
    fn short_name_without_project_is_unresolvable() {
        for project in [None, Some("")] {
            let err = normalize_locator("secretA", project).unwrap_err();
            assert!(
                matches!(err, Error::UnresolvableScope { ref reference } if reference == "secretA"),
                "unexpected error: {err:?}"
            );
        }
    }

    #[test]
    fn any_versions_segment_counts_as_pinned() {
        assert_eq!(
            normalized("projects/P/secrets/S/versions/", None),
            "projects/P/secrets/S/versions/"
        );
        assert_eq!(
            normalized("projects/P/secrets/S/versions/not a version", None),
            "projects/P/secrets/S/versions/not a version"
        );
    }

    #[test]
    fn misspelt_version_segment_is_not_a_version() {
        assert_eq!(
            normalized("projects/P/secrets/S/version/1", None),
            "projects/P/secrets/S/version/1/versions/latest"
        );
    }

    #[test]
    fn classification_is_structural_only() {
        assert!(SecretLocator::parse("projects/P/secrets/S").is_fully_qualified());
        assert!(SecretLocator::parse("projects/P/secrets/S/anything/else").is_fully_qualified());
        assert!(SecretLocator::parse("projects/we ird/secrets/n@me").is_fully_qualified());
        assert!(SecretLocator::parse("prefix/projects/P/secrets/S").is_fully_qualified());

        assert!(!SecretLocator::parse("projects/P/secrets/+x").is_fully_qualified());
        assert!(!SecretLocator::parse("projects//secrets/S").is_fully_qualified());
        assert!(!SecretLocator::parse("projects/P/secrets/").is_fully_qualified());
        assert!(!SecretLocator::parse("projects/P").is_fully_qualified());
        assert!(!SecretLocator::parse("secretA").is_fully_qualified());
    }

    #[test]
    fn embedded_qualified_name_is_fetched_as_written() {
        for project in [None, Some("p1")] {
            assert_eq!(
                normalized("team/projects/P/secrets/S", project),
                "team/projects/P/secrets/S/versions/latest"
            );
        }
    }

    #[test]
    fn plus_prefixed_secret_is_a_short_name() {
        assert_eq!(
            normalized("projects/P/secrets/+x", Some("p1")),
            "projects/p1/secrets/projects/P/secrets/+x/versions/latest"
        );
        assert!(normalize_locator("projects/P/secrets/+x", None).is_err());
    }

    #[test]
    fn short_name_with_slash_is_rewritten_verbatim() {
        assert_eq!(
            normalized("team/db-pass", Some("p1")),
            "projects/p1/secrets/team/db-pass/versions/latest"
        );
    }

    #[test]
    fn locator_displays_as_written() {
        let locator = SecretLocator::parse("db-pass/versions/2");
        assert_eq!(locator.to_string(), "db-pass/versions/2");
        assert_eq!(locator.as_str(), "db-pass/versions/2");
    }
}
