//! Secret Manager access: the fetch-by-name boundary and its REST client

use crate::config::parse_endpoint;
use crate::metadata::TokenSource;
use crate::reference::SecretName;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use secrets_init_core::{Error, ResolveContext, Result, ResultExt};
use serde::Deserialize;
use std::fmt;
use url::Url;

/// Backing store that returns the raw payload of a secret version
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetch the payload of `name`. Called exactly once per reference per pass.
    async fn fetch_secret(&self, ctx: &ResolveContext, name: &SecretName) -> Result<Vec<u8>>;
}

/// Secret Manager v1 REST client (`secretmanager.versions.access`)
#[derive(Clone)]
pub struct SecretManagerClient {
    http: reqwest::Client,
    endpoint: String,
    tokens: TokenSource,
}

#[derive(Deserialize)]
struct AccessSecretVersionResponse {
    payload: Option<SecretPayload>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SecretPayload {
    #[serde(default)]
    data: String,
    data_crc32c: Option<Int64>,
}

/// proto3 JSON renders int64 as a string, but numbers are accepted too
#[derive(Deserialize)]
#[serde(untagged)]
enum Int64 {
    Text(String),
    Number(i64),
}

impl Int64 {
    fn value(&self) -> Option<i64> {
        match self {
            Int64::Text(raw) => raw.parse().ok(),
            Int64::Number(n) => Some(*n),
        }
    }
}

#[derive(Deserialize)]
struct GoogleErrorBody {
    error: GoogleErrorDetail,
}

#[derive(Deserialize)]
struct GoogleErrorDetail {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

impl SecretManagerClient {
    /// Use an existing HTTP client
    pub fn with_client(http: reqwest::Client, endpoint: &str, tokens: TokenSource) -> Result<Self> {
        let endpoint = parse_endpoint("secret_manager_endpoint", endpoint)?;
        Ok(Self {
            http,
            endpoint,
            tokens,
        })
    }

    /// The API base URL
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// `{endpoint}/v1/{name}:access`, one path segment per name component.
    ///
    /// Components are percent-encoded, so `?` and `#` stay in the path. Dot
    /// segments are refused since the request would address another secret.
    fn access_url(&self, name: &SecretName) -> Result<Url> {
        let mut url = Url::parse(&self.endpoint)
            .with_context(|| format!("secret_manager_endpoint '{}' is not a valid URL", self.endpoint))?;
        let parts: Vec<&str> = name.as_str().split('/').collect();
        if parts.iter().any(|part| matches!(*part, "." | "..")) {
            return Err(Error::configuration(format!(
                "secret name '{name}' contains a '.' or '..' path segment"
            )));
        }

        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                Error::configuration(format!(
                    "secret_manager_endpoint '{}' cannot be a base URL",
                    self.endpoint
                ))
            })?;
            segments.pop_if_empty().push("v1");
            if let Some((last, rest)) = parts.split_last() {
                segments.extend(rest);
                segments.push(&format!("{last}:access"));
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl SecretStore for SecretManagerClient {
    async fn fetch_secret(&self, ctx: &ResolveContext, name: &SecretName) -> Result<Vec<u8>> {
        let url = self.access_url(name)?;
        let token = self.tokens.token(ctx).await?;

        ctx.run("access secret version", async {
            let response = self
                .http
                .get(url.clone())
                .bearer_auth(token)
                .send()
                .await
                .map_err(|e| Error::network(url.as_str(), e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(Error::network(
                    url.as_str(),
                    format!("HTTP {status}: {}", describe_error_body(&body)),
                ));
            }

            let body: AccessSecretVersionResponse = response
                .json()
                .await
                .map_err(|e| Error::network(url.as_str(), format!("invalid response body: {e}")))?;
            decode_payload(body.payload)
        })
        .await
    }
}

impl fmt::Debug for SecretManagerClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretManagerClient")
            .field("endpoint", &self.endpoint)
            .field("tokens", &self.tokens)
            .finish()
    }
}

/// Base64-decode the payload and check it against `dataCrc32c` when present
fn decode_payload(payload: Option<SecretPayload>) -> Result<Vec<u8>> {
    let Some(payload) = payload else {
        return Err(Error::invalid_payload("response has no payload"));
    };
    let data = STANDARD
        .decode(payload.data.as_bytes())
        .map_err(|e| Error::invalid_payload(format!("payload is not valid base64: {e}")))?;

    if let Some(expected) = payload.data_crc32c.as_ref() {
        let expected = expected
            .value()
            .ok_or_else(|| Error::invalid_payload("dataCrc32c is not an integer"))?;
        let actual = i64::from(crc32c::crc32c(&data));
        if actual != expected {
            return Err(Error::invalid_payload(format!(
                "checksum mismatch: expected crc32c {expected}, got {actual}"
            )));
        }
    }
    Ok(data)
}

/// Pull `status: message` out of a Google API error body, or fall back to the raw text
fn describe_error_body(body: &str) -> String {
    match serde_json::from_str::<GoogleErrorBody>(body) {
        Ok(parsed) if !parsed.error.status.is_empty() => {
            format!("{}: {}", parsed.error.status, parsed.error.message)
        }
        Ok(parsed) => parsed.error.message,
        Err(_) => body.trim().chars().take(256).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(data: &str, crc: Option<Int64>) -> Option<SecretPayload> {
        Some(SecretPayload {
            data: data.to_string(),
            data_crc32c: crc,
        })
    }

    #[test]
    fn decodes_base64_payload() {
        let data = decode_payload(payload("aHVudGVyMg==", None)).unwrap();
        assert_eq!(data, b"hunter2");
    }

    #[test]
    fn verifies_checksum() {
        let crc = i64::from(crc32c::crc32c(b"hunter2"));
        let data = decode_payload(payload("aHVudGVyMg==", Some(Int64::Text(crc.to_string())))).unwrap();
        assert_eq!(data, b"hunter2");

        let data = decode_payload(payload("aHVudGVyMg==", Some(Int64::Number(crc)))).unwrap();
        assert_eq!(data, b"hunter2");

        let err = decode_payload(payload("aHVudGVyMg==", Some(Int64::Number(crc + 1)))).unwrap_err();
        assert!(matches!(err, Error::InvalidPayload { .. }));
        assert!(err.to_string().contains("checksum mismatch"));
    }

    #[test]
    fn rejects_bad_payloads() {
        assert!(matches!(
            decode_payload(None),
            Err(Error::InvalidPayload { .. })
        ));
        assert!(matches!(
            decode_payload(payload("not base64!", None)),
            Err(Error::InvalidPayload { .. })
        ));
        assert!(matches!(
            decode_payload(payload("", Some(Int64::Text("abc".into())))),
            Err(Error::InvalidPayload { .. })
        ));
    }

    #[test]
    fn empty_payload_is_empty_value() {
        assert!(decode_payload(payload("", None)).unwrap().is_empty());
    }

    #[test]
    fn describes_google_error_bodies() {
        let body = r#"{"error":{"code":404,"message":"Secret [projects/1/secrets/x] not found or has no versions.","status":"NOT_FOUND"}}"#;
        assert_eq!(
            describe_error_body(body),
            "NOT_FOUND: Secret [projects/1/secrets/x] not found or has no versions."
        );
        assert_eq!(describe_error_body("  upstream connect error  "), "upstream connect error");
    }

    fn client(endpoint: &str) -> SecretManagerClient {
        SecretManagerClient::with_client(
            reqwest::Client::new(),
            endpoint,
            TokenSource::Static("t".into()),
        )
        .unwrap()
    }

    fn name(raw: &str) -> SecretName {
        crate::reference::normalize_locator(raw, None).unwrap()
    }

    #[test]
    fn access_url_appends_method() {
        let client = client("https://secretmanager.googleapis.com/");
        let name = crate::reference::normalize_locator("db-pass", Some("p1")).unwrap();
        assert_eq!(
            client.access_url(&name).unwrap().as_str(),
            "https://secretmanager.googleapis.com/v1/projects/p1/secrets/db-pass/versions/latest:access"
        );
    }

    #[test]
    fn access_url_keeps_endpoint_path_prefix() {
        let client = client("http://127.0.0.1:9000/proxy/");
        assert_eq!(
            client.access_url(&name("projects/P/secrets/S/versions/2")).unwrap().as_str(),
            "http://127.0.0.1:9000/proxy/v1/projects/P/secrets/S/versions/2:access"
        );
    }

    #[test]
    fn access_url_encodes_reserved_characters() {
        let client = client("https://secretmanager.googleapis.com");
        let url = client
            .access_url(&name("projects/P/secrets/a#b?c/versions/latest"))
            .unwrap();
        assert_eq!(url.path(), "/v1/projects/P/secrets/a%23b%3Fc/versions/latest:access");
        assert!(url.query().is_none());
        assert!(url.fragment().is_none());
    }

    #[test]
    fn access_url_refuses_dot_segments() {
        let client = client("https://secretmanager.googleapis.com");
        for raw in [
            "projects/X/secrets/../../Q/secrets/S/versions/latest",
            "projects/X/secrets/./S/versions/latest",
        ] {
            let err = client.access_url(&name(raw)).unwrap_err();
            assert!(matches!(err, Error::Configuration { .. }), "{raw}: {err:?}");
        }
    }
}
