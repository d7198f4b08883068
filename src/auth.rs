//! Access-token resolution for the Docs API.
//!
//! Token issuing is someone else's job; this module only turns what is on
//! disk (or in the environment) into a bearer token:
//!
//! 1. `PDF2DOCS_ACCESS_TOKEN`, used verbatim.
//! 2. The authorized-user JSON file (`token.json` by default, the format the
//!    Google client libraries write). With a refresh token and client
//!    credentials a fresh access token is requested from `token_uri`;
//!    otherwise the stored `token` is used as-is.
//!
//! The token must carry the `https://www.googleapis.com/auth/documents` scope.

use crate::error::Pdf2DocsError;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};

/// Environment variable that short-circuits credential file handling.
pub const ACCESS_TOKEN_ENV: &str = "PDF2DOCS_ACCESS_TOKEN";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Contents of an authorized-user credentials file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorizedUser {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub token_uri: Option<String>,
}

impl AuthorizedUser {
    /// Form parameters for a refresh-token grant, if the file has everything
    /// the grant needs.
    fn refresh_params(&self) -> Option<[(&'static str, &str); 4]> {
        Some([
            ("grant_type", "refresh_token"),
            ("refresh_token", self.refresh_token.as_deref()?),
            ("client_id", self.client_id.as_deref()?),
            ("client_secret", self.client_secret.as_deref()?),
        ])
    }

    fn token_uri(&self) -> &str {
        self.token_uri.as_deref().unwrap_or(DEFAULT_TOKEN_URI)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Resolve a bearer token from the environment or `credentials_path`.
pub async fn resolve_access_token(
    http: &reqwest::Client,
    credentials_path: &Path,
) -> Result<String, Pdf2DocsError> {
    if let Ok(token) = std::env::var(ACCESS_TOKEN_ENV) {
        if !token.trim().is_empty() {
            debug!("Using access token from {}", ACCESS_TOKEN_ENV);
            return Ok(token.trim().to_string());
        }
    }
    token_from_file(http, credentials_path).await
}

async fn token_from_file(
    http: &reqwest::Client,
    credentials_path: &Path,
) -> Result<String, Pdf2DocsError> {
    let raw = tokio::fs::read_to_string(credentials_path)
        .await
        .map_err(|e| Pdf2DocsError::CredentialsUnavailable {
            detail: format!(
                "cannot read '{}': {e}. Set {} or provide an authorized-user file.",
                credentials_path.display(),
                ACCESS_TOKEN_ENV
            ),
        })?;
    let user: AuthorizedUser =
        serde_json::from_str(&raw).map_err(|e| Pdf2DocsError::CredentialsUnavailable {
            detail: format!("'{}' is not valid JSON: {e}", credentials_path.display()),
        })?;

    if let Some(params) = user.refresh_params() {
        match refresh(http, user.token_uri(), &params).await {
            Ok(token) => return Ok(token),
            Err(e) if user.token.is_some() => {
                warn!("Token refresh failed, falling back to stored token: {}", e);
            }
            Err(e) => return Err(e),
        }
    }

    user.token
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| Pdf2DocsError::CredentialsUnavailable {
            detail: format!(
                "'{}' has neither a refresh token with client credentials nor a stored token",
                credentials_path.display()
            ),
        })
}

async fn refresh(
    http: &reqwest::Client,
    token_uri: &str,
    params: &[(&'static str, &str); 4],
) -> Result<String, Pdf2DocsError> {
    debug!("Refreshing access token at {}", token_uri);
    let fail = |detail: String| Pdf2DocsError::CredentialsUnavailable { detail };

    let response = http
        .post(token_uri)
        .form(params)
        .send()
        .await
        .map_err(|e| fail(format!("token refresh request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(fail(format!("token refresh rejected (HTTP {status}): {}", body.trim())));
    }

    let parsed: TokenResponse = response
        .json()
        .await
        .map_err(|e| fail(format!("unexpected token response: {e}")))?;
    Ok(parsed.access_token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_json(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn refresh_params_need_all_three_fields() {
        let full: AuthorizedUser = serde_json::from_str(
            r#"{"refresh_token": "r", "client_id": "id", "client_secret": "s"}"#,
        )
        .unwrap();
        let params = full.refresh_params().unwrap();
        assert_eq!(params[0], ("grant_type", "refresh_token"));
        assert_eq!(params[1], ("refresh_token", "r"));
        assert_eq!(full.token_uri(), DEFAULT_TOKEN_URI);

        let partial: AuthorizedUser =
            serde_json::from_str(r#"{"refresh_token": "r", "client_id": "id"}"#).unwrap();
        assert!(partial.refresh_params().is_none());
    }

    #[tokio::test]
    async fn stored_token_is_used_without_refresh_credentials() {
        let file = write_json(r#"{"token": "ya29.stored", "scopes": ["https://www.googleapis.com/auth/documents"]}"#);
        let http = reqwest::Client::new();
        let token = token_from_file(&http, file.path()).await.unwrap();
        assert_eq!(token, "ya29.stored");
    }

    #[tokio::test]
    async fn missing_file_is_reported() {
        let http = reqwest::Client::new();
        let err = token_from_file(&http, Path::new("/definitely/not/here/token.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, Pdf2DocsError::CredentialsUnavailable { .. }));
        assert!(err.to_string().contains(ACCESS_TOKEN_ENV));
    }

    #[tokio::test]
    async fn file_without_any_token_is_rejected() {
        let file = write_json(r#"{"client_id": "id"}"#);
        let http = reqwest::Client::new();
        let err = token_from_file(&http, file.path()).await.unwrap_err();
        assert!(matches!(err, Pdf2DocsError::CredentialsUnavailable { .. }));
    }

    #[tokio::test]
    async fn failed_refresh_falls_back_to_stored_token() {
        // Nothing listens on port 9 locally, so the refresh fails fast.
        let file = write_json(
            r#"{"token": "ya29.stale", "refresh_token": "r", "client_id": "id",
                "client_secret": "s", "token_uri": "http://127.0.0.1:9/token"}"#,
        );
        let http = reqwest::Client::new();
        let token = token_from_file(&http, file.path()).await.unwrap();
        assert_eq!(token, "ya29.stale");
    }

    #[tokio::test]
    async fn refresh_grant_replaces_stored_token() {
        let (base, server) = crate::test_http::serve_once(
            200,
            r#"{"access_token": "ya29.fresh", "expires_in": 3599, "token_type": "Bearer"}"#,
        )
        .await;
        let file = write_json(&format!(
            r#"{{"token": "ya29.stale", "refresh_token": "r-1", "client_id": "id",
                "client_secret": "s", "token_uri": "{base}/token"}}"#
        ));
        let http = reqwest::Client::new();

        let token = token_from_file(&http, file.path()).await.unwrap();
        assert_eq!(token, "ya29.fresh");

        let seen = server.await.unwrap();
        assert_eq!(seen.request_line, "POST /token HTTP/1.1");
        assert_eq!(
            seen.header("content-type"),
            Some("application/x-www-form-urlencoded")
        );
        assert_eq!(
            seen.body,
            "grant_type=refresh_token&refresh_token=r-1&client_id=id&client_secret=s"
        );
    }

    #[tokio::test]
    async fn rejected_refresh_without_stored_token_fails() {
        let (base, _server) =
            crate::test_http::serve_once(400, r#"{"error": "invalid_grant"}"#).await;
        let file = write_json(&format!(
            r#"{{"refresh_token": "r-1", "client_id": "id", "client_secret": "s",
                "token_uri": "{base}/token"}}"#
        ));
        let http = reqwest::Client::new();

        let err = token_from_file(&http, file.path()).await.unwrap_err();
        assert!(err.to_string().contains("invalid_grant"));
    }
}
