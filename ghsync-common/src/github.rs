//! GitHub REST API boundary: installation discovery and token exchange.
//!
//! Two endpoints, both bearer-assertion authenticated:
//!
//! 1. `GET /app/installations` - list installations visible to the signing
//!    identity; selection is first-in-response-order.
//! 2. `POST /app/installations/{id}/access_tokens` - mint a one-hour
//!    installation access token.
//!
//! Response-body interpretation lives in pure helper functions so the
//! empty-list and null-token paths are unit-testable without a network.

use secrecy::SecretString;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Failures at the API boundary.
#[derive(Debug, Error)]
pub enum GitHubError {
    /// The remote reported an authorization error for the assertion.
    #[error("GitHub rejected the assertion (HTTP {status}): {body}")]
    AuthRejected { status: u16, body: String },

    /// The installation list came back empty but valid.
    #[error("the App is not installed on any account or organization")]
    NoInstallationFound,

    /// Token exchange failed or carried no usable token.
    #[error("installation token request failed: {reason}")]
    TokenRequestFailed { reason: String },

    /// Transport-level failure.
    #[error("GitHub API request failed: {0}")]
    Http(String),

    /// Non-auth HTTP error status.
    #[error("GitHub API error (HTTP {status}): {body}")]
    Status { status: u16, body: String },

    /// Body did not match the expected shape.
    #[error("malformed GitHub API response: {0}")]
    MalformedResponse(String),
}

/// A discovered installation of the App. Fetched, never mutated.
#[derive(Debug, Clone, Deserialize)]
pub struct InstallationRecord {
    /// Installation identifier used in the token-exchange path.
    pub id: u64,
    /// Owning account, when the API includes it.
    #[serde(default)]
    pub account: Option<InstallationAccount>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstallationAccount {
    pub login: String,
}

/// Installation-scoped access token. One-hour validity enforced remotely;
/// no local expiry tracking - exhaustion surfaces as a git auth failure and
/// the recovery is to re-run issuance.
pub struct AccessToken {
    /// The token itself, kept out of logs and `Debug` output.
    pub secret: SecretString,
    /// Remote-reported expiry, RFC 3339; informational only.
    pub expires_at: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: Option<String>,
    #[serde(default)]
    expires_at: Option<String>,
}

/// Blocking client over the two issuance endpoints.
pub struct GitHubClient {
    api_base_url: String,
    http: reqwest::blocking::Client,
}

const USER_AGENT: &str = concat!("ghsync/", env!("CARGO_PKG_VERSION"));
const API_VERSION: &str = "2022-11-28";

impl GitHubClient {
    /// Creates a client for the given API base URL (overridable for tests).
    ///
    /// # Errors
    ///
    /// Returns [`GitHubError::Http`] when the HTTP client cannot be built.
    pub fn new(api_base_url: impl Into<String>) -> Result<Self, GitHubError> {
        let http = reqwest::blocking::Client::builder()
            .connect_timeout(Duration::from_secs(15))
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| GitHubError::Http(e.to_string()))?;
        Ok(Self {
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Lists installations and selects one.
    ///
    /// # Errors
    ///
    /// [`GitHubError::AuthRejected`] on 401/403 (bad credentials),
    /// [`GitHubError::NoInstallationFound`] on an empty-but-valid response -
    /// surfaced distinctly so an operator can tell "app not installed
    /// anywhere" from "bad credentials".
    pub fn resolve_installation(&self, assertion: &str) -> Result<InstallationRecord, GitHubError> {
        let url = format!("{}/app/installations", self.api_base_url);
        let response = self
            .http
            .get(url)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", USER_AGENT)
            .header("X-GitHub-Api-Version", API_VERSION)
            .bearer_auth(assertion)
            .send()
            .map_err(|e| GitHubError::Http(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| GitHubError::Http(e.to_string()))?;
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(GitHubError::AuthRejected {
                status: status.as_u16(),
                body,
            });
        }
        if !status.is_success() {
            return Err(GitHubError::Status {
                status: status.as_u16(),
                body,
            });
        }

        select_installation(&body)
    }

    /// Exchanges a fresh assertion for an installation access token.
    ///
    /// # Errors
    ///
    /// Any missing, null, or empty `token` field in the response is a hard
    /// [`GitHubError::TokenRequestFailed`]; an empty token is never
    /// propagated downstream.
    pub fn exchange(
        &self,
        assertion: &str,
        installation_id: u64,
    ) -> Result<AccessToken, GitHubError> {
        let url = format!(
            "{}/app/installations/{}/access_tokens",
            self.api_base_url, installation_id
        );
        let response = self
            .http
            .post(url)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", USER_AGENT)
            .header("X-GitHub-Api-Version", API_VERSION)
            .bearer_auth(assertion)
            .send()
            .map_err(|e| GitHubError::Http(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| GitHubError::Http(e.to_string()))?;
        if !status.is_success() {
            return Err(GitHubError::TokenRequestFailed {
                reason: format!("HTTP {}: {}", status.as_u16(), body),
            });
        }

        token_from_response(&body)
    }
}

/// Picks the first installation from a list-installations body.
fn select_installation(body: &str) -> Result<InstallationRecord, GitHubError> {
    let installations: Vec<InstallationRecord> =
        serde_json::from_str(body).map_err(|e| GitHubError::MalformedResponse(e.to_string()))?;
    installations
        .into_iter()
        .next()
        .ok_or(GitHubError::NoInstallationFound)
}

/// Extracts the access token from an exchange response body.
fn token_from_response(body: &str) -> Result<AccessToken, GitHubError> {
    let parsed: TokenResponse =
        serde_json::from_str(body).map_err(|e| GitHubError::MalformedResponse(e.to_string()))?;
    match parsed.token {
        Some(token) if !token.trim().is_empty() => Ok(AccessToken {
            secret: SecretString::from(token),
            expires_at: parsed.expires_at.unwrap_or_default(),
        }),
        Some(_) => Err(GitHubError::TokenRequestFailed {
            reason: "response carried an empty token field".to_string(),
        }),
        None => Err(GitHubError::TokenRequestFailed {
            reason: "response carried no token field".to_string(),
        }),
    }
}
