//! End-to-end token issuance.
//!
//! Strict sequence: read blob → decrypt → sign → resolve installation →
//! sign again (fresh validity window) → exchange. Any failure here is fatal
//! to the run; the decrypted key handle is dropped (and zeroized) before this
//! function returns on every path.

use thiserror::Error;
use tracing::{debug, info};

use crate::assertion::{AssertionError, AssertionSigner};
use crate::config::{AppConfig, ConfigError};
use crate::github::{AccessToken, GitHubClient, GitHubError};
use crate::vault::{KeyVault, VaultError};

/// Fatal issuance-phase errors.
#[derive(Debug, Error)]
pub enum IssuanceError {
    #[error("configuration is incomplete")]
    Configuration(Vec<ConfigError>),

    #[error(transparent)]
    Vault(#[from] VaultError),

    #[error(transparent)]
    Assertion(#[from] AssertionError),

    #[error(transparent)]
    GitHub(#[from] GitHubError),
}

impl IssuanceError {
    /// Stable catalog code for this failure.
    pub fn code(&self) -> crate::ErrorCode {
        match self {
            Self::Configuration(errors) => {
                if errors
                    .iter()
                    .any(|e| matches!(e, ConfigError::Placeholder { .. }))
                {
                    crate::ErrorCode::ConfigPlaceholder
                } else if errors
                    .iter()
                    .any(|e| matches!(e, ConfigError::PathNotFound { .. }))
                {
                    crate::ErrorCode::ConfigKeyFileError
                } else {
                    crate::ErrorCode::ConfigMissing
                }
            }
            Self::Vault(_) => crate::ErrorCode::DecryptionFailed,
            Self::Assertion(_) => crate::ErrorCode::AssertionSignFailed,
            Self::GitHub(GitHubError::AuthRejected { .. }) => crate::ErrorCode::AuthRejected,
            Self::GitHub(GitHubError::NoInstallationFound) => crate::ErrorCode::NoInstallationFound,
            Self::GitHub(_) => crate::ErrorCode::TokenRequestFailed,
        }
    }
}

/// Runs the full issuance pipeline for an already-validated configuration.
///
/// # Errors
///
/// Returns the first fatal [`IssuanceError`]; there are no retries.
pub fn issue_token(config: &AppConfig) -> Result<AccessToken, IssuanceError> {
    let blob = KeyVault::read_blob(&config.key_path)?;
    debug!(path = %config.key_path.display(), bytes = blob.len(), "read encrypted key artifact");

    let handle = KeyVault::decrypt(&blob, &config.password_hash)?;
    info!("decrypted signing key into ephemeral handle");

    let signer = AssertionSigner::new(config.issuer());
    let client = GitHubClient::new(&config.api_base_url)?;

    let discovery = signer.sign(&handle)?;
    let installation = client.resolve_installation(discovery.bearer())?;
    info!(
        installation = installation.id,
        account = installation
            .account
            .as_ref()
            .map(|a| a.login.as_str())
            .unwrap_or("<unknown>"),
        "resolved App installation"
    );

    // Fresh assertion for the exchange; the discovery one is never reused.
    let exchange = signer.sign(&handle)?;
    let token = client.exchange(exchange.bearer(), installation.id)?;
    info!(expires_at = %token.expires_at, "issued installation access token");

    Ok(token)
}

/// Loads configuration and runs [`issue_token`].
///
/// # Errors
///
/// Returns [`IssuanceError::Configuration`] before any network activity when
/// required values are missing or placeholder-valued.
pub fn issue_token_from_env() -> Result<AccessToken, IssuanceError> {
    let config = AppConfig::load().map_err(IssuanceError::Configuration)?;
    issue_token(&config)
}
