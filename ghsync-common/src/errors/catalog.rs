//! Error catalog for ghsync.
//!
//! Every failure mode surfaced to an operator maps to a stable code in the
//! `GHS-Exxx` format with a message template and remediation steps, so a
//! failed run can be acted on without consulting anything beyond its output.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error code enumeration covering all ghsync failure scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorCode {
    // =========================================================================
    // Config Errors (E001-E099)
    // =========================================================================
    /// Required configuration value is unset
    ConfigMissing,
    /// Configuration value still holds a setup placeholder
    ConfigPlaceholder,
    /// Encrypted key artifact not found or unreadable
    ConfigKeyFileError,

    // =========================================================================
    // Issuance Errors (E100-E199)
    // =========================================================================
    /// Private-key blob could not be decrypted
    DecryptionFailed,
    /// Assertion could not be signed
    AssertionSignFailed,
    /// GitHub rejected the signed assertion
    AuthRejected,
    /// The App has no installations
    NoInstallationFound,
    /// Token exchange failed or returned no token
    TokenRequestFailed,

    // =========================================================================
    // Record Errors (E200-E299)
    // =========================================================================
    /// Repo list line has a malformed `owner/name` identifier
    RecordInvalid,
    /// Destination holds conflicting content (foreign repo or non-git files)
    DestinationConflict,

    // =========================================================================
    // Git Errors (E300-E399)
    // =========================================================================
    /// Clone or pull operation failed
    GitOperationFailed,
    /// Stash reapply left conflicts behind
    StashReapplyConflict,

    // =========================================================================
    // Internal Errors (E500-E599)
    // =========================================================================
    /// Unexpected internal error
    Internal,
}

/// Error category by subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Config,
    Issuance,
    Records,
    Git,
    Internal,
}

/// A fully resolved catalog entry for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEntry {
    /// Error code string (e.g., "GHS-E101")
    pub code: String,
    /// Error category
    pub category: ErrorCategory,
    /// Human-readable error message
    pub message: String,
    /// Steps to remediate the error
    pub remediation: Vec<String>,
}

impl ErrorCode {
    /// Numeric portion of the error code.
    #[must_use]
    pub const fn code_number(&self) -> u16 {
        match self {
            Self::ConfigMissing => 1,
            Self::ConfigPlaceholder => 2,
            Self::ConfigKeyFileError => 3,
            Self::DecryptionFailed => 100,
            Self::AssertionSignFailed => 101,
            Self::AuthRejected => 102,
            Self::NoInstallationFound => 103,
            Self::TokenRequestFailed => 104,
            Self::RecordInvalid => 200,
            Self::DestinationConflict => 201,
            Self::GitOperationFailed => 300,
            Self::StashReapplyConflict => 301,
            Self::Internal => 500,
        }
    }

    /// Full code string, e.g. `GHS-E100`.
    #[must_use]
    pub fn code_string(&self) -> String {
        format!("GHS-E{:03}", self.code_number())
    }

    /// Category for this code.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigMissing | Self::ConfigPlaceholder | Self::ConfigKeyFileError => {
                ErrorCategory::Config
            }
            Self::DecryptionFailed
            | Self::AssertionSignFailed
            | Self::AuthRejected
            | Self::NoInstallationFound
            | Self::TokenRequestFailed => ErrorCategory::Issuance,
            Self::RecordInvalid | Self::DestinationConflict => ErrorCategory::Records,
            Self::GitOperationFailed | Self::StashReapplyConflict => ErrorCategory::Git,
            Self::Internal => ErrorCategory::Internal,
        }
    }

    /// Whether this error aborts the whole run (as opposed to one record).
    #[must_use]
    pub const fn fatal(&self) -> bool {
        matches!(self.category(), ErrorCategory::Config | ErrorCategory::Issuance)
    }

    /// Returns the error message template.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::ConfigMissing => "Required configuration value is not set",
            Self::ConfigPlaceholder => "Configuration value still holds a setup placeholder",
            Self::ConfigKeyFileError => "Encrypted key artifact not found or unreadable",
            Self::DecryptionFailed => "Private key blob could not be decrypted",
            Self::AssertionSignFailed => "App assertion could not be signed",
            Self::AuthRejected => "GitHub rejected the signed assertion",
            Self::NoInstallationFound => "The App has no installations",
            Self::TokenRequestFailed => "Installation token exchange failed",
            Self::RecordInvalid => "Repo list entry has a malformed owner/name identifier",
            Self::DestinationConflict => "Destination holds conflicting content",
            Self::GitOperationFailed => "Git clone or pull failed",
            Self::StashReapplyConflict => "Stashed local changes did not reapply cleanly",
            Self::Internal => "Unexpected internal error",
        }
    }

    /// Remediation steps for this code.
    #[must_use]
    pub const fn remediation(&self) -> &'static [&'static str] {
        match self {
            Self::ConfigMissing => &[
                "Set all GHSYNC_* variables: APP_ID, CLIENT_ID, KEY_FILE, PASSWORD_HASH",
            ],
            Self::ConfigPlaceholder => &[
                "Replace the placeholder with the real value from your App settings",
            ],
            Self::ConfigKeyFileError => &[
                "Check that GHSYNC_KEY_FILE points at the encrypted key artifact",
                "Re-run the setup flow if the artifact was never generated",
            ],
            Self::DecryptionFailed => &[
                "Verify GHSYNC_PASSWORD_HASH matches the hash used at setup time",
                "Re-encrypt the private key if the artifact is corrupted",
            ],
            Self::AssertionSignFailed => &[
                "The decrypted key is not a valid RSA PEM; re-run setup with the App's key",
            ],
            Self::AuthRejected => &[
                "Confirm the App ID / client ID belongs to the key that signed the assertion",
                "Check the system clock; assertions expire ten minutes after signing",
            ],
            Self::NoInstallationFound => &[
                "Install the App on at least one account or organization",
            ],
            Self::TokenRequestFailed => &[
                "Re-run issuance; the exchange response carried no usable token",
            ],
            Self::RecordInvalid => &[
                "Fix the line to match owner/name ([A-Za-z0-9._-] on both sides)",
            ],
            Self::DestinationConflict => &[
                "Move or remove the conflicting content, then re-run sync",
                "ghsync never deletes or merges into content it does not manage",
            ],
            Self::GitOperationFailed => &[
                "Inspect the reported git stderr; re-run sync once the cause is fixed",
                "An authentication failure usually means the token expired: re-run issuance",
            ],
            Self::StashReapplyConflict => &[
                "Resolve the stash conflict manually in the affected repository",
            ],
            Self::Internal => &["Re-run with --verbose and report the full output"],
        }
    }

    /// Builds the resolved entry for display.
    #[must_use]
    pub fn entry(&self) -> ErrorEntry {
        ErrorEntry {
            code: self.code_string(),
            category: self.category(),
            message: self.message().to_string(),
            remediation: self
                .remediation()
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code_string(), self.message())
    }
}
