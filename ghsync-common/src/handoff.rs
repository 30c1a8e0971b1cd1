//! Token handoff between the issuance and reconciliation commands.
//!
//! `auth` deposits the freshly minted installation token at a private path;
//! `sync` picks it up and deletes it in the same step, so a token is read at
//! most once from disk. Both sides tolerate the file being absent.

use secrecy::{ExposeSecret, SecretString};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

const HANDOFF_FILE: &str = "ghsync-token";

/// A single-slot token drop on the local filesystem.
pub struct TokenHandoff {
    path: PathBuf,
}

impl TokenHandoff {
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    /// Prefers the per-user runtime directory, which is tmpfs-backed and
    /// wiped at logout on most Linux systems.
    pub fn default_path() -> PathBuf {
        dirs::runtime_dir()
            .unwrap_or_else(env::temp_dir)
            .join(HANDOFF_FILE)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the token, readable by the owning user only.
    pub fn store(&self, token: &SecretString) -> io::Result<()> {
        fs::write(&self.path, token.expose_secret())?;
        restrict_permissions(&self.path)?;
        debug!(path = %self.path.display(), "stored handoff token");
        Ok(())
    }

    /// Consumes the stored token, deleting the file whether or not its
    /// contents were usable. Returns `None` when no token was waiting.
    pub fn take(&self) -> io::Result<Option<SecretString>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        fs::remove_file(&self.path)?;
        debug!(path = %self.path.display(), "consumed handoff token");

        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        Ok(Some(SecretString::from(trimmed.to_string())))
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> io::Result<()> {
    Ok(())
}
