//! Environment variable parsing with type safety.
//!
//! Provides a parser for ghsync environment variables with placeholder
//! detection and error collection, so all configuration issues are reported
//! at once instead of one per run.

use std::env;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use zeroize::Zeroizing;

/// Values that setup templates ship with; finding one means the operator never
/// finished configuration.
const PLACEHOLDER_VALUES: &[&str] = &["changeme", "replace-me", "replace_me", "todo", "xxx"];

/// Errors that can occur during environment variable parsing.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required variable is unset or empty.
    #[error("{var} is not set")]
    Missing { var: String },

    /// Variable still holds a setup placeholder.
    #[error("{var} holds the placeholder value '{value}'")]
    Placeholder { var: String, value: String },

    /// Path variable points at a missing file.
    #[error("{var}: file not found: {path}")]
    PathNotFound { var: String, path: PathBuf },
}

/// Type-safe environment variable parser with the `GHSYNC_` prefix.
///
/// Collects errors during parsing so all issues can be reported at once.
pub struct EnvParser {
    prefix: &'static str,
    errors: Vec<ConfigError>,
}

impl EnvParser {
    pub fn new() -> Self {
        Self {
            prefix: "GHSYNC_",
            errors: Vec::new(),
        }
    }

    /// Get all accumulated errors.
    pub fn errors(&self) -> &[ConfigError] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Take ownership of errors.
    pub fn take_errors(&mut self) -> Vec<ConfigError> {
        std::mem::take(&mut self.errors)
    }

    fn var_name(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }

    /// Get a required string value, rejecting unset, empty, and placeholder
    /// values. Returns an empty string on failure; the error is accumulated.
    pub fn required_string(&mut self, name: &str) -> String {
        let var_name = self.var_name(name);
        match env::var(&var_name) {
            Ok(value) if !value.trim().is_empty() => {
                if is_placeholder(&value) {
                    self.errors.push(ConfigError::Placeholder {
                        var: var_name,
                        value: value.clone(),
                    });
                }
                value
            }
            _ => {
                self.errors.push(ConfigError::Missing { var: var_name });
                String::new()
            }
        }
    }

    /// Get a required path value, tilde-expanded, that must exist on disk.
    pub fn required_existing_path(&mut self, name: &str) -> PathBuf {
        let var_name = self.var_name(name);
        let raw = match env::var(&var_name) {
            Ok(value) if !value.trim().is_empty() => value,
            _ => {
                self.errors.push(ConfigError::Missing { var: var_name });
                return PathBuf::new();
            }
        };
        if is_placeholder(&raw) {
            self.errors.push(ConfigError::Placeholder {
                var: var_name,
                value: raw.clone(),
            });
            return PathBuf::from(raw);
        }
        let path = PathBuf::from(shellexpand::tilde(&raw).into_owned());
        if !path.is_file() {
            self.errors.push(ConfigError::PathNotFound {
                var: var_name,
                path: path.clone(),
            });
        }
        path
    }

    /// Get an optional string value with default.
    pub fn get_string(&mut self, name: &str, default: &str) -> String {
        match env::var(self.var_name(name)) {
            Ok(value) if !value.trim().is_empty() => value,
            _ => default.to_string(),
        }
    }
}

impl Default for EnvParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Placeholder detection: template markers left behind by setup docs.
fn is_placeholder(value: &str) -> bool {
    let trimmed = value.trim();
    let lowered = trimmed.to_lowercase();
    trimmed.starts_with("YOUR_")
        || trimmed.starts_with('<') && trimmed.ends_with('>')
        || PLACEHOLDER_VALUES.contains(&lowered.as_str())
}

/// Resolved App configuration, validated before any network call.
pub struct AppConfig {
    /// Numeric App identifier.
    pub app_id: String,
    /// OAuth-style client identifier (preferred issuer claim when set).
    pub client_id: String,
    /// Path to the encrypted private-key artifact.
    pub key_path: PathBuf,
    /// Stored password-hash string; effective decryption secret.
    pub password_hash: Zeroizing<String>,
    /// API base URL, overridable for tests.
    pub api_base_url: String,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("app_id", &self.app_id)
            .field("client_id", &self.client_id)
            .field("key_path", &self.key_path)
            .field("password_hash", &"<redacted>")
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

impl AppConfig {
    /// Loads and validates configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns every accumulated [`ConfigError`] when any required value is
    /// missing, placeholder-valued, or (for the key artifact) absent on disk.
    pub fn load() -> Result<Self, Vec<ConfigError>> {
        let mut parser = EnvParser::new();
        let app_id = parser.required_string("APP_ID");
        let client_id = parser.required_string("CLIENT_ID");
        let key_path = parser.required_existing_path("KEY_FILE");
        let password_hash = Zeroizing::new(parser.required_string("PASSWORD_HASH"));
        let api_base_url = parser.get_string("API_URL", "https://api.github.com");

        if parser.has_errors() {
            return Err(parser.take_errors());
        }
        Ok(Self {
            app_id,
            client_id,
            key_path,
            password_hash,
            api_base_url,
        })
    }

    /// Issuer claim for signed assertions: the client ID when configured,
    /// otherwise the numeric App ID.
    pub fn issuer(&self) -> &str {
        if self.client_id.is_empty() {
            &self.app_id
        } else {
            &self.client_id
        }
    }
}

#[cfg(test)]
#[allow(unsafe_code)]
mod tests {
    use super::*;
    use crate::config::env_test_lock;

    fn set(name: &str, value: &str) {
        // SAFETY: serialized by env_test_lock; no other thread reads the
        // environment while a config test holds the lock.
        unsafe { env::set_var(name, value) };
    }

    fn unset(name: &str) {
        unsafe { env::remove_var(name) };
    }

    fn clear_all() {
        for name in [
            "GHSYNC_APP_ID",
            "GHSYNC_CLIENT_ID",
            "GHSYNC_KEY_FILE",
            "GHSYNC_PASSWORD_HASH",
            "GHSYNC_API_URL",
        ] {
            unset(name);
        }
    }

    #[test]
    fn missing_values_are_all_reported() {
        let _lock = env_test_lock();
        clear_all();

        let err = AppConfig::load().unwrap_err();
        // APP_ID, CLIENT_ID, KEY_FILE, PASSWORD_HASH
        assert_eq!(err.len(), 4);
        assert!(matches!(err[0], ConfigError::Missing { .. }));
    }

    #[test]
    fn placeholder_values_are_rejected() {
        let _lock = env_test_lock();
        clear_all();
        let key = tempfile::NamedTempFile::new().unwrap();

        set("GHSYNC_APP_ID", "YOUR_APP_ID");
        set("GHSYNC_CLIENT_ID", "Iv1.abc123");
        set("GHSYNC_KEY_FILE", key.path().to_str().unwrap());
        set("GHSYNC_PASSWORD_HASH", "changeme");

        let err = AppConfig::load().unwrap_err();
        assert_eq!(err.len(), 2);
        assert!(
            err.iter()
                .all(|e| matches!(e, ConfigError::Placeholder { .. }))
        );
        clear_all();
    }

    #[test]
    fn valid_environment_loads_and_prefers_client_id_issuer() {
        let _lock = env_test_lock();
        clear_all();
        let key = tempfile::NamedTempFile::new().unwrap();

        set("GHSYNC_APP_ID", "123456");
        set("GHSYNC_CLIENT_ID", "Iv1.abc123");
        set("GHSYNC_KEY_FILE", key.path().to_str().unwrap());
        set("GHSYNC_PASSWORD_HASH", "$6$salt$hashhashhash");

        let config = AppConfig::load().unwrap();
        assert_eq!(config.issuer(), "Iv1.abc123");
        assert_eq!(config.api_base_url, "https://api.github.com");
        clear_all();
    }

    #[test]
    fn debug_output_redacts_password_hash() {
        let _lock = env_test_lock();
        clear_all();
        let key = tempfile::NamedTempFile::new().unwrap();

        set("GHSYNC_APP_ID", "123456");
        set("GHSYNC_CLIENT_ID", "Iv1.abc123");
        set("GHSYNC_KEY_FILE", key.path().to_str().unwrap());
        set("GHSYNC_PASSWORD_HASH", "$6$salt$hashhashhash");

        let rendered = format!("{:?}", AppConfig::load().unwrap());
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("hashhashhash"));
        clear_all();
    }

    #[test]
    fn missing_key_file_is_its_own_error() {
        let _lock = env_test_lock();
        clear_all();

        set("GHSYNC_APP_ID", "123456");
        set("GHSYNC_CLIENT_ID", "Iv1.abc123");
        set("GHSYNC_KEY_FILE", "/nonexistent/ghsync/key.enc");
        set("GHSYNC_PASSWORD_HASH", "$6$salt$hashhashhash");

        let err = AppConfig::load().unwrap_err();
        assert_eq!(err.len(), 1);
        assert!(matches!(err[0], ConfigError::PathNotFound { .. }));
        clear_all();
    }

    #[test]
    fn angle_bracket_placeholders_detected() {
        assert!(is_placeholder("<set-me>"));
        assert!(is_placeholder("YOUR_CLIENT_ID"));
        assert!(is_placeholder("ChangeMe"));
        assert!(!is_placeholder("Iv1.abc123"));
    }
}
