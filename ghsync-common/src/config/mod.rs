//! Configuration system for ghsync.
//!
//! All inputs arrive as `GHSYNC_*` environment variables. Parsing collects
//! every problem before reporting, so an operator fixes the whole set in one
//! pass, and placeholder values left over from setup templates are rejected
//! with the same weight as missing ones - before any network call is made.

pub mod env;

pub use env::{AppConfig, ConfigError, EnvParser};

#[cfg(test)]
pub(crate) fn env_test_lock() -> std::sync::MutexGuard<'static, ()> {
    use std::sync::{Mutex, OnceLock};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    ENV_LOCK.get_or_init(|| Mutex::new(())).lock().unwrap()
}
