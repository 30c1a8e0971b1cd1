//! Shared subsystems for ghsync.
//!
//! ghsync authenticates as a GitHub App (encrypted private key → signed
//! assertion → installation access token) and reconciles a declarative
//! repository list onto local paths. This crate holds everything the CLI
//! binary dispatches into:
//!
//! - [`config`] - typed `GHSYNC_*` environment configuration
//! - [`vault`] - encrypted private-key artifact and passphrase derivation
//! - [`assertion`] - RS256 time-bounded App assertions
//! - [`github`] - installation discovery and token exchange
//! - [`pipeline`] - the end-to-end issuance sequence
//! - [`repospec`] - the `owner/name [destination]` list parser
//! - [`reconcile`] - per-destination classification and sync engine
//! - [`handoff`] - write-once/read-once token handoff between entry points

pub mod assertion;
pub mod config;
pub mod errors;
pub mod github;
pub mod handoff;
pub mod pipeline;
pub mod reconcile;
pub mod repospec;
pub mod util;
pub mod vault;

pub use errors::{ErrorCode, ErrorEntry};
