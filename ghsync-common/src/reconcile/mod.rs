//! Repository reconciliation: drive each declared destination to match the
//! authenticated remote.
//!
//! Split so each stage is testable on its own:
//! - [`classify`] - pure-ish destination state inspection, computed once per
//!   record before any mutation
//! - [`git`] - captured-output subprocess wrapper over the `git` binary
//! - [`credentials`] - the credential-helper store that keeps the token out
//!   of every persisted remote URL
//! - [`engine`] - the sequential per-record state machine

pub mod classify;
pub mod credentials;
pub mod engine;
pub mod git;

pub use classify::{LocalState, classify, classify_with};
pub use credentials::CredentialStore;
pub use engine::{
    Outcome, ReconcileEngine, RecordReport, RecordWarning, RemoteEndpoint, SyncRun, SyncSummary,
};
