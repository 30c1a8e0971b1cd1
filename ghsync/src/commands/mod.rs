//! Subcommand implementations.

pub mod auth;
pub mod sync;

use ghsync_common::pipeline::IssuanceError;
use std::process::ExitCode;

/// Issuance failures are fatal; they carry catalog codes and remediation.
pub(crate) const EXIT_FATAL: u8 = 2;

/// The run completed but at least one record was skipped, failed, or invalid.
pub(crate) const EXIT_PARTIAL: u8 = 1;

/// Prints a catalogued issuance failure and returns the fatal exit code.
pub(crate) fn report_issuance_failure(error: &IssuanceError) -> ExitCode {
    let entry = error.code().entry();
    eprintln!("{}: {}", entry.code, entry.message);
    eprintln!("  cause: {error}");
    if let IssuanceError::Configuration(problems) = error {
        for problem in problems {
            eprintln!("  - {problem}");
        }
    }
    for step in &entry.remediation {
        eprintln!("  remediation: {step}");
    }
    ExitCode::from(EXIT_FATAL)
}
