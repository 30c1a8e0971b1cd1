//! `ghsync sync` - reconcile the declared repository list.
//!
//! Uses a token parked by `auth` when one is waiting, otherwise runs the
//! issuance pipeline inline. Records are processed sequentially in file
//! order; conflicts are reported and skipped, never resolved destructively.

use ghsync_common::ErrorCode;
use ghsync_common::handoff::TokenHandoff;
use ghsync_common::pipeline;
use ghsync_common::reconcile::{CredentialStore, Outcome, ReconcileEngine, SyncRun};
use ghsync_common::repospec;
use secrecy::SecretString;
use std::fs;
use std::path::Path;
use std::process::ExitCode;
use tracing::{error, info};

use super::{EXIT_FATAL, EXIT_PARTIAL};

pub fn run(repos_file: &Path, default_destination: &Path) -> ExitCode {
    let text = match fs::read_to_string(repos_file) {
        Ok(text) => text,
        Err(e) => {
            error!(path = %repos_file.display(), error = %e, "could not read repository list");
            return ExitCode::from(EXIT_FATAL);
        }
    };

    let token = match acquire_token() {
        Ok(token) => token,
        Err(code) => return code,
    };

    let engine = ReconcileEngine::new(CredentialStore::new(CredentialStore::default_path()));
    let records = repospec::parse(&text, default_destination);
    let run = match engine.run(records, &token) {
        Ok(run) => run,
        Err(e) => {
            error!(error = %e, "could not persist credential store");
            return ExitCode::from(EXIT_FATAL);
        }
    };

    report(&run);
    if run.summary.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_PARTIAL)
    }
}

fn acquire_token() -> Result<SecretString, ExitCode> {
    let handoff = TokenHandoff::at(TokenHandoff::default_path());
    match handoff.take() {
        Ok(Some(token)) => {
            info!("using parked token");
            return Ok(token);
        }
        Ok(None) => info!("no parked token; minting one inline"),
        Err(e) => {
            error!(path = %handoff.path().display(), error = %e, "could not read parked token");
            return Err(ExitCode::from(EXIT_FATAL));
        }
    }

    pipeline::issue_token_from_env()
        .map(|token| token.secret)
        .map_err(|e| super::report_issuance_failure(&e))
}

fn report(run: &SyncRun) {
    for report in &run.reports {
        let code = report
            .code()
            .map(|c| format!(" [{}]", c.code_string()))
            .unwrap_or_default();
        match &report.detail {
            Some(detail) => println!(
                "{} -> {}: {}{code} ({detail})",
                report.record.id,
                report.record.dest.display(),
                report.outcome
            ),
            None => println!(
                "{} -> {}: {}{code}",
                report.record.id,
                report.record.dest.display(),
                report.outcome
            ),
        }
        for warning in &report.warnings {
            println!(
                "  warning [{}]: {}",
                warning.code.code_string(),
                warning.message
            );
        }
    }
    for error in &run.invalid_records {
        println!(
            "invalid record [{}]: {error}",
            ErrorCode::RecordInvalid.code_string()
        );
    }

    let s = &run.summary;
    println!(
        "{} records: {} cloned, {} updated, {} skipped, {} failed, {} invalid",
        s.total, s.cloned, s.updated, s.skipped, s.failed, s.invalid
    );
    if run
        .reports
        .iter()
        .any(|r| matches!(r.outcome, Outcome::SkippedConflict))
    {
        println!("skipped destinations were left untouched; resolve them and re-run");
    }
}
