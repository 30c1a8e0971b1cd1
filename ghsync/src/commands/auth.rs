//! `ghsync auth` - mint a token and park it for the next command.

use ghsync_common::handoff::TokenHandoff;
use ghsync_common::pipeline;
use secrecy::ExposeSecret;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

use super::EXIT_FATAL;

pub fn run(output: Option<PathBuf>, print: bool) -> ExitCode {
    let token = match pipeline::issue_token_from_env() {
        Ok(token) => token,
        Err(e) => return super::report_issuance_failure(&e),
    };

    if print {
        println!("{}", token.secret.expose_secret());
        return ExitCode::SUCCESS;
    }

    let handoff = TokenHandoff::at(output.unwrap_or_else(TokenHandoff::default_path));
    if let Err(e) = handoff.store(&token.secret) {
        error!(path = %handoff.path().display(), error = %e, "could not park token");
        return ExitCode::from(EXIT_FATAL);
    }

    println!(
        "token parked at {} (expires {})",
        handoff.path().display(),
        token.expires_at
    );
    ExitCode::SUCCESS
}
