//! Entrypoint for the `scenelink` command-line client.
//!
//! Delegates to [`scenelink_cli::run`], which resolves the bridge address,
//! sends one request and prints the response envelope.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    scenelink_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
