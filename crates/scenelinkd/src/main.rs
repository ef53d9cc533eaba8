//! Daemon entrypoint for the scenelink bridge.

use std::io::{self, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    match scenelinkd::run_daemon() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let mut stderr = io::stderr().lock();
            writeln!(stderr, "scenelinkd: {error}").unwrap_or_default();
            ExitCode::FAILURE
        }
    }
}
