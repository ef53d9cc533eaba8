//! Command-line client for the scenelink bridge.
//!
//! `scenelink <COMMAND> [--params JSON] [--host H] [--port P]` sends one
//! request, prints the response envelope as pretty JSON and exits with
//! status 0 for a success envelope and 1 otherwise. Configuration loading and
//! the IO streams are injectable so the runtime can be exercised in tests.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use scenelink_protocol::{CommandRequest, Envelope};
use serde_json::{Map, Value};

mod cli;
mod config;
mod errors;
mod transport;

use cli::Cli;
use config::{ConfigLoader, OrthoConfigLoader, apply_overrides};
pub(crate) use errors::AppError;
use errors::json_kind;

/// Runs the client using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    run_with_loader(args, stdout, stderr, &OrthoConfigLoader)
}

pub(crate) fn run_with_loader<I, W, E, L>(
    args: I,
    stdout: &mut W,
    stderr: &mut E,
    loader: &L,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) if !error.use_stderr() => {
            return match write!(stdout, "{error}") {
                Ok(()) => ExitCode::SUCCESS,
                Err(_) => ExitCode::FAILURE,
            };
        }
        Err(error) => return report(stderr, &AppError::CliUsage(error)),
    };

    match execute(cli, loader).and_then(|envelope| print_envelope(stdout, &envelope)) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => report(stderr, &error),
    }
}

fn execute<L: ConfigLoader>(cli: Cli, loader: &L) -> Result<Envelope, AppError> {
    let params = parse_params(cli.params.as_deref())?;
    let config = apply_overrides(loader.load()?, cli.host, cli.port);
    let stream = transport::connect(&config.endpoint())?;
    transport::exchange(stream, &CommandRequest::new(cli.command, params))
}

/// Parses `--params`; absent means an empty object.
fn parse_params(raw: Option<&str>) -> Result<Map<String, Value>, AppError> {
    let Some(raw) = raw else {
        return Ok(Map::new());
    };
    match serde_json::from_str(raw).map_err(AppError::ParamsNotJson)? {
        Value::Object(params) => Ok(params),
        Value::Null => Ok(Map::new()),
        other => Err(AppError::ParamsNotObject {
            kind: json_kind(&other),
        }),
    }
}

/// Prints `envelope` and reports whether it was a success.
fn print_envelope<W: Write>(stdout: &mut W, envelope: &Envelope) -> Result<bool, AppError> {
    let rendered = serde_json::to_string_pretty(envelope).map_err(AppError::RenderResponse)?;
    writeln!(stdout, "{rendered}").map_err(AppError::ForwardResponse)?;
    Ok(envelope.is_success())
}

fn report<E: Write>(stderr: &mut E, error: &AppError) -> ExitCode {
    let _ = writeln!(stderr, "scenelink: {error}");
    ExitCode::FAILURE
}
