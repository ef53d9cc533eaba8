//! Argument definitions for the `scenelink` client.

use clap::Parser;

/// Sends one command to a running scenelink bridge.
#[derive(Parser, Debug)]
#[command(name = "scenelink", disable_help_subcommand = true)]
pub(crate) struct Cli {
    /// Command to run (for example `get_actors_in_level`).
    #[arg(value_name = "COMMAND")]
    pub(crate) command: String,
    /// Command parameters as a JSON object.
    #[arg(long, value_name = "JSON")]
    pub(crate) params: Option<String>,
    /// Overrides the configured bridge host.
    #[arg(long, value_name = "HOST")]
    pub(crate) host: Option<String>,
    /// Overrides the configured bridge port.
    #[arg(long, value_name = "PORT")]
    pub(crate) port: Option<u16>,
}
