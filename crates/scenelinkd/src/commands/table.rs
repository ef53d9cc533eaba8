//! Name-to-function handler tables.

use serde_json::Value;
use tracing::debug;

use crate::dispatch::CommandGroup;

use super::COMMANDS_TARGET;
use super::errors::{CommandError, CommandResult};
use super::params::Params;

/// Signature shared by every command handler.
pub type Handler<H> = fn(&mut H, &Params<'_>) -> CommandResult;

/// A command group backed by a static list of handler functions.
pub struct HandlerTable<H> {
    name: &'static str,
    entries: Vec<(&'static str, Handler<H>)>,
}

impl<H> HandlerTable<H> {
    /// Creates an empty table for the group called `name`.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: Vec::new(),
        }
    }

    /// Adds `handler` under `command`.
    #[must_use]
    pub fn with(mut self, command: &'static str, handler: Handler<H>) -> Self {
        self.entries.push((command, handler));
        self
    }

    /// Appends every entry from `other`.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        self.entries.extend(other.entries);
        self
    }

    fn lookup(&self, command: &str) -> Option<Handler<H>> {
        self.entries
            .iter()
            .find(|(name, _)| *name == command)
            .map(|(_, handler)| *handler)
    }

    /// Runs `command`, returning handler errors as typed values.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::UnknownCommand`] when the table has no entry
    /// for `command`, otherwise whatever the handler reports.
    pub fn run(&self, host: &mut H, command: &str, params: &Value) -> CommandResult {
        let handler = self
            .lookup(command)
            .ok_or_else(|| CommandError::UnknownCommand {
                group: self.name,
                command: command.to_owned(),
            })?;
        handler(host, &Params::new(params))
    }
}

impl<H> CommandGroup<H> for HandlerTable<H> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn commands(&self) -> Vec<&'static str> {
        self.entries.iter().map(|(name, _)| *name).collect()
    }

    fn handle(&self, host: &mut H, command: &str, params: &Value) -> Value {
        match self.run(host, command, params) {
            Ok(result) => result,
            Err(error) => {
                debug!(
                    target: COMMANDS_TARGET,
                    group = self.name,
                    command,
                    %error,
                    "command failed"
                );
                error.to_failure()
            }
        }
    }
}
