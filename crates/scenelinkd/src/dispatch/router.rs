//! Command routing.
//!
//! The router owns the registered handler groups and a table mapping each
//! command name to the group that owns it. The table is built once during
//! registration, so dispatch is a single hash lookup and no group is ever
//! tried speculatively.

use std::collections::HashMap;

use scenelink_protocol::{CommandRequest, Envelope};
use serde_json::{Value, json};
use tracing::{debug, warn};

use super::{CommandGroup, DISPATCH_TARGET, DispatchError};

/// Built-in liveness probe answered by the router itself.
pub const PING_COMMAND: &str = "ping";

/// Destination of a resolved command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Built-in `ping`.
    Ping,
    /// Index of the owning group in registration order.
    Group(usize),
}

/// Routes commands to handler groups.
pub struct CommandRouter<H> {
    groups: Vec<Box<dyn CommandGroup<H>>>,
    table: HashMap<&'static str, usize>,
}

impl<H> Default for CommandRouter<H> {
    fn default() -> Self {
        Self {
            groups: Vec::new(),
            table: HashMap::new(),
        }
    }
}

impl<H> CommandRouter<H> {
    /// Creates a router with no groups; only `ping` resolves.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `group` and returns the router for chaining.
    #[must_use]
    pub fn with_group(mut self, group: impl CommandGroup<H> + 'static) -> Self {
        self.register(group);
        self
    }

    /// Registers `group`, claiming every command it lists that no earlier
    /// group has claimed.
    pub fn register(&mut self, group: impl CommandGroup<H> + 'static) {
        let index = self.groups.len();
        let name = group.name();
        for command in group.commands() {
            if command == PING_COMMAND {
                warn!(
                    target: DISPATCH_TARGET,
                    group = name,
                    "group lists the built-in ping command; ignoring"
                );
                continue;
            }
            if let Some(owner) = self.table.get(command) {
                warn!(
                    target: DISPATCH_TARGET,
                    command,
                    group = name,
                    owner = self.group_name(*owner),
                    "command already routed to an earlier group"
                );
                continue;
            }
            self.table.insert(command, index);
        }
        debug!(target: DISPATCH_TARGET, group = name, index, "registered command group");
        self.groups.push(Box::new(group));
    }

    /// Resolves `command` to its destination.
    #[must_use]
    pub fn resolve(&self, command: &str) -> Option<Route> {
        if command == PING_COMMAND {
            return Some(Route::Ping);
        }
        self.table.get(command).copied().map(Route::Group)
    }

    /// Runs a resolved command against the host and wraps the result.
    pub fn invoke(&self, host: &mut H, route: Route, command: &str, params: &Value) -> Envelope {
        match route {
            Route::Ping => Envelope::success(json!({ "message": "pong" })),
            Route::Group(index) => match self.groups.get(index) {
                Some(group) => Envelope::from_handler_result(group.handle(host, command, params)),
                None => DispatchError::unknown_command(command).to_envelope(),
            },
        }
    }

    /// Resolves and runs `request` in one step.
    pub fn dispatch(&self, host: &mut H, request: &CommandRequest) -> Envelope {
        match self.resolve(request.command()) {
            Some(route) => self.invoke(host, route, request.command(), request.params()),
            None => DispatchError::unknown_command(request.command()).to_envelope(),
        }
    }

    /// Name of the group behind `route`, for logging.
    #[must_use]
    pub fn route_name(&self, route: Route) -> &'static str {
        match route {
            Route::Ping => PING_COMMAND,
            Route::Group(index) => self.group_name(index),
        }
    }

    /// Number of commands routed to groups, excluding `ping`.
    #[must_use]
    pub fn command_count(&self) -> usize {
        self.table.len()
    }

    fn group_name(&self, index: usize) -> &'static str {
        self.groups.get(index).map_or("unknown", |group| group.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    /// Test group that records calls and echoes its parameters.
    struct RecordingGroup {
        name: &'static str,
        commands: Vec<&'static str>,
    }

    impl CommandGroup<Vec<String>> for RecordingGroup {
        fn name(&self) -> &'static str {
            self.name
        }

        fn commands(&self) -> Vec<&'static str> {
            self.commands.clone()
        }

        fn handle(&self, host: &mut Vec<String>, command: &str, params: &Value) -> Value {
            host.push(format!("{}:{command}", self.name));
            if command == "fail" {
                return json!({ "success": false, "error": "X" });
            }
            json!({ "group": self.name, "params": params })
        }
    }

    fn group(name: &'static str, commands: &[&'static str]) -> RecordingGroup {
        RecordingGroup {
            name,
            commands: commands.to_vec(),
        }
    }

    #[fixture]
    fn router() -> CommandRouter<Vec<String>> {
        CommandRouter::new()
            .with_group(group("actor", &["create_actor", "fail"]))
            .with_group(group("editor", &["focus_viewport", "create_actor"]))
    }

    fn request(command: &str) -> CommandRequest {
        CommandRequest::parse(format!(r#"{{"command":"{command}","params":{{"k":1}}}}"#).as_bytes())
            .expect("parse request")
    }

    #[rstest]
    fn ping_bypasses_groups(router: CommandRouter<Vec<String>>) {
        let mut host = Vec::new();
        let envelope = router.dispatch(&mut host, &request("ping"));
        assert_eq!(envelope, Envelope::success(json!({ "message": "pong" })));
        assert!(host.is_empty());
    }

    #[rstest]
    #[case("create_actor", "actor")]
    #[case("focus_viewport", "editor")]
    fn routes_to_owning_group(
        router: CommandRouter<Vec<String>>,
        #[case] command: &str,
        #[case] group: &str,
    ) {
        let mut host = Vec::new();
        let envelope = router.dispatch(&mut host, &request(command));
        assert_eq!(
            envelope,
            Envelope::success(json!({ "group": group, "params": { "k": 1 } }))
        );
        assert_eq!(host, vec![format!("{group}:{command}")]);
    }

    #[rstest]
    fn first_registered_group_wins_overlaps(router: CommandRouter<Vec<String>>) {
        assert_eq!(router.resolve("create_actor"), Some(Route::Group(0)));
        assert_eq!(router.route_name(Route::Group(0)), "actor");
        assert_eq!(router.command_count(), 3);
    }

    #[rstest]
    fn unknown_commands_never_reach_a_group(router: CommandRouter<Vec<String>>) {
        let mut host = Vec::new();
        let envelope = router.dispatch(&mut host, &request("teleport"));
        assert_eq!(envelope, Envelope::error("Unknown command: teleport"));
        assert!(host.is_empty());
    }

    #[rstest]
    fn handler_failures_become_error_envelopes(router: CommandRouter<Vec<String>>) {
        let mut host = Vec::new();
        let envelope = router.dispatch(&mut host, &request("fail"));
        assert_eq!(envelope, Envelope::error("X"));
    }

    #[rstest]
    fn groups_cannot_shadow_ping() {
        let router: CommandRouter<Vec<String>> =
            CommandRouter::new().with_group(group("rogue", &["ping"]));
        assert_eq!(router.resolve("ping"), Some(Route::Ping));
        assert_eq!(router.command_count(), 0);
    }
}
