//! Command handler groups operating on the [`Scene`].
//!
//! Each group is a [`HandlerTable`] mapping command names to plain
//! functions of the form `fn(&mut Scene, &Params) -> CommandResult`. Handlers
//! report failure through [`CommandError`]; the table converts that into the
//! in-band `{"success": false, "error": ...}` object at the group boundary,
//! which the router in turn turns into an error envelope.
//!
//! | group            | commands |
//! |------------------|----------|
//! | `actor`          | level actors, sky, weather, georeference, control lights |
//! | `editor`         | viewport focus and screenshots |
//! | `blueprint`      | Blueprint assets and their components |
//! | `blueprint_node` | event graph nodes, variables and input mappings |
//! | `rendering`      | high resolution screenshots |

mod actor;
mod blueprint;
mod blueprint_node;
mod editor;
mod environment;
mod errors;
mod lights;
mod params;
mod rendering;
mod table;

use crate::dispatch::CommandRouter;
use crate::scene::Scene;

pub use self::errors::{CommandError, CommandResult};
pub use self::params::Params;
pub use self::table::{Handler, HandlerTable};

const COMMANDS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::commands");

/// Builds the router serving every scene command group.
#[must_use]
pub fn scene_router() -> CommandRouter<Scene> {
    CommandRouter::new()
        .with_group(actor::group())
        .with_group(editor::group())
        .with_group(blueprint::group())
        .with_group(blueprint_node::group())
        .with_group(rendering::group())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::Route;
    use rstest::rstest;
    use scenelink_protocol::{CommandRequest, Envelope};
    use serde_json::json;

    #[rstest]
    fn every_group_command_is_routed() {
        assert_eq!(scene_router().command_count(), 42);
    }

    #[rstest]
    #[case("create_actor", "actor")]
    #[case("set_time_of_day", "actor")]
    #[case("delete_mm_control_light", "actor")]
    #[case("take_screenshot", "editor")]
    #[case("compile_blueprint", "blueprint")]
    #[case("connect_blueprint_nodes", "blueprint_node")]
    #[case("take_highresshot", "rendering")]
    fn commands_reach_their_group(#[case] command: &str, #[case] group: &str) {
        let router = scene_router();
        let route = router.resolve(command).expect("command is routed");
        assert!(matches!(route, Route::Group(_)));
        assert_eq!(router.route_name(route), group);
    }

    #[rstest]
    fn handler_failures_surface_as_error_envelopes() {
        let router = scene_router();
        let mut scene = Scene::new();
        let request = CommandRequest::parse(br#"{"command":"create_actor","params":{}}"#)
            .expect("parse request");
        assert_eq!(
            router.dispatch(&mut scene, &request),
            Envelope::error("Missing 'type' parameter")
        );
    }

    #[rstest]
    fn empty_level_lists_no_actors() {
        let router = scene_router();
        let mut scene = Scene::new();
        let request = CommandRequest::parse(br#"{"command":"get_actors_in_level","params":{}}"#)
            .expect("parse request");
        assert_eq!(
            router.dispatch(&mut scene, &request),
            Envelope::success(json!({ "actors": [] }))
        );
    }
}
