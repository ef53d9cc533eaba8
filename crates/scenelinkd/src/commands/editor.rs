//! Editor viewport commands.

use serde_json::json;

use crate::scene::{Capture, Scene, VIEWPORT_SIZE, ViewportFocus};

use super::errors::{CommandError, CommandResult};
use super::params::Params;
use super::table::HandlerTable;

pub(super) fn group() -> HandlerTable<Scene> {
    HandlerTable::new("editor")
        .with("focus_viewport", focus_viewport)
        .with("take_screenshot", take_screenshot)
}

fn focus_viewport(scene: &mut Scene, params: &Params<'_>) -> CommandResult {
    let target = params.optional_str("target")?;
    let location = params.optional_vector("location")?;
    let mut focus = ViewportFocus {
        target: None,
        ..scene.viewport().clone()
    };
    match (target, location) {
        (Some(name), _) => {
            let actor = scene.actor(name).ok_or_else(|| CommandError::ActorNotFound {
                name: name.to_owned(),
            })?;
            focus.location = actor.transform.location;
            focus.target = Some(actor.name.clone());
        }
        (None, Some(location)) => focus.location = location,
        (None, None) => return Err(CommandError::MissingFocus),
    }
    if let Some(distance) = params.optional_f64("distance")? {
        focus.distance = distance;
    }
    if let Some(orientation) = params.optional_vector("orientation")? {
        focus.orientation = orientation;
    }

    let result = json!({
        "focused": true,
        "target": focus.target,
        "location": focus.location,
        "distance": focus.distance,
        "orientation": focus.orientation,
    });
    scene.focus(focus);
    Ok(result)
}

fn take_screenshot(scene: &mut Scene, params: &Params<'_>) -> CommandResult {
    let filepath = params.required_str("filepath")?;
    let (width, height) = VIEWPORT_SIZE;
    scene.record_capture(Capture {
        filepath: filepath.to_owned(),
        width,
        height,
    });
    Ok(json!({ "filepath": filepath }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Vector3;
    use rstest::rstest;
    use serde_json::Value;

    fn run(scene: &mut Scene, command: &str, params: Value) -> CommandResult {
        group().run(scene, command, &params)
    }

    #[rstest]
    fn focus_on_an_actor_uses_its_location() {
        let mut scene = Scene::with_default_environment();
        let result = run(
            &mut scene,
            "focus_viewport",
            json!({ "target": "BP_ThirdPersonCharacter_C_0", "distance": 250 }),
        )
        .expect("focus");
        assert_eq!(result["focused"], json!(true));
        assert_eq!(result["location"], json!([0.0, 0.0, 90.0]));
        assert_eq!(scene.viewport().distance, 250.0);
    }

    #[rstest]
    fn focus_on_a_location() {
        let mut scene = Scene::new();
        run(&mut scene, "focus_viewport", json!({ "location": [10, 20, 30] })).expect("focus");
        assert_eq!(scene.viewport().location, Vector3::new(10.0, 20.0, 30.0));
        assert_eq!(scene.viewport().target, None);
    }

    #[rstest]
    fn focus_needs_a_target_or_location() {
        let mut scene = Scene::new();
        let error = run(&mut scene, "focus_viewport", json!({ "distance": 5 })).expect_err("no focus");
        assert_eq!(error.to_string(), "Either 'target' or 'location' must be provided");
    }

    #[rstest]
    fn screenshots_are_recorded() {
        let mut scene = Scene::new();
        let result = run(&mut scene, "take_screenshot", json!({ "filepath": "shot.png" }))
            .expect("screenshot");
        assert_eq!(result, json!({ "filepath": "shot.png" }));
        assert_eq!(scene.captures().len(), 1);

        let error = run(&mut scene, "take_screenshot", json!({})).expect_err("no path");
        assert_eq!(error.to_string(), "Missing 'filepath' parameter");
    }
}
