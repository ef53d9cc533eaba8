//! Multi-purpose control light commands.

use serde_json::json;

use crate::scene::Scene;
use crate::scene::environment::ControlLight;

use super::errors::{CommandError, CommandResult};
use super::params::Params;
use super::table::HandlerTable;

pub(super) fn handlers() -> HandlerTable<Scene> {
    HandlerTable::new("actor")
        .with("create_mm_control_light", create_mm_control_light)
        .with("get_mm_control_lights", get_mm_control_lights)
        .with("update_mm_control_light", update_mm_control_light)
        .with("delete_mm_control_light", delete_mm_control_light)
}

/// Overlays whichever settings `params` carries onto `light`.
fn apply_settings(light: &mut ControlLight, params: &Params<'_>) -> Result<(), CommandError> {
    if let Some(location) = params.optional_vector("location")? {
        light.location = location;
    }
    if let Some(intensity) = params.optional_f64("intensity")? {
        if intensity < 0.0 {
            return Err(CommandError::out_of_range("Intensity must be non-negative"));
        }
        light.intensity = intensity;
    }
    if let Some(color) = params.optional_color("color")? {
        light.color = color;
    }
    Ok(())
}

fn create_mm_control_light(scene: &mut Scene, params: &Params<'_>) -> CommandResult {
    let name = params.required_str("light_name")?;
    if scene.contains_actor(name) {
        return Err(CommandError::LightExists {
            name: name.to_owned(),
        });
    }
    let mut light = ControlLight::default();
    apply_settings(&mut light, params)?;
    scene.spawn(light.spawn(name));
    Ok(light.summary(name))
}

fn get_mm_control_lights(scene: &mut Scene, _params: &Params<'_>) -> CommandResult {
    let lights: Vec<_> = scene
        .control_lights()
        .map(|actor| ControlLight::read(actor).summary(&actor.name))
        .collect();
    Ok(json!({ "count": lights.len(), "lights": lights }))
}

fn update_mm_control_light(scene: &mut Scene, params: &Params<'_>) -> CommandResult {
    let name = params.required_str("light_name")?;
    let actor = scene
        .control_light_mut(name)
        .ok_or_else(|| CommandError::LightNotFound {
            name: name.to_owned(),
        })?;
    let mut light = ControlLight::read(actor);
    apply_settings(&mut light, params)?;
    light.write(actor);
    Ok(light.summary(name))
}

fn delete_mm_control_light(scene: &mut Scene, params: &Params<'_>) -> CommandResult {
    let name = params.required_str("light_name")?;
    scene
        .remove_control_light(name)
        .ok_or_else(|| CommandError::LightNotFound {
            name: name.to_owned(),
        })?;
    Ok(json!({
        "deleted_light": name,
        "success": true,
        "message": format!("Light deleted: {name}"),
    }))
}
