//! Blueprint asset commands.

use serde_json::{Value, json};

use crate::scene::{Actor, Blueprint, Component, Scene, Transform, resolve_component_type};

use super::errors::{CommandError, CommandResult};
use super::params::Params;
use super::table::HandlerTable;

const DEFAULT_PARENT_CLASS: &str = "Actor";
const AUTO_POSSESS_VALUES: &[&str] = &[
    "Disabled", "Player0", "Player1", "Player2", "Player3", "Player4", "Player5", "Player6",
    "Player7",
];
const PAWN_FLAGS: &[(&str, &str)] = &[
    ("use_controller_rotation_yaw", "bUseControllerRotationYaw"),
    ("use_controller_rotation_pitch", "bUseControllerRotationPitch"),
    ("use_controller_rotation_roll", "bUseControllerRotationRoll"),
    ("can_be_damaged", "bCanBeDamaged"),
];

pub(super) fn group() -> HandlerTable<Scene> {
    HandlerTable::new("blueprint")
        .with("create_blueprint", create_blueprint)
        .with("add_component_to_blueprint", add_component_to_blueprint)
        .with("set_component_property", set_component_property)
        .with("set_physics_properties", set_physics_properties)
        .with("compile_blueprint", compile_blueprint)
        .with("spawn_blueprint_actor", spawn_blueprint_actor)
        .with("set_blueprint_property", set_blueprint_property)
        .with("set_static_mesh_properties", set_static_mesh_properties)
        .with("set_pawn_properties", set_pawn_properties)
}

/// Looks up the Blueprint named by the `blueprint_name` parameter.
pub(super) fn target_blueprint<'a>(
    scene: &'a mut Scene,
    params: &Params<'_>,
) -> Result<&'a mut Blueprint, CommandError> {
    let name = params.required_str("blueprint_name")?;
    scene
        .blueprint_mut(name)
        .ok_or_else(|| CommandError::BlueprintNotFound {
            name: name.to_owned(),
        })
}

fn target_component<'a>(
    blueprint: &'a mut Blueprint,
    name: &str,
) -> Result<&'a mut Component, CommandError> {
    blueprint
        .component_mut(name)
        .ok_or_else(|| CommandError::ComponentNotFound {
            name: name.to_owned(),
        })
}

fn required_value<'a>(params: &Params<'a>, name: &'static str) -> Result<&'a Value, CommandError> {
    params
        .get(name)
        .ok_or(CommandError::MissingParameter { name })
}

fn create_blueprint(scene: &mut Scene, params: &Params<'_>) -> CommandResult {
    let name = params.required_str("name")?;
    let parent_class = params
        .optional_str("parent_class")?
        .filter(|parent| !parent.trim().is_empty())
        .unwrap_or(DEFAULT_PARENT_CLASS);
    if scene.blueprint(name).is_some() {
        return Err(CommandError::BlueprintExists {
            name: name.to_owned(),
        });
    }
    let blueprint = Blueprint::new(name, parent_class);
    let result = json!({ "name": blueprint.name, "path": blueprint.path() });
    scene.add_blueprint(blueprint);
    Ok(result)
}

fn add_component_to_blueprint(scene: &mut Scene, params: &Params<'_>) -> CommandResult {
    let raw_type = params.required_str("component_type")?;
    let component_name = params.required_str("component_name")?;
    let mut transform = Transform::default();
    transform.apply(
        params.optional_vector("location")?,
        params.optional_vector("rotation")?,
        params.optional_vector("scale")?,
    );
    let properties = match params.get("component_properties") {
        Some(Value::Object(map)) => map.clone(),
        Some(_) => {
            return Err(CommandError::invalid(
                "component_properties",
                "expected an object",
            ));
        }
        None => serde_json::Map::new(),
    };

    let blueprint = target_blueprint(scene, params)?;
    let component_type =
        resolve_component_type(raw_type).ok_or_else(|| CommandError::UnknownComponentType {
            component_type: raw_type.to_owned(),
        })?;
    if blueprint.component(component_name).is_some() {
        return Err(CommandError::ComponentExists {
            name: component_name.to_owned(),
        });
    }
    blueprint.components.push(Component {
        name: component_name.to_owned(),
        component_type,
        transform,
        properties,
    });
    blueprint.mark_modified();
    Ok(json!({
        "component_name": component_name,
        "component_type": component_type,
    }))
}

fn set_component_property(scene: &mut Scene, params: &Params<'_>) -> CommandResult {
    let component_name = params.required_str("component_name")?;
    let property = params.required_str("property_name")?;
    let value = required_value(params, "property_value")?;
    let blueprint = target_blueprint(scene, params)?;
    let component = target_component(blueprint, component_name)?;
    component
        .properties
        .insert(property.to_owned(), value.clone());
    blueprint.mark_modified();
    Ok(json!({ "component": component_name, "property": property }))
}

fn set_physics_properties(scene: &mut Scene, params: &Params<'_>) -> CommandResult {
    let component_name = params.required_str("component_name")?;
    let settings = [
        ("simulate_physics", params.optional_bool("simulate_physics")?.map(Value::from)),
        ("gravity_enabled", params.optional_bool("gravity_enabled")?.map(Value::from)),
        ("mass", params.optional_f64("mass")?.map(Value::from)),
        ("linear_damping", params.optional_f64("linear_damping")?.map(Value::from)),
        ("angular_damping", params.optional_f64("angular_damping")?.map(Value::from)),
    ];
    let blueprint = target_blueprint(scene, params)?;
    let component = target_component(blueprint, component_name)?;
    if !component.is_primitive() {
        return Err(CommandError::WrongComponentKind {
            name: component_name.to_owned(),
            expected: "primitive",
        });
    }
    for (key, value) in settings {
        if let Some(value) = value {
            component.properties.insert(key.to_owned(), value);
        }
    }
    blueprint.mark_modified();
    Ok(json!({ "component": component_name }))
}

fn compile_blueprint(scene: &mut Scene, params: &Params<'_>) -> CommandResult {
    let blueprint = target_blueprint(scene, params)?;
    blueprint.compiled = true;
    Ok(json!({ "name": blueprint.name, "compiled": true }))
}

fn spawn_blueprint_actor(scene: &mut Scene, params: &Params<'_>) -> CommandResult {
    let blueprint_name = params.required_str("blueprint_name")?;
    let actor_name = params.required_str("actor_name")?;
    let mut transform = Transform::default();
    transform.apply(
        params.optional_vector("location")?,
        params.optional_vector("rotation")?,
        params.optional_vector("scale")?,
    );
    let blueprint = scene
        .blueprint(blueprint_name)
        .ok_or_else(|| CommandError::BlueprintNotFound {
            name: blueprint_name.to_owned(),
        })?;
    if scene.contains_actor(actor_name) {
        return Err(CommandError::ActorExists {
            name: actor_name.to_owned(),
        });
    }
    let mut actor =
        Actor::new(actor_name, format!("{}_C", blueprint.name)).with_transform(transform);
    actor.properties = blueprint.properties.clone();
    let summary = actor.summary();
    scene.spawn(actor);
    Ok(summary)
}

fn set_blueprint_property(scene: &mut Scene, params: &Params<'_>) -> CommandResult {
    let property = params.required_str("property_name")?;
    let value = required_value(params, "property_value")?;
    let blueprint = target_blueprint(scene, params)?;
    blueprint
        .properties
        .insert(property.to_owned(), value.clone());
    blueprint.mark_modified();
    Ok(json!({ "property": property, "success": true }))
}

fn set_static_mesh_properties(scene: &mut Scene, params: &Params<'_>) -> CommandResult {
    let component_name = params.required_str("component_name")?;
    let static_mesh = params.optional_str("static_mesh")?;
    let material = params.optional_str("material")?;
    let blueprint = target_blueprint(scene, params)?;
    let component = target_component(blueprint, component_name)?;
    if !component.is_static_mesh() {
        return Err(CommandError::WrongComponentKind {
            name: component_name.to_owned(),
            expected: "static mesh",
        });
    }
    if let Some(mesh) = static_mesh {
        component
            .properties
            .insert("static_mesh".to_owned(), json!(mesh));
    }
    if let Some(material) = material {
        component
            .properties
            .insert("material".to_owned(), json!(material));
    }
    blueprint.mark_modified();
    Ok(json!({ "component": component_name }))
}

/// Accepts `Player0` as well as the qualified `EAutoReceiveInput::Player0`.
fn auto_possess_value(raw: &str) -> Option<&'static str> {
    let short = raw.rsplit("::").next().unwrap_or(raw);
    AUTO_POSSESS_VALUES
        .iter()
        .copied()
        .find(|candidate| candidate.eq_ignore_ascii_case(short))
}

fn set_pawn_properties(scene: &mut Scene, params: &Params<'_>) -> CommandResult {
    let auto_possess = params
        .optional_str("auto_possess_player")?
        .map(|raw| {
            auto_possess_value(raw).ok_or_else(|| {
                CommandError::invalid(
                    "auto_possess_player",
                    format!("could not find enum value for '{raw}'"),
                )
            })
        })
        .transpose()?;
    let mut flags = Vec::new();
    for &(param, property) in PAWN_FLAGS {
        if let Some(value) = params.optional_bool(param)? {
            flags.push((property, value));
        }
    }

    let blueprint = target_blueprint(scene, params)?;
    let mut applied = serde_json::Map::new();
    if let Some(value) = auto_possess {
        blueprint
            .properties
            .insert("AutoPossessPlayer".to_owned(), json!(value));
        applied.insert("AutoPossessPlayer".to_owned(), json!(value));
    }
    for (property, value) in flags {
        blueprint.properties.insert(property.to_owned(), json!(value));
        applied.insert(property.to_owned(), json!(value));
    }
    blueprint.mark_modified();
    Ok(json!({
        "blueprint": blueprint.name,
        "success": true,
        "results": applied,
    }))
}
