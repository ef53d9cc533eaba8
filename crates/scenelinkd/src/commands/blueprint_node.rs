//! Blueprint event graph commands.
//!
//! Every node-creating command answers `{node_id}` with the identifier of
//! the node it placed; `connect_blueprint_nodes` validates both ends before
//! recording a link.

use serde_json::{Value, json};

use crate::scene::{Blueprint, GraphNode, InputMapping, NodeKind, NodeLink, Scene, Variable};

use super::blueprint::target_blueprint;
use super::errors::{CommandError, CommandResult};
use super::params::Params;
use super::table::HandlerTable;

const VARIABLE_TYPES: &[&str] = &[
    "Boolean", "Integer", "Float", "String", "Name", "Text", "Vector", "Rotator", "Transform",
];
const INPUT_TYPES: &[&str] = &["Action", "Axis"];

pub(super) fn group() -> HandlerTable<Scene> {
    HandlerTable::new("blueprint_node")
        .with("connect_blueprint_nodes", connect_blueprint_nodes)
        .with("create_input_mapping", create_input_mapping)
        .with(
            "add_blueprint_get_self_component_reference",
            add_blueprint_get_self_component_reference,
        )
        .with("add_blueprint_self_reference", add_blueprint_self_reference)
        .with("find_blueprint_nodes", find_blueprint_nodes)
        .with("add_blueprint_event_node", add_blueprint_event_node)
        .with("add_blueprint_input_action_node", add_blueprint_input_action_node)
        .with("add_blueprint_function_node", add_blueprint_function_node)
        .with("add_blueprint_get_component_node", add_blueprint_get_component_node)
        .with("add_blueprint_variable", add_blueprint_variable)
}

/// Places a node on the named Blueprint's graph and answers its id.
fn place_node(
    scene: &mut Scene,
    params: &Params<'_>,
    kind: NodeKind,
    title: String,
    pins: Vec<String>,
) -> CommandResult {
    let position = params.node_position()?;
    // Resolve the Blueprint before allocating so failures do not consume ids.
    target_blueprint(scene, params)?;
    let id = scene.next_node_id();
    let blueprint = target_blueprint(scene, params)?;
    blueprint.nodes.push(GraphNode {
        id: id.clone(),
        kind,
        title,
        position,
        pins,
    });
    blueprint.mark_modified();
    Ok(json!({ "node_id": id }))
}

fn pins(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| (*name).to_owned()).collect()
}

fn add_blueprint_event_node(scene: &mut Scene, params: &Params<'_>) -> CommandResult {
    let event_name = params.required_str("event_name")?;
    let existing = target_blueprint(scene, params)?
        .nodes
        .iter()
        .find(|node| node.kind == NodeKind::Event && node.title == event_name)
        .map(|node| node.id.clone());
    if let Some(id) = existing {
        return Ok(json!({ "node_id": id }));
    }
    let mut event_pins = pins(&["then"]);
    if event_name == "ReceiveTick" {
        event_pins.push("DeltaSeconds".to_owned());
    }
    place_node(scene, params, NodeKind::Event, event_name.to_owned(), event_pins)
}

fn add_blueprint_input_action_node(scene: &mut Scene, params: &Params<'_>) -> CommandResult {
    let action_name = params.required_str("action_name")?;
    place_node(
        scene,
        params,
        NodeKind::InputAction,
        action_name.to_owned(),
        pins(&["Pressed", "Released", "Key"]),
    )
}

fn add_blueprint_function_node(scene: &mut Scene, params: &Params<'_>) -> CommandResult {
    let function_name = params.required_str("function_name")?;
    let target = params.optional_str("target")?;
    let mut function_pins = pins(&["execute", "then", "self", "ReturnValue"]);
    match params.get("params") {
        Some(Value::Object(arguments)) => function_pins.extend(arguments.keys().cloned()),
        Some(_) => return Err(CommandError::invalid("params", "expected an object")),
        None => {}
    }
    let title = match target {
        Some(target) if !target.is_empty() && target != "self" => {
            format!("{target}.{function_name}")
        }
        _ => function_name.to_owned(),
    };
    place_node(scene, params, NodeKind::Function, title, function_pins)
}

fn component_reference(scene: &mut Scene, params: &Params<'_>, title_prefix: &str) -> CommandResult {
    let component_name = params.required_str("component_name")?;
    if target_blueprint(scene, params)?
        .component(component_name)
        .is_none()
    {
        return Err(CommandError::ComponentNotFound {
            name: component_name.to_owned(),
        });
    }
    place_node(
        scene,
        params,
        NodeKind::ComponentReference,
        format!("{title_prefix}{component_name}"),
        pins(&[component_name]),
    )
}

fn add_blueprint_get_self_component_reference(
    scene: &mut Scene,
    params: &Params<'_>,
) -> CommandResult {
    component_reference(scene, params, "")
}

fn add_blueprint_get_component_node(scene: &mut Scene, params: &Params<'_>) -> CommandResult {
    component_reference(scene, params, "Get ")
}

fn add_blueprint_self_reference(scene: &mut Scene, params: &Params<'_>) -> CommandResult {
    place_node(
        scene,
        params,
        NodeKind::SelfReference,
        "Self".to_owned(),
        pins(&["self"]),
    )
}

fn require_pin<'a>(
    blueprint: &'a Blueprint,
    id: &str,
    pin: &str,
) -> Result<&'a GraphNode, CommandError> {
    let node = blueprint
        .node(id)
        .ok_or_else(|| CommandError::NodeNotFound { id: id.to_owned() })?;
    if !node.has_pin(pin) {
        return Err(CommandError::PinNotFound {
            id: id.to_owned(),
            pin: pin.to_owned(),
        });
    }
    Ok(node)
}

fn connect_blueprint_nodes(scene: &mut Scene, params: &Params<'_>) -> CommandResult {
    let source_node = params.required_str("source_node_id")?;
    let source_pin = params.required_str("source_pin")?;
    let target_node = params.required_str("target_node_id")?;
    let target_pin = params.required_str("target_pin")?;
    let blueprint = target_blueprint(scene, params)?;
    require_pin(blueprint, source_node, source_pin)?;
    require_pin(blueprint, target_node, target_pin)?;

    let link = NodeLink {
        source_node: source_node.to_owned(),
        source_pin: source_pin.to_owned(),
        target_node: target_node.to_owned(),
        target_pin: target_pin.to_owned(),
    };
    if !blueprint.links.contains(&link) {
        blueprint.links.push(link);
        blueprint.mark_modified();
    }
    Ok(json!({
        "source_node_id": source_node,
        "target_node_id": target_node,
    }))
}

fn find_blueprint_nodes(scene: &mut Scene, params: &Params<'_>) -> CommandResult {
    let kind = params
        .optional_str("node_type")?
        .map(parse_node_kind)
        .transpose()?;
    let event_type = params.optional_str("event_type")?;
    let blueprint = target_blueprint(scene, params)?;
    let node_guids: Vec<&str> = blueprint
        .nodes
        .iter()
        .filter(|node| kind.is_none_or(|kind| node.kind == kind))
        .filter(|node| event_type.is_none_or(|event| node.title == event))
        .map(|node| node.id.as_str())
        .collect();
    Ok(json!({ "node_guids": node_guids }))
}

fn parse_node_kind(raw: &str) -> Result<NodeKind, CommandError> {
    let normalised: String = raw
        .chars()
        .filter(|character| *character != '_')
        .collect::<String>()
        .to_ascii_lowercase();
    match normalised.as_str() {
        "event" => Ok(NodeKind::Event),
        "inputaction" => Ok(NodeKind::InputAction),
        "function" => Ok(NodeKind::Function),
        "componentreference" | "component" => Ok(NodeKind::ComponentReference),
        "selfreference" | "self" => Ok(NodeKind::SelfReference),
        _ => Err(CommandError::invalid(
            "node_type",
            format!("unsupported node type '{raw}'"),
        )),
    }
}

fn add_blueprint_variable(scene: &mut Scene, params: &Params<'_>) -> CommandResult {
    let variable_name = params.required_str("variable_name")?;
    let raw_type = params.required_str("variable_type")?;
    let variable_type = VARIABLE_TYPES
        .iter()
        .copied()
        .find(|candidate| candidate.eq_ignore_ascii_case(raw_type))
        .ok_or_else(|| {
            CommandError::invalid("variable_type", format!("unsupported type '{raw_type}'"))
        })?;
    let default_value = params.get("default_value").cloned();
    let is_exposed = params.optional_bool("is_exposed")?.unwrap_or(false);

    let blueprint = target_blueprint(scene, params)?;
    if blueprint
        .variables
        .iter()
        .any(|variable| variable.name == variable_name)
    {
        return Err(CommandError::VariableExists {
            name: variable_name.to_owned(),
        });
    }
    blueprint.variables.push(Variable {
        name: variable_name.to_owned(),
        variable_type: variable_type.to_owned(),
        default_value,
        is_exposed,
    });
    blueprint.mark_modified();
    Ok(json!({
        "variable_name": variable_name,
        "variable_type": variable_type,
    }))
}

fn create_input_mapping(scene: &mut Scene, params: &Params<'_>) -> CommandResult {
    let action_name = params.required_str("action_name")?;
    let key = params.required_str("key")?;
    let raw_type = params.optional_str("input_type")?.unwrap_or("Action");
    let input_type = INPUT_TYPES
        .iter()
        .copied()
        .find(|candidate| candidate.eq_ignore_ascii_case(raw_type))
        .ok_or_else(|| {
            CommandError::invalid("input_type", format!("unsupported input type '{raw_type}'"))
        })?;
    scene.map_input(InputMapping {
        action_name: action_name.to_owned(),
        key: key.to_owned(),
        input_type: input_type.to_owned(),
    });
    Ok(json!({
        "action_name": action_name,
        "key": key,
        "input_type": input_type,
    }))
}
