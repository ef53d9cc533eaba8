//! Blueprint assets: components, defaults, variables and event graphs.

use serde_json::{Map, Value, json};
use strum::Display;

use super::math::Transform;

/// Content folder new Blueprints are created in.
pub const BLUEPRINT_PACKAGE_PATH: &str = "/Game/Blueprints/";

/// Component classes that can be added to a Blueprint.
pub const COMPONENT_TYPES: &[&str] = &[
    "SceneComponent",
    "StaticMeshComponent",
    "SkeletalMeshComponent",
    "PointLightComponent",
    "SpotLightComponent",
    "DirectionalLightComponent",
    "BoxComponent",
    "SphereComponent",
    "CapsuleComponent",
    "CameraComponent",
    "SpringArmComponent",
    "AudioComponent",
];

/// Resolves a component type name, accepting it with or without the
/// `Component` suffix and in any case.
#[must_use]
pub fn resolve_component_type(raw: &str) -> Option<&'static str> {
    let trimmed = raw.trim();
    COMPONENT_TYPES.iter().copied().find(|candidate| {
        candidate.eq_ignore_ascii_case(trimmed)
            || candidate
                .strip_suffix("Component")
                .is_some_and(|short| short.eq_ignore_ascii_case(trimmed))
    })
}

/// A component template inside a Blueprint.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub name: String,
    pub component_type: &'static str,
    pub transform: Transform,
    pub properties: Map<String, Value>,
}

impl Component {
    /// Returns `true` for component types that take part in physics.
    #[must_use]
    pub fn is_primitive(&self) -> bool {
        !matches!(
            self.component_type,
            "SceneComponent"
                | "CameraComponent"
                | "SpringArmComponent"
                | "AudioComponent"
                | "PointLightComponent"
                | "SpotLightComponent"
                | "DirectionalLightComponent"
        )
    }

    /// Returns `true` for static mesh components.
    #[must_use]
    pub fn is_static_mesh(&self) -> bool {
        self.component_type == "StaticMeshComponent"
    }
}

/// A member variable declared on a Blueprint.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub variable_type: String,
    pub default_value: Option<Value>,
    pub is_exposed: bool,
}

/// Kind of an event graph node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum NodeKind {
    Event,
    InputAction,
    Function,
    ComponentReference,
    SelfReference,
}

/// One node in a Blueprint's event graph.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    pub id: String,
    pub kind: NodeKind,
    pub title: String,
    pub position: [f64; 2],
    pub pins: Vec<String>,
}

impl GraphNode {
    /// Returns `true` when the node exposes a pin called `pin`.
    #[must_use]
    pub fn has_pin(&self, pin: &str) -> bool {
        self.pins.iter().any(|candidate| candidate == pin)
    }
}

/// Wire between two node pins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeLink {
    pub source_node: String,
    pub source_pin: String,
    pub target_node: String,
    pub target_pin: String,
}

/// A Blueprint asset.
#[derive(Debug, Clone, PartialEq)]
pub struct Blueprint {
    pub name: String,
    pub parent_class: String,
    pub components: Vec<Component>,
    pub properties: Map<String, Value>,
    pub variables: Vec<Variable>,
    pub nodes: Vec<GraphNode>,
    pub links: Vec<NodeLink>,
    pub compiled: bool,
}

impl Blueprint {
    /// Creates an empty, uncompiled Blueprint.
    pub fn new(name: impl Into<String>, parent_class: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent_class: parent_class.into(),
            components: Vec::new(),
            properties: Map::new(),
            variables: Vec::new(),
            nodes: Vec::new(),
            links: Vec::new(),
            compiled: false,
        }
    }

    /// Asset path of the Blueprint.
    #[must_use]
    pub fn path(&self) -> String {
        format!("{BLUEPRINT_PACKAGE_PATH}{}", self.name)
    }

    /// Looks up a component by name.
    #[must_use]
    pub fn component(&self, name: &str) -> Option<&Component> {
        self.components.iter().find(|component| component.name == name)
    }

    /// Looks up a component by name for modification.
    pub fn component_mut(&mut self, name: &str) -> Option<&mut Component> {
        self.components
            .iter_mut()
            .find(|component| component.name == name)
    }

    /// Looks up a graph node by id.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Any edit invalidates the last compile.
    pub fn mark_modified(&mut self) {
        self.compiled = false;
    }

    /// JSON description used when reporting a Blueprint.
    #[must_use]
    pub fn summary(&self) -> Value {
        json!({
            "name": self.name,
            "path": self.path(),
            "parent_class": self.parent_class,
            "components": self
                .components
                .iter()
                .map(|component| json!({
                    "name": component.name,
                    "type": component.component_type,
                }))
                .collect::<Vec<_>>(),
            "variables": self
                .variables
                .iter()
                .map(|variable| variable.name.as_str())
                .collect::<Vec<_>>(),
            "node_count": self.nodes.len(),
            "compiled": self.compiled,
        })
    }
}

/// An input action bound to a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputMapping {
    pub action_name: String,
    pub key: String,
    pub input_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("StaticMeshComponent", Some("StaticMeshComponent"))]
    #[case("StaticMesh", Some("StaticMeshComponent"))]
    #[case("pointlight", Some("PointLightComponent"))]
    #[case("Teleporter", None)]
    fn component_types_resolve_with_or_without_suffix(
        #[case] raw: &str,
        #[case] expected: Option<&'static str>,
    ) {
        assert_eq!(resolve_component_type(raw), expected);
    }

    #[rstest]
    fn new_blueprints_live_under_the_blueprint_folder() {
        let blueprint = Blueprint::new("BP_Door", "Actor");
        assert_eq!(blueprint.path(), "/Game/Blueprints/BP_Door");
        assert!(!blueprint.compiled);
    }

    #[rstest]
    fn lights_are_not_primitive_components() {
        let light = Component {
            name: "Lamp".to_owned(),
            component_type: "PointLightComponent",
            transform: Transform::default(),
            properties: Map::new(),
        };
        assert!(!light.is_primitive());
        assert!(!light.is_static_mesh());
    }
}
