//! Actors placed in the level.

use serde_json::{Map, Value, json};
use strum::{Display, EnumString};

use super::math::Transform;

/// Actor classes that `create_actor` can place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum ActorKind {
    #[strum(to_string = "StaticMeshActor", serialize = "StaticMesh")]
    StaticMesh,
    #[strum(to_string = "PointLight")]
    PointLight,
    #[strum(to_string = "SpotLight")]
    SpotLight,
    #[strum(to_string = "DirectionalLight")]
    DirectionalLight,
    #[strum(to_string = "CameraActor", serialize = "Camera")]
    Camera,
}

impl ActorKind {
    /// Properties a freshly spawned actor of this kind starts with.
    fn default_properties(self) -> Map<String, Value> {
        let value = match self {
            Self::StaticMesh => json!({ "static_mesh": "/Engine/BasicShapes/Cube.Cube" }),
            Self::PointLight | Self::SpotLight => {
                json!({ "intensity": 5000.0, "light_color": [255, 255, 255] })
            }
            Self::DirectionalLight => json!({ "intensity": 10.0, "light_color": [255, 255, 255] }),
            Self::Camera => json!({ "field_of_view": 90.0 }),
        };
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }
}

/// One actor in the level.
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    pub name: String,
    pub class: String,
    pub transform: Transform,
    pub properties: Map<String, Value>,
    pub tags: Vec<String>,
    pub hidden: bool,
}

impl Actor {
    /// Creates an actor of an arbitrary class with no properties.
    pub fn new(name: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            class: class.into(),
            transform: Transform::default(),
            properties: Map::new(),
            tags: Vec::new(),
            hidden: false,
        }
    }

    /// Creates an actor of a known kind with that kind's default properties.
    pub fn of_kind(name: impl Into<String>, kind: ActorKind) -> Self {
        Self {
            properties: kind.default_properties(),
            ..Self::new(name, kind.to_string())
        }
    }

    /// Sets the initial transform.
    #[must_use]
    pub const fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Sets one property.
    #[must_use]
    pub fn with_property(mut self, key: &str, value: Value) -> Self {
        self.properties.insert(key.to_owned(), value);
        self
    }

    /// Adds a tag.
    #[must_use]
    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tags.push(tag.to_owned());
        self
    }

    /// Returns `true` when the actor carries `tag`.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|candidate| candidate == tag)
    }

    /// Compact JSON form used in actor listings.
    #[must_use]
    pub fn summary(&self) -> Value {
        json!({
            "name": self.name,
            "class": self.class,
            "location": self.transform.location,
            "rotation": self.transform.rotation,
            "scale": self.transform.scale,
        })
    }

    /// Full JSON form including properties, tags and visibility.
    #[must_use]
    pub fn details(&self) -> Value {
        let mut value = self.summary();
        if let Value::Object(map) = &mut value {
            map.insert("properties".to_owned(), Value::Object(self.properties.clone()));
            map.insert("tags".to_owned(), json!(self.tags));
            map.insert("hidden".to_owned(), Value::Bool(self.hidden));
        }
        value
    }
}
