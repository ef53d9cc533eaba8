//! Sky, weather, georeference and control-light actors.
//!
//! These are ordinary [`Actor`]s whose state lives in their property maps
//! under the property names the engine plugins expose. The helpers here
//! create them with sensible defaults and read their state back.

use serde_json::{Value, json};

use super::actor::Actor;
use super::math::{Color, Transform, Vector3};

pub const SKY_CLASS: &str = "Ultra_Dynamic_Sky_C";
pub const DEFAULT_SKY_NAME: &str = "Ultra_Dynamic_Sky_C_0";
pub const WEATHER_CLASS: &str = "Ultra_Dynamic_Weather_C";
pub const DEFAULT_WEATHER_NAME: &str = "Ultra_Dynamic_Weather_C_0";
pub const GEOREFERENCE_CLASS: &str = "CesiumGeoreference";
pub const CHARACTER_CLASS: &str = "BP_ThirdPersonCharacter_C";
pub const DEFAULT_CHARACTER_NAME: &str = "BP_ThirdPersonCharacter_C_0";

pub const TIME_OF_DAY: &str = "Time of Day";
pub const COLOR_TEMPERATURE: &str = "Color Temperature";
pub const WEATHER_PRESET: &str = "Weather Preset";
pub const RAIN: &str = "Rain";
pub const CLOUD_COVERAGE: &str = "Cloud Coverage";
pub const WETNESS: &str = "Material Wetness";
pub const ORIGIN_LATITUDE: &str = "OriginLatitude";
pub const ORIGIN_LONGITUDE: &str = "OriginLongitude";
pub const ORIGIN_HEIGHT: &str = "OriginHeight";

/// Tag carried by every multi-purpose control light.
pub const CONTROL_LIGHT_TAG: &str = "MMControlLight";
const CONTROL_LIGHT_CLASS: &str = "PointLight";
const INTENSITY: &str = "intensity";
const LIGHT_COLOR: &str = "light_color";

/// Reads a numeric property, treating anything else as zero.
#[must_use]
pub fn number(actor: &Actor, property: &str) -> f64 {
    actor
        .properties
        .get(property)
        .and_then(Value::as_f64)
        .unwrap_or_default()
}

/// Reads a string property, treating anything else as empty.
#[must_use]
pub fn text<'a>(actor: &'a Actor, property: &str) -> &'a str {
    actor
        .properties
        .get(property)
        .and_then(Value::as_str)
        .unwrap_or_default()
}

/// Sky actor at noon with daylight colour temperature.
#[must_use]
pub fn sky(name: &str) -> Actor {
    Actor::new(name, SKY_CLASS)
        .with_property(TIME_OF_DAY, json!(1200.0))
        .with_property(COLOR_TEMPERATURE, json!(6500.0))
}

/// Weather actor with clear skies.
#[must_use]
pub fn weather(name: &str) -> Actor {
    Actor::new(name, WEATHER_CLASS)
        .with_property(WEATHER_PRESET, json!("Clear_Skies"))
        .with_property(RAIN, json!(0.0))
        .with_property(CLOUD_COVERAGE, json!(0.0))
        .with_property(WETNESS, json!(0.0))
}

/// Switches a weather actor to the rain preset.
pub fn make_it_rain(actor: &mut Actor) {
    actor.properties.insert(WEATHER_PRESET.to_owned(), json!("Rain"));
    actor.properties.insert(RAIN.to_owned(), json!(10.0));
    actor.properties.insert(CLOUD_COVERAGE.to_owned(), json!(8.0));
    actor.properties.insert(WETNESS.to_owned(), json!(1.0));
}

/// Georeference actor at the null island origin.
#[must_use]
pub fn georeference(name: &str) -> Actor {
    Actor::new(name, GEOREFERENCE_CLASS)
        .with_property(ORIGIN_LATITUDE, json!(0.0))
        .with_property(ORIGIN_LONGITUDE, json!(0.0))
        .with_property(ORIGIN_HEIGHT, json!(0.0))
}

/// Player character standing just above the origin.
#[must_use]
pub fn character(name: &str) -> Actor {
    let transform = Transform {
        location: Vector3::new(0.0, 0.0, 90.0),
        ..Transform::default()
    };
    Actor::new(name, CHARACTER_CLASS).with_transform(transform)
}

/// Returns `true` for actors that represent a playable character.
#[must_use]
pub fn is_character(actor: &Actor) -> bool {
    actor.class.contains("Character")
}

/// Sky state as reported to clients.
#[must_use]
pub fn sky_summary(actor: &Actor) -> Value {
    json!({
        "sky_name": actor.name,
        "class": actor.class,
        "time_of_day": number(actor, TIME_OF_DAY),
        "color_temperature": number(actor, COLOR_TEMPERATURE),
    })
}

/// Weather state as reported to clients.
#[must_use]
pub fn weather_summary(actor: &Actor) -> Value {
    json!({
        "weather_name": actor.name,
        "class": actor.class,
        "weather_preset": text(actor, WEATHER_PRESET),
        "rain": number(actor, RAIN),
        "cloud_coverage": number(actor, CLOUD_COVERAGE),
        "wetness": number(actor, WETNESS),
    })
}

/// Georeference origin as reported to clients.
#[must_use]
pub fn georeference_summary(actor: &Actor) -> Value {
    json!({
        "georeference_name": actor.name,
        "latitude": number(actor, ORIGIN_LATITUDE),
        "longitude": number(actor, ORIGIN_LONGITUDE),
        "height": number(actor, ORIGIN_HEIGHT),
    })
}

/// Settings of a multi-purpose control light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlLight {
    pub location: Vector3,
    pub intensity: f64,
    pub color: Color,
}

impl Default for ControlLight {
    fn default() -> Self {
        Self {
            location: Vector3::new(0.0, 0.0, 100.0),
            intensity: 1000.0,
            color: Color::WHITE,
        }
    }
}

impl ControlLight {
    /// Builds the point light actor that carries these settings.
    #[must_use]
    pub fn spawn(&self, name: &str) -> Actor {
        let transform = Transform {
            location: self.location,
            ..Transform::default()
        };
        Actor::new(name, CONTROL_LIGHT_CLASS)
            .with_transform(transform)
            .with_tag(CONTROL_LIGHT_TAG)
            .with_property(INTENSITY, json!(self.intensity))
            .with_property(LIGHT_COLOR, json!(self.color))
    }

    /// Reads the settings back from a control light actor.
    #[must_use]
    pub fn read(actor: &Actor) -> Self {
        let color = actor
            .properties
            .get(LIGHT_COLOR)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
            .unwrap_or(Color::WHITE);
        Self {
            location: actor.transform.location,
            intensity: number(actor, INTENSITY),
            color,
        }
    }

    /// Writes the settings onto an existing control light actor.
    pub fn write(&self, actor: &mut Actor) {
        actor.transform.location = self.location;
        actor.properties.insert(INTENSITY.to_owned(), json!(self.intensity));
        actor.properties.insert(LIGHT_COLOR.to_owned(), json!(self.color));
    }

    /// Control light state as reported to clients.
    #[must_use]
    pub fn summary(&self, name: &str) -> Value {
        json!({
            "light_name": name,
            "location": self.location,
            "intensity": self.intensity,
            "color": self.color,
        })
    }
}
