//! Spatial value types shared by actors and Blueprint components.

use serde::{Deserialize, Serialize};

/// Three-component vector serialised as `[x, y, z]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vector3(pub [f64; 3]);

impl Vector3 {
    /// All components zero.
    pub const ZERO: Self = Self([0.0; 3]);
    /// All components one.
    pub const ONE: Self = Self([1.0; 3]);

    /// Builds a vector from its components.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self([x, y, z])
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        let [ax, ay, az] = self.0;
        let [bx, by, bz] = other.0;
        ((ax - bx).powi(2) + (ay - by).powi(2) + (az - bz).powi(2)).sqrt()
    }
}

/// Location, rotation (pitch, yaw, roll in degrees) and scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub location: Vector3,
    pub rotation: Vector3,
    pub scale: Vector3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            location: Vector3::ZERO,
            rotation: Vector3::ZERO,
            scale: Vector3::ONE,
        }
    }
}

impl Transform {
    /// Replaces whichever parts are given, keeping the rest.
    pub fn apply(
        &mut self,
        location: Option<Vector3>,
        rotation: Option<Vector3>,
        scale: Option<Vector3>,
    ) {
        if let Some(location) = location {
            self.location = location;
        }
        if let Some(rotation) = rotation {
            self.rotation = rotation;
        }
        if let Some(scale) = scale {
            self.scale = scale;
        }
    }
}

/// 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// Opaque white.
    pub const WHITE: Self = Self {
        r: 255,
        g: 255,
        b: 255,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn vectors_serialise_as_arrays() {
        let value = serde_json::to_value(Vector3::new(1.0, 2.5, -3.0)).expect("serialise");
        assert_eq!(value, json!([1.0, 2.5, -3.0]));
    }

    #[rstest]
    fn apply_keeps_unspecified_parts() {
        let mut transform = Transform::default();
        transform.apply(Some(Vector3::new(1.0, 0.0, 0.0)), None, None);
        assert_eq!(transform.location, Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(transform.rotation, Vector3::ZERO);
        assert_eq!(transform.scale, Vector3::ONE);
    }

    #[rstest]
    fn distance_is_euclidean() {
        let distance = Vector3::new(0.0, 3.0, 0.0).distance(Vector3::new(4.0, 0.0, 0.0));
        assert!((distance - 5.0).abs() < f64::EPSILON);
    }
}
