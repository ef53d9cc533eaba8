//! Typed access to a command's `params` object.

use serde_json::{Map, Value};

use crate::scene::{Color, Vector3};

use super::errors::CommandError;

/// Largest magnitude below which every integer has an exact `f64` form.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Borrowed view of request parameters with typed getters.
///
/// Absent keys and explicit `null` values are treated alike.
#[derive(Debug, Clone, Copy)]
pub struct Params<'a> {
    map: Option<&'a Map<String, Value>>,
}

impl<'a> Params<'a> {
    /// Wraps a `params` value; anything but an object behaves as empty.
    #[must_use]
    pub fn new(value: &'a Value) -> Self {
        Self {
            map: value.as_object(),
        }
    }

    /// Raw value for `name`, skipping `null`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&'a Value> {
        self.map
            .and_then(|map| map.get(name))
            .filter(|value| !value.is_null())
    }

    /// Required string parameter.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::MissingParameter`] when absent and
    /// [`CommandError::InvalidParameter`] when not a string.
    pub fn required_str(&self, name: &'static str) -> Result<&'a str, CommandError> {
        self.optional_str(name)?
            .ok_or(CommandError::MissingParameter { name })
    }

    /// Optional string parameter.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::InvalidParameter`] when present but not a
    /// string.
    pub fn optional_str(&self, name: &'static str) -> Result<Option<&'a str>, CommandError> {
        self.get(name)
            .map(|value| {
                value
                    .as_str()
                    .ok_or_else(|| CommandError::invalid(name, "expected a string"))
            })
            .transpose()
    }

    /// Required numeric parameter.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::MissingParameter`] when absent and
    /// [`CommandError::InvalidParameter`] when not a number.
    pub fn required_f64(&self, name: &'static str) -> Result<f64, CommandError> {
        self.optional_f64(name)?
            .ok_or(CommandError::MissingParameter { name })
    }

    /// Optional numeric parameter.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::InvalidParameter`] when present but not a
    /// number.
    pub fn optional_f64(&self, name: &'static str) -> Result<Option<f64>, CommandError> {
        self.get(name)
            .map(|value| {
                value
                    .as_f64()
                    .ok_or_else(|| CommandError::invalid(name, "expected a number"))
            })
            .transpose()
    }

    /// Optional whole-number parameter; integral floats such as `2.0` are
    /// accepted.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::InvalidParameter`] when present but not a
    /// whole number.
    pub fn optional_integer(&self, name: &'static str) -> Result<Option<i64>, CommandError> {
        let Some(value) = self.get(name) else {
            return Ok(None);
        };
        if let Some(integer) = value.as_i64() {
            return Ok(Some(integer));
        }
        match value.as_f64() {
            Some(float) if float.fract() == 0.0 && float.abs() <= MAX_EXACT_INTEGER => {
                let integer = float as i64;
                Ok(Some(integer))
            }
            _ => Err(CommandError::invalid(name, "expected a whole number")),
        }
    }

    /// Optional boolean parameter.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::InvalidParameter`] when present but not a
    /// boolean.
    pub fn optional_bool(&self, name: &'static str) -> Result<Option<bool>, CommandError> {
        self.get(name)
            .map(|value| {
                value
                    .as_bool()
                    .ok_or_else(|| CommandError::invalid(name, "expected a boolean"))
            })
            .transpose()
    }

    /// Optional `[x, y, z]` parameter.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::InvalidParameter`] unless the value is an
    /// array of exactly three numbers.
    pub fn optional_vector(&self, name: &'static str) -> Result<Option<Vector3>, CommandError> {
        let Some(value) = self.get(name) else {
            return Ok(None);
        };
        let components = value
            .as_array()
            .and_then(|items| {
                items
                    .iter()
                    .map(Value::as_f64)
                    .collect::<Option<Vec<_>>>()
            })
            .ok_or_else(|| CommandError::invalid(name, "expected an array of numbers"))?;
        match components.as_slice() {
            [x, y, z] => Ok(Some(Vector3::new(*x, *y, *z))),
            _ => Err(CommandError::invalid(name, "expected exactly 3 components")),
        }
    }

    /// Optional `[x, y]` graph position; defaults to the origin.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::InvalidParameter`] unless the value is an
    /// array of exactly two numbers.
    pub fn node_position(&self) -> Result<[f64; 2], CommandError> {
        const NAME: &str = "node_position";
        let Some(value) = self.get(NAME) else {
            return Ok([0.0, 0.0]);
        };
        let components: Option<Vec<f64>> = value
            .as_array()
            .and_then(|items| items.iter().map(Value::as_f64).collect());
        match components.as_deref() {
            Some([x, y]) => Ok([*x, *y]),
            _ => Err(CommandError::invalid(NAME, "expected [x, y]")),
        }
    }

    /// Optional colour given as `{r, g, b}` or `[r, g, b]`, each channel in
    /// `0..=255`.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::InvalidParameter`] for any other shape or an
    /// out of range channel.
    pub fn optional_color(&self, name: &'static str) -> Result<Option<Color>, CommandError> {
        let Some(value) = self.get(name) else {
            return Ok(None);
        };
        let channels: [Option<&Value>; 3] = match value {
            Value::Object(map) => [map.get("r"), map.get("g"), map.get("b")],
            Value::Array(items) if items.len() == 3 => [items.first(), items.get(1), items.get(2)],
            _ => return Err(CommandError::invalid(name, "expected {r, g, b} or [r, g, b]")),
        };
        let [r, g, b] = channels;
        Ok(Some(Color {
            r: channel(name, "r", r)?,
            g: channel(name, "g", g)?,
            b: channel(name, "b", b)?,
        }))
    }

    /// The whole parameter object, for handlers that store free-form values.
    #[must_use]
    pub fn entries(&self) -> impl Iterator<Item = (&'a String, &'a Value)> {
        self.map.into_iter().flat_map(|map| map.iter())
    }
}

fn channel(name: &'static str, label: &str, value: Option<&Value>) -> Result<u8, CommandError> {
    let Some(value) = value else {
        return Err(CommandError::invalid(name, format!("missing channel '{label}'")));
    };
    value
        .as_u64()
        .and_then(|raw| u8::try_from(raw).ok())
        .ok_or_else(|| {
            CommandError::invalid(
                name,
                format!("channel '{label}' must be between 0 and 255"),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn missing_and_null_values_are_absent() {
        let value = json!({ "name": null });
        let params = Params::new(&value);
        assert_eq!(
            params.required_str("name"),
            Err(CommandError::MissingParameter { name: "name" })
        );
        assert_eq!(params.optional_f64("intensity"), Ok(None));
    }

    #[rstest]
    fn wrong_types_are_invalid() {
        let value = json!({ "name": 4, "location": [1, 2] });
        let params = Params::new(&value);
        assert!(matches!(
            params.required_str("name"),
            Err(CommandError::InvalidParameter { name: "name", .. })
        ));
        assert!(matches!(
            params.optional_vector("location"),
            Err(CommandError::InvalidParameter { name: "location", .. })
        ));
    }

    #[rstest]
    fn vectors_accept_integers_and_floats() {
        let value = json!({ "location": [1, 2.5, -3] });
        assert_eq!(
            Params::new(&value).optional_vector("location"),
            Ok(Some(Vector3::new(1.0, 2.5, -3.0)))
        );
    }

    #[rstest]
    #[case(json!(2), Some(2))]
    #[case(json!(3.0), Some(3))]
    fn integers_accept_integral_floats(#[case] raw: Value, #[case] expected: Option<i64>) {
        let value = json!({ "n": raw });
        assert_eq!(Params::new(&value).optional_integer("n"), Ok(expected));
    }

    #[rstest]
    fn fractional_integers_are_rejected() {
        let value = json!({ "n": 1.5 });
        assert!(Params::new(&value).optional_integer("n").is_err());
    }

    #[rstest]
    #[case(json!({ "r": 1, "g": 2, "b": 3 }))]
    #[case(json!([1, 2, 3]))]
    fn colours_accept_objects_and_arrays(#[case] raw: Value) {
        let value = json!({ "color": raw });
        assert_eq!(
            Params::new(&value).optional_color("color"),
            Ok(Some(Color { r: 1, g: 2, b: 3 }))
        );
    }

    #[rstest]
    fn colour_channels_are_bounded() {
        let value = json!({ "color": { "r": 256, "g": 0, "b": 0 } });
        let error = Params::new(&value)
            .optional_color("color")
            .expect_err("channel out of range");
        assert_eq!(
            error.to_string(),
            "Invalid 'color' parameter: channel 'r' must be between 0 and 255"
        );
    }

    #[rstest]
    fn node_position_defaults_to_origin() {
        let value = json!({});
        assert_eq!(Params::new(&value).node_position(), Ok([0.0, 0.0]));
    }
}
