//! Sky, weather and georeference commands.

use serde_json::{Value, json};

use crate::scene::environment::{
    self, COLOR_TEMPERATURE, ORIGIN_LATITUDE, ORIGIN_LONGITUDE, SKY_CLASS, TIME_OF_DAY,
};
use crate::scene::{Actor, Scene};

use super::errors::{CommandError, CommandResult};
use super::params::Params;
use super::table::HandlerTable;

const TIME_OF_DAY_RANGE: std::ops::RangeInclusive<f64> = 0.0..=2400.0;
const COLOR_TEMPERATURE_RANGE: std::ops::RangeInclusive<f64> = 1500.0..=15000.0;

pub(super) fn handlers() -> HandlerTable<Scene> {
    HandlerTable::new("actor")
        .with("get_time_of_day", get_time_of_day)
        .with("set_time_of_day", set_time_of_day)
        .with("get_ultra_dynamic_sky", get_ultra_dynamic_sky)
        .with("get_ultra_dynamic_weather", get_ultra_dynamic_weather)
        .with("set_color_temperature", set_color_temperature)
        .with("set_current_weather_to_rain", set_current_weather_to_rain)
        .with("set_cesium_latitude_longitude", set_cesium_latitude_longitude)
        .with("get_cesium_properties", get_cesium_properties)
}

/// Resolves the named sky, or the first sky in the level when unnamed.
fn sky_mut<'a>(scene: &'a mut Scene, params: &Params<'_>) -> Result<&'a mut Actor, CommandError> {
    match params.optional_str("sky_name")? {
        Some(name) => scene.sky_mut(name).ok_or_else(|| CommandError::SkyNotFound {
            name: name.to_owned(),
        }),
        None => scene.first_sky_mut().ok_or_else(|| CommandError::SkyNotFound {
            name: SKY_CLASS.to_owned(),
        }),
    }
}

fn time_of_day_report(sky: &Actor) -> Value {
    json!({
        "time_of_day": environment::number(sky, TIME_OF_DAY),
        "sky_name": sky.name,
        "property_name": TIME_OF_DAY,
        "property_type": "float",
    })
}

fn get_time_of_day(scene: &mut Scene, params: &Params<'_>) -> CommandResult {
    let sky = sky_mut(scene, params)?;
    Ok(time_of_day_report(sky))
}

fn set_time_of_day(scene: &mut Scene, params: &Params<'_>) -> CommandResult {
    let time_of_day = params.required_f64("time_of_day")?;
    if !TIME_OF_DAY_RANGE.contains(&time_of_day) {
        return Err(CommandError::out_of_range(
            "Time of day must be between 0 and 2400",
        ));
    }
    let sky = sky_mut(scene, params)?;
    sky.properties
        .insert(TIME_OF_DAY.to_owned(), json!(time_of_day));

    let mut report = time_of_day_report(sky);
    if let Value::Object(map) = &mut report {
        map.insert(
            "message".to_owned(),
            json!("Time of day set and sky update functions called"),
        );
        map.insert("update_functions_called".to_owned(), json!(true));
    }
    Ok(report)
}

fn get_ultra_dynamic_sky(scene: &mut Scene, params: &Params<'_>) -> CommandResult {
    let sky = sky_mut(scene, params)?;
    Ok(environment::sky_summary(sky))
}

fn set_color_temperature(scene: &mut Scene, params: &Params<'_>) -> CommandResult {
    let temperature = params.required_f64("color_temperature")?;
    if !COLOR_TEMPERATURE_RANGE.contains(&temperature) {
        return Err(CommandError::out_of_range(
            "Color temperature must be between 1500 and 15000",
        ));
    }
    let sky = sky_mut(scene, params)?;
    sky.properties
        .insert(COLOR_TEMPERATURE.to_owned(), json!(temperature));
    Ok(json!({
        "sky_name": sky.name,
        "color_temperature": temperature,
        "property_name": COLOR_TEMPERATURE,
    }))
}

fn get_ultra_dynamic_weather(scene: &mut Scene, _params: &Params<'_>) -> CommandResult {
    scene
        .weather()
        .map(environment::weather_summary)
        .ok_or(CommandError::WeatherNotFound)
}

fn set_current_weather_to_rain(scene: &mut Scene, _params: &Params<'_>) -> CommandResult {
    let weather = scene.weather_mut().ok_or(CommandError::WeatherNotFound)?;
    environment::make_it_rain(weather);
    Ok(environment::weather_summary(weather))
}

fn set_cesium_latitude_longitude(scene: &mut Scene, params: &Params<'_>) -> CommandResult {
    let latitude = params.required_f64("latitude")?;
    let longitude = params.required_f64("longitude")?;
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(CommandError::out_of_range(
            "Latitude must be between -90 and 90",
        ));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(CommandError::out_of_range(
            "Longitude must be between -180 and 180",
        ));
    }
    let georeference = scene
        .georeference_mut()
        .ok_or(CommandError::GeoreferenceNotFound)?;
    georeference
        .properties
        .insert(ORIGIN_LATITUDE.to_owned(), json!(latitude));
    georeference
        .properties
        .insert(ORIGIN_LONGITUDE.to_owned(), json!(longitude));
    Ok(environment::georeference_summary(georeference))
}

fn get_cesium_properties(scene: &mut Scene, _params: &Params<'_>) -> CommandResult {
    scene
        .georeference()
        .map(environment::georeference_summary)
        .ok_or(CommandError::GeoreferenceNotFound)
}
