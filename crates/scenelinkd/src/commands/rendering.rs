//! Rendering commands.

use std::path::Path;

use serde_json::json;

use crate::scene::{Capture, Scene, VIEWPORT_SIZE};

use super::errors::{CommandError, CommandResult};
use super::params::Params;
use super::table::HandlerTable;

const SCREENSHOT_DIR: &str = "Saved/Screenshots";
const MULTIPLIER_RANGE: std::ops::RangeInclusive<i64> = 1..=10;

pub(super) fn group() -> HandlerTable<Scene> {
    HandlerTable::new("rendering").with("take_highresshot", take_highresshot)
}

fn take_highresshot(scene: &mut Scene, params: &Params<'_>) -> CommandResult {
    let multiplier = params.optional_integer("resolution_multiplier")?.unwrap_or(1);
    if !MULTIPLIER_RANGE.contains(&multiplier) {
        return Err(CommandError::out_of_range(
            "Resolution multiplier must be between 1 and 10",
        ));
    }
    let factor = u32::try_from(multiplier)
        .map_err(|_| CommandError::invalid("resolution_multiplier", "expected a small integer"))?;

    let filename = match params.optional_str("filename")? {
        Some(name) if Path::new(name).extension().is_some() => name.to_owned(),
        Some(name) => format!("{name}.png"),
        None => format!("HighresScreenshot{:05}.png", scene.captures_taken()),
    };
    let filepath = format!("{SCREENSHOT_DIR}/{filename}");
    let (base_width, base_height) = VIEWPORT_SIZE;
    let (width, height) = (base_width * factor, base_height * factor);

    scene.record_capture(Capture {
        filepath: filepath.clone(),
        width,
        height,
    });
    Ok(json!({
        "message": format!("High resolution screenshot captured at {width}x{height}"),
        "filepath": filepath,
        "width": width,
        "height": height,
        "resolution_multiplier": factor,
    }))
}
