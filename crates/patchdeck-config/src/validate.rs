//! Validation helpers and parsing utilities for user-supplied preference values.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{ConfigError, ConfigResult};
use crate::model::WindowGeometry;

/// `WIDTHxHEIGHT+X+Y`, anchored at both ends.
const GEOMETRY_PATTERN: &str = r"^(\d+)x(\d+)\+(\d+)\+(\d+)$";

static GEOMETRY_REGEX: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(GEOMETRY_PATTERN));

/// Parse a `WIDTHxHEIGHT+X+Y` window geometry string.
///
/// # Errors
///
/// Returns `ConfigError::InvalidField` when the value does not match the
/// geometry format or a component overflows `u32`.
pub fn parse_geometry(value: &str) -> ConfigResult<WindowGeometry> {
    let regex = GEOMETRY_REGEX
        .as_ref()
        .map_err(|source| ConfigError::Pattern {
            pattern: GEOMETRY_PATTERN,
            source: source.clone(),
        })?;

    let invalid = |reason: &'static str| ConfigError::InvalidField {
        field: "window_geometry".to_string(),
        reason,
        value: Some(value.to_string()),
    };

    let captures = regex
        .captures(value.trim())
        .ok_or_else(|| invalid("expected WIDTHxHEIGHT+X+Y"))?;

    let mut parts = [0_u32; 4];
    for (slot, index) in parts.iter_mut().zip(1..=4) {
        let text = captures.get(index).map_or("", |group| group.as_str());
        *slot = text
            .parse::<u32>()
            .map_err(|_| invalid("component out of range"))?;
    }

    let [width, height, x, y] = parts;
    Ok(WindowGeometry {
        width,
        height,
        x,
        y,
    })
}

/// Parse an on/off style toggle (`on`, `off`, `true`, `false`, `yes`, `no`, `1`, `0`).
///
/// # Errors
///
/// Returns `ConfigError::InvalidField` for any other value.
pub fn parse_toggle(field: &str, value: &str) -> ConfigResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidField {
            field: field.to_string(),
            reason: "expected on or off",
            value: Some(value.to_string()),
        }),
    }
}
