//! Attribute value decoding.
//!
//! Small stateless parsers for the typed values found in raw attribute
//! strings. None of them fail loudly: malformed input yields `None` and the
//! caller falls back to a default.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;

/// Base64 engine for `<d>` payloads; padding is optional in the wild.
const DATA_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decode a boolean token.
///
/// Accepts exactly `true`, `false`, `yes`, `no`, `TRUE` and `FALSE`,
/// surrounded by optional whitespace. Anything else is `None`.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim() {
        "true" | "yes" | "TRUE" => Some(true),
        "false" | "no" | "FALSE" => Some(false),
        _ => None,
    }
}

/// Decode an optional boolean attribute, defaulting to `false`.
pub fn bool_or_false(value: Option<&str>) -> bool {
    value.and_then(parse_bool).unwrap_or(false)
}

/// Decode a non-negative integer.
pub fn parse_uint(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok()
}

/// Decode a signed integer.
pub fn parse_int(value: &str) -> Option<i32> {
    value.trim().parse::<i32>().ok()
}

/// Decode a positive id; zero and garbage both mean "no id".
pub fn parse_id(value: Option<&str>) -> Option<u32> {
    value.and_then(parse_uint).filter(|&id| id != 0)
}

/// Decode a floating point number.
pub fn parse_double(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Decode a length with an optional unit suffix into inches.
///
/// Supported units are `in`, `cm`, `mm`, `pt`, `pi` and `px` (96 dpi); a
/// bare number is taken to be inches.
pub fn parse_length(value: &str) -> Option<f64> {
    let value = value.trim();
    let split = value
        .find(|c: char| c.is_ascii_alphabetic() || c == '"')
        .unwrap_or(value.len());
    let (number, unit) = value.split_at(split);
    let number = parse_double(number)?;
    let factor = match unit.trim() {
        "" | "in" | "inch" | "\"" => 1.0,
        "cm" => 1.0 / 2.54,
        "mm" => 1.0 / 25.4,
        "pt" => 1.0 / 72.0,
        "pi" => 1.0 / 6.0,
        "px" => 1.0 / 96.0,
        _ => return None,
    };
    Some(number * factor)
}

/// Convert a length in the given unit name to inches.
pub fn length_in_unit(value: &str, unit: Option<&str>) -> Option<f64> {
    match unit {
        Some(unit) => parse_length(&format!("{}{}", value.trim(), unit.trim())),
        None => parse_length(value),
    }
}

/// Decode a length into points; point values are taken as written.
pub fn parse_points(value: &str) -> Option<f64> {
    match value.trim().strip_suffix("pt") {
        Some(points) => parse_double(points),
        None => parse_length(value).map(|inches| inches * 72.0),
    }
}

/// Decode the text payload of a `<d>` element.
///
/// Base64 payloads may be wrapped across lines; all ASCII whitespace is
/// dropped before decoding. Raw payloads are taken byte for byte.
pub fn decode_data(payload: &str, base64: bool) -> Option<Vec<u8>> {
    if !base64 {
        return Some(payload.as_bytes().to_vec());
    }
    let compact: String = payload
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    DATA_ENGINE.decode(compact.as_bytes()).ok()
}
