//! Decoding of `props` strings into normalized property lists.
//!
//! AbiWord stores formatting inline as `key:value; key:value`. Raw pairs are
//! merged first (style chain, then the element's own props) and only then
//! normalized, one mapping per property family.

use std::collections::BTreeMap;

use crate::model::{PropertyList, PropertyValue};
use crate::parser::attrs::{parse_double, parse_int, parse_length, parse_points, parse_uint};

/// Raw `key -> value` pairs of a props string.
pub type RawProps = BTreeMap<String, String>;

/// Split a props string into raw pairs.
///
/// Empty items and items without a colon are skipped; later duplicates win.
pub fn parse_prop_string(props: &str) -> RawProps {
    let mut result = RawProps::new();
    for item in props.split(';') {
        let Some((key, value)) = item.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();
        if key.is_empty() {
            continue;
        }
        result.insert(key.to_string(), value.to_string());
    }
    result
}

/// Parse an optional props attribute.
pub fn parse_optional(props: Option<&str>) -> RawProps {
    props.map(parse_prop_string).unwrap_or_default()
}

/// Overlay `over` onto `base`.
pub fn overlay(base: &mut RawProps, over: &RawProps) {
    for (k, v) in over {
        base.insert(k.clone(), v.clone());
    }
}

/// Normalize a colour value; `transparent` and garbage yield `None`.
pub fn normalize_color(value: &str) -> Option<String> {
    let value = value.trim();
    let hex = value.strip_prefix('#').unwrap_or(value);
    if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        Some(format!("#{}", hex.to_ascii_lowercase()))
    } else {
        None
    }
}

fn insert_length(list: &mut PropertyList, key: &str, value: Option<&String>) {
    if let Some(inches) = value.and_then(|v| parse_length(v)) {
        list.insert(key, PropertyValue::Inch(inches));
    }
}

fn insert_color(list: &mut PropertyList, key: &str, value: Option<&String>) {
    if let Some(color) = value.and_then(|v| normalize_color(v)) {
        list.insert(key, color);
    }
}

fn writing_mode(value: &str) -> Option<&'static str> {
    match value {
        "rtl" => Some("rl-tb"),
        "ltr" => Some("lr-tb"),
        _ => None,
    }
}

/// Paragraph-level properties.
pub fn paragraph_properties(raw: &RawProps) -> PropertyList {
    let mut list = PropertyList::new();

    if let Some(align) = raw.get("text-align") {
        let align = match align.as_str() {
            "left" => Some("left"),
            "right" => Some("end"),
            "center" => Some("center"),
            "justify" => Some("justify"),
            _ => None,
        };
        if let Some(align) = align {
            list.insert("fo:text-align", align);
        }
    }

    for side in ["left", "right", "top", "bottom"] {
        insert_length(
            &mut list,
            &format!("fo:margin-{}", side),
            raw.get(&format!("margin-{}", side)),
        );
    }
    insert_length(&mut list, "fo:text-indent", raw.get("text-indent"));

    if let Some(height) = raw.get("line-height") {
        if let Some(at_least) = height.strip_suffix('+') {
            if let Some(inches) = parse_length(at_least) {
                list.insert("style:line-height-at-least", PropertyValue::Inch(inches));
            }
        } else if let Some(ratio) = parse_double(height) {
            list.insert("fo:line-height", PropertyValue::Percent(ratio));
        } else if let Some(inches) = parse_length(height) {
            list.insert("fo:line-height", PropertyValue::Inch(inches));
        }
    }

    if let Some(mode) = raw.get("dom-dir").and_then(|d| writing_mode(d)) {
        list.insert("style:writing-mode", mode);
    }
    if raw.get("keep-with-next").map(String::as_str) == Some("yes") {
        list.insert("fo:keep-with-next", "always");
    }
    if raw.get("keep-together").map(String::as_str) == Some("yes") {
        list.insert("fo:keep-together", "always");
    }
    for key in ["widows", "orphans"] {
        if let Some(count) = raw.get(key).and_then(|v| parse_int(v)) {
            list.insert(format!("fo:{}", key), count);
        }
    }
    insert_color(&mut list, "fo:background-color", raw.get("bgcolor"));

    list
}

/// Tab stops declared by the `tabstops` paragraph property.
///
/// Each stop is `position/XN` where `X` is the alignment letter and `N` the
/// leader kind.
pub fn tab_stops(raw: &RawProps) -> Vec<PropertyList> {
    let Some(tabs) = raw.get("tabstops") else {
        return Vec::new();
    };

    let mut stops = Vec::new();
    for item in tabs.split(',') {
        let item = item.trim();
        let (position, kind) = item.split_once('/').unwrap_or((item, "L0"));
        let Some(position) = parse_length(position) else {
            continue;
        };

        let mut stop = PropertyList::new();
        stop.insert("style:position", PropertyValue::Inch(position));

        let mut chars = kind.chars();
        match chars.next() {
            Some('R') => stop.insert("style:type", "right"),
            Some('C') => stop.insert("style:type", "center"),
            Some('D') => {
                stop.insert("style:type", "char");
                stop.insert("style:char", ".");
            }
            _ => stop.insert("style:type", "left"),
        }
        match chars.next() {
            Some('1') => stop.insert("style:leader-text", "."),
            Some('2') => stop.insert("style:leader-text", "-"),
            Some('3') => stop.insert("style:leader-text", "_"),
            _ => {}
        }
        stops.push(stop);
    }
    stops
}

/// Character-level properties.
pub fn character_properties(raw: &RawProps) -> PropertyList {
    let mut list = PropertyList::new();

    if let Some(family) = raw.get("font-family") {
        list.insert("style:font-name", family.as_str());
    }
    if let Some(size) = raw.get("font-size").and_then(|v| parse_points(v)) {
        list.insert("fo:font-size", PropertyValue::Point(size));
    }
    for (key, target) in [
        ("font-weight", "fo:font-weight"),
        ("font-style", "fo:font-style"),
        ("font-variant", "fo:font-variant"),
        ("text-transform", "fo:text-transform"),
    ] {
        if let Some(value) = raw.get(key) {
            list.insert(target, value.as_str());
        }
    }
    insert_color(&mut list, "fo:color", raw.get("color"));
    insert_color(&mut list, "fo:background-color", raw.get("bgcolor"));

    if let Some(decoration) = raw.get("text-decoration") {
        for part in decoration.split_whitespace() {
            match part {
                "underline" => list.insert("style:text-underline-type", "single"),
                "line-through" => list.insert("style:text-line-through-type", "single"),
                "overline" => list.insert("style:text-overline-type", "single"),
                _ => {}
            }
        }
    }

    match raw.get("text-position").map(String::as_str) {
        Some("superscript") => list.insert("style:text-position", "super 58%"),
        Some("subscript") => list.insert("style:text-position", "sub 58%"),
        _ => {}
    }

    if let Some(lang) = raw.get("lang") {
        if lang != "-none-" && !lang.is_empty() {
            let (language, country) = lang.split_once('-').unwrap_or((lang.as_str(), ""));
            list.insert("fo:language", language);
            if !country.is_empty() {
                list.insert("fo:country", country);
            }
        }
    }

    list
}

/// Section-level properties and the column definitions of the section.
pub fn section_properties(raw: &RawProps) -> (PropertyList, Vec<PropertyList>) {
    let mut list = PropertyList::new();

    for side in ["left", "right", "top", "bottom"] {
        insert_length(
            &mut list,
            &format!("fo:margin-{}", side),
            raw.get(&format!("page-margin-{}", side)),
        );
    }
    insert_length(&mut list, "fo:header-height", raw.get("page-margin-header"));
    insert_length(&mut list, "fo:footer-height", raw.get("page-margin-footer"));
    if let Some(mode) = raw.get("dom-dir").and_then(|d| writing_mode(d)) {
        list.insert("style:writing-mode", mode);
    }

    let count = raw
        .get("columns")
        .and_then(|v| parse_uint(v))
        .unwrap_or(1)
        .clamp(1, 64);
    let mut columns = Vec::new();
    if count > 1 {
        insert_length(&mut list, "fo:column-gap", raw.get("column-gap"));
        let width = PropertyValue::Percent(1.0 / count as f64);
        for _ in 0..count {
            columns.push(PropertyList::new().with("style:rel-width", width.clone()));
        }
    }
    (list, columns)
}

/// Table-level properties and the column definitions from `table-column-props`.
pub fn table_properties(raw: &RawProps) -> (PropertyList, Vec<PropertyList>) {
    let mut list = PropertyList::new();
    insert_length(&mut list, "fo:margin-left", raw.get("table-column-leftpos"));
    insert_color(&mut list, "fo:background-color", raw.get("background-color"));
    insert_color(&mut list, "fo:background-color", raw.get("bgcolor"));

    let mut columns = Vec::new();
    if let Some(widths) = raw.get("table-column-props") {
        for width in widths.split('/') {
            if let Some(inches) = parse_length(width) {
                columns.push(
                    PropertyList::new().with("style:column-width", PropertyValue::Inch(inches)),
                );
            }
        }
    }
    (list, columns)
}

/// Cell-level properties; grid positions are handled by the table tracker.
pub fn cell_properties(raw: &RawProps) -> PropertyList {
    let mut list = PropertyList::new();
    insert_color(&mut list, "fo:background-color", raw.get("background-color"));
    insert_color(&mut list, "fo:background-color", raw.get("bgcolor"));

    for (side, abw) in [("left", "left"), ("right", "right"), ("top", "top"), ("bottom", "bot")] {
        if let Some(color) = raw.get(&format!("{}-color", abw)).and_then(|v| normalize_color(v)) {
            let thickness = raw
                .get(&format!("{}-thickness", abw))
                .and_then(|v| parse_length(v))
                .unwrap_or(0.01);
            list.insert(
                format!("fo:border-{}", side),
                format!("{:.4}in solid {}", thickness, color),
            );
        }
    }

    if let Some(align) = raw.get("vertical-align") {
        list.insert("style:vertical-align", align.as_str());
    }
    list
}

/// Frame properties of an inline image.
pub fn image_properties(raw: &RawProps) -> PropertyList {
    let mut list = PropertyList::new();
    insert_length(&mut list, "svg:width", raw.get("width"));
    insert_length(&mut list, "svg:height", raw.get("height"));
    list
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_prop_string() {
        let raw = parse_prop_string("font-weight:bold; font-size: 12pt;;bogus; color:ff0000");
        assert_eq!(raw.get("font-weight").map(String::as_str), Some("bold"));
        assert_eq!(raw.get("font-size").map(String::as_str), Some("12pt"));
        assert_eq!(raw.get("color").map(String::as_str), Some("ff0000"));
        assert_eq!(raw.len(), 3);
    }

    #[test]
    fn test_parse_prop_string_value_with_colon() {
        let raw = parse_prop_string("font-family:Times: Roman");
        assert_eq!(raw.get("font-family").map(String::as_str), Some("Times: Roman"));
    }

    #[test]
    fn test_overlay_wins() {
        let mut base = parse_prop_string("a:1; b:2");
        overlay(&mut base, &parse_prop_string("b:3"));
        assert_eq!(base.get("b").map(String::as_str), Some("3"));
    }

    #[test]
    fn test_normalize_color() {
        assert_eq!(normalize_color("FF00aa"), Some("#ff00aa".to_string()));
        assert_eq!(normalize_color("#000000"), Some("#000000".to_string()));
        assert_eq!(normalize_color("transparent"), None);
    }

    #[test]
    fn test_character_properties() {
        let raw = parse_prop_string(
            "font-family:Arial; font-size:12pt; font-weight:bold; text-decoration:underline line-through; lang:en-US; text-position:superscript",
        );
        let props = character_properties(&raw);
        assert_eq!(props.get_str("style:font-name"), Some("Arial"));
        assert_eq!(props.get("fo:font-size"), Some(&PropertyValue::Point(12.0)));
        assert_eq!(props.get_str("fo:font-weight"), Some("bold"));
        assert_eq!(props.get_str("style:text-underline-type"), Some("single"));
        assert_eq!(props.get_str("style:text-line-through-type"), Some("single"));
        assert_eq!(props.get_str("fo:language"), Some("en"));
        assert_eq!(props.get_str("fo:country"), Some("US"));
        assert_eq!(props.get_str("style:text-position"), Some("super 58%"));
    }

    #[test]
    fn test_paragraph_properties() {
        let raw = parse_prop_string(
            "text-align:right; margin-left:0.5in; line-height:1.5; dom-dir:rtl; keep-with-next:yes; unknown:1",
        );
        let props = paragraph_properties(&raw);
        assert_eq!(props.get_str("fo:text-align"), Some("end"));
        assert_eq!(props.get("fo:margin-left"), Some(&PropertyValue::Inch(0.5)));
        assert_eq!(props.get("fo:line-height"), Some(&PropertyValue::Percent(1.5)));
        assert_eq!(props.get_str("style:writing-mode"), Some("rl-tb"));
        assert_eq!(props.get_str("fo:keep-with-next"), Some("always"));
        assert_eq!(props.len(), 5);
    }

    #[test]
    fn test_line_height_at_least() {
        let props = paragraph_properties(&parse_prop_string("line-height:12pt+"));
        assert!(props.contains("style:line-height-at-least"));
        assert!(!props.contains("fo:line-height"));
    }

    #[test]
    fn test_tab_stops() {
        let stops = tab_stops(&parse_prop_string("tabstops:1in/L0,2in/R1,3in/D0"));
        assert_eq!(stops.len(), 3);
        assert_eq!(stops[0].get_str("style:type"), Some("left"));
        assert_eq!(stops[1].get_str("style:type"), Some("right"));
        assert_eq!(stops[1].get_str("style:leader-text"), Some("."));
        assert_eq!(stops[2].get_str("style:char"), Some("."));
        assert_eq!(stops[2].get("style:position"), Some(&PropertyValue::Inch(3.0)));
    }

    #[test]
    fn test_section_columns() {
        let (props, columns) =
            section_properties(&parse_prop_string("columns:2; column-gap:0.25in; page-margin-left:1in"));
        assert_eq!(columns.len(), 2);
        assert_eq!(props.get("fo:column-gap"), Some(&PropertyValue::Inch(0.25)));
        assert_eq!(props.get("fo:margin-left"), Some(&PropertyValue::Inch(1.0)));

        let (_, columns) = section_properties(&RawProps::new());
        assert!(columns.is_empty());
    }

    #[test]
    fn test_table_columns() {
        let (_, columns) = table_properties(&parse_prop_string("table-column-props:1.5in/2in/"));
        assert_eq!(columns.len(), 2);
        assert_eq!(
            columns[1].get("style:column-width"),
            Some(&PropertyValue::Inch(2.0))
        );
    }

    #[test]
    fn test_cell_borders() {
        let props = cell_properties(&parse_prop_string("bot-color:000000; bgcolor:ffffff"));
        assert_eq!(props.get_str("fo:background-color"), Some("#ffffff"));
        assert!(props.get_str("fo:border-bottom").unwrap().ends_with("solid #000000"));
    }

    #[test]
    fn test_image_properties() {
        let props = image_properties(&parse_prop_string("width:2in; height:72pt"));
        assert_eq!(props.get("svg:width"), Some(&PropertyValue::Inch(2.0)));
        assert_eq!(props.get("svg:height"), Some(&PropertyValue::Inch(1.0)));
    }
}
