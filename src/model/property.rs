//! Typed property lists passed to document sinks.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single typed property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum PropertyValue {
    /// Free-form string
    String(String),
    /// Integer value
    Int(i32),
    /// Unitless floating point value
    Double(f64),
    /// Length in inches
    Inch(f64),
    /// Length in typographic points
    Point(f64),
    /// Ratio where 1.0 means 100%
    Percent(f64),
    /// Boolean flag
    Bool(bool),
}

impl PropertyValue {
    /// Get the value as a string slice, if it is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the numeric payload of any numeric variant.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            PropertyValue::Int(v) => Some(v as f64),
            PropertyValue::Double(v)
            | PropertyValue::Inch(v)
            | PropertyValue::Point(v)
            | PropertyValue::Percent(v) => Some(v),
            _ => None,
        }
    }

    /// Get the value as an integer, if it is one.
    pub fn as_int(&self) -> Option<i32> {
        match *self {
            PropertyValue::Int(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::String(s) => write!(f, "{}", s),
            PropertyValue::Int(v) => write!(f, "{}", v),
            PropertyValue::Double(v) => write!(f, "{}", v),
            PropertyValue::Inch(v) => write!(f, "{}in", v),
            PropertyValue::Point(v) => write!(f, "{}pt", v),
            PropertyValue::Percent(v) => write!(f, "{}%", v * 100.0),
            PropertyValue::Bool(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::String(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::String(s)
    }
}

impl From<i32> for PropertyValue {
    fn from(v: i32) -> Self {
        PropertyValue::Int(v)
    }
}

impl From<u32> for PropertyValue {
    /// Values above `i32::MAX` saturate.
    fn from(v: u32) -> Self {
        PropertyValue::Int(i32::try_from(v).unwrap_or(i32::MAX))
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        PropertyValue::Bool(v)
    }
}

/// An ordered set of named properties.
///
/// Keys are kept sorted so that two lists built from the same input always
/// compare and serialize identically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyList {
    entries: BTreeMap<String, PropertyValue>,
}

impl PropertyList {
    /// Create an empty property list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a property.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Get a property by key.
    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.entries.get(key)
    }

    /// Get a string property by key.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(PropertyValue::as_str)
    }

    /// Check whether a key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Remove a property, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<PropertyValue> {
        self.entries.remove(key)
    }

    /// Copy every entry of `other` into this list, overwriting duplicates.
    pub fn merge(&mut self, other: &PropertyList) {
        for (k, v) in &other.entries {
            self.entries.insert(k.clone(), v.clone());
        }
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over properties in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<PropertyValue>> FromIterator<(K, V)> for PropertyList {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut list = PropertyList::new();
        for (k, v) in iter {
            list.insert(k, v);
        }
        list
    }
}
