//! List element definitions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// List elements keyed by their id.
pub type ListElements = BTreeMap<u32, ListElement>;

/// A list-level definition taken from an `<l>` element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListElement {
    /// Element id
    pub id: u32,
    /// Parent element id, if any
    pub parent_id: Option<u32>,
    /// Canonical list id; `None` until resolved
    pub list_id: Option<u32>,
    /// Separator between nested numbers (`list-decimal`), "NULL" when absent
    pub decimal: String,
    /// Number delimiter template (`list-delim`), e.g. "%L."
    pub delimiter: Option<String>,
    /// First number of the list
    pub start_value: Option<u32>,
    /// Numbering or bullet kind
    pub kind: ListKind,
}

impl ListElement {
    /// Create an unresolved list element.
    pub fn new(id: u32, parent_id: Option<u32>, kind: ListKind) -> Self {
        Self {
            id,
            parent_id,
            list_id: None,
            decimal: "NULL".to_string(),
            delimiter: None,
            start_value: None,
            kind,
        }
    }

    /// Set the decimal separator.
    pub fn with_decimal(mut self, decimal: impl Into<String>) -> Self {
        self.decimal = decimal.into();
        self
    }

    /// Set the delimiter template.
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = Some(delimiter.into());
        self
    }

    /// Set the start value.
    pub fn with_start_value(mut self, start: u32) -> Self {
        self.start_value = Some(start);
        self
    }

    /// Check whether the canonical list id has been computed.
    pub fn is_resolved(&self) -> bool {
        self.list_id.is_some()
    }

    /// Prefix and suffix around the number, split out of the delimiter template.
    pub fn affixes(&self) -> (String, String) {
        match self.delimiter.as_deref() {
            Some(delim) => match delim.find("%L") {
                Some(pos) => (delim[..pos].to_string(), delim[pos + 2..].to_string()),
                None => (String::new(), delim.to_string()),
            },
            None => (String::new(), ".".to_string()),
        }
    }
}

/// Numbering style of an ordered list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NumberFormat {
    /// 1, 2, 3
    Decimal,
    /// a, b, c
    LowerAlpha,
    /// A, B, C
    UpperAlpha,
    /// i, ii, iii
    LowerRoman,
    /// I, II, III
    UpperRoman,
}

impl NumberFormat {
    /// Format token understood by sinks.
    pub fn token(&self) -> &'static str {
        match self {
            NumberFormat::Decimal => "1",
            NumberFormat::LowerAlpha => "a",
            NumberFormat::UpperAlpha => "A",
            NumberFormat::LowerRoman => "i",
            NumberFormat::UpperRoman => "I",
        }
    }
}

/// Whether a list is numbered or bulleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListKind {
    /// Numbered list
    Ordered(NumberFormat),
    /// Bulleted list with its bullet character
    Unordered(char),
}

impl ListKind {
    /// Decode the numeric `type` attribute of an `<l>` element.
    ///
    /// Unknown or missing types fall back to a decimal numbered list.
    pub fn from_type(value: Option<u32>) -> Self {
        match value {
            Some(0) | Some(0x80) | Some(0x81) | None => ListKind::Ordered(NumberFormat::Decimal),
            Some(1) => ListKind::Ordered(NumberFormat::LowerAlpha),
            Some(2) => ListKind::Ordered(NumberFormat::UpperAlpha),
            Some(3) => ListKind::Ordered(NumberFormat::LowerRoman),
            Some(4) => ListKind::Ordered(NumberFormat::UpperRoman),
            Some(5) => ListKind::Unordered('\u{2022}'),
            Some(6) => ListKind::Unordered('\u{2013}'),
            Some(7) => ListKind::Unordered('\u{25a0}'),
            Some(8) => ListKind::Unordered('\u{25b2}'),
            Some(9) => ListKind::Unordered('\u{2666}'),
            Some(10) => ListKind::Unordered('\u{2733}'),
            Some(11) => ListKind::Unordered('\u{21d2}'),
            Some(12) => ListKind::Unordered('\u{2713}'),
            Some(13) => ListKind::Unordered('\u{2610}'),
            Some(14) => ListKind::Unordered('\u{261e}'),
            Some(15) => ListKind::Unordered('\u{2665}'),
            Some(16) => ListKind::Unordered('\u{27a3}'),
            Some(_) => ListKind::Ordered(NumberFormat::Decimal),
        }
    }

    /// Check if this is a numbered list.
    pub fn is_ordered(&self) -> bool {
        matches!(self, ListKind::Ordered(_))
    }
}
