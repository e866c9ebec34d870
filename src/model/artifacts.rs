//! Cross-pass artifacts collected by the first pass and read by the second.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::list::ListElements;
use super::property::PropertyList;

/// Grid dimensions of one table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSize {
    /// Number of rows
    pub rows: u32,
    /// Number of columns
    pub columns: u32,
}

/// A named binary payload from a `<d>` element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedData {
    /// MIME type, if declared
    pub mime_type: Option<String>,
    /// Decoded bytes
    #[serde(skip_serializing)]
    pub data: Vec<u8>,
}

impl EmbeddedData {
    /// Create a new payload.
    pub fn new(mime_type: Option<String>, data: Vec<u8>) -> Self {
        Self { mime_type, data }
    }

    /// Size of the payload in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Everything the styles pass discovers for the content pass.
///
/// Built fresh for every top-level parse and dropped when it returns,
/// whichever way it returns.
#[derive(Debug, Default)]
pub struct Artifacts {
    /// List elements keyed by id
    pub list_elements: ListElements,
    /// Table sizes keyed by table number in document order
    pub table_sizes: BTreeMap<usize, TableSize>,
    /// Embedded data keyed by name
    pub data: HashMap<String, EmbeddedData>,
    /// Normalized metadata entries (`dc:title`, ...)
    pub metadata: PropertyList,
}

impl Artifacts {
    /// Create an empty artifact set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if nothing was collected.
    pub fn is_empty(&self) -> bool {
        self.list_elements.is_empty()
            && self.table_sizes.is_empty()
            && self.data.is_empty()
            && self.metadata.is_empty()
    }
}
