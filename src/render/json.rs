//! JSON rendering of recorded sink events.

use crate::error::{Error, Result};

use super::SinkEvent;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert recorded events to a JSON array.
pub fn to_json(events: &[SinkEvent], format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(events),
        JsonFormat::Compact => serde_json::to_string(events),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}
