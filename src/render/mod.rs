//! Document sinks and output rendering.

mod json;
mod recorder;
mod sink;
mod text;

pub use json::{to_json, JsonFormat};
pub use recorder::{EventRecorder, SinkEvent};
pub use sink::{CompositeSink, DocumentSink, NullSink};
pub use text::TextSink;
