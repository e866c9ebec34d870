//! # unabw
//!
//! AbiWord document import library for Rust.
//!
//! This library reads AbiWord documents (`.abw` XML, or gzip-compressed
//! `.zabw`) and replays their structure as a normalized, balanced stream of
//! rich-text events into a [`DocumentSink`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use unabw::render::EventRecorder;
//!
//! fn main() -> unabw::Result<()> {
//!     let mut recorder = EventRecorder::new();
//!     unabw::parse_file("letter.abw", &mut recorder)?;
//!
//!     for event in recorder.events() {
//!         println!("{}", event.name());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Two-pass parsing**: lists, tables and embedded data are discovered
//!   before any content is emitted
//! - **Balanced output**: every open event is matched by its close, even for
//!   malformed markup
//! - **Normalized properties**: `props` strings become typed property lists
//! - **Reference sinks**: event recording, JSON output and plain text

pub mod collector;
pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_abw, AbwFormat};
pub use error::{Error, Result};
pub use model::{
    Artifacts, EmbeddedData, ListElement, ListKind, NumberFormat, PropertyList, PropertyValue,
    TableSize,
};
pub use parser::{AbwParser, ErrorMode, ParseOptions};
pub use render::{to_json, DocumentSink, EventRecorder, JsonFormat, SinkEvent, TextSink};

use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::Path;

/// Parse an AbiWord document from a seekable reader into `sink`.
///
/// Compressed input is inflated into memory first.
///
/// # Example
///
/// ```no_run
/// use std::fs::File;
/// use unabw::render::NullSink;
///
/// let file = File::open("letter.abw").unwrap();
/// unabw::parse(file, &mut NullSink).unwrap();
/// ```
pub fn parse<R: Read + Seek>(input: R, sink: &mut dyn DocumentSink) -> Result<()> {
    parse_with_options(input, ParseOptions::default(), sink)
}

/// Parse an AbiWord document with custom options.
///
/// # Example
///
/// ```no_run
/// use std::fs::File;
/// use unabw::{parse_with_options, ParseOptions, TextSink};
///
/// let options = ParseOptions::new().strict().text_only();
/// let mut sink = TextSink::new();
/// parse_with_options(File::open("letter.abw").unwrap(), options, &mut sink).unwrap();
/// println!("{}", sink.into_text());
/// ```
pub fn parse_with_options<R: Read + Seek>(
    mut input: R,
    options: ParseOptions,
    sink: &mut dyn DocumentSink,
) -> Result<()> {
    let mut magic = Vec::with_capacity(2);
    input.by_ref().take(2).read_to_end(&mut magic)?;
    input.seek(SeekFrom::Start(0))?;

    if detect::is_gzip(&magic) {
        let mut data = Vec::new();
        GzDecoder::new(input).read_to_end(&mut data)?;
        log::debug!("inflated compressed document to {} bytes", data.len());
        return AbwParser::with_options(Cursor::new(data), options).parse(sink);
    }

    AbwParser::with_options(input, options).parse(sink)
}

/// Parse an AbiWord document from bytes.
///
/// # Example
///
/// ```
/// use unabw::EventRecorder;
///
/// let mut recorder = EventRecorder::new();
/// unabw::parse_bytes(b"<abiword><section><p>Hi</p></section></abiword>", &mut recorder)?;
/// assert_eq!(recorder.text(), "Hi");
/// # Ok::<(), unabw::Error>(())
/// ```
pub fn parse_bytes(data: &[u8], sink: &mut dyn DocumentSink) -> Result<()> {
    parse(Cursor::new(data), sink)
}

/// Parse an AbiWord file.
pub fn parse_file<P: AsRef<Path>>(path: P, sink: &mut dyn DocumentSink) -> Result<()> {
    let file = File::open(path)?;
    parse(BufReader::new(file), sink)
}

/// Extract plain text from an AbiWord file.
///
/// # Example
///
/// ```no_run
/// let text = unabw::extract_text("letter.abw").unwrap();
/// println!("{}", text);
/// ```
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let mut sink = TextSink::new();
    parse_file(path, &mut sink)?;
    Ok(sink.into_text())
}

/// Extract plain text from AbiWord bytes.
pub fn extract_text_from_bytes(data: &[u8]) -> Result<String> {
    let mut sink = TextSink::new();
    parse_bytes(data, &mut sink)?;
    Ok(sink.into_text())
}

/// Parse a document and return every sink call it produced.
///
/// # Example
///
/// ```
/// use std::io::Cursor;
/// use unabw::{record_events, to_json, JsonFormat};
///
/// let events = record_events(Cursor::new("<abiword><section><p>x</p></section></abiword>"))?;
/// let json = to_json(&events, JsonFormat::Compact)?;
/// assert!(json.contains(r#"{"event":"insertText","text":"x"}"#));
/// # Ok::<(), unabw::Error>(())
/// ```
pub fn record_events<R: Read + Seek>(input: R) -> Result<Vec<SinkEvent>> {
    let mut recorder = EventRecorder::new();
    parse(input, &mut recorder)?;
    Ok(recorder.into_events())
}
