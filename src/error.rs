//! Error types for unabw library.

use std::io;
use thiserror::Error;

/// Result type alias for unabw operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during AbiWord processing.
///
/// Only failures that abort a whole parse live here. Structural anomalies in
/// the markup (unmatched closes, dangling list or image references, unknown
/// elements) are absorbed by the collectors and never surface as an `Error`.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading, seeking or inflating the input.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The XML tokenizer rejected the input.
    #[error("XML error: {0}")]
    Xml(String),

    /// The input stream contains no data.
    #[error("Input is empty")]
    EmptyInput,

    /// The input is not recognized as an AbiWord document.
    #[error("Unknown file format: not an AbiWord document")]
    UnknownFormat,

    /// Error while serializing recorded output.
    #[error("Rendering error: {0}")]
    Render(String),
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        match err {
            quick_xml::Error::Io(e) => Error::Io(io::Error::new(e.kind(), e.to_string())),
            _ => Error::Xml(err.to_string()),
        }
    }
}
