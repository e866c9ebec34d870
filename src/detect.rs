//! AbiWord format detection and validation.

use crate::error::{Error, Result};
use flate2::read::GzDecoder;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// AbiWord format information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbwFormat {
    /// Whether the document is gzip-compressed (`.zabw`)
    pub compressed: bool,
    /// `version` attribute of the root element, if present
    pub version: Option<String>,
}

impl std::fmt::Display for AbwFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = if self.compressed { "zabw" } else { "abw" };
        match &self.version {
            Some(version) => write!(f, "AbiWord {} ({})", version, kind),
            None => write!(f, "AbiWord ({})", kind),
        }
    }
}

/// gzip magic bytes
const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];

/// How much of the (inflated) document is inspected for the root element.
const PROBE_LEN: u64 = 4096;

/// Check whether data starts with the gzip magic.
pub fn is_gzip(data: &[u8]) -> bool {
    data.starts_with(GZIP_MAGIC)
}

/// Detect AbiWord format from a file path.
///
/// # Example
/// ```no_run
/// use unabw::detect::detect_format_from_path;
///
/// let format = detect_format_from_path("letter.abw").unwrap();
/// println!("{}", format);
/// ```
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<AbwFormat> {
    let file = File::open(path)?;
    let mut header = Vec::new();
    BufReader::new(file).take(PROBE_LEN).read_to_end(&mut header)?;
    detect_format_from_bytes(&header)
}

/// Detect AbiWord format from the leading bytes of a document.
///
/// # Returns
/// * `Ok(AbwFormat)` if the first element is `<abiword>`
/// * `Err(Error::UnknownFormat)` otherwise
pub fn detect_format_from_bytes(data: &[u8]) -> Result<AbwFormat> {
    if is_gzip(data) {
        // a truncated gzip stream still inflates its leading bytes
        let mut inflated = Vec::new();
        let mut decoder = GzDecoder::new(data).take(PROBE_LEN);
        if let Err(err) = decoder.read_to_end(&mut inflated) {
            if inflated.is_empty() {
                log::debug!("gzip header present but nothing inflated: {}", err);
                return Err(Error::UnknownFormat);
            }
        }
        let version = root_version(&inflated)?;
        return Ok(AbwFormat {
            compressed: true,
            version,
        });
    }

    let version = root_version(data)?;
    Ok(AbwFormat {
        compressed: false,
        version,
    })
}

/// Find the root element and return its `version` attribute.
fn root_version(data: &[u8]) -> Result<Option<String>> {
    let mut reader = Reader::from_reader(data);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if e.name().as_ref() != b"abiword" {
                    return Err(Error::UnknownFormat);
                }
                let version = e
                    .try_get_attribute("version")
                    .ok()
                    .flatten()
                    .and_then(|attr| attr.unescape_value().ok().map(|v| v.into_owned()));
                return Ok(version);
            }
            Ok(Event::Decl(_)) | Ok(Event::Comment(_)) | Ok(Event::DocType(_))
            | Ok(Event::PI(_)) => {}
            Ok(Event::Text(text)) if text.iter().all(u8::is_ascii_whitespace) => {}
            _ => return Err(Error::UnknownFormat),
        }
    }
}

/// Check if a file is an AbiWord document.
pub fn is_abw<P: AsRef<Path>>(path: P) -> bool {
    detect_format_from_path(path).is_ok()
}

/// Check if bytes start an AbiWord document.
pub fn is_abw_bytes(data: &[u8]) -> bool {
    detect_format_from_bytes(data).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    const PLAIN: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE abiword PUBLIC "-//ABISOURCE//DTD AWML 1.0 Strict//EN" "http://www.abisource.com/awml.dtd">
<!-- saved by hand -->
<abiword template="false" version="2.8.6" xmlns="http://www.abisource.com/awml.dtd">
<section><p>x</p></section>
</abiword>"#;

    #[test]
    fn test_detect_plain_document() {
        let format = detect_format_from_bytes(PLAIN.as_bytes()).unwrap();
        assert!(!format.compressed);
        assert_eq!(format.version.as_deref(), Some("2.8.6"));
        assert_eq!(format.to_string(), "AbiWord 2.8.6 (abw)");
    }

    #[test]
    fn test_detect_without_version() {
        let format = detect_format_from_bytes(b"<abiword><section/></abiword>").unwrap();
        assert_eq!(format.version, None);
    }

    #[test]
    fn test_detect_compressed_document() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(PLAIN.as_bytes()).unwrap();
        let data = encoder.finish().unwrap();

        let format = detect_format_from_bytes(&data).unwrap();
        assert!(format.compressed);
        assert_eq!(format.version.as_deref(), Some("2.8.6"));
    }

    #[test]
    fn test_detect_other_xml() {
        let result = detect_format_from_bytes(b"<html><body/></html>");
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_detect_garbage() {
        assert!(!is_abw_bytes(b""));
        assert!(!is_abw_bytes(b"Not a document"));
        assert!(!is_abw_bytes(&[0x1f, 0x8b, 0x00]));
        assert!(is_abw_bytes(b"  <abiword/>"));
    }

    #[test]
    fn test_detect_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.abw");
        std::fs::write(&path, PLAIN).unwrap();
        assert!(is_abw(&path));
        assert!(!is_abw(dir.path().join("missing.abw")));
    }
}
