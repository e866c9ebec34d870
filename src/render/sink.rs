//! The document sink contract.
//!
//! A sink receives the normalized rich-text call sequence produced by the
//! content pass. All methods default to doing nothing, so an implementation
//! only overrides the calls it cares about.
//!
//! # Example
//!
//! ```
//! use unabw::render::DocumentSink;
//!
//! #[derive(Default)]
//! struct WordCounter {
//!     words: usize,
//! }
//!
//! impl DocumentSink for WordCounter {
//!     fn insert_text(&mut self, text: &str) {
//!         self.words += text.split_whitespace().count();
//!     }
//! }
//!
//! let mut counter = WordCounter::default();
//! unabw::parse_bytes(
//!     b"<abiword><section><p>three little words</p></section></abiword>",
//!     &mut counter,
//! )
//! .unwrap();
//! assert_eq!(counter.words, 3);
//! ```
//!
//! The call order is `start_document`, then sections (or headers and
//! footers) holding paragraphs, list levels and tables, then
//! `end_document`. Every open call is matched by exactly one close call.

use crate::model::PropertyList;

/// Receiver of the emitted document structure.
pub trait DocumentSink {
    /// Document metadata, delivered once right after `start_document`.
    fn set_document_metadata(&mut self, metadata: &PropertyList) {
        let _ = metadata;
    }

    /// Called once before anything else.
    fn start_document(&mut self) {}

    /// Called once after everything else.
    fn end_document(&mut self) {}

    /// Open a body section with its column definitions.
    fn open_section(&mut self, props: &PropertyList, columns: &[PropertyList]) {
        let _ = (props, columns);
    }

    /// Close the body section.
    fn close_section(&mut self) {}

    /// Open a page header; `librevenge:occurrence` tells which pages.
    fn open_header(&mut self, props: &PropertyList) {
        let _ = props;
    }

    /// Close the page header.
    fn close_header(&mut self) {}

    /// Open a page footer; `librevenge:occurrence` tells which pages.
    fn open_footer(&mut self, props: &PropertyList) {
        let _ = props;
    }

    /// Close the page footer.
    fn close_footer(&mut self) {}

    /// Open a paragraph.
    fn open_paragraph(&mut self, props: &PropertyList, tab_stops: &[PropertyList]) {
        let _ = (props, tab_stops);
    }

    /// Close the paragraph.
    fn close_paragraph(&mut self) {}

    /// Open a numbered list level.
    fn open_ordered_list_level(&mut self, props: &PropertyList) {
        let _ = props;
    }

    /// Close a numbered list level.
    fn close_ordered_list_level(&mut self) {}

    /// Open a bulleted list level.
    fn open_unordered_list_level(&mut self, props: &PropertyList) {
        let _ = props;
    }

    /// Close a bulleted list level.
    fn close_unordered_list_level(&mut self) {}

    /// Open a paragraph that is a list item.
    fn open_list_element(&mut self, props: &PropertyList, tab_stops: &[PropertyList]) {
        let _ = (props, tab_stops);
    }

    /// Close the list item.
    fn close_list_element(&mut self) {}

    /// Open a character span.
    fn open_span(&mut self, props: &PropertyList) {
        let _ = props;
    }

    /// Close the span.
    fn close_span(&mut self) {}

    /// Literal text; never contains tab characters.
    fn insert_text(&mut self, text: &str) {
        let _ = text;
    }

    /// A tab character.
    fn insert_tab(&mut self) {}

    /// A line break inside the paragraph.
    fn insert_line_break(&mut self) {}

    /// Open a hyperlink.
    fn open_link(&mut self, props: &PropertyList) {
        let _ = props;
    }

    /// Close the hyperlink.
    fn close_link(&mut self) {}

    /// Open a footnote.
    fn open_footnote(&mut self, props: &PropertyList) {
        let _ = props;
    }

    /// Close the footnote.
    fn close_footnote(&mut self) {}

    /// Open an endnote.
    fn open_endnote(&mut self, props: &PropertyList) {
        let _ = props;
    }

    /// Close the endnote.
    fn close_endnote(&mut self) {}

    /// Open a table with its column definitions.
    fn open_table(&mut self, props: &PropertyList, columns: &[PropertyList]) {
        let _ = (props, columns);
    }

    /// Open a table row.
    fn open_table_row(&mut self, props: &PropertyList) {
        let _ = props;
    }

    /// Close the table row.
    fn close_table_row(&mut self) {}

    /// Open a table cell.
    fn open_table_cell(&mut self, props: &PropertyList) {
        let _ = props;
    }

    /// Close the table cell.
    fn close_table_cell(&mut self) {}

    /// A grid position covered by a spanning cell or left empty.
    fn insert_covered_table_cell(&mut self, props: &PropertyList) {
        let _ = props;
    }

    /// Close the table.
    fn close_table(&mut self) {}

    /// Embedded binary object such as an image.
    fn insert_binary_object(&mut self, props: &PropertyList, data: &[u8]) {
        let _ = (props, data);
    }
}

/// A sink that ignores every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DocumentSink for NullSink {}

impl<S: DocumentSink + ?Sized> DocumentSink for &mut S {
    fn set_document_metadata(&mut self, metadata: &PropertyList) {
        (**self).set_document_metadata(metadata)
    }
    fn start_document(&mut self) {
        (**self).start_document()
    }
    fn end_document(&mut self) {
        (**self).end_document()
    }
    fn open_section(&mut self, props: &PropertyList, columns: &[PropertyList]) {
        (**self).open_section(props, columns)
    }
    fn close_section(&mut self) {
        (**self).close_section()
    }
    fn open_header(&mut self, props: &PropertyList) {
        (**self).open_header(props)
    }
    fn close_header(&mut self) {
        (**self).close_header()
    }
    fn open_footer(&mut self, props: &PropertyList) {
        (**self).open_footer(props)
    }
    fn close_footer(&mut self) {
        (**self).close_footer()
    }
    fn open_paragraph(&mut self, props: &PropertyList, tab_stops: &[PropertyList]) {
        (**self).open_paragraph(props, tab_stops)
    }
    fn close_paragraph(&mut self) {
        (**self).close_paragraph()
    }
    fn open_ordered_list_level(&mut self, props: &PropertyList) {
        (**self).open_ordered_list_level(props)
    }
    fn close_ordered_list_level(&mut self) {
        (**self).close_ordered_list_level()
    }
    fn open_unordered_list_level(&mut self, props: &PropertyList) {
        (**self).open_unordered_list_level(props)
    }
    fn close_unordered_list_level(&mut self) {
        (**self).close_unordered_list_level()
    }
    fn open_list_element(&mut self, props: &PropertyList, tab_stops: &[PropertyList]) {
        (**self).open_list_element(props, tab_stops)
    }
    fn close_list_element(&mut self) {
        (**self).close_list_element()
    }
    fn open_span(&mut self, props: &PropertyList) {
        (**self).open_span(props)
    }
    fn close_span(&mut self) {
        (**self).close_span()
    }
    fn insert_text(&mut self, text: &str) {
        (**self).insert_text(text)
    }
    fn insert_tab(&mut self) {
        (**self).insert_tab()
    }
    fn insert_line_break(&mut self) {
        (**self).insert_line_break()
    }
    fn open_link(&mut self, props: &PropertyList) {
        (**self).open_link(props)
    }
    fn close_link(&mut self) {
        (**self).close_link()
    }
    fn open_footnote(&mut self, props: &PropertyList) {
        (**self).open_footnote(props)
    }
    fn close_footnote(&mut self) {
        (**self).close_footnote()
    }
    fn open_endnote(&mut self, props: &PropertyList) {
        (**self).open_endnote(props)
    }
    fn close_endnote(&mut self) {
        (**self).close_endnote()
    }
    fn open_table(&mut self, props: &PropertyList, columns: &[PropertyList]) {
        (**self).open_table(props, columns)
    }
    fn open_table_row(&mut self, props: &PropertyList) {
        (**self).open_table_row(props)
    }
    fn close_table_row(&mut self) {
        (**self).close_table_row()
    }
    fn open_table_cell(&mut self, props: &PropertyList) {
        (**self).open_table_cell(props)
    }
    fn close_table_cell(&mut self) {
        (**self).close_table_cell()
    }
    fn insert_covered_table_cell(&mut self, props: &PropertyList) {
        (**self).insert_covered_table_cell(props)
    }
    fn close_table(&mut self) {
        (**self).close_table()
    }
    fn insert_binary_object(&mut self, props: &PropertyList, data: &[u8]) {
        (**self).insert_binary_object(props, data)
    }
}

/// Fans every call out to several sinks, in order.
///
/// Useful for recording events while extracting text in the same parse.
#[derive(Default)]
pub struct CompositeSink<'a> {
    sinks: Vec<&'a mut dyn DocumentSink>,
}

impl<'a> CompositeSink<'a> {
    /// Create an empty composite.
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    /// Add a sink to the end of the chain.
    pub fn with_sink(mut self, sink: &'a mut dyn DocumentSink) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Number of sinks in the chain.
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Check if the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

macro_rules! fan_out {
    ($( fn $name:ident(&mut self $(, $arg:ident : $ty:ty)*); )*) => {
        impl DocumentSink for CompositeSink<'_> {
            $(
                fn $name(&mut self $(, $arg: $ty)*) {
                    for sink in self.sinks.iter_mut() {
                        sink.$name($($arg),*);
                    }
                }
            )*
        }
    };
}

fan_out! {
    fn set_document_metadata(&mut self, metadata: &PropertyList);
    fn start_document(&mut self);
    fn end_document(&mut self);
    fn open_section(&mut self, props: &PropertyList, columns: &[PropertyList]);
    fn close_section(&mut self);
    fn open_header(&mut self, props: &PropertyList);
    fn close_header(&mut self);
    fn open_footer(&mut self, props: &PropertyList);
    fn close_footer(&mut self);
    fn open_paragraph(&mut self, props: &PropertyList, tab_stops: &[PropertyList]);
    fn close_paragraph(&mut self);
    fn open_ordered_list_level(&mut self, props: &PropertyList);
    fn close_ordered_list_level(&mut self);
    fn open_unordered_list_level(&mut self, props: &PropertyList);
    fn close_unordered_list_level(&mut self);
    fn open_list_element(&mut self, props: &PropertyList, tab_stops: &[PropertyList]);
    fn close_list_element(&mut self);
    fn open_span(&mut self, props: &PropertyList);
    fn close_span(&mut self);
    fn insert_text(&mut self, text: &str);
    fn insert_tab(&mut self);
    fn insert_line_break(&mut self);
    fn open_link(&mut self, props: &PropertyList);
    fn close_link(&mut self);
    fn open_footnote(&mut self, props: &PropertyList);
    fn close_footnote(&mut self);
    fn open_endnote(&mut self, props: &PropertyList);
    fn close_endnote(&mut self);
    fn open_table(&mut self, props: &PropertyList, columns: &[PropertyList]);
    fn open_table_row(&mut self, props: &PropertyList);
    fn close_table_row(&mut self);
    fn open_table_cell(&mut self, props: &PropertyList);
    fn close_table_cell(&mut self);
    fn insert_covered_table_cell(&mut self, props: &PropertyList);
    fn close_table(&mut self);
    fn insert_binary_object(&mut self, props: &PropertyList, data: &[u8]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counter {
        texts: usize,
        paragraphs: usize,
    }

    impl DocumentSink for Counter {
        fn insert_text(&mut self, _text: &str) {
            self.texts += 1;
        }
        fn open_paragraph(&mut self, _props: &PropertyList, _tab_stops: &[PropertyList]) {
            self.paragraphs += 1;
        }
    }

    #[test]
    fn test_default_methods_are_noops() {
        let mut sink = NullSink;
        sink.start_document();
        sink.insert_text("ignored");
        sink.insert_binary_object(&PropertyList::new(), &[1, 2, 3]);
        sink.end_document();
    }

    #[test]
    fn test_mut_ref_forwards() {
        let mut counter = Counter::default();
        {
            let mut by_ref = &mut counter;
            by_ref.insert_text("a");
            DocumentSink::open_paragraph(&mut by_ref, &PropertyList::new(), &[]);
        }
        assert_eq!(counter.texts, 1);
        assert_eq!(counter.paragraphs, 1);
    }

    #[test]
    fn test_composite_fans_out() {
        let mut first = Counter::default();
        let mut second = Counter::default();
        {
            let mut composite = CompositeSink::new()
                .with_sink(&mut first)
                .with_sink(&mut second);
            assert_eq!(composite.len(), 2);
            composite.insert_text("x");
            composite.insert_text("y");
        }
        assert_eq!(first.texts, 2);
        assert_eq!(second.texts, 2);
    }
}
