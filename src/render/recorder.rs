//! Recording sink.
//!
//! `EventRecorder` stores every sink call as a [`SinkEvent`], which makes the
//! emitted sequence easy to inspect, compare and serialize.
//!
//! # Example
//!
//! ```
//! use unabw::render::{EventRecorder, SinkEvent};
//!
//! let mut recorder = EventRecorder::new();
//! unabw::parse_bytes(b"<abiword><section><p>Hi</p></section></abiword>", &mut recorder)?;
//!
//! assert_eq!(recorder.events().first(), Some(&SinkEvent::StartDocument));
//! assert_eq!(recorder.text(), "Hi");
//! # Ok::<(), unabw::Error>(())
//! ```

use serde::Serialize;

use crate::model::PropertyList;

use super::DocumentSink;

/// One recorded sink call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum SinkEvent {
    /// `set_document_metadata`
    SetDocumentMetadata {
        /// Metadata entries
        metadata: PropertyList,
    },
    /// `start_document`
    StartDocument,
    /// `end_document`
    EndDocument,
    /// `open_section`
    OpenSection {
        /// Section properties
        props: PropertyList,
        /// Column definitions
        columns: Vec<PropertyList>,
    },
    /// `close_section`
    CloseSection,
    /// `open_header`
    OpenHeader {
        /// Header properties
        props: PropertyList,
    },
    /// `close_header`
    CloseHeader,
    /// `open_footer`
    OpenFooter {
        /// Footer properties
        props: PropertyList,
    },
    /// `close_footer`
    CloseFooter,
    /// `open_paragraph`
    OpenParagraph {
        /// Paragraph properties
        props: PropertyList,
        /// Tab stops
        tab_stops: Vec<PropertyList>,
    },
    /// `close_paragraph`
    CloseParagraph,
    /// `open_ordered_list_level`
    OpenOrderedListLevel {
        /// Level properties
        props: PropertyList,
    },
    /// `close_ordered_list_level`
    CloseOrderedListLevel,
    /// `open_unordered_list_level`
    OpenUnorderedListLevel {
        /// Level properties
        props: PropertyList,
    },
    /// `close_unordered_list_level`
    CloseUnorderedListLevel,
    /// `open_list_element`
    OpenListElement {
        /// Paragraph properties
        props: PropertyList,
        /// Tab stops
        tab_stops: Vec<PropertyList>,
    },
    /// `close_list_element`
    CloseListElement,
    /// `open_span`
    OpenSpan {
        /// Character properties
        props: PropertyList,
    },
    /// `close_span`
    CloseSpan,
    /// `insert_text`
    InsertText {
        /// The text
        text: String,
    },
    /// `insert_tab`
    InsertTab,
    /// `insert_line_break`
    InsertLineBreak,
    /// `open_link`
    OpenLink {
        /// Link properties
        props: PropertyList,
    },
    /// `close_link`
    CloseLink,
    /// `open_footnote`
    OpenFootnote {
        /// Note properties
        props: PropertyList,
    },
    /// `close_footnote`
    CloseFootnote,
    /// `open_endnote`
    OpenEndnote {
        /// Note properties
        props: PropertyList,
    },
    /// `close_endnote`
    CloseEndnote,
    /// `open_table`
    OpenTable {
        /// Table properties
        props: PropertyList,
        /// Column definitions
        columns: Vec<PropertyList>,
    },
    /// `open_table_row`
    OpenTableRow {
        /// Row properties
        props: PropertyList,
    },
    /// `close_table_row`
    CloseTableRow,
    /// `open_table_cell`
    OpenTableCell {
        /// Cell properties
        props: PropertyList,
    },
    /// `close_table_cell`
    CloseTableCell,
    /// `insert_covered_table_cell`
    InsertCoveredTableCell {
        /// Cell properties
        props: PropertyList,
    },
    /// `close_table`
    CloseTable,
    /// `insert_binary_object`
    InsertBinaryObject {
        /// Object properties
        props: PropertyList,
        /// Payload size in bytes
        size: usize,
    },
}

impl SinkEvent {
    /// Name of the sink call, e.g. `openParagraph`.
    pub fn name(&self) -> &'static str {
        match self {
            SinkEvent::SetDocumentMetadata { .. } => "setDocumentMetadata",
            SinkEvent::StartDocument => "startDocument",
            SinkEvent::EndDocument => "endDocument",
            SinkEvent::OpenSection { .. } => "openSection",
            SinkEvent::CloseSection => "closeSection",
            SinkEvent::OpenHeader { .. } => "openHeader",
            SinkEvent::CloseHeader => "closeHeader",
            SinkEvent::OpenFooter { .. } => "openFooter",
            SinkEvent::CloseFooter => "closeFooter",
            SinkEvent::OpenParagraph { .. } => "openParagraph",
            SinkEvent::CloseParagraph => "closeParagraph",
            SinkEvent::OpenOrderedListLevel { .. } => "openOrderedListLevel",
            SinkEvent::CloseOrderedListLevel => "closeOrderedListLevel",
            SinkEvent::OpenUnorderedListLevel { .. } => "openUnorderedListLevel",
            SinkEvent::CloseUnorderedListLevel => "closeUnorderedListLevel",
            SinkEvent::OpenListElement { .. } => "openListElement",
            SinkEvent::CloseListElement => "closeListElement",
            SinkEvent::OpenSpan { .. } => "openSpan",
            SinkEvent::CloseSpan => "closeSpan",
            SinkEvent::InsertText { .. } => "insertText",
            SinkEvent::InsertTab => "insertTab",
            SinkEvent::InsertLineBreak => "insertLineBreak",
            SinkEvent::OpenLink { .. } => "openLink",
            SinkEvent::CloseLink => "closeLink",
            SinkEvent::OpenFootnote { .. } => "openFootnote",
            SinkEvent::CloseFootnote => "closeFootnote",
            SinkEvent::OpenEndnote { .. } => "openEndnote",
            SinkEvent::CloseEndnote => "closeEndnote",
            SinkEvent::OpenTable { .. } => "openTable",
            SinkEvent::OpenTableRow { .. } => "openTableRow",
            SinkEvent::CloseTableRow => "closeTableRow",
            SinkEvent::OpenTableCell { .. } => "openTableCell",
            SinkEvent::CloseTableCell => "closeTableCell",
            SinkEvent::InsertCoveredTableCell { .. } => "insertCoveredTableCell",
            SinkEvent::CloseTable => "closeTable",
            SinkEvent::InsertBinaryObject { .. } => "insertBinaryObject",
        }
    }

    /// Name of the close call that balances this open call.
    pub fn closing_name(&self) -> Option<&'static str> {
        let name = match self {
            SinkEvent::StartDocument => "endDocument",
            SinkEvent::OpenSection { .. } => "closeSection",
            SinkEvent::OpenHeader { .. } => "closeHeader",
            SinkEvent::OpenFooter { .. } => "closeFooter",
            SinkEvent::OpenParagraph { .. } => "closeParagraph",
            SinkEvent::OpenOrderedListLevel { .. } => "closeOrderedListLevel",
            SinkEvent::OpenUnorderedListLevel { .. } => "closeUnorderedListLevel",
            SinkEvent::OpenListElement { .. } => "closeListElement",
            SinkEvent::OpenSpan { .. } => "closeSpan",
            SinkEvent::OpenLink { .. } => "closeLink",
            SinkEvent::OpenFootnote { .. } => "closeFootnote",
            SinkEvent::OpenEndnote { .. } => "closeEndnote",
            SinkEvent::OpenTable { .. } => "closeTable",
            SinkEvent::OpenTableRow { .. } => "closeTableRow",
            SinkEvent::OpenTableCell { .. } => "closeTableCell",
            _ => return None,
        };
        Some(name)
    }

    /// Check if this event closes something.
    pub fn is_close(&self) -> bool {
        matches!(
            self,
            SinkEvent::EndDocument
                | SinkEvent::CloseSection
                | SinkEvent::CloseHeader
                | SinkEvent::CloseFooter
                | SinkEvent::CloseParagraph
                | SinkEvent::CloseOrderedListLevel
                | SinkEvent::CloseUnorderedListLevel
                | SinkEvent::CloseListElement
                | SinkEvent::CloseSpan
                | SinkEvent::CloseLink
                | SinkEvent::CloseFootnote
                | SinkEvent::CloseEndnote
                | SinkEvent::CloseTable
                | SinkEvent::CloseTableRow
                | SinkEvent::CloseTableCell
        )
    }

    /// Get the text if this is a text event.
    pub fn text(&self) -> Option<&str> {
        match self {
            SinkEvent::InsertText { text } => Some(text),
            _ => None,
        }
    }

    /// Get the primary property list, if the call carries one.
    pub fn props(&self) -> Option<&PropertyList> {
        match self {
            SinkEvent::SetDocumentMetadata { metadata } => Some(metadata),
            SinkEvent::OpenSection { props, .. }
            | SinkEvent::OpenHeader { props }
            | SinkEvent::OpenFooter { props }
            | SinkEvent::OpenParagraph { props, .. }
            | SinkEvent::OpenOrderedListLevel { props }
            | SinkEvent::OpenUnorderedListLevel { props }
            | SinkEvent::OpenListElement { props, .. }
            | SinkEvent::OpenSpan { props }
            | SinkEvent::OpenLink { props }
            | SinkEvent::OpenFootnote { props }
            | SinkEvent::OpenEndnote { props }
            | SinkEvent::OpenTable { props, .. }
            | SinkEvent::OpenTableRow { props }
            | SinkEvent::OpenTableCell { props }
            | SinkEvent::InsertCoveredTableCell { props }
            | SinkEvent::InsertBinaryObject { props, .. } => Some(props),
            _ => None,
        }
    }
}

/// A sink that records every call.
#[derive(Debug, Clone, Default)]
pub struct EventRecorder {
    events: Vec<SinkEvent>,
}

impl EventRecorder {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded events in call order.
    pub fn events(&self) -> &[SinkEvent] {
        &self.events
    }

    /// Take the recorded events.
    pub fn into_events(self) -> Vec<SinkEvent> {
        self.events
    }

    /// Names of the recorded calls in order.
    pub fn names(&self) -> Vec<&'static str> {
        self.events.iter().map(SinkEvent::name).collect()
    }

    /// Number of recorded calls with the given name.
    pub fn count(&self, name: &str) -> usize {
        self.events.iter().filter(|e| e.name() == name).count()
    }

    /// All inserted text concatenated.
    pub fn text(&self) -> String {
        self.events.iter().filter_map(SinkEvent::text).collect()
    }

    /// Check that every open call is matched by the right close call.
    ///
    /// Returns the offending event index on failure.
    pub fn check_balanced(&self) -> std::result::Result<(), usize> {
        let mut open: Vec<&'static str> = Vec::new();
        for (index, event) in self.events.iter().enumerate() {
            if let Some(closing) = event.closing_name() {
                open.push(closing);
            } else if event.is_close() {
                if open.pop() != Some(event.name()) {
                    return Err(index);
                }
            }
        }
        if open.is_empty() {
            Ok(())
        } else {
            Err(self.events.len())
        }
    }

    /// Forget everything recorded so far.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    fn push(&mut self, event: SinkEvent) {
        self.events.push(event);
    }
}

impl DocumentSink for EventRecorder {
    fn set_document_metadata(&mut self, metadata: &PropertyList) {
        self.push(SinkEvent::SetDocumentMetadata {
            metadata: metadata.clone(),
        });
    }

    fn start_document(&mut self) {
        self.push(SinkEvent::StartDocument);
    }

    fn end_document(&mut self) {
        self.push(SinkEvent::EndDocument);
    }

    fn open_section(&mut self, props: &PropertyList, columns: &[PropertyList]) {
        self.push(SinkEvent::OpenSection {
            props: props.clone(),
            columns: columns.to_vec(),
        });
    }

    fn close_section(&mut self) {
        self.push(SinkEvent::CloseSection);
    }

    fn open_header(&mut self, props: &PropertyList) {
        self.push(SinkEvent::OpenHeader {
            props: props.clone(),
        });
    }

    fn close_header(&mut self) {
        self.push(SinkEvent::CloseHeader);
    }

    fn open_footer(&mut self, props: &PropertyList) {
        self.push(SinkEvent::OpenFooter {
            props: props.clone(),
        });
    }

    fn close_footer(&mut self) {
        self.push(SinkEvent::CloseFooter);
    }

    fn open_paragraph(&mut self, props: &PropertyList, tab_stops: &[PropertyList]) {
        self.push(SinkEvent::OpenParagraph {
            props: props.clone(),
            tab_stops: tab_stops.to_vec(),
        });
    }

    fn close_paragraph(&mut self) {
        self.push(SinkEvent::CloseParagraph);
    }

    fn open_ordered_list_level(&mut self, props: &PropertyList) {
        self.push(SinkEvent::OpenOrderedListLevel {
            props: props.clone(),
        });
    }

    fn close_ordered_list_level(&mut self) {
        self.push(SinkEvent::CloseOrderedListLevel);
    }

    fn open_unordered_list_level(&mut self, props: &PropertyList) {
        self.push(SinkEvent::OpenUnorderedListLevel {
            props: props.clone(),
        });
    }

    fn close_unordered_list_level(&mut self) {
        self.push(SinkEvent::CloseUnorderedListLevel);
    }

    fn open_list_element(&mut self, props: &PropertyList, tab_stops: &[PropertyList]) {
        self.push(SinkEvent::OpenListElement {
            props: props.clone(),
            tab_stops: tab_stops.to_vec(),
        });
    }

    fn close_list_element(&mut self) {
        self.push(SinkEvent::CloseListElement);
    }

    fn open_span(&mut self, props: &PropertyList) {
        self.push(SinkEvent::OpenSpan {
            props: props.clone(),
        });
    }

    fn close_span(&mut self) {
        self.push(SinkEvent::CloseSpan);
    }

    fn insert_text(&mut self, text: &str) {
        self.push(SinkEvent::InsertText {
            text: text.to_string(),
        });
    }

    fn insert_tab(&mut self) {
        self.push(SinkEvent::InsertTab);
    }

    fn insert_line_break(&mut self) {
        self.push(SinkEvent::InsertLineBreak);
    }

    fn open_link(&mut self, props: &PropertyList) {
        self.push(SinkEvent::OpenLink {
            props: props.clone(),
        });
    }

    fn close_link(&mut self) {
        self.push(SinkEvent::CloseLink);
    }

    fn open_footnote(&mut self, props: &PropertyList) {
        self.push(SinkEvent::OpenFootnote {
            props: props.clone(),
        });
    }

    fn close_footnote(&mut self) {
        self.push(SinkEvent::CloseFootnote);
    }

    fn open_endnote(&mut self, props: &PropertyList) {
        self.push(SinkEvent::OpenEndnote {
            props: props.clone(),
        });
    }

    fn close_endnote(&mut self) {
        self.push(SinkEvent::CloseEndnote);
    }

    fn open_table(&mut self, props: &PropertyList, columns: &[PropertyList]) {
        self.push(SinkEvent::OpenTable {
            props: props.clone(),
            columns: columns.to_vec(),
        });
    }

    fn open_table_row(&mut self, props: &PropertyList) {
        self.push(SinkEvent::OpenTableRow {
            props: props.clone(),
        });
    }

    fn close_table_row(&mut self) {
        self.push(SinkEvent::CloseTableRow);
    }

    fn open_table_cell(&mut self, props: &PropertyList) {
        self.push(SinkEvent::OpenTableCell {
            props: props.clone(),
        });
    }

    fn close_table_cell(&mut self) {
        self.push(SinkEvent::CloseTableCell);
    }

    fn insert_covered_table_cell(&mut self, props: &PropertyList) {
        self.push(SinkEvent::InsertCoveredTableCell {
            props: props.clone(),
        });
    }

    fn close_table(&mut self) {
        self.push(SinkEvent::CloseTable);
    }

    fn insert_binary_object(&mut self, props: &PropertyList, data: &[u8]) {
        self.push(SinkEvent::InsertBinaryObject {
            props: props.clone(),
            size: data.len(),
        });
    }
}
