//! Plain text rendering.

use crate::model::PropertyList;

use super::DocumentSink;

/// A sink that flattens the document into plain text.
///
/// Paragraph ends and line breaks become `\n`, tabs stay `\t`, and list
/// items are indented by level with a `- ` marker.
#[derive(Debug, Clone, Default)]
pub struct TextSink {
    output: String,
    include_metadata: bool,
    list_depth: usize,
}

impl TextSink {
    /// Create an empty text sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Write metadata entries as `key: value` lines before the body.
    pub fn with_metadata(mut self, include: bool) -> Self {
        self.include_metadata = include;
        self
    }

    /// Text collected so far.
    pub fn text(&self) -> &str {
        &self.output
    }

    /// Finish and return the text without trailing whitespace.
    pub fn into_text(self) -> String {
        self.output.trim_end().to_string()
    }
}

impl DocumentSink for TextSink {
    fn set_document_metadata(&mut self, metadata: &PropertyList) {
        if !self.include_metadata || metadata.is_empty() {
            return;
        }
        for (key, value) in metadata.iter() {
            self.output.push_str(&format!("{}: {}\n", key, value));
        }
        self.output.push('\n');
    }

    fn close_paragraph(&mut self) {
        self.output.push('\n');
    }

    fn open_ordered_list_level(&mut self, _props: &PropertyList) {
        self.list_depth += 1;
    }

    fn close_ordered_list_level(&mut self) {
        self.list_depth = self.list_depth.saturating_sub(1);
    }

    fn open_unordered_list_level(&mut self, _props: &PropertyList) {
        self.list_depth += 1;
    }

    fn close_unordered_list_level(&mut self) {
        self.list_depth = self.list_depth.saturating_sub(1);
    }

    fn open_list_element(&mut self, _props: &PropertyList, _tab_stops: &[PropertyList]) {
        let indent = self.list_depth.saturating_sub(1);
        self.output.push_str(&"  ".repeat(indent));
        self.output.push_str("- ");
    }

    fn close_list_element(&mut self) {
        self.output.push('\n');
    }

    fn insert_text(&mut self, text: &str) {
        self.output.push_str(text);
    }

    fn insert_tab(&mut self) {
        self.output.push('\t');
    }

    fn insert_line_break(&mut self) {
        self.output.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraphs_and_breaks() {
        let mut sink = TextSink::new();
        let props = PropertyList::new();
        sink.open_paragraph(&props, &[]);
        sink.insert_text("Hello,");
        sink.insert_tab();
        sink.insert_text("world!");
        sink.insert_line_break();
        sink.insert_text("Again");
        sink.close_paragraph();
        sink.open_paragraph(&props, &[]);
        sink.insert_text("Second paragraph.");
        sink.close_paragraph();

        assert_eq!(sink.into_text(), "Hello,\tworld!\nAgain\nSecond paragraph.");
    }

    #[test]
    fn test_list_items_are_indented() {
        let mut sink = TextSink::new();
        let props = PropertyList::new();
        sink.open_unordered_list_level(&props);
        sink.open_list_element(&props, &[]);
        sink.insert_text("one");
        sink.close_list_element();
        sink.open_ordered_list_level(&props);
        sink.open_list_element(&props, &[]);
        sink.insert_text("nested");
        sink.close_list_element();
        sink.close_ordered_list_level();
        sink.close_unordered_list_level();

        assert_eq!(sink.into_text(), "- one\n  - nested");
    }

    #[test]
    fn test_metadata_header() {
        let metadata = PropertyList::new().with("dc:title", "Report");
        let mut sink = TextSink::new().with_metadata(true);
        sink.set_document_metadata(&metadata);
        sink.insert_text("Body");
        assert_eq!(sink.into_text(), "dc:title: Report\n\nBody");

        let mut quiet = TextSink::new();
        quiet.set_document_metadata(&metadata);
        assert_eq!(quiet.text(), "");
    }
}
