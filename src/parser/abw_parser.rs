//! Two-pass AbiWord parser.

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};

use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::Reader;

use crate::collector::{
    Collector, ContentCollector, ListAttrs, PageSizeAttrs, ParagraphAttrs, SectionAttrs,
    StylesCollector, TextStyleAttrs,
};
use crate::error::{Error, Result};
use crate::model::Artifacts;
use crate::render::DocumentSink;

use super::attrs::{bool_or_false, decode_data};
use super::list_resolver::resolve_list_ids;
use super::options::{ErrorMode, ParseOptions};
use super::token::Token;

/// AbiWord document parser.
///
/// The input is read twice. The first pass collects list definitions,
/// embedded data, table sizes and metadata; the second pass emits the
/// document to a [`DocumentSink`] using what the first pass found.
pub struct AbwParser<R: Read + Seek> {
    input: R,
    options: ParseOptions,
}

impl<R: Read + Seek> AbwParser<R> {
    /// Create a parser with default options.
    pub fn new(input: R) -> Self {
        Self::with_options(input, ParseOptions::default())
    }

    /// Create a parser with custom options.
    pub fn with_options(input: R, options: ParseOptions) -> Self {
        Self { input, options }
    }

    /// Get the parse options.
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Give back the underlying input.
    pub fn into_inner(self) -> R {
        self.input
    }

    /// Parse the document into `sink`.
    ///
    /// Either both passes complete or an error is returned. The sink may
    /// have received a partial sequence when the second pass fails.
    pub fn parse(&mut self, sink: &mut dyn DocumentSink) -> Result<()> {
        let artifacts = self.collect_artifacts()?;

        log::debug!(
            "first pass: {} list elements, {} tables, {} data items",
            artifacts.list_elements.len(),
            artifacts.table_sizes.len(),
            artifacts.data.len()
        );

        let mut content = ContentCollector::new(sink, &artifacts, self.options.clone());
        self.process_document(&mut content)
    }

    /// Run the first pass only and return its resolved artifacts.
    pub fn collect_artifacts(&mut self) -> Result<Artifacts> {
        if self.input.seek(SeekFrom::End(0))? == 0 {
            return Err(Error::EmptyInput);
        }

        let mut artifacts = Artifacts::new();
        {
            let mut styles = StylesCollector::new(&mut artifacts);
            self.process_document(&mut styles)?;
        }
        resolve_list_ids(&mut artifacts.list_elements);
        Ok(artifacts)
    }

    /// One full traversal of the input with `collector` active.
    fn process_document(&mut self, collector: &mut dyn Collector) -> Result<()> {
        self.input.seek(SeekFrom::Start(0))?;

        let mut reader = Reader::from_reader(BufReader::new(&mut self.input));
        let config = reader.config_mut();
        config.trim_text(false);
        config.check_end_names = false;

        let mut traversal = Traversal {
            reader,
            buf: Vec::new(),
            collector,
            error_mode: self.options.error_mode,
            finished: false,
            in_metadata: false,
            metadata_key: None,
            paragraph_depth: 0,
            span_depth: 0,
        };
        traversal.run()
    }
}

/// Attribute values of one element, unescaped.
struct Attrs(HashMap<String, String>);

impl Attrs {
    fn from_element(element: &BytesStart<'_>) -> Self {
        let mut values = HashMap::new();
        for attr in element.attributes().with_checks(false).flatten() {
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = match attr.unescape_value() {
                Ok(value) => value.into_owned(),
                Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
            };
            values.insert(key, value);
        }
        Self(values)
    }

    fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    fn owned(&self, name: &str) -> Option<String> {
        self.0.get(name).cloned()
    }
}

/// State of a single pass over the XML.
struct Traversal<'c, B: BufRead> {
    reader: Reader<B>,
    buf: Vec<u8>,
    collector: &'c mut dyn Collector,
    error_mode: ErrorMode,
    finished: bool,
    in_metadata: bool,
    metadata_key: Option<String>,
    paragraph_depth: usize,
    span_depth: usize,
}

impl<B: BufRead> Traversal<'_, B> {
    fn run(&mut self) -> Result<()> {
        while let Some(event) = self.next_event()? {
            match event {
                Event::Start(element) => self.element_start(&element, false)?,
                Event::Empty(element) => {
                    self.element_start(&element, true)?;
                    self.element_end(Token::from_name(element.name().as_ref()));
                }
                Event::End(element) => {
                    self.element_end(Token::from_name(element.name().as_ref()));
                }
                Event::Text(text) => self.text(&text),
                _ => {}
            }
        }
        self.collector.end_document();
        Ok(())
    }

    /// Pull the next event; `None` at the end of input.
    ///
    /// In lenient mode a syntax error ends the pass as if the input had
    /// run out. I/O errors are always fatal.
    fn next_event(&mut self) -> Result<Option<Event<'static>>> {
        if self.finished {
            return Ok(None);
        }
        self.buf.clear();
        match self.reader.read_event_into(&mut self.buf) {
            Ok(Event::Eof) => {
                self.finished = true;
                Ok(None)
            }
            Ok(event) => Ok(Some(event.into_owned())),
            Err(quick_xml::Error::Io(err)) => Err(quick_xml::Error::Io(err).into()),
            Err(err) => {
                self.finished = true;
                let position = self.reader.error_position();
                match self.error_mode {
                    ErrorMode::Strict => Err(Error::Xml(format!("{} at byte {}", err, position))),
                    ErrorMode::Lenient => {
                        log::warn!("malformed XML at byte {}: {}; ending pass", position, err);
                        Ok(None)
                    }
                }
            }
        }
    }

    fn text(&mut self, text: &BytesText<'_>) {
        let value = match text.unescape() {
            Ok(value) => value.into_owned(),
            Err(err) => {
                log::debug!("keeping raw text after unescape failure: {}", err);
                String::from_utf8_lossy(text).into_owned()
            }
        };
        if !self.is_significant(&value) {
            return;
        }

        if self.in_metadata {
            match self.metadata_key.take() {
                Some(key) => self.collector.add_metadata_entry(&key, &value),
                None => log::debug!("metadata text without a key: {:?}", value),
            }
        } else {
            self.collector.insert_text(&value);
        }
    }

    /// Whitespace-only text is layout, except inside a span, or inside a
    /// paragraph when it holds no line break.
    fn is_significant(&self, text: &str) -> bool {
        if !text.chars().all(char::is_whitespace) {
            return true;
        }
        if text.is_empty() {
            return false;
        }
        self.span_depth > 0 || (self.paragraph_depth > 0 && !text.contains(['\n', '\r']))
    }

    fn element_start(&mut self, element: &BytesStart<'_>, empty: bool) -> Result<()> {
        let token = Token::from_name(element.name().as_ref());
        if !token.is_known() {
            log::debug!(
                "skipping unknown element <{}>",
                String::from_utf8_lossy(element.name().as_ref())
            );
            return Ok(());
        }

        let attrs = Attrs::from_element(element);
        match token {
            Token::Abiword => {
                self.collector.collect_document_properties(attrs.get("props"));
                self.collector.start_document();
            }
            Token::Metadata => self.in_metadata = true,
            Token::M => {
                if let Some(key) = attrs.owned("key") {
                    self.metadata_key = Some(key);
                }
            }
            Token::History | Token::Revisions | Token::IgnoredWords => {
                if !empty {
                    self.skip_element(token)?;
                }
            }
            Token::S => self.read_style(&attrs),
            Token::L => self.collector.collect_list(&ListAttrs {
                id: attrs.owned("id"),
                parent_id: attrs.owned("parentid"),
                decimal: attrs.owned("list-decimal"),
                delimiter: attrs.owned("list-delim"),
                start_value: attrs.owned("start-value"),
                list_type: attrs.owned("type"),
            }),
            Token::PageSize => self.collector.collect_page_size(&PageSizeAttrs {
                width: attrs.owned("width"),
                height: attrs.owned("height"),
                units: attrs.owned("units"),
                page_scale: attrs.owned("page-scale"),
            }),
            Token::Section => self.read_section(&attrs),
            Token::D => self.read_data(&attrs, empty)?,
            Token::P => {
                self.paragraph_depth += 1;
                // the parent id comes from the same `listid` attribute as the list id
                self.collector.collect_paragraph_properties(&ParagraphAttrs {
                    level: attrs.owned("level"),
                    list_id: attrs.owned("listid"),
                    parent_id: attrs.owned("listid"),
                    style: attrs.owned("style"),
                    props: attrs.owned("props"),
                });
            }
            Token::C => {
                self.span_depth += 1;
                self.collector
                    .collect_character_properties(attrs.get("style"), attrs.get("props"));
            }
            Token::Cbr => self.collector.insert_column_break(),
            Token::Pbr => self.collector.insert_page_break(),
            Token::Br => self.collector.insert_line_break(),
            Token::A => self.collector.open_link(attrs.get("xlink:href")),
            Token::Foot => self.collector.open_foot(attrs.get("footnote-id")),
            Token::Endnote => self.collector.open_endnote(attrs.get("endnote-id")),
            Token::Table => self.collector.open_table(attrs.get("props")),
            Token::Cell => self.collector.open_cell(attrs.get("props")),
            Token::Image => self
                .collector
                .insert_image(attrs.get("dataid"), attrs.get("props")),
            Token::Unknown => {}
        }
        Ok(())
    }

    fn element_end(&mut self, token: Token) {
        match token {
            Token::Metadata => {
                self.in_metadata = false;
                self.metadata_key = None;
            }
            Token::Section => self.collector.end_section(),
            Token::P => {
                self.paragraph_depth = self.paragraph_depth.saturating_sub(1);
                self.collector.close_paragraph_or_list_element();
            }
            Token::C => {
                self.span_depth = self.span_depth.saturating_sub(1);
                self.collector.close_span();
            }
            Token::A => self.collector.close_link(),
            Token::Foot => self.collector.close_foot(),
            Token::Endnote => self.collector.close_endnote(),
            Token::Table => self.collector.close_table(),
            Token::Cell => self.collector.close_cell(),
            _ => {}
        }
    }

    fn read_style(&mut self, attrs: &Attrs) {
        let kind = attrs.get("type").unwrap_or_default();
        if !(kind.starts_with('P') || kind.starts_with('C')) {
            log::debug!("ignoring style of type {:?}", kind);
            return;
        }
        self.collector.collect_text_style(&TextStyleAttrs {
            name: attrs.owned("name"),
            based_on: attrs.owned("basedon"),
            props: attrs.owned("props"),
        });
    }

    fn read_section(&mut self, attrs: &Attrs) {
        match attrs.get("type") {
            Some(kind) if kind.starts_with("header") || kind.starts_with("footer") => {
                self.collector.collect_header_footer(attrs.get("id"), kind);
            }
            _ => self.collector.collect_section_properties(&SectionAttrs {
                props: attrs.owned("props"),
                header: attrs.owned("header"),
                header_even: attrs.owned("header-even"),
                header_first: attrs.owned("header-first"),
                header_last: attrs.owned("header-last"),
                footer: attrs.owned("footer"),
                footer_even: attrs.owned("footer-even"),
                footer_first: attrs.owned("footer-first"),
                footer_last: attrs.owned("footer-last"),
            }),
        }
    }

    /// Gather the payload of a `<d>` element up to its end tag.
    fn read_data(&mut self, attrs: &Attrs, empty: bool) -> Result<()> {
        let mut payload = String::new();
        if !empty {
            while let Some(event) = self.next_event()? {
                match event {
                    Event::Text(text) => match text.unescape() {
                        Ok(value) => payload.push_str(&value),
                        Err(_) => payload.push_str(&String::from_utf8_lossy(&text)),
                    },
                    Event::CData(data) => payload.push_str(&String::from_utf8_lossy(&data)),
                    Event::End(end) if Token::from_name(end.name().as_ref()) == Token::D => break,
                    _ => {}
                }
            }
        }

        let base64 = bool_or_false(attrs.get("base64"));
        match decode_data(&payload, base64) {
            Some(bytes) => {
                self.collector
                    .collect_data(attrs.get("name"), attrs.get("mime-type"), bytes)
            }
            None => log::warn!(
                "dropping data item {:?}: payload is not valid base64",
                attrs.get("name")
            ),
        }
        Ok(())
    }

    /// Skip everything up to the end of the current `token` element.
    fn skip_element(&mut self, token: Token) -> Result<()> {
        while let Some(event) = self.next_event()? {
            if let Event::End(element) = event {
                if Token::from_name(element.name().as_ref()) == token {
                    break;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::EventRecorder;
    use std::io::Cursor;

    fn record(xml: &str) -> EventRecorder {
        let mut recorder = EventRecorder::new();
        AbwParser::new(Cursor::new(xml.as_bytes()))
            .parse(&mut recorder)
            .unwrap();
        recorder
    }

    #[test]
    fn test_empty_input_is_an_error() {
        let mut parser = AbwParser::new(Cursor::new(Vec::new()));
        let result = parser.parse(&mut EventRecorder::new());
        assert!(matches!(result, Err(Error::EmptyInput)));
    }

    #[test]
    fn test_first_pass_collects_artifacts() {
        let xml = r#"<abiword>
            <metadata><m key="dc.title">Report</m></metadata>
            <lists>
                <l id="1" parentid="0" type="0"/>
                <l id="2" parentid="1" type="5"/>
            </lists>
            <section>
                <table><cell props="left-attach:0; right-attach:2; top-attach:0; bot-attach:1"></cell></table>
            </section>
            <data><d name="pic" mime-type="image/png" base64="yes">AAEC</d></data>
        </abiword>"#;
        let artifacts = AbwParser::new(Cursor::new(xml)).collect_artifacts().unwrap();

        assert_eq!(artifacts.list_elements[&2].list_id, Some(1));
        assert_eq!(artifacts.table_sizes[&0].columns, 2);
        assert_eq!(artifacts.data["pic"].data, vec![0, 1, 2]);
        assert_eq!(artifacts.metadata.get_str("dc:title"), Some("Report"));
    }

    #[test]
    fn test_raw_data_payload() {
        let xml = r#"<abiword><data><d name="svg" base64="no"><![CDATA[<svg/>]]></d></data></abiword>"#;
        let artifacts = AbwParser::new(Cursor::new(xml)).collect_artifacts().unwrap();
        assert_eq!(artifacts.data["svg"].data, b"<svg/>");
    }

    #[test]
    fn test_history_is_drained() {
        let recorder = record(
            r#"<abiword><history><version id="1"><p>not content</p></version></history><section><p>kept</p></section></abiword>"#,
        );
        assert_eq!(recorder.text(), "kept");
    }

    #[test]
    fn test_empty_ignoredwords_does_not_swallow_document() {
        let recorder = record(r#"<abiword><ignoredwords/><section><p>kept</p></section></abiword>"#);
        assert_eq!(recorder.text(), "kept");
    }

    #[test]
    fn test_whitespace_between_spans_is_kept() {
        let recorder = record(r#"<abiword><section><p><c>a</c> <c>b</c></p></section></abiword>"#);
        assert_eq!(recorder.text(), "a b");
    }

    #[test]
    fn test_layout_whitespace_is_dropped() {
        let recorder = record("<abiword>\n  <section>\n    <p>\n      <c>x</c>\n    </p>\n  </section>\n</abiword>");
        assert_eq!(recorder.text(), "x");
    }

    #[test]
    fn test_escaped_text() {
        let recorder = record(r#"<abiword><section><p>a &amp; b &lt;c&gt;</p></section></abiword>"#);
        assert_eq!(recorder.text(), "a & b <c>");
    }

    #[test]
    fn test_strict_mode_reports_malformed_xml() {
        let xml = "<abiword><section><p>text</p></section><!-- unterminated";
        let mut parser = AbwParser::with_options(Cursor::new(xml), ParseOptions::new().strict());
        let result = parser.parse(&mut EventRecorder::new());
        assert!(matches!(result, Err(Error::Xml(_))));
    }

    #[test]
    fn test_lenient_mode_keeps_prefix() {
        let xml = "<abiword><section><p>text</p></section><!-- unterminated";
        let mut recorder = EventRecorder::new();
        AbwParser::new(Cursor::new(xml)).parse(&mut recorder).unwrap();
        assert_eq!(recorder.text(), "text");
        assert_eq!(recorder.check_balanced(), Ok(()));
    }

    #[test]
    fn test_style_types_other_than_p_and_c_are_ignored() {
        let recorder = record(
            r#"<abiword><styles><s type="X" name="Weird" props="font-weight:bold"/></styles><section><p><c style="Weird">t</c></p></section></abiword>"#,
        );
        let span = recorder
            .events()
            .iter()
            .find(|e| e.name() == "openSpan")
            .unwrap();
        assert!(span.props().unwrap().is_empty());
    }

    #[test]
    fn test_parse_twice_with_same_parser() {
        let xml = r#"<abiword><section><p><c>again</c></p></section></abiword>"#;
        let mut parser = AbwParser::new(Cursor::new(xml));
        let mut first = EventRecorder::new();
        let mut second = EventRecorder::new();
        parser.parse(&mut first).unwrap();
        parser.parse(&mut second).unwrap();
        assert_eq!(first.events(), second.events());
    }
}
