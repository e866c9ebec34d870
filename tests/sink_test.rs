//! Integration tests for the reference sinks.

use unabw::model::PropertyList;
use unabw::render::{CompositeSink, DocumentSink, EventRecorder, JsonFormat, SinkEvent, TextSink};

const REPORT: &str = r#"<abiword>
<metadata><m key="dc.title">Status</m><m key="abiword.generator">AbiWord</m></metadata>
<lists><l id="1" parentid="0" type="5"/><l id="2" parentid="1" type="5"/></lists>
<section>
<p>Intro&#9;text</p>
<p listid="1">alpha</p>
<p listid="2">beta</p>
<p>Done</p>
</section>
</abiword>"#;

/// Sink that only counts structure.
#[derive(Default)]
struct Outline {
    sections: usize,
    paragraphs: usize,
    items: usize,
    depth: usize,
    max_depth: usize,
}

impl DocumentSink for Outline {
    fn open_section(&mut self, _props: &PropertyList, _columns: &[PropertyList]) {
        self.sections += 1;
    }

    fn open_paragraph(&mut self, _props: &PropertyList, _tab_stops: &[PropertyList]) {
        self.paragraphs += 1;
    }

    fn open_list_element(&mut self, _props: &PropertyList, _tab_stops: &[PropertyList]) {
        self.items += 1;
    }

    fn open_unordered_list_level(&mut self, _props: &PropertyList) {
        self.depth += 1;
        self.max_depth = self.max_depth.max(self.depth);
    }

    fn close_unordered_list_level(&mut self) {
        self.depth -= 1;
    }
}

#[test]
fn test_partial_sink() {
    let mut outline = Outline::default();
    unabw::parse_bytes(REPORT.as_bytes(), &mut outline).unwrap();

    assert_eq!(outline.sections, 1);
    assert_eq!(outline.paragraphs, 2);
    assert_eq!(outline.items, 2);
    assert_eq!(outline.max_depth, 2);
    assert_eq!(outline.depth, 0);
}

#[test]
fn test_text_sink_output() {
    let text = unabw::extract_text_from_bytes(REPORT.as_bytes()).unwrap();
    assert_eq!(text, "Intro\ttext\n- alpha\n  - beta\nDone");
}

#[test]
fn test_text_sink_with_metadata() {
    let mut sink = TextSink::new().with_metadata(true);
    unabw::parse_bytes(REPORT.as_bytes(), &mut sink).unwrap();
    let text = sink.into_text();

    assert!(text.starts_with("abiword:generator: AbiWord\ndc:title: Status\n\nIntro"));
}

#[test]
fn test_composite_sink_feeds_all() {
    let mut recorder = EventRecorder::new();
    let mut text = TextSink::new();
    let mut outline = Outline::default();
    {
        let mut composite = CompositeSink::new()
            .with_sink(&mut recorder)
            .with_sink(&mut text)
            .with_sink(&mut outline);
        assert_eq!(composite.len(), 3);
        unabw::parse_bytes(REPORT.as_bytes(), &mut composite).unwrap();
    }

    assert_eq!(recorder.check_balanced(), Ok(()));
    assert_eq!(recorder.count("openListElement"), outline.items);
    assert_eq!(text.text().trim_end(), "Intro\ttext\n- alpha\n  - beta\nDone");
}

#[test]
fn test_json_output() {
    let events = unabw::record_events(std::io::Cursor::new(REPORT)).unwrap();
    let json = unabw::to_json(&events, JsonFormat::Compact).unwrap();

    assert!(json.starts_with(r#"[{"event":"startDocument"}"#));
    assert!(json.contains(r#"{"event":"insertText","text":"alpha"}"#));
    assert!(json.contains(r#""event":"openUnorderedListLevel""#));
    assert!(json.ends_with(r#"{"event":"endDocument"}]"#));

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value.as_array().map(Vec::len), Some(events.len()));

    let pretty = unabw::to_json(&events, JsonFormat::Pretty).unwrap();
    assert!(pretty.contains('\n'));
}

#[test]
fn test_table_event_sequence() {
    let xml = r#"<abiword><section><table>
<cell props="left-attach:0; right-attach:2; top-attach:0; bot-attach:1"><p>wide</p></cell>
<cell props="left-attach:1; right-attach:2; top-attach:1; bot-attach:2"><p>right</p></cell>
</table></section></abiword>"#;
    let events = unabw::record_events(std::io::Cursor::new(xml)).unwrap();
    let names: Vec<&str> = events.iter().map(SinkEvent::name).collect();

    assert_eq!(
        names,
        vec![
            "startDocument",
            "openSection",
            "openTable",
            "openTableRow",
            "openTableCell",
            "openParagraph",
            "openSpan",
            "insertText",
            "closeSpan",
            "closeParagraph",
            "closeTableCell",
            "closeTableRow",
            "openTableRow",
            "insertCoveredTableCell",
            "openTableCell",
            "openParagraph",
            "openSpan",
            "insertText",
            "closeSpan",
            "closeParagraph",
            "closeTableCell",
            "closeTableRow",
            "closeTable",
            "closeSection",
            "endDocument",
        ]
    );

    match &events[2] {
        SinkEvent::OpenTable { columns, .. } => assert_eq!(columns.len(), 2),
        other => panic!("unexpected {:?}", other),
    }
    let wide = events[4].props().unwrap();
    assert_eq!(
        wide.get("table:number-columns-spanned").and_then(|v| v.as_int()),
        Some(2)
    );
}
