//! Collectors driven by the token dispatcher.
//!
//! Each pass over the document has exactly one active collector. The styles
//! collector runs first and only records facts that later content depends
//! on; the content collector runs second and emits to the sink.

mod content;
pub mod props;
mod state;
mod styles;
mod table;

pub use content::ContentCollector;
pub use state::{Layer, NoteKind, ParsingState, SectionKind, Transition};
pub use styles::StylesCollector;
pub use table::{CellPosition, TableGrid, MAX_TABLE_COLUMNS, MAX_TABLE_ROWS};

/// Raw attributes of an `<s>` style definition of type `P` or `C`.
#[derive(Debug, Clone, Default)]
pub struct TextStyleAttrs {
    /// `name`
    pub name: Option<String>,
    /// `basedon`
    pub based_on: Option<String>,
    /// `props`
    pub props: Option<String>,
}

/// Raw attributes of an `<l>` list definition.
#[derive(Debug, Clone, Default)]
pub struct ListAttrs {
    /// `id`
    pub id: Option<String>,
    /// `parentid`
    pub parent_id: Option<String>,
    /// `list-decimal`
    pub decimal: Option<String>,
    /// `list-delim`
    pub delimiter: Option<String>,
    /// `start-value`
    pub start_value: Option<String>,
    /// `type`
    pub list_type: Option<String>,
}

/// Raw attributes of `<pagesize>`.
#[derive(Debug, Clone, Default)]
pub struct PageSizeAttrs {
    /// `width`
    pub width: Option<String>,
    /// `height`
    pub height: Option<String>,
    /// `units`
    pub units: Option<String>,
    /// `page-scale`
    pub page_scale: Option<String>,
}

/// Raw attributes of an ordinary `<section>`.
#[derive(Debug, Clone, Default)]
pub struct SectionAttrs {
    /// `props`
    pub props: Option<String>,
    /// `header`
    pub header: Option<String>,
    /// `header-even`
    pub header_even: Option<String>,
    /// `header-first`
    pub header_first: Option<String>,
    /// `header-last`
    pub header_last: Option<String>,
    /// `footer`
    pub footer: Option<String>,
    /// `footer-even`
    pub footer_even: Option<String>,
    /// `footer-first`
    pub footer_first: Option<String>,
    /// `footer-last`
    pub footer_last: Option<String>,
}

impl SectionAttrs {
    /// Header and footer references as `(attribute, id)` pairs.
    pub fn references(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("header", &self.header),
            ("header-even", &self.header_even),
            ("header-first", &self.header_first),
            ("header-last", &self.header_last),
            ("footer", &self.footer),
            ("footer-even", &self.footer_even),
            ("footer-first", &self.footer_first),
            ("footer-last", &self.footer_last),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_deref().map(|v| (name, v)))
    }
}

/// Raw attributes of a `<p>` paragraph.
#[derive(Debug, Clone, Default)]
pub struct ParagraphAttrs {
    /// `level`
    pub level: Option<String>,
    /// `listid`
    pub list_id: Option<String>,
    /// Parent list id; read from the same `listid` attribute
    pub parent_id: Option<String>,
    /// `style`
    pub style: Option<String>,
    /// `props`
    pub props: Option<String>,
}

/// The semantic operations a collector accepts from the dispatcher.
///
/// Every method defaults to a no-op, so a collector implements only the
/// calls that matter to its pass. Closes arrive purely because an end tag
/// was seen; implementations must tolerate closes without a matching open.
pub trait Collector {
    /// Literal text outside metadata.
    fn insert_text(&mut self, text: &str) {
        let _ = text;
    }

    /// `<br>`
    fn insert_line_break(&mut self) {}

    /// `<cbr>`
    fn insert_column_break(&mut self) {}

    /// `<pbr>`
    fn insert_page_break(&mut self) {}

    /// `props` of the `<abiword>` root.
    fn collect_document_properties(&mut self, props: Option<&str>) {
        let _ = props;
    }

    /// `<pagesize>`
    fn collect_page_size(&mut self, attrs: &PageSizeAttrs) {
        let _ = attrs;
    }

    /// An ordinary `<section>`.
    fn collect_section_properties(&mut self, attrs: &SectionAttrs) {
        let _ = attrs;
    }

    /// A `<section>` whose `type` starts with `header` or `footer`.
    fn collect_header_footer(&mut self, id: Option<&str>, kind: &str) {
        let _ = (id, kind);
    }

    /// `<p>`
    fn collect_paragraph_properties(&mut self, attrs: &ParagraphAttrs) {
        let _ = attrs;
    }

    /// `<c>`
    fn collect_character_properties(&mut self, style: Option<&str>, props: Option<&str>) {
        let _ = (style, props);
    }

    /// `<s>` with a paragraph or character type.
    fn collect_text_style(&mut self, attrs: &TextStyleAttrs) {
        let _ = attrs;
    }

    /// A decoded `<d>` payload.
    fn collect_data(&mut self, name: Option<&str>, mime_type: Option<&str>, data: Vec<u8>) {
        let _ = (name, mime_type, data);
    }

    /// `<l>`
    fn collect_list(&mut self, attrs: &ListAttrs) {
        let _ = attrs;
    }

    /// `<table>`
    fn open_table(&mut self, props: Option<&str>) {
        let _ = props;
    }

    /// `</table>`
    fn close_table(&mut self) {}

    /// `<cell>`
    fn open_cell(&mut self, props: Option<&str>) {
        let _ = props;
    }

    /// `</cell>`
    fn close_cell(&mut self) {}

    /// `<a>`
    fn open_link(&mut self, href: Option<&str>) {
        let _ = href;
    }

    /// `</a>`
    fn close_link(&mut self) {}

    /// `<foot>`
    fn open_foot(&mut self, id: Option<&str>) {
        let _ = id;
    }

    /// `</foot>`
    fn close_foot(&mut self) {}

    /// `<endnote>`
    fn open_endnote(&mut self, id: Option<&str>) {
        let _ = id;
    }

    /// `</endnote>`
    fn close_endnote(&mut self) {}

    /// `<image>`
    fn insert_image(&mut self, data_id: Option<&str>, props: Option<&str>) {
        let _ = (data_id, props);
    }

    /// A metadata entry with its `key`.
    fn add_metadata_entry(&mut self, key: &str, value: &str) {
        let _ = (key, value);
    }

    /// `</p>`
    fn close_paragraph_or_list_element(&mut self) {}

    /// `</c>`
    fn close_span(&mut self) {}

    /// `</section>`
    fn end_section(&mut self) {}

    /// Start of the document.
    fn start_document(&mut self) {}

    /// End of the pass.
    fn end_document(&mut self) {}
}

/// Normalize a metadata key: the first `.` becomes `:`.
pub fn metadata_key(key: &str) -> String {
    match key.split_once('.') {
        Some((prefix, rest)) => format!("{}:{}", prefix, rest),
        None => key.to_string(),
    }
}
