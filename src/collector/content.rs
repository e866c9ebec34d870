//! Second-pass collector.
//!
//! Decodes attribute strings into normalized properties, drives the
//! structural state tracker and replays its transitions into the sink.

use std::collections::{HashMap, HashSet};
use std::mem;

use crate::model::{Artifacts, ListElement, ListKind, PropertyList, PropertyValue};
use crate::parser::attrs::{length_in_unit, parse_double, parse_id, parse_uint};
use crate::parser::list_resolver::list_depth;
use crate::parser::ParseOptions;
use crate::render::DocumentSink;

use super::props::{
    cell_properties, character_properties, image_properties, overlay, paragraph_properties,
    parse_optional, section_properties, tab_stops, table_properties, RawProps,
};
use super::state::{Layer, NoteKind, ParsingState, SectionKind, Transition};
use super::table::{TableGrid, MAX_TABLE_COLUMNS};
use super::{Collector, PageSizeAttrs, ParagraphAttrs, SectionAttrs, TextStyleAttrs};

/// Deepest list nesting that is emitted.
const MAX_LIST_LEVEL: u32 = 10;

/// A stored `<s>` definition.
#[derive(Debug, Clone)]
struct TextStyle {
    based_on: Option<String>,
    raw: RawProps,
}

/// A break waiting for the next paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingBreak {
    Column,
    Page,
}

/// Properties prepared for the next open of each layer kind.
#[derive(Debug, Default)]
struct Pending {
    section: PropertyList,
    section_columns: Vec<PropertyList>,
    header_footer: PropertyList,
    list_level: PropertyList,
    paragraph: PropertyList,
    tab_stops: Vec<PropertyList>,
    span: PropertyList,
    link: PropertyList,
    note: PropertyList,
    table: PropertyList,
    table_columns: Vec<PropertyList>,
    cell: Option<PropertyList>,
}

/// Paragraph-scoped context, saved while a note is open.
#[derive(Debug, Clone, Default)]
struct ParagraphContext {
    raw: RawProps,
    span_props: PropertyList,
    list_group: Option<u32>,
}

/// Collector for the emission pass.
pub struct ContentCollector<'a> {
    sink: &'a mut dyn DocumentSink,
    artifacts: &'a Artifacts,
    options: ParseOptions,
    state: ParsingState,
    styles: HashMap<String, TextStyle>,
    document_raw: RawProps,
    page_props: PropertyList,
    page_committed: bool,
    pending: Pending,
    pending_break: Option<PendingBreak>,
    context: ParagraphContext,
    saved_contexts: Vec<ParagraphContext>,
    skipping: bool,
    table_count: usize,
    grids: Vec<TableGrid>,
}

impl<'a> ContentCollector<'a> {
    /// Create a collector emitting into `sink`, reading pass-one `artifacts`.
    pub fn new(
        sink: &'a mut dyn DocumentSink,
        artifacts: &'a Artifacts,
        options: ParseOptions,
    ) -> Self {
        Self {
            sink,
            artifacts,
            options,
            state: ParsingState::new(),
            styles: HashMap::new(),
            document_raw: RawProps::new(),
            page_props: PropertyList::new(),
            page_committed: false,
            pending: Pending::default(),
            pending_break: None,
            context: ParagraphContext::default(),
            saved_contexts: Vec::new(),
            skipping: false,
            table_count: 0,
            grids: Vec::new(),
        }
    }

    /// Structural state, for inspection.
    pub fn state(&self) -> &ParsingState {
        &self.state
    }

    fn replay(&mut self, transitions: Vec<Transition>) {
        for transition in transitions {
            match transition {
                Transition::StartDocument => {
                    self.sink.start_document();
                    if self.options.include_metadata && !self.artifacts.metadata.is_empty() {
                        self.sink.set_document_metadata(&self.artifacts.metadata);
                    }
                }
                Transition::EndDocument => self.sink.end_document(),
                Transition::Open(layer) => self.emit_open(layer),
                Transition::Close(layer) => self.emit_close(layer),
            }
        }
    }

    fn emit_open(&mut self, layer: Layer) {
        let pending = &mut self.pending;
        match layer {
            Layer::Section(SectionKind::Body) => {
                let mut props = mem::take(&mut pending.section);
                if !self.page_committed {
                    props.merge(&self.page_props);
                    self.page_committed = true;
                }
                let columns = mem::take(&mut pending.section_columns);
                self.sink.open_section(&props, &columns);
            }
            Layer::Section(SectionKind::Header) => {
                let props = mem::take(&mut pending.header_footer);
                self.sink.open_header(&props);
            }
            Layer::Section(SectionKind::Footer) => {
                let props = mem::take(&mut pending.header_footer);
                self.sink.open_footer(&props);
            }
            Layer::ListLevel { ordered } => {
                let props = mem::take(&mut pending.list_level);
                if ordered {
                    self.sink.open_ordered_list_level(&props);
                } else {
                    self.sink.open_unordered_list_level(&props);
                }
            }
            Layer::Paragraph | Layer::ListElement => {
                let props = mem::take(&mut pending.paragraph);
                let stops = mem::take(&mut pending.tab_stops);
                if layer == Layer::ListElement {
                    self.sink.open_list_element(&props, &stops);
                } else {
                    self.sink.open_paragraph(&props, &stops);
                }
            }
            Layer::Link => {
                let props = mem::take(&mut pending.link);
                self.sink.open_link(&props);
            }
            Layer::Span => {
                let props = mem::take(&mut pending.span);
                self.sink.open_span(&props);
            }
            Layer::Note(kind) => {
                let props = mem::take(&mut pending.note);
                match kind {
                    NoteKind::Footnote => self.sink.open_footnote(&props),
                    NoteKind::Endnote => self.sink.open_endnote(&props),
                }
            }
            Layer::Table => {
                let props = mem::take(&mut pending.table);
                let columns = mem::take(&mut pending.table_columns);
                self.sink.open_table(&props, &columns);
            }
            Layer::Row => {
                // explicit rows are positioned by start_row after the open
                if let Some(grid) = self.grids.last_mut() {
                    grid.begin_row(None);
                }
                self.sink.open_table_row(&PropertyList::new());
            }
            Layer::Cell => {
                let props = match pending.cell.take() {
                    Some(props) => props,
                    None => {
                        if let Some(grid) = self.grids.last_mut() {
                            grid.place_implicit();
                        }
                        PropertyList::new()
                    }
                };
                self.sink.open_table_cell(&props);
            }
        }
    }

    fn emit_close(&mut self, layer: Layer) {
        match layer {
            Layer::Section(SectionKind::Body) => self.sink.close_section(),
            Layer::Section(SectionKind::Header) => self.sink.close_header(),
            Layer::Section(SectionKind::Footer) => self.sink.close_footer(),
            Layer::ListLevel { ordered: true } => self.sink.close_ordered_list_level(),
            Layer::ListLevel { ordered: false } => self.sink.close_unordered_list_level(),
            Layer::Paragraph => self.sink.close_paragraph(),
            Layer::ListElement => self.sink.close_list_element(),
            Layer::Link => self.sink.close_link(),
            Layer::Span => self.sink.close_span(),
            Layer::Note(NoteKind::Footnote) => self.sink.close_footnote(),
            Layer::Note(NoteKind::Endnote) => self.sink.close_endnote(),
            Layer::Table => {
                self.sink.close_table();
                self.grids.pop();
            }
            Layer::Row => {
                if let Some(grid) = self.grids.last_mut() {
                    for _ in grid.next_column..grid.columns {
                        self.sink.insert_covered_table_cell(&PropertyList::new());
                    }
                    grid.begin_row(None);
                }
                self.sink.close_table_row();
            }
            Layer::Cell => self.sink.close_table_cell(),
        }
    }

    /// Raw props of a style and everything it is based on; own values win.
    fn resolve_style(&self, name: Option<&str>) -> RawProps {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = name;
        while let Some(style_name) = current {
            if !seen.insert(style_name) {
                log::debug!("style {} is based on itself, stopping", style_name);
                break;
            }
            let Some(style) = self.styles.get(style_name) else {
                break;
            };
            chain.push(style);
            current = style.based_on.as_deref();
        }

        let mut raw = RawProps::new();
        for style in chain.iter().rev() {
            overlay(&mut raw, &style.raw);
        }
        raw
    }

    /// Outline level from a `Heading N` style in the chain.
    fn outline_level(&self, name: Option<&str>) -> Option<u32> {
        let mut seen = HashSet::new();
        let mut current = name;
        while let Some(style_name) = current {
            if !seen.insert(style_name) {
                break;
            }
            let level = style_name
                .strip_prefix("Heading ")
                .and_then(parse_uint)
                .filter(|level| (1..=MAX_LIST_LEVEL).contains(level));
            if level.is_some() {
                return level;
            }
            current = self.styles.get(style_name).and_then(|s| s.based_on.as_deref());
        }
        None
    }

    fn active_list_group(&self) -> Option<u32> {
        if self.state.list_depth() == 0 {
            None
        } else {
            self.context.list_group
        }
    }

    fn close_paragraph(&mut self) {
        let transitions = self.state.close_paragraph();
        self.replay(transitions);
    }

    fn close_list_levels(&mut self) {
        self.close_paragraph();
        while self.state.list_depth() > 0 {
            let transitions = self.state.close_list_level();
            if transitions.is_empty() {
                break;
            }
            self.replay(transitions);
        }
        self.context.list_group = None;
    }

    fn list_level_properties(element: &ListElement, group: u32, level: u32) -> PropertyList {
        let mut props = PropertyList::new()
            .with("librevenge:list-id", group)
            .with("librevenge:level", level);
        match element.kind {
            ListKind::Ordered(format) => {
                let (prefix, suffix) = element.affixes();
                props.insert("style:num-format", format.token());
                props.insert("style:num-prefix", prefix);
                props.insert("style:num-suffix", suffix);
                props.insert("text:start-value", element.start_value.unwrap_or(1));
                if element.decimal != "NULL" {
                    props.insert("abw:list-decimal", element.decimal.as_str());
                }
            }
            ListKind::Unordered(bullet) => {
                props.insert("text:bullet-char", bullet.to_string());
            }
        }
        props
    }

    /// Open, close or continue list levels for a list item paragraph.
    fn enter_list(&mut self, element: &ListElement, element_id: u32, level: Option<u32>) {
        let group = element.list_id.unwrap_or(element_id);
        let level = level
            .filter(|&l| l > 0)
            .unwrap_or_else(|| list_depth(&self.artifacts.list_elements, element_id))
            .clamp(1, MAX_LIST_LEVEL) as usize;

        if self.active_list_group() != Some(group) {
            self.close_list_levels();
        }
        self.close_paragraph();

        while self.state.list_depth() > level {
            let transitions = self.state.close_list_level();
            if transitions.is_empty() {
                break;
            }
            self.replay(transitions);
        }
        while self.state.list_depth() < level {
            let depth = self.state.list_depth() as u32 + 1;
            self.pending.list_level = Self::list_level_properties(element, group, depth);
            let transitions = self.state.open_list_level(element.kind.is_ordered());
            if transitions.is_empty() {
                break;
            }
            self.replay(transitions);
        }
        self.context.list_group = Some(group);
    }

    fn ensure_span(&mut self) -> bool {
        if !self.state.is_span_open() {
            self.pending.span = self.context.span_props.clone();
        }
        let transitions = self.state.ensure_span();
        self.replay(transitions);
        self.state.is_span_open()
    }

    fn start_row(&mut self, row: u32) {
        let transitions = self.state.open_row();
        self.replay(transitions);
        if let Some(grid) = self.grids.last_mut() {
            grid.begin_row(Some(row));
        }
    }

    /// Close the open row; closing it pads the row to the table width.
    fn finish_row(&mut self) {
        let transitions = self.state.close_row();
        self.replay(transitions);
    }

    fn header_footer_properties(id: Option<&str>, kind: &str) -> PropertyList {
        let occurrence = match kind.split_once('-').map(|(_, suffix)| suffix) {
            Some("even") => "even",
            Some("first") => "first",
            Some("last") => "last",
            _ => "all",
        };
        let mut props = PropertyList::new().with("librevenge:occurrence", occurrence);
        if let Some(id) = id {
            props.insert("abw:id", id);
        }
        props
    }
}

impl Collector for ContentCollector<'_> {
    fn insert_text(&mut self, text: &str) {
        if self.skipping || text.is_empty() {
            return;
        }
        if !self.ensure_span() {
            return;
        }
        for (index, part) in text.split('\t').enumerate() {
            if index > 0 {
                self.sink.insert_tab();
            }
            if !part.is_empty() {
                self.sink.insert_text(part);
            }
        }
    }

    fn insert_line_break(&mut self) {
        if self.skipping {
            return;
        }
        if self.ensure_span() {
            self.sink.insert_line_break();
        }
    }

    fn insert_column_break(&mut self) {
        if !self.skipping {
            self.pending_break = Some(PendingBreak::Column);
        }
    }

    fn insert_page_break(&mut self) {
        if !self.skipping {
            self.pending_break = Some(PendingBreak::Page);
        }
    }

    fn collect_document_properties(&mut self, props: Option<&str>) {
        self.document_raw = parse_optional(props);
    }

    fn collect_page_size(&mut self, attrs: &PageSizeAttrs) {
        let units = attrs.units.as_deref();
        let width = attrs.width.as_deref().and_then(|w| length_in_unit(w, units));
        let height = attrs.height.as_deref().and_then(|h| length_in_unit(h, units));

        let mut props = PropertyList::new();
        if let Some(width) = width {
            props.insert("fo:page-width", PropertyValue::Inch(width));
        }
        if let Some(height) = height {
            props.insert("fo:page-height", PropertyValue::Inch(height));
        }
        if let (Some(width), Some(height)) = (width, height) {
            let orientation = if width > height { "landscape" } else { "portrait" };
            props.insert("style:print-orientation", orientation);
        }
        if let Some(scale) = attrs.page_scale.as_deref().and_then(parse_double) {
            if scale > 0.0 && (scale - 1.0).abs() > f64::EPSILON {
                props.insert("style:scale-to", PropertyValue::Percent(scale));
            }
        }
        self.page_props = props;
    }

    fn collect_section_properties(&mut self, attrs: &SectionAttrs) {
        let mut raw = self.document_raw.clone();
        overlay(&mut raw, &parse_optional(attrs.props.as_deref()));
        let (mut props, columns) = section_properties(&raw);
        for (name, id) in attrs.references() {
            props.insert(format!("abw:{}", name), id);
        }

        self.skipping = false;
        self.context = ParagraphContext::default();
        self.pending.section = props;
        self.pending.section_columns = columns;
        let transitions = self.state.open_section(SectionKind::Body);
        self.replay(transitions);
    }

    fn collect_header_footer(&mut self, id: Option<&str>, kind: &str) {
        self.context = ParagraphContext::default();
        if !self.options.include_headers_footers {
            let transitions = self.state.close_section();
            self.replay(transitions);
            self.skipping = true;
            return;
        }
        self.skipping = false;
        let section = if kind.starts_with("footer") {
            SectionKind::Footer
        } else {
            SectionKind::Header
        };
        self.pending.header_footer = Self::header_footer_properties(id, kind);
        let transitions = self.state.open_section(section);
        self.replay(transitions);
    }

    fn collect_paragraph_properties(&mut self, attrs: &ParagraphAttrs) {
        if self.skipping {
            return;
        }

        let mut raw = self.resolve_style(attrs.style.as_deref());
        overlay(&mut raw, &parse_optional(attrs.props.as_deref()));

        let mut props = paragraph_properties(&raw);
        if let Some(level) = self.outline_level(attrs.style.as_deref()) {
            props.insert("text:outline-level", level);
        }
        match self.pending_break.take() {
            Some(PendingBreak::Page) => props.insert("fo:break-before", "page"),
            Some(PendingBreak::Column) => props.insert("fo:break-before", "column"),
            None => {}
        }
        let stops = tab_stops(&raw);
        let span_props = character_properties(&raw);

        let artifacts = self.artifacts;
        let elements = &artifacts.list_elements;
        let list_entry = parse_id(attrs.list_id.as_deref())
            .and_then(|id| elements.get(&id).map(|e| (id, e)))
            .or_else(|| {
                parse_id(attrs.parent_id.as_deref())
                    .and_then(|id| elements.get(&id).map(|e| (id, e)))
            });

        let list_element = match list_entry {
            Some((id, element)) => {
                let level = attrs.level.as_deref().and_then(parse_uint);
                self.enter_list(element, id, level);
                true
            }
            None => {
                if self.state.list_depth() > 0 {
                    self.close_list_levels();
                }
                false
            }
        };

        self.context.raw = raw;
        self.context.span_props = span_props;
        self.pending.paragraph = props;
        self.pending.tab_stops = stops;
        let transitions = self.state.open_paragraph(list_element);
        self.replay(transitions);
    }

    fn collect_character_properties(&mut self, style: Option<&str>, props: Option<&str>) {
        if self.skipping {
            return;
        }
        let mut raw = self.context.raw.clone();
        overlay(&mut raw, &self.resolve_style(style));
        overlay(&mut raw, &parse_optional(props));

        self.pending.span = character_properties(&raw);
        let transitions = self.state.open_span();
        self.replay(transitions);
    }

    fn collect_text_style(&mut self, attrs: &TextStyleAttrs) {
        let Some(name) = attrs.name.as_deref() else {
            return;
        };
        self.styles.insert(
            name.to_string(),
            TextStyle {
                based_on: attrs.based_on.clone().filter(|b| b != name),
                raw: parse_optional(attrs.props.as_deref()),
            },
        );
    }

    fn open_table(&mut self, props: Option<&str>) {
        let index = self.table_count;
        self.table_count += 1;
        if self.skipping {
            return;
        }

        self.close_list_levels();
        let (table_props, mut columns) = table_properties(&parse_optional(props));
        let size = self
            .artifacts
            .table_sizes
            .get(&index)
            .copied()
            .unwrap_or_default();
        columns.truncate(MAX_TABLE_COLUMNS as usize);
        if columns.is_empty() {
            columns = vec![PropertyList::new(); size.columns.min(MAX_TABLE_COLUMNS) as usize];
        }
        let width = size.columns.max(columns.len() as u32).min(MAX_TABLE_COLUMNS);

        self.pending.table = table_props;
        self.pending.table_columns = columns;
        let transitions = self.state.open_table();
        let opened = transitions.contains(&Transition::Open(Layer::Table));
        self.replay(transitions);
        if opened {
            self.grids.push(TableGrid::new(width));
        }
    }

    fn close_table(&mut self) {
        if self.skipping || self.grids.is_empty() {
            return;
        }
        self.finish_row();
        let transitions = self.state.close_table();
        self.replay(transitions);
    }

    fn open_cell(&mut self, props: Option<&str>) {
        if self.skipping {
            return;
        }
        let Some(grid) = self.grids.last() else {
            log::debug!("cell outside of a table, ignoring");
            return;
        };
        let raw = parse_optional(props);
        let position = grid.position(&raw);
        let current_row = grid.row;

        let transitions = self.state.close_cell();
        self.replay(transitions);

        if current_row != Some(position.top) {
            if current_row.is_some() {
                self.finish_row();
            }
            let first_new = match current_row {
                Some(row) if row < position.top => row + 1,
                _ => position.top,
            };
            for row in first_new..position.top {
                self.start_row(row);
                self.finish_row();
            }
            self.start_row(position.top);
        }

        let next_column = self.grids.last().map_or(0, |g| g.next_column);
        for _ in next_column..position.left {
            self.sink.insert_covered_table_cell(&PropertyList::new());
        }

        let mut cell = cell_properties(&raw);
        cell.insert("librevenge:column", position.left);
        cell.insert("librevenge:row", position.top);
        if position.column_span() > 1 {
            cell.insert("table:number-columns-spanned", position.column_span());
        }
        if position.row_span() > 1 {
            cell.insert("table:number-rows-spanned", position.row_span());
        }
        self.pending.cell = Some(cell);
        let transitions = self.state.open_cell();
        self.replay(transitions);
        if let Some(grid) = self.grids.last_mut() {
            grid.record(&position);
        }
    }

    fn close_cell(&mut self) {
        if self.skipping {
            return;
        }
        let transitions = self.state.close_cell();
        self.replay(transitions);
    }

    fn open_link(&mut self, href: Option<&str>) {
        if self.skipping {
            return;
        }
        let mut props = PropertyList::new().with("xlink:type", "simple");
        if let Some(href) = href {
            props.insert("xlink:href", href);
        }
        self.pending.link = props;
        let transitions = self.state.open_link();
        self.replay(transitions);
    }

    fn close_link(&mut self) {
        if self.skipping {
            return;
        }
        let transitions = self.state.close_link();
        self.replay(transitions);
    }

    fn open_foot(&mut self, id: Option<&str>) {
        self.open_note(NoteKind::Footnote, id);
    }

    fn close_foot(&mut self) {
        self.close_note(NoteKind::Footnote);
    }

    fn open_endnote(&mut self, id: Option<&str>) {
        self.open_note(NoteKind::Endnote, id);
    }

    fn close_endnote(&mut self) {
        self.close_note(NoteKind::Endnote);
    }

    fn insert_image(&mut self, data_id: Option<&str>, props: Option<&str>) {
        if self.skipping || !self.options.extract_resources {
            return;
        }
        let Some(name) = data_id else {
            log::debug!("image without a data reference");
            return;
        };
        let artifacts = self.artifacts;
        let Some(data) = artifacts.data.get(name) else {
            log::warn!("image references unknown data item '{}', skipping", name);
            return;
        };

        let mut image = image_properties(&parse_optional(props));
        image.insert(
            "librevenge:mime-type",
            data.mime_type.as_deref().unwrap_or("application/octet-stream"),
        );
        if self.ensure_span() {
            self.sink.insert_binary_object(&image, &data.data);
        }
    }

    fn close_paragraph_or_list_element(&mut self) {
        if self.skipping {
            return;
        }
        self.close_paragraph();
    }

    fn close_span(&mut self) {
        if self.skipping {
            return;
        }
        let transitions = self.state.close_span();
        self.replay(transitions);
    }

    fn end_section(&mut self) {
        let transitions = self.state.close_section();
        self.replay(transitions);
        self.skipping = false;
        self.context = ParagraphContext::default();
    }

    fn start_document(&mut self) {
        let transitions = self.state.start_document();
        self.replay(transitions);
    }

    fn end_document(&mut self) {
        let transitions = self.state.end_document();
        self.replay(transitions);
    }
}

impl ContentCollector<'_> {
    fn open_note(&mut self, kind: NoteKind, id: Option<&str>) {
        if self.skipping {
            return;
        }
        let mut props = PropertyList::new();
        if let Some(number) = id.and_then(parse_uint) {
            props.insert("librevenge:number", number);
        }
        self.pending.note = props;
        let transitions = self.state.open_note(kind);
        if transitions.contains(&Transition::Open(Layer::Note(kind))) {
            self.saved_contexts.push(mem::take(&mut self.context));
        }
        self.replay(transitions);
    }

    fn close_note(&mut self, kind: NoteKind) {
        if self.skipping {
            return;
        }
        let transitions = self.state.close_note(kind);
        if transitions.contains(&Transition::Close(Layer::Note(kind))) {
            if let Some(context) = self.saved_contexts.pop() {
                self.context = context;
            }
        }
        self.replay(transitions);
    }
}
