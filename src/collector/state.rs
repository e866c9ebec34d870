//! Structural state tracking for the content pass.
//!
//! The tracker is a stack of open layers. Every operation returns the
//! transitions it performed, implicit opens and forced closes included, and
//! the content collector replays them into the sink. Because every `Open`
//! pushes and every `Close` pops, replaying the transitions of a whole pass
//! always yields a balanced call sequence, whatever the markup looked like.

/// Kind of a section-level block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    /// Ordinary body section
    Body,
    /// Page header
    Header,
    /// Page footer
    Footer,
}

/// Kind of note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteKind {
    /// `<foot>`
    Footnote,
    /// `<endnote>`
    Endnote,
}

/// One open structural layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    /// Section, header or footer
    Section(SectionKind),
    /// One level of a list
    ListLevel {
        /// Ordered (numbered) or unordered (bulleted)
        ordered: bool,
    },
    /// Plain paragraph
    Paragraph,
    /// Paragraph acting as a list item
    ListElement,
    /// Hyperlink
    Link,
    /// Character span
    Span,
    /// Footnote or endnote; starts a nested frame
    Note(NoteKind),
    /// Table
    Table,
    /// Table row
    Row,
    /// Table cell; starts a nested frame
    Cell,
}

impl Layer {
    fn is_paragraph(&self) -> bool {
        matches!(self, Layer::Paragraph | Layer::ListElement)
    }

    fn is_list_level(&self) -> bool {
        matches!(self, Layer::ListLevel { .. })
    }

    /// Layers a block-level search must not cross.
    fn is_block_barrier(&self) -> bool {
        matches!(
            self,
            Layer::Section(_) | Layer::Note(_) | Layer::Table | Layer::Row | Layer::Cell
        )
    }

    /// Layers an inline search must not cross.
    fn is_inline_barrier(&self) -> bool {
        !matches!(self, Layer::Link | Layer::Span)
    }

    /// Layers that can hold paragraphs directly.
    fn holds_blocks(&self) -> bool {
        matches!(self, Layer::Section(_) | Layer::Note(_) | Layer::Cell)
    }
}

/// A single state change, in the order it happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The document was started
    StartDocument,
    /// The document was finished
    EndDocument,
    /// A layer was opened
    Open(Layer),
    /// A layer was closed
    Close(Layer),
}

/// Layered structural state of the content pass.
#[derive(Debug, Default)]
pub struct ParsingState {
    document_started: bool,
    document_ended: bool,
    page_span_open: bool,
    stack: Vec<Layer>,
}

impl ParsingState {
    /// Create an idle tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the document has been started.
    pub fn is_document_started(&self) -> bool {
        self.document_started
    }

    /// Check if the document has been finished.
    pub fn is_document_ended(&self) -> bool {
        self.document_ended
    }

    /// Check if the page geometry has been committed by a first section.
    pub fn is_page_span_open(&self) -> bool {
        self.page_span_open
    }

    /// Check if any section, header or footer is open.
    pub fn is_section_open(&self) -> bool {
        self.stack.iter().any(|l| matches!(l, Layer::Section(_)))
    }

    /// Kind of the open section, if any.
    pub fn section_kind(&self) -> Option<SectionKind> {
        self.stack.iter().find_map(|l| match l {
            Layer::Section(kind) => Some(*kind),
            _ => None,
        })
    }

    /// Check if a paragraph is open in the current frame.
    pub fn is_paragraph_open(&self) -> bool {
        self.find(Layer::is_paragraph, Layer::is_block_barrier).is_some()
    }

    /// Check if a span is open in the current paragraph.
    pub fn is_span_open(&self) -> bool {
        self.find(|l| *l == Layer::Span, Layer::is_inline_barrier)
            .is_some()
    }

    /// Check if a link is open in the current paragraph.
    pub fn is_link_open(&self) -> bool {
        self.find(|l| *l == Layer::Link, Layer::is_inline_barrier)
            .is_some()
    }

    /// Check if the innermost table has an open row.
    pub fn is_row_open(&self) -> bool {
        self.find(
            |l| *l == Layer::Row,
            |l| matches!(l, Layer::Table | Layer::Note(_)),
        )
        .is_some()
    }

    /// Check if a note is open anywhere.
    pub fn is_in_note(&self) -> bool {
        self.stack.iter().any(|l| matches!(l, Layer::Note(_)))
    }

    /// Number of list levels open in the current frame.
    pub fn list_depth(&self) -> usize {
        self.stack
            .iter()
            .rev()
            .take_while(|l| !l.is_block_barrier())
            .filter(|l| l.is_list_level())
            .count()
    }

    /// Current stack, bottom first.
    pub fn layers(&self) -> &[Layer] {
        &self.stack
    }

    /// Start the document. Repeated calls are no-ops.
    pub fn start_document(&mut self) -> Vec<Transition> {
        let mut out = Vec::new();
        self.begin(&mut out);
        out
    }

    /// Finish the document, closing everything still open.
    ///
    /// A document that was never started is started and finished at once.
    pub fn end_document(&mut self) -> Vec<Transition> {
        let mut out = Vec::new();
        if !self.begin(&mut out) {
            return out;
        }
        self.close_from(0, &mut out);
        out.push(Transition::EndDocument);
        self.document_ended = true;
        self.page_span_open = false;
        out
    }

    /// Open a section, closing whatever is open.
    pub fn open_section(&mut self, kind: SectionKind) -> Vec<Transition> {
        let mut out = Vec::new();
        if !self.begin(&mut out) {
            return out;
        }
        self.close_from(0, &mut out);
        self.push(Layer::Section(kind), &mut out);
        self.page_span_open = true;
        out
    }

    /// Close the open section and everything inside it.
    pub fn close_section(&mut self) -> Vec<Transition> {
        let mut out = Vec::new();
        if let Some(index) = self.stack.iter().position(|l| matches!(l, Layer::Section(_))) {
            self.close_from(index, &mut out);
        }
        out
    }

    /// Open a list level in the current frame.
    pub fn open_list_level(&mut self, ordered: bool) -> Vec<Transition> {
        let mut out = Vec::new();
        if !self.begin(&mut out) {
            return out;
        }
        self.close_matching(Layer::is_paragraph, Layer::is_block_barrier, &mut out);
        self.ensure_block_context(&mut out);
        self.push(Layer::ListLevel { ordered }, &mut out);
        out
    }

    /// Close the innermost list level of the current frame.
    pub fn close_list_level(&mut self) -> Vec<Transition> {
        let mut out = Vec::new();
        self.close_matching(Layer::is_list_level, Layer::is_block_barrier, &mut out);
        out
    }

    /// Open a paragraph or list item, force-closing the current one.
    pub fn open_paragraph(&mut self, list_element: bool) -> Vec<Transition> {
        let mut out = Vec::new();
        if !self.begin(&mut out) {
            return out;
        }
        self.close_matching(Layer::is_paragraph, Layer::is_block_barrier, &mut out);
        self.ensure_block_context(&mut out);
        let layer = if list_element {
            Layer::ListElement
        } else {
            Layer::Paragraph
        };
        self.push(layer, &mut out);
        out
    }

    /// Close the paragraph of the current frame and its inline content.
    pub fn close_paragraph(&mut self) -> Vec<Transition> {
        let mut out = Vec::new();
        self.close_matching(Layer::is_paragraph, Layer::is_block_barrier, &mut out);
        out
    }

    /// Open a span, force-closing the current one.
    pub fn open_span(&mut self) -> Vec<Transition> {
        let mut out = Vec::new();
        if !self.begin(&mut out) {
            return out;
        }
        self.close_matching(|l| *l == Layer::Span, Layer::is_inline_barrier, &mut out);
        self.ensure_paragraph(&mut out);
        self.push(Layer::Span, &mut out);
        out
    }

    /// Make sure a span is open for inline content.
    pub fn ensure_span(&mut self) -> Vec<Transition> {
        let mut out = Vec::new();
        if !self.begin(&mut out) {
            return out;
        }
        self.ensure_paragraph(&mut out);
        if !self.is_span_open() {
            self.push(Layer::Span, &mut out);
        }
        out
    }

    /// Close the innermost span.
    pub fn close_span(&mut self) -> Vec<Transition> {
        let mut out = Vec::new();
        self.close_matching(|l| *l == Layer::Span, Layer::is_inline_barrier, &mut out);
        out
    }

    /// Open a link in the current paragraph.
    pub fn open_link(&mut self) -> Vec<Transition> {
        let mut out = Vec::new();
        if !self.begin(&mut out) {
            return out;
        }
        self.close_matching(|l| *l == Layer::Span, Layer::is_inline_barrier, &mut out);
        self.ensure_paragraph(&mut out);
        self.push(Layer::Link, &mut out);
        out
    }

    /// Close the innermost link.
    pub fn close_link(&mut self) -> Vec<Transition> {
        let mut out = Vec::new();
        self.close_matching(|l| *l == Layer::Link, Layer::is_inline_barrier, &mut out);
        out
    }

    /// Open a note anchored in the current paragraph.
    pub fn open_note(&mut self, kind: NoteKind) -> Vec<Transition> {
        let mut out = Vec::new();
        if !self.begin(&mut out) {
            return out;
        }
        self.ensure_paragraph(&mut out);
        self.push(Layer::Note(kind), &mut out);
        out
    }

    /// Close the innermost note of the given kind.
    pub fn close_note(&mut self, kind: NoteKind) -> Vec<Transition> {
        let mut out = Vec::new();
        self.close_matching(
            |l| *l == Layer::Note(kind),
            |l| matches!(l, Layer::Section(_)),
            &mut out,
        );
        out
    }

    /// Open a table as a block of the current frame.
    pub fn open_table(&mut self) -> Vec<Transition> {
        let mut out = Vec::new();
        if !self.begin(&mut out) {
            return out;
        }
        self.close_matching(Layer::is_paragraph, Layer::is_block_barrier, &mut out);
        self.ensure_block_context(&mut out);
        self.push(Layer::Table, &mut out);
        out
    }

    /// Close the innermost table.
    pub fn close_table(&mut self) -> Vec<Transition> {
        let mut out = Vec::new();
        self.close_matching(
            |l| *l == Layer::Table,
            |l| matches!(l, Layer::Section(_) | Layer::Note(_)),
            &mut out,
        );
        out
    }

    /// Open a row in the innermost table, closing any open row first.
    pub fn open_row(&mut self) -> Vec<Transition> {
        let mut out = Vec::new();
        if !self.begin(&mut out) {
            return out;
        }
        let Some(table) = self.find(|l| *l == Layer::Table, |l| matches!(l, Layer::Note(_))) else {
            return out;
        };
        self.close_from(table + 1, &mut out);
        self.push(Layer::Row, &mut out);
        out
    }

    /// Close the open row of the innermost table.
    pub fn close_row(&mut self) -> Vec<Transition> {
        let mut out = Vec::new();
        self.close_matching(
            |l| *l == Layer::Row,
            |l| matches!(l, Layer::Table | Layer::Note(_)),
            &mut out,
        );
        out
    }

    /// Open a cell in the current row; opens a row when none is open.
    pub fn open_cell(&mut self) -> Vec<Transition> {
        let mut out = Vec::new();
        if !self.begin(&mut out) {
            return out;
        }
        let barrier = |l: &Layer| matches!(l, Layer::Table | Layer::Note(_));
        match self.find(|l| *l == Layer::Row, barrier) {
            Some(row) => self.close_from(row + 1, &mut out),
            None => {
                let Some(table) =
                    self.find(|l| *l == Layer::Table, |l| matches!(l, Layer::Note(_)))
                else {
                    return out;
                };
                self.close_from(table + 1, &mut out);
                self.push(Layer::Row, &mut out);
            }
        }
        self.push(Layer::Cell, &mut out);
        out
    }

    /// Close the open cell of the innermost table.
    pub fn close_cell(&mut self) -> Vec<Transition> {
        let mut out = Vec::new();
        self.close_matching(
            |l| *l == Layer::Cell,
            |l| matches!(l, Layer::Table | Layer::Note(_)),
            &mut out,
        );
        out
    }

    /// Start the document if needed. Returns `false` once it has ended.
    fn begin(&mut self, out: &mut Vec<Transition>) -> bool {
        if self.document_ended {
            return false;
        }
        if !self.document_started {
            self.document_started = true;
            out.push(Transition::StartDocument);
        }
        true
    }

    fn push(&mut self, layer: Layer, out: &mut Vec<Transition>) {
        self.stack.push(layer);
        out.push(Transition::Open(layer));
    }

    /// Index of the topmost layer matching `target`, not looking past `barrier`.
    fn find(
        &self,
        target: impl Fn(&Layer) -> bool,
        barrier: impl Fn(&Layer) -> bool,
    ) -> Option<usize> {
        for (index, layer) in self.stack.iter().enumerate().rev() {
            if target(layer) {
                return Some(index);
            }
            if barrier(layer) {
                return None;
            }
        }
        None
    }

    fn close_matching(
        &mut self,
        target: impl Fn(&Layer) -> bool,
        barrier: impl Fn(&Layer) -> bool,
        out: &mut Vec<Transition>,
    ) {
        if let Some(index) = self.find(target, barrier) {
            self.close_from(index, out);
        }
    }

    /// Close every layer at `index` and above, innermost first.
    fn close_from(&mut self, index: usize, out: &mut Vec<Transition>) {
        while self.stack.len() > index {
            if let Some(layer) = self.stack.pop() {
                out.push(Transition::Close(layer));
            }
        }
    }

    /// Make the top of the stack able to hold a paragraph, list level or table.
    fn ensure_block_context(&mut self, out: &mut Vec<Transition>) {
        let holder = self
            .stack
            .iter()
            .rev()
            .find(|l| l.is_block_barrier())
            .copied();
        match holder {
            Some(layer) if layer.holds_blocks() => {}
            Some(Layer::Row) => self.push(Layer::Cell, out),
            Some(Layer::Table) => {
                self.push(Layer::Row, out);
                self.push(Layer::Cell, out);
            }
            _ => {
                self.close_from(0, out);
                self.push(Layer::Section(SectionKind::Body), out);
                self.page_span_open = true;
            }
        }
    }

    fn ensure_paragraph(&mut self, out: &mut Vec<Transition>) {
        if self.is_paragraph_open() {
            return;
        }
        self.ensure_block_context(out);
        let in_list = self.stack.last().is_some_and(Layer::is_list_level);
        self.push(
            if in_list {
                Layer::ListElement
            } else {
                Layer::Paragraph
            },
            out,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Transition::{Close, EndDocument, Open, StartDocument};

    fn body() -> Layer {
        Layer::Section(SectionKind::Body)
    }

    #[test]
    fn test_start_document_is_idempotent() {
        let mut state = ParsingState::new();
        assert_eq!(state.start_document(), vec![StartDocument]);
        assert!(state.start_document().is_empty());
        assert!(state.is_document_started());
    }

    #[test]
    fn test_simple_paragraph_sequence() {
        let mut state = ParsingState::new();
        let mut all = Vec::new();
        all.extend(state.open_section(SectionKind::Body));
        all.extend(state.open_paragraph(false));
        all.extend(state.open_span());
        all.extend(state.close_span());
        all.extend(state.close_paragraph());
        all.extend(state.close_section());
        all.extend(state.end_document());
        assert_eq!(
            all,
            vec![
                StartDocument,
                Open(body()),
                Open(Layer::Paragraph),
                Open(Layer::Span),
                Close(Layer::Span),
                Close(Layer::Paragraph),
                Close(body()),
                EndDocument,
            ]
        );
    }

    #[test]
    fn test_paragraph_opens_section_implicitly() {
        let mut state = ParsingState::new();
        assert_eq!(
            state.open_paragraph(false),
            vec![StartDocument, Open(body()), Open(Layer::Paragraph)]
        );
        assert!(state.is_page_span_open());
    }

    #[test]
    fn test_open_paragraph_force_closes_previous() {
        let mut state = ParsingState::new();
        state.open_paragraph(false);
        state.open_span();
        assert_eq!(
            state.open_paragraph(false),
            vec![Close(Layer::Span), Close(Layer::Paragraph), Open(Layer::Paragraph)]
        );
    }

    #[test]
    fn test_open_span_force_closes_previous() {
        let mut state = ParsingState::new();
        state.open_span();
        assert_eq!(state.open_span(), vec![Close(Layer::Span), Open(Layer::Span)]);
    }

    #[test]
    fn test_ensure_span_reuses_open_span() {
        let mut state = ParsingState::new();
        state.open_span();
        assert!(state.ensure_span().is_empty());
    }

    #[test]
    fn test_unmatched_closes_are_noops() {
        let mut state = ParsingState::new();
        assert!(state.close_span().is_empty());
        assert!(state.close_paragraph().is_empty());
        assert!(state.close_section().is_empty());
        assert!(state.close_link().is_empty());
        assert!(state.close_cell().is_empty());
        assert!(state.close_table().is_empty());
        assert!(state.close_note(NoteKind::Footnote).is_empty());
        assert!(!state.is_document_started());
    }

    #[test]
    fn test_close_section_closes_contents() {
        let mut state = ParsingState::new();
        state.open_section(SectionKind::Body);
        state.open_list_level(true);
        state.open_paragraph(true);
        state.open_span();
        assert_eq!(
            state.close_section(),
            vec![
                Close(Layer::Span),
                Close(Layer::ListElement),
                Close(Layer::ListLevel { ordered: true }),
                Close(body()),
            ]
        );
        assert!(!state.is_section_open());
    }

    #[test]
    fn test_end_document_closes_everything() {
        let mut state = ParsingState::new();
        state.open_span();
        let out = state.end_document();
        assert_eq!(
            out,
            vec![
                Close(Layer::Span),
                Close(Layer::Paragraph),
                Close(body()),
                EndDocument
            ]
        );
    }

    #[test]
    fn test_operations_after_end_are_ignored() {
        let mut state = ParsingState::new();
        state.end_document();
        assert!(state.open_paragraph(false).is_empty());
        assert!(state.start_document().is_empty());
        assert!(state.end_document().is_empty());
    }

    #[test]
    fn test_document_ended_flag() {
        let mut state = ParsingState::new();
        state.open_paragraph(false);
        assert!(state.is_document_started());
        assert!(!state.is_document_ended());
        state.end_document();
        assert!(state.is_document_ended());
        assert!(!state.is_section_open());
    }

    #[test]
    fn test_end_document_without_start() {
        let mut state = ParsingState::new();
        assert_eq!(state.end_document(), vec![StartDocument, EndDocument]);
    }

    #[test]
    fn test_note_has_own_paragraph_frame() {
        let mut state = ParsingState::new();
        state.open_span();
        state.open_note(NoteKind::Footnote);
        // the outer paragraph is not closed by the note's paragraph
        assert_eq!(state.open_paragraph(false), vec![Open(Layer::Paragraph)]);
        assert_eq!(
            state.close_note(NoteKind::Footnote),
            vec![Close(Layer::Paragraph), Close(Layer::Note(NoteKind::Footnote))]
        );
        assert!(state.is_paragraph_open());
        assert!(state.is_span_open());
        assert!(!state.is_in_note());
    }

    #[test]
    fn test_in_note_flag() {
        let mut state = ParsingState::new();
        state.open_span();
        assert!(!state.is_in_note());
        state.open_note(NoteKind::Endnote);
        assert!(state.is_in_note());
        // the note's own frame has no paragraph yet
        assert!(!state.is_paragraph_open());
        state.close_note(NoteKind::Endnote);
        assert!(!state.is_in_note());
    }

    #[test]
    fn test_close_paragraph_does_not_cross_cell() {
        let mut state = ParsingState::new();
        state.open_section(SectionKind::Body);
        state.open_table();
        state.open_cell();
        assert!(state.close_paragraph().is_empty());
        assert_eq!(
            state.close_table(),
            vec![Close(Layer::Cell), Close(Layer::Row), Close(Layer::Table)]
        );
    }

    #[test]
    fn test_open_cell_opens_row() {
        let mut state = ParsingState::new();
        state.open_table();
        assert!(!state.is_row_open());
        assert_eq!(state.open_cell(), vec![Open(Layer::Row), Open(Layer::Cell)]);
        assert_eq!(state.open_cell(), vec![Close(Layer::Cell), Open(Layer::Cell)]);
        assert_eq!(
            state.open_row(),
            vec![Close(Layer::Cell), Close(Layer::Row), Open(Layer::Row)]
        );
        assert!(state.is_row_open());
        state.close_row();
        assert!(!state.is_row_open());
    }

    #[test]
    fn test_cell_without_table_is_ignored() {
        let mut state = ParsingState::new();
        state.open_paragraph(false);
        assert_eq!(state.open_cell(), Vec::new());
        assert_eq!(state.open_row(), Vec::new());
    }

    #[test]
    fn test_table_closes_paragraph() {
        let mut state = ParsingState::new();
        state.open_paragraph(false);
        assert_eq!(
            state.open_table(),
            vec![Close(Layer::Paragraph), Open(Layer::Table)]
        );
    }

    #[test]
    fn test_implicit_paragraph_in_list_is_list_element() {
        let mut state = ParsingState::new();
        state.open_list_level(false);
        assert_eq!(state.ensure_span(), vec![Open(Layer::ListElement), Open(Layer::Span)]);
        assert_eq!(state.list_depth(), 1);
    }

    #[test]
    fn test_list_depth_is_per_frame() {
        let mut state = ParsingState::new();
        state.open_list_level(true);
        state.open_list_level(true);
        state.open_paragraph(true);
        state.open_note(NoteKind::Endnote);
        assert_eq!(state.list_depth(), 0);
        state.close_note(NoteKind::Endnote);
        assert_eq!(state.list_depth(), 2);
    }

    #[test]
    fn test_link_wraps_spans() {
        let mut state = ParsingState::new();
        state.open_paragraph(false);
        state.open_link();
        state.open_span();
        assert!(state.is_link_open());
        assert_eq!(
            state.close_link(),
            vec![Close(Layer::Span), Close(Layer::Link)]
        );
    }

    #[test]
    fn test_header_section_kind() {
        let mut state = ParsingState::new();
        state.open_section(SectionKind::Header);
        assert_eq!(state.section_kind(), Some(SectionKind::Header));
        assert_eq!(
            state.open_section(SectionKind::Body),
            vec![
                Close(Layer::Section(SectionKind::Header)),
                Open(body())
            ]
        );
    }
}
