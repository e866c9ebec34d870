//! First-pass collector.
//!
//! Records list definitions, embedded data, table sizes and metadata into the
//! cross-pass artifacts. Everything that would emit content is left at the
//! trait's no-op default.

use crate::model::{Artifacts, EmbeddedData, ListElement, ListKind};
use crate::parser::attrs::{parse_id, parse_uint};

use super::props::parse_optional;
use super::table::TableGrid;
use super::{metadata_key, Collector, ListAttrs};

/// Collector for the structural discovery pass.
pub struct StylesCollector<'a> {
    artifacts: &'a mut Artifacts,
    table_count: usize,
    tables: Vec<(usize, TableGrid)>,
}

impl<'a> StylesCollector<'a> {
    /// Create a collector writing into `artifacts`.
    pub fn new(artifacts: &'a mut Artifacts) -> Self {
        Self {
            artifacts,
            table_count: 0,
            tables: Vec::new(),
        }
    }

    fn finish_table(&mut self) {
        if let Some((index, grid)) = self.tables.pop() {
            log::debug!("table {} has size {:?}", index, grid.size());
            self.artifacts.table_sizes.insert(index, grid.size());
        }
    }
}

impl Collector for StylesCollector<'_> {
    fn collect_list(&mut self, attrs: &ListAttrs) {
        let Some(id) = parse_id(attrs.id.as_deref()) else {
            log::debug!("list definition without a usable id: {:?}", attrs.id);
            return;
        };
        let parent = parse_id(attrs.parent_id.as_deref());
        let kind = ListKind::from_type(attrs.list_type.as_deref().and_then(parse_uint));

        let mut element = ListElement::new(id, parent, kind);
        if let Some(decimal) = attrs.decimal.as_deref() {
            element = element.with_decimal(decimal);
        }
        if let Some(delimiter) = attrs.delimiter.as_deref() {
            element = element.with_delimiter(delimiter);
        }
        if let Some(start) = attrs.start_value.as_deref().and_then(parse_uint) {
            element = element.with_start_value(start);
        }
        self.artifacts.list_elements.insert(id, element);
    }

    fn collect_data(&mut self, name: Option<&str>, mime_type: Option<&str>, data: Vec<u8>) {
        let Some(name) = name else {
            log::debug!("dropping unnamed data item of {} bytes", data.len());
            return;
        };
        self.artifacts.data.insert(
            name.to_string(),
            EmbeddedData::new(mime_type.map(str::to_string), data),
        );
    }

    fn add_metadata_entry(&mut self, key: &str, value: &str) {
        self.artifacts.metadata.insert(metadata_key(key), value);
    }

    fn open_table(&mut self, _props: Option<&str>) {
        let index = self.table_count;
        self.table_count += 1;
        self.tables.push((index, TableGrid::default()));
    }

    fn close_table(&mut self) {
        self.finish_table();
    }

    fn open_cell(&mut self, props: Option<&str>) {
        let Some((_, grid)) = self.tables.last_mut() else {
            return;
        };
        let position = grid.position(&parse_optional(props));
        grid.record(&position);
    }

    fn end_document(&mut self) {
        while !self.tables.is_empty() {
            self.finish_table();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NumberFormat, TableSize};

    fn list(id: &str, parent: Option<&str>, list_type: Option<&str>) -> ListAttrs {
        ListAttrs {
            id: Some(id.to_string()),
            parent_id: parent.map(str::to_string),
            list_type: list_type.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_collect_list() {
        let mut artifacts = Artifacts::new();
        {
            let mut collector = StylesCollector::new(&mut artifacts);
            collector.collect_list(&list("1", Some("0"), Some("2")));
            collector.collect_list(&ListAttrs {
                delimiter: Some("(%L)".to_string()),
                start_value: Some("3".to_string()),
                ..list("2", Some("1"), Some("5"))
            });
            collector.collect_list(&list("abc", None, None));
        }
        assert_eq!(artifacts.list_elements.len(), 2);
        let first = &artifacts.list_elements[&1];
        assert_eq!(first.parent_id, None);
        assert_eq!(first.kind, ListKind::Ordered(NumberFormat::UpperAlpha));
        assert_eq!(first.decimal, "NULL");
        let second = &artifacts.list_elements[&2];
        assert_eq!(second.parent_id, Some(1));
        assert_eq!(second.start_value, Some(3));
        assert!(!second.kind.is_ordered());
        assert!(!second.is_resolved());
    }

    #[test]
    fn test_collect_data_and_metadata() {
        let mut artifacts = Artifacts::new();
        {
            let mut collector = StylesCollector::new(&mut artifacts);
            collector.collect_data(Some("img"), Some("image/png"), vec![1, 2]);
            collector.collect_data(None, None, vec![3]);
            collector.add_metadata_entry("dc.title", "Report");
            collector.insert_text("ignored");
        }
        assert_eq!(artifacts.data.len(), 1);
        assert_eq!(artifacts.data["img"].mime_type.as_deref(), Some("image/png"));
        assert_eq!(artifacts.metadata.get_str("dc:title"), Some("Report"));
    }

    #[test]
    fn test_table_sizes_in_document_order() {
        let mut artifacts = Artifacts::new();
        {
            let mut collector = StylesCollector::new(&mut artifacts);
            collector.open_table(None);
            collector.open_cell(Some("left-attach:0; right-attach:1; top-attach:0; bot-attach:1"));
            collector.close_cell();
            collector.open_cell(Some("left-attach:1; right-attach:2; top-attach:0; bot-attach:1"));
            // nested table inside the second cell
            collector.open_table(None);
            collector.open_cell(None);
            collector.close_cell();
            collector.close_table();
            collector.close_cell();
            collector.open_cell(Some("left-attach:0; right-attach:2; top-attach:1; bot-attach:2"));
            collector.close_cell();
            collector.close_table();
            collector.open_table(None);
            collector.end_document();
        }
        assert_eq!(artifacts.table_sizes[&0], TableSize { rows: 2, columns: 2 });
        assert_eq!(artifacts.table_sizes[&1], TableSize { rows: 1, columns: 1 });
        assert_eq!(artifacts.table_sizes[&2], TableSize::default());
    }

    #[test]
    fn test_cell_outside_table_is_ignored() {
        let mut artifacts = Artifacts::new();
        StylesCollector::new(&mut artifacts).open_cell(Some("left-attach:0"));
        assert!(artifacts.table_sizes.is_empty());
    }
}
