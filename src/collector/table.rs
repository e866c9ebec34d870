//! Table grid bookkeeping shared by both passes.

use crate::model::TableSize;
use crate::parser::attrs::parse_uint;

use super::props::RawProps;

/// Widest table that is laid out; attachments beyond it are clamped.
pub const MAX_TABLE_COLUMNS: u32 = 256;

/// Tallest table that is laid out; attachments beyond it are clamped.
pub const MAX_TABLE_ROWS: u32 = 8192;

/// Grid position of a cell, from its `*-attach` properties.
///
/// `right` and `bottom` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellPosition {
    /// First column
    pub left: u32,
    /// One past the last column
    pub right: u32,
    /// First row
    pub top: u32,
    /// One past the last row
    pub bottom: u32,
}

impl CellPosition {
    /// Number of columns the cell spans.
    pub fn column_span(&self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    /// Number of rows the cell spans.
    pub fn row_span(&self) -> u32 {
        self.bottom.saturating_sub(self.top)
    }
}

/// Running state of one open table.
#[derive(Debug, Clone, Default)]
pub struct TableGrid {
    /// Table width in columns
    pub columns: u32,
    /// Row currently open, if any
    pub row: Option<u32>,
    /// Next unfilled column of the open row
    pub next_column: u32,
    size: TableSize,
}

impl TableGrid {
    /// Create a grid for a table of the given width.
    pub fn new(columns: u32) -> Self {
        Self {
            columns,
            ..Default::default()
        }
    }

    /// Position of a cell; missing attachments continue from the previous cell.
    pub fn position(&self, raw: &RawProps) -> CellPosition {
        let attach = |key: &str, limit: u32| {
            raw.get(key)
                .and_then(|v| parse_uint(v))
                .map(|v| v.min(limit))
        };

        let top = attach("top-attach", MAX_TABLE_ROWS - 1)
            .unwrap_or(self.row.unwrap_or(0))
            .min(MAX_TABLE_ROWS - 1);
        let left = attach("left-attach", MAX_TABLE_COLUMNS - 1)
            .unwrap_or(if self.row == Some(top) {
                self.next_column
            } else {
                0
            })
            .min(MAX_TABLE_COLUMNS - 1);
        let right = attach("right-attach", MAX_TABLE_COLUMNS)
            .filter(|&r| r > left)
            .unwrap_or(left.saturating_add(1));
        let bottom = attach("bot-attach", MAX_TABLE_ROWS)
            .filter(|&b| b > top)
            .unwrap_or(top.saturating_add(1));

        CellPosition {
            left,
            right,
            top,
            bottom,
        }
    }

    /// Begin a row at `row`, with no cells placed yet.
    pub fn begin_row(&mut self, row: Option<u32>) {
        self.row = row;
        self.next_column = 0;
    }

    /// Account for a cell opened without attachments, at the next column.
    pub fn place_implicit(&mut self) {
        self.next_column = self.next_column.saturating_add(1).min(MAX_TABLE_COLUMNS);
    }

    /// Record a placed cell, growing the observed size.
    pub fn record(&mut self, position: &CellPosition) {
        if self.row == Some(position.top) {
            self.next_column = self.next_column.max(position.right);
        } else {
            self.row = Some(position.top);
            self.next_column = position.right;
        }
        self.size.rows = self.size.rows.max(position.bottom);
        self.size.columns = self.size.columns.max(position.right);
    }

    /// Size observed so far.
    pub fn size(&self) -> TableSize {
        self.size
    }
}
