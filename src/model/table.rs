//! Table model structures.

use super::{Fill, ParagraphInfo};
use serde::{Deserialize, Serialize};

/// A cell in a table (`a:tc`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// Cell content (paragraphs)
    #[serde(default)]
    pub paragraphs: Vec<ParagraphInfo>,

    /// Explicit cell fill from `a:tcPr`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<Fill>,

    /// Horizontal span (`gridSpan`)
    #[serde(default = "default_span", skip_serializing_if = "is_default_span")]
    pub grid_span: u32,

    /// Vertical span (`rowSpan`)
    #[serde(default = "default_span", skip_serializing_if = "is_default_span")]
    pub row_span: u32,

    /// Continuation of a horizontally merged cell
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub h_merge: bool,

    /// Continuation of a vertically merged cell
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub v_merge: bool,
}

fn default_span() -> u32 {
    1
}

fn is_default_span(n: &u32) -> bool {
    *n == 1
}

impl Cell {
    /// Create a new empty cell.
    pub fn new() -> Self {
        Self {
            grid_span: 1,
            row_span: 1,
            ..Default::default()
        }
    }

    /// Whether this cell is covered by a neighbour's span.
    pub fn is_merged_continuation(&self) -> bool {
        self.h_merge || self.v_merge
    }

    /// Concatenated cell text, paragraphs joined with newlines.
    pub fn plain_text(&self) -> String {
        self.paragraphs
            .iter()
            .map(ParagraphInfo::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Whether no paragraph carries visible text.
    pub fn is_empty(&self) -> bool {
        self.paragraphs.iter().all(ParagraphInfo::is_empty)
    }
}

/// A table inside a graphic frame (`a:tbl`).
///
/// Declared widths and heights are EMU weights. They need not match the
/// frame the table is drawn into.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableInfo {
    pub rows: Vec<Vec<Cell>>,

    /// Declared column widths (`a:gridCol/@w`)
    pub column_widths: Vec<i64>,

    /// Declared row heights (`a:tr/@h`)
    pub row_heights: Vec<i64>,

    /// `a:tblPr/@firstRow`
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub first_row: bool,

    /// `a:tblPr/@bandRow`
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub band_row: bool,
}

impl TableInfo {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Declared column count: the grid size, or the widest row when the
    /// grid is absent.
    pub fn column_count(&self) -> usize {
        if self.column_widths.is_empty() {
            self.rows.iter().map(Vec::len).max().unwrap_or(0)
        } else {
            self.column_widths.len()
        }
    }

    /// Pad or truncate every row to the declared column count and make sure
    /// there is one height per row.
    pub fn normalize(&mut self) {
        let columns = self.column_count();
        for row in &mut self.rows {
            row.truncate(columns);
            row.resize_with(columns, Cell::new);
        }
        let rows = self.rows.len();
        self.row_heights.truncate(rows);
        self.row_heights.resize(rows, 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TextRun;

    fn cell(text: &str) -> Cell {
        let mut cell = Cell::new();
        let mut para = ParagraphInfo::new();
        para.runs.push(TextRun::new(text));
        cell.paragraphs.push(para);
        cell
    }

    #[test]
    fn test_normalize_pads_and_truncates() {
        let mut table = TableInfo::new();
        table.column_widths = vec![100, 100, 100];
        table.rows.push(vec![cell("a")]);
        table.rows.push(vec![cell("a"), cell("b"), cell("c"), cell("d")]);
        table.row_heights = vec![10];

        table.normalize();

        assert!(table.rows.iter().all(|r| r.len() == 3));
        assert_eq!(table.rows[1][2].plain_text(), "c");
        assert_eq!(table.row_heights, vec![10, 0]);
    }

    #[test]
    fn test_column_count_without_grid() {
        let mut table = TableInfo::new();
        table.rows.push(vec![cell("a"), cell("b")]);
        table.rows.push(vec![cell("a")]);
        assert_eq!(table.column_count(), 2);
        table.normalize();
        assert_eq!(table.rows[1].len(), 2);
        assert!(table.rows[1][1].is_empty());
    }
}
