//! Table types.

use serde::{Deserialize, Serialize};

/// A single table row: cell text, where a cell may be absent.
pub type TableRow = Vec<Option<String>>;

/// A table grid extracted from one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableGrid {
    /// Rows in the table
    pub rows: Vec<TableRow>,
}

impl TableGrid {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table from rows.
    pub fn from_rows(rows: Vec<TableRow>) -> Self {
        Self { rows }
    }

    /// Create a table from string values; empty strings become absent cells.
    pub fn from_strings<R, S>(rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rows = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|cell| {
                        let cell = cell.into();
                        if cell.is_empty() {
                            None
                        } else {
                            Some(cell)
                        }
                    })
                    .collect()
            })
            .collect();
        Self { rows }
    }

    /// Add a row to the table.
    pub fn add_row(&mut self, row: TableRow) {
        self.rows.push(row);
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of columns (based on first row).
    pub fn column_count(&self) -> usize {
        self.rows.first().map(|r| r.len()).unwrap_or(0)
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A table formed by concatenating per-page grids across a page span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StitchedTable {
    /// Accumulated rows
    pub rows: Vec<TableRow>,

    /// First contributing page (zero-based)
    pub start_page: usize,

    /// Last contributing page (zero-based)
    pub end_page: usize,

    /// Every page that contributed rows, ascending
    pub pages: Vec<usize>,
}

impl StitchedTable {
    /// Start a stitched table from the first page's grid.
    pub fn start(page: usize, table: &TableGrid) -> Self {
        Self {
            rows: table.rows.clone(),
            start_page: page,
            end_page: page,
            pages: vec![page],
        }
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Check if a page lies inside the stitched span.
    pub fn spans_page(&self, page: usize) -> bool {
        (self.start_page..=self.end_page).contains(&page)
    }

    pub(crate) fn record_page(&mut self, page: usize) {
        self.end_page = self.end_page.max(page);
        if self.pages.last() != Some(&page) {
            self.pages.push(page);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_new() {
        let table = TableGrid::new();
        assert!(table.is_empty());
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.column_count(), 0);
    }

    #[test]
    fn test_from_strings_marks_empty_cells_absent() {
        let table = TableGrid::from_strings([vec!["Name", "Age"], vec!["Alice", ""]]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.rows[1][1], None);
        assert_eq!(table.rows[1][0].as_deref(), Some("Alice"));
    }

    #[test]
    fn test_stitched_span() {
        let mut stitched = StitchedTable::start(2, &TableGrid::from_strings([vec!["h"]]));
        stitched.record_page(4);
        assert!(stitched.spans_page(3));
        assert!(!stitched.spans_page(5));
        assert_eq!(stitched.pages, vec![2, 4]);
    }
}
