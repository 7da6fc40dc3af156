//! Table continuation across pages.
//!
//! A table that runs over a page break repeats its header on every page. The
//! stitcher keeps the first page's rows and appends every later grid minus
//! its header row.

use std::path::Path;

use csv::WriterBuilder;

use crate::error::{Error, Result};
use crate::model::{StitchedTable, TableGrid};
use crate::output::write_atomic;

/// Fold state for stitching tables page by page.
#[derive(Debug, Clone, Default)]
pub struct TableStitcher {
    table: Option<StitchedTable>,
}

impl TableStitcher {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one page's tables into the accumulator.
    ///
    /// Pages without tables leave the accumulation untouched.
    pub fn stitch(mut self, page: usize, tables: &[TableGrid]) -> Self {
        for grid in tables {
            if grid.is_empty() {
                continue;
            }
            match self.table.as_mut() {
                Some(acc) if !acc.is_empty() => {
                    acc.rows.extend(grid.rows.iter().skip(1).cloned());
                    acc.record_page(page);
                }
                _ => {
                    log::debug!("Table accumulation starts on page {}", page + 1);
                    self.table = Some(StitchedTable::start(page, grid));
                }
            }
        }
        self
    }

    /// The table accumulated so far.
    pub fn current(&self) -> Option<&StitchedTable> {
        self.table.as_ref()
    }

    /// Finish the fold; a table without rows yields nothing.
    pub fn finish(self) -> Option<StitchedTable> {
        self.table.filter(|t| !t.is_empty())
    }
}

/// Stitch a whole range of pages in one call.
pub fn stitch_tables<'a, I>(pages: I) -> Option<StitchedTable>
where
    I: IntoIterator<Item = (usize, &'a [TableGrid])>,
{
    pages
        .into_iter()
        .fold(TableStitcher::new(), |acc, (page, tables)| acc.stitch(page, tables))
        .finish()
}

/// Serialize a table as CSV.
///
/// Rows may differ in length. Absent cells are written empty and embedded
/// newlines become spaces.
pub fn table_to_csv(table: &StitchedTable) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new().flexible(true).from_writer(Vec::new());

    for row in &table.rows {
        let record = row.iter().map(|cell| match cell {
            Some(text) => text.replace("\r\n", " ").replace(['\n', '\r'], " "),
            None => String::new(),
        });
        writer.write_record(record)?;
    }

    writer
        .into_inner()
        .map_err(|e| Error::Io(e.into_error()))
}

/// Write a table to `path` atomically.
pub fn write_table(table: &StitchedTable, path: &Path) -> Result<()> {
    let data = table_to_csv(table)?;
    write_atomic(path, &data)?;
    log::info!(
        "Wrote table with {} rows from pages {}-{} to {}",
        table.row_count(),
        table.start_page + 1,
        table.end_page + 1,
        path.display()
    );
    Ok(())
}
