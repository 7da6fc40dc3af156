//! Asset post-processing: raster fragment merging and table stitching.

mod raster;
mod tables;

pub use raster::{RasterMerger, DEFAULT_MAX_GAP};
pub use tables::{stitch_tables, table_to_csv, write_table, TableStitcher};
