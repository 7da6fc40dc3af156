//! Data model shared by the source, the classifiers and the renderers.
//!
//! Sources produce [`PageContent`]; the pipeline turns it into files and a
//! [`PageAssetIndex`]; the assembler turns the index into an
//! [`AssembledDocument`].

mod document;
mod geometry;
mod page;
mod raster;
mod table;

pub use document::{AssembledDocument, PageAssetIndex, PageAssets, PageBlock};
pub use geometry::{DrawingItem, DrawingKind, FillColor, Point, Primitive};
pub use page::PageContent;
pub use raster::{detect_extension, RasterAsset, RawImage};
pub use table::{StitchedTable, TableGrid, TableRow};
