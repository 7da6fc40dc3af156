//! Rendering of page assets: SVG for drawings, plain text for the assembled
//! document.

mod assemble;
mod svg;

pub use assemble::assemble;
pub use svg::{SvgDocument, SvgRenderer};
