//! Assembled document and per-page asset index.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Assets realized for a single page, as references relative to the output
/// directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageAssets {
    /// Stitched table covering this page
    pub table: Option<String>,

    /// Raster files in extraction order
    pub images: Vec<String>,

    /// Vector renders (illustration first, then table wireframe)
    pub vectors: Vec<String>,
}

impl PageAssets {
    /// Check if no asset was realized for the page.
    pub fn is_empty(&self) -> bool {
        self.table.is_none() && self.images.is_empty() && self.vectors.is_empty()
    }

    /// References in document order: table, images, vector renders.
    pub fn references(&self) -> impl Iterator<Item = &str> {
        self.table
            .iter()
            .chain(self.images.iter())
            .chain(self.vectors.iter())
            .map(String::as_str)
    }
}

/// Page number (0-indexed) to realized assets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageAssetIndex {
    pages: BTreeMap<usize, PageAssets>,
}

impl PageAssetIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold step: record one page's raster and vector outputs.
    pub fn with_page(mut self, page: usize, images: Vec<String>, vectors: Vec<String>) -> Self {
        let entry = self.pages.entry(page).or_default();
        entry.images = images;
        entry.vectors = vectors;
        self
    }

    /// Fold step: reference a stitched table from every page in `pages`.
    pub fn with_table(mut self, pages: impl IntoIterator<Item = usize>, reference: &str) -> Self {
        for page in pages {
            self.pages.entry(page).or_default().table = Some(reference.to_string());
        }
        self
    }

    /// Assets for a page, if any were recorded.
    pub fn get(&self, page: usize) -> Option<&PageAssets> {
        self.pages.get(&page)
    }

    /// Iterate over recorded pages in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &PageAssets)> {
        self.pages.iter().map(|(page, assets)| (*page, assets))
    }

    /// Number of recorded pages.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// One page of the linearized output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageBlock {
    /// Page index (0-indexed)
    pub page: usize,

    /// Filtered page text
    pub text: String,

    /// Asset references in document order
    pub references: Vec<String>,
}

impl PageBlock {
    /// Render the block: text, then each reference, separated by blank lines.
    pub fn render(&self) -> String {
        let mut out = self.text.clone();
        for reference in &self.references {
            out.push_str("\n\n");
            out.push_str(reference);
        }
        out
    }
}

/// The final linearized document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssembledDocument {
    /// Page blocks in ascending page order
    pub blocks: Vec<PageBlock>,
}

impl AssembledDocument {
    /// Get the number of page blocks.
    pub fn page_count(&self) -> usize {
        self.blocks.len()
    }

    /// Check if the document has no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Render to plain text, blocks joined by a blank line.
    pub fn to_text(&self) -> String {
        self.blocks
            .iter()
            .map(PageBlock::render)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
