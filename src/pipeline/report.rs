//! Run summary.

use std::path::PathBuf;

use serde::Serialize;

use super::options::PageRange;

/// What was produced for one page.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PageReport {
    /// Zero-based page index
    pub page: usize,
    /// Raster files left in the output directory
    pub images: Vec<PathBuf>,
    /// Whether the page's fragments were fused into one image
    pub images_merged: bool,
    /// SVG renders written for the page
    pub vectors: Vec<PathBuf>,
    /// Whether the grid predicate fired
    pub grid_bearing: bool,
    pub structural_items: usize,
    pub illustrative_items: usize,
    /// Non-empty groups whose render fell below the content gate
    pub suppressed_renders: usize,
}

/// The stitched table of a run.
#[derive(Debug, Clone, Serialize)]
pub struct TableReport {
    pub path: PathBuf,
    pub rows: usize,
    /// Zero-based pages that contributed rows
    pub pages: Vec<usize>,
}

/// Summary of a pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessReport {
    /// Processed pages (absent for a document without pages)
    pub range: Option<PageRange>,
    pub pages: Vec<PageReport>,
    pub table: Option<TableReport>,
    /// The assembled document
    pub document: PathBuf,
}

impl ProcessReport {
    /// Number of processed pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Pages classified as grid-bearing.
    pub fn grid_bearing_pages(&self) -> usize {
        self.pages.iter().filter(|p| p.grid_bearing).count()
    }

    /// Pages whose raster fragments were merged.
    pub fn merged_pages(&self) -> usize {
        self.pages.iter().filter(|p| p.images_merged).count()
    }

    /// Renders suppressed by the content gate across all pages.
    pub fn suppressed_renders(&self) -> usize {
        self.pages.iter().map(|p| p.suppressed_renders).sum()
    }

    /// Every raster and SVG file written.
    pub fn asset_count(&self) -> usize {
        self.pages
            .iter()
            .map(|p| p.images.len() + p.vectors.len())
            .sum::<usize>()
            + usize::from(self.table.is_some())
    }
}
