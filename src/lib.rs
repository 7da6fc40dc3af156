//! # pdfweave
//!
//! Splits PDF pages into reusable assets and one linearized text document.
//!
//! For every page the pipeline separates table gridlines from illustrative
//! vector art and renders each group to SVG, writes embedded raster images
//! (fusing fragments of one figure back into a single image), stitches a
//! table that continues across pages into one CSV file, and assembles the
//! page text with references to all of those assets in reading order.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfweave::process_file;
//!
//! fn main() -> pdfweave::Result<()> {
//!     std::fs::create_dir_all("out")?;
//!     let report = process_file("document.pdf", "out")?;
//!     println!(
//!         "{} pages, {} grid-bearing",
//!         report.page_count(),
//!         report.grid_bearing_pages()
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Grid classification**: structural vs illustrative vector drawings
//! - **SVG output**: top-left origin, minimum-content gate
//! - **Raster merging**: vertically adjacent fragments stacked into one JPEG
//! - **Table stitching**: continuation tables folded into one CSV
//! - **Parallel processing**: Uses Rayon for per-page derivation

pub mod assets;
pub mod error;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod render;
pub mod source;
pub mod vector;

// Re-export commonly used types
pub use assets::{RasterMerger, TableStitcher};
pub use error::{Error, Result};
pub use model::{
    AssembledDocument, DrawingItem, DrawingKind, FillColor, PageAssetIndex, PageContent, Point,
    Primitive, RasterAsset, RawImage, StitchedTable, TableGrid, TableRow,
};
pub use output::OutputDir;
pub use pipeline::{PageRange, PageReport, Pipeline, PipelineOptions, ProcessReport, TableReport};
pub use render::{assemble, SvgRenderer};
pub use source::{
    detect_format_from_bytes, detect_format_from_path, DocumentSource, LopdfSource, MemorySource,
};
pub use vector::{ClassifierConfig, GridClassifier};

use std::path::{Path, PathBuf};

/// Process every page of a PDF file into `output_dir`.
///
/// The output directory must exist.
///
/// # Example
///
/// ```no_run
/// use pdfweave::process_file;
///
/// let report = process_file("report.pdf", "./assets").unwrap();
/// println!("Wrote {}", report.document.display());
/// ```
pub fn process_file<P: AsRef<Path>, Q: AsRef<Path>>(
    path: P,
    output_dir: Q,
) -> Result<ProcessReport> {
    process_file_with_options(path, output_dir, PipelineOptions::default())
}

/// Process a PDF file with custom options.
///
/// # Example
///
/// ```no_run
/// use pdfweave::{process_file_with_options, PageRange, PipelineOptions};
///
/// let options = PipelineOptions::new()
///     .with_pages(PageRange::new(0, 12)?)
///     .with_min_vector_elements(3);
/// let report = process_file_with_options("report.pdf", "./assets", options)?;
/// # Ok::<(), pdfweave::Error>(())
/// ```
pub fn process_file_with_options<P: AsRef<Path>, Q: AsRef<Path>>(
    path: P,
    output_dir: Q,
    options: PipelineOptions,
) -> Result<ProcessReport> {
    let source = LopdfSource::open(path)?;
    Pipeline::new(output_dir.as_ref())?
        .with_options(options)
        .run(&source)
}

/// Process a PDF held in memory.
pub fn process_bytes<Q: AsRef<Path>>(data: &[u8], output_dir: Q) -> Result<ProcessReport> {
    let source = LopdfSource::from_bytes(data)?;
    Pipeline::new(output_dir.as_ref())?.run(&source)
}

/// Builder for a pipeline run.
///
/// # Example
///
/// ```no_run
/// use pdfweave::{PageRange, Pdfweave};
///
/// let report = Pdfweave::new("./assets")
///     .with_pages(PageRange::new(0, 3)?)
///     .with_max_merge_gap(30.0)
///     .sequential()
///     .process("document.pdf")?;
/// # Ok::<(), pdfweave::Error>(())
/// ```
pub struct Pdfweave {
    output_dir: PathBuf,
    options: PipelineOptions,
}

impl Pdfweave {
    /// Create a builder writing into `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            options: PipelineOptions::default(),
        }
    }

    /// Replace all options.
    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    /// Restrict processing to a page range.
    pub fn with_pages(mut self, range: PageRange) -> Self {
        self.options = self.options.with_pages(range);
        self
    }

    /// Set the minimum line count per axis for a grid.
    pub fn with_min_lines(mut self, min_lines: usize) -> Self {
        self.options = self.options.with_min_lines(min_lines);
        self
    }

    /// Set the alignment tolerance.
    pub fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.options = self.options.with_tolerance(tolerance);
        self
    }

    /// Set the SVG minimum-content gate.
    pub fn with_min_vector_elements(mut self, min: usize) -> Self {
        self.options = self.options.with_min_vector_elements(min);
        self
    }

    /// Set the raster merge gap.
    pub fn with_max_merge_gap(mut self, gap: f32) -> Self {
        self.options = self.options.with_max_merge_gap(gap);
        self
    }

    /// Skip table wireframe renders.
    pub fn without_wireframes(mut self) -> Self {
        self.options = self.options.with_wireframes(false);
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.options = self.options.sequential();
        self
    }

    /// Process a PDF file.
    pub fn process<P: AsRef<Path>>(self, path: P) -> Result<ProcessReport> {
        let source = LopdfSource::open(path)?;
        self.run(&source)
    }

    /// Process any document source.
    pub fn run<S: DocumentSource + ?Sized>(self, source: &S) -> Result<ProcessReport> {
        Pipeline::new(self.output_dir)?
            .with_options(self.options)
            .run(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let builder = Pdfweave::new("out")
            .with_min_lines(4)
            .with_tolerance(0.5)
            .with_min_vector_elements(2)
            .with_max_merge_gap(10.0)
            .without_wireframes()
            .sequential();

        assert_eq!(builder.options.classifier.min_lines, 4);
        assert_eq!(builder.options.classifier.tolerance, 0.5);
        assert_eq!(builder.options.min_vector_elements, 2);
        assert_eq!(builder.options.max_merge_gap, 10.0);
        assert!(!builder.options.write_wireframes);
        assert!(!builder.options.parallel);
    }

    #[test]
    fn test_process_bytes_rejects_non_pdf() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            process_bytes(b"<!DOCTYPE html>", dir.path()),
            Err(Error::UnknownFormat)
        ));
    }

    #[test]
    fn test_process_file_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let result = process_file(dir.path().join("missing.pdf"), dir.path());
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_builder_runs_memory_source() {
        let dir = tempfile::tempdir().unwrap();
        let source = MemorySource::new(vec![PageContent::letter(0).with_text("Hello")]);
        let report = Pdfweave::new(dir.path()).sequential().run(&source).unwrap();

        assert_eq!(report.page_count(), 1);
        assert_eq!(std::fs::read_to_string(report.document).unwrap(), "Hello");
    }

    #[test]
    fn test_builder_missing_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let source = MemorySource::new(vec![PageContent::letter(0)]);
        assert!(Pdfweave::new(dir.path().join("nope")).run(&source).is_err());
    }
}
