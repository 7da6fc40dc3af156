//! The page pipeline.
//!
//! Pages are loaded in ascending order. Each page's derived assets (raster
//! files, classification, SVG renders) are independent of other pages and may
//! be computed in parallel; table stitching and the asset index are
//! sequential folds over the results.

mod options;
mod report;

pub use options::{PageRange, PipelineOptions};
pub use report::{PageReport, ProcessReport, TableReport};

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::assets::{write_table, RasterMerger, TableStitcher};
use crate::error::{Error, Result};
use crate::model::{PageAssetIndex, PageContent, RasterAsset};
use crate::output::{write_atomic, OutputDir};
use crate::render::{assemble, SvgRenderer};
use crate::source::DocumentSource;
use crate::vector::{ClassifiedGroup, GridClassifier};

/// Runs documents through classification, merging, stitching and assembly,
/// writing every asset into one output directory.
#[derive(Debug, Clone)]
pub struct Pipeline {
    output: OutputDir,
    options: PipelineOptions,
}

/// Per-page result carried from the parallel step to the folds.
struct PageOutput {
    report: PageReport,
    text: String,
}

impl Pipeline {
    /// Create a pipeline writing into an existing directory.
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            output: OutputDir::open(output_dir)?,
            options: PipelineOptions::default(),
        })
    }

    /// Set the options.
    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    /// Get the options.
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Get the output directory.
    pub fn output_dir(&self) -> &Path {
        self.output.root()
    }

    /// Process the configured page range of `source`.
    ///
    /// A failed asset write does not stop the run: the table and
    /// `content.txt` are still written from what succeeded, then the first
    /// failure is returned.
    pub fn run<S: DocumentSource + ?Sized>(&self, source: &S) -> Result<ProcessReport> {
        self.options.validate()?;
        let range = self.options.resolve_pages(source.page_count())?;

        let pages = match range {
            Some(range) => range
                .iter()
                .map(|index| source.load_page(index))
                .collect::<Result<Vec<PageContent>>>()?,
            None => Vec::new(),
        };
        log::info!("Processing {} pages", pages.len());

        let results: Vec<(PageOutput, Option<Error>)> = if self.options.parallel {
            pages.par_iter().map(|page| self.process_page(page)).collect()
        } else {
            pages.iter().map(|page| self.process_page(page)).collect()
        };

        // First failure in page order; the remaining outputs are still produced
        let mut first_error: Option<Error> = None;
        let mut outputs = Vec::with_capacity(results.len());
        for (output, error) in results {
            first_error = first_error.or(error);
            outputs.push(output);
        }

        // Table fold
        let stitched = pages
            .iter()
            .fold(TableStitcher::new(), |acc, page| acc.stitch(page.index, &page.tables))
            .finish();

        let table = match (stitched, range) {
            (Some(table), Some(range)) => {
                let path = self.output.table_path(range.start, range.end);
                match write_table(&table, &path) {
                    Ok(()) => Some((table, path)),
                    Err(e) => {
                        log::warn!("Table {} not written: {}", path.display(), e);
                        first_error = first_error.or(Some(e));
                        None
                    }
                }
            }
            _ => None,
        };

        // Asset index fold
        let mut index = outputs.iter().fold(PageAssetIndex::new(), |index, out| {
            index.with_page(
                out.report.page,
                self.references(&out.report.images),
                self.references(&out.report.vectors),
            )
        });
        if let Some((stitched, path)) = &table {
            index = index.with_table(
                stitched.start_page..=stitched.end_page,
                &self.output.reference(path),
            );
        }

        let document = assemble(
            outputs.iter().map(|out| (out.report.page, out.text.as_str())),
            &index,
        );
        let document_path = self.output.document_path();
        match write_atomic(&document_path, document.to_text().as_bytes()) {
            Ok(()) => log::info!(
                "Wrote document with {} page blocks to {}",
                document.page_count(),
                document_path.display()
            ),
            Err(e) => first_error = first_error.or(Some(e)),
        }

        if let Some(e) = first_error {
            return Err(e);
        }

        Ok(ProcessReport {
            range,
            pages: outputs.into_iter().map(|out| out.report).collect(),
            table: table.map(|(stitched, path)| TableReport {
                path,
                rows: stitched.row_count(),
                pages: stitched.pages,
            }),
            document: document_path,
        })
    }

    fn references(&self, paths: &[PathBuf]) -> Vec<String> {
        paths.iter().map(|p| self.output.reference(p)).collect()
    }

    /// Derive one page's assets.
    ///
    /// Every output kind is attempted; the page output lists what was
    /// written, alongside the first failure.
    fn process_page(&self, page: &PageContent) -> (PageOutput, Option<Error>) {
        let mut report = PageReport {
            page: page.index,
            ..Default::default()
        };

        let (assets, mut first_error) = self.write_rasters(page);
        report.images_merged = assets.iter().any(|a| a.combined);
        report.images = assets.into_iter().map(|a| a.path).collect();

        let classifier = GridClassifier::with_config(self.options.classifier.clone());
        let classification = classifier.classify(&page.drawings);
        report.grid_bearing = classification.grid_bearing;
        report.structural_items = classification.structural.len();
        report.illustrative_items = classification.illustrative.len();

        let mut renders = vec![(
            &classification.illustrative,
            self.output.vector_path(page.index),
        )];
        if self.options.write_wireframes {
            renders.push((
                &classification.structural,
                self.output.wireframe_path(page.index),
            ));
        }

        for (group, path) in renders {
            match self.write_render(page, group, &path) {
                Ok(true) => report.vectors.push(path),
                Ok(false) if !group.is_empty() => report.suppressed_renders += 1,
                Ok(false) => {}
                Err(e) => first_error = first_error.or(Some(e)),
            }
        }

        let output = PageOutput {
            report,
            text: page.filtered_text(),
        };
        (output, first_error)
    }

    /// Write the page's raster fragments, fused when they qualify.
    ///
    /// Every fragment is attempted; only the written ones take part in the
    /// merge.
    fn write_rasters(&self, page: &PageContent) -> (Vec<RasterAsset>, Option<Error>) {
        let mut first_error: Option<Error> = None;
        let mut assets = Vec::with_capacity(page.images.len());
        for (k, image) in page.images.iter().enumerate() {
            let path = self.output.image_path(page.index, k, &image.format);
            match write_atomic(&path, &image.data) {
                Ok(()) => assets.push(RasterAsset::new(path, image.format.clone(), image.y)),
                Err(e) => {
                    log::warn!("Image {} not written: {}", path.display(), e);
                    first_error = first_error.or(Some(e));
                }
            }
        }

        let merger = RasterMerger::new().with_max_gap(self.options.max_merge_gap);
        let assets = merger.combine_or_keep(assets, &self.output.combined_image_path(page.index));
        (assets, first_error)
    }

    /// Render a group to `path`; `false` when nothing qualified.
    fn write_render(
        &self,
        page: &PageContent,
        group: &ClassifiedGroup,
        path: &Path,
    ) -> Result<bool> {
        let renderer = SvgRenderer::new().with_min_elements(self.options.min_vector_elements);
        let items = group.items(&page.drawings);
        let Some(svg) = renderer.render(items, page.width, page.height) else {
            log::debug!(
                "Page {}: no {:?} render ({} items)",
                page.number(),
                group.kind,
                group.len()
            );
            return Ok(false);
        };

        write_atomic(path, svg.content.as_bytes())?;
        log::info!("Wrote {} elements to {}", svg.element_count, path.display());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DrawingItem, FillColor, Point, Primitive, RawImage, TableGrid};
    use crate::source::MemorySource;

    fn line(x0: f32, y0: f32, x1: f32, y1: f32) -> DrawingItem {
        DrawingItem::stroke(vec![Primitive::line(
            Point::new(x0, y0),
            Point::new(x1, y1),
        )])
    }

    fn grid_page() -> PageContent {
        let mut page = PageContent::letter(0).with_text("Quarterly figures");
        for y in [100.0, 120.0, 140.0, 160.0] {
            page.add_drawing(line(50.0, y, 300.0, y));
        }
        for x in [50.0, 175.0, 300.0] {
            page.add_drawing(line(x, 100.0, x, 160.0));
        }
        page.add_drawing(DrawingItem::filled(
            vec![Primitive::rect(400.0, 400.0, 20.0, 20.0)],
            FillColor::new(0.0, 0.5, 1.0),
        ));
        page
    }

    #[test]
    fn test_missing_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Pipeline::new(dir.path().join("missing")),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn test_page_report() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(dir.path()).unwrap();
        let (output, error) = pipeline.process_page(&grid_page());
        assert!(error.is_none());

        assert!(output.report.grid_bearing);
        assert_eq!(output.report.structural_items, 7);
        assert_eq!(output.report.illustrative_items, 1);
        assert_eq!(
            output.report.vectors,
            vec![
                dir.path().join("page_1_vector.svg"),
                dir.path().join("page_1_table_wireframe.svg"),
            ]
        );
        assert_eq!(output.text, "Quarterly figures");
    }

    #[test]
    fn test_without_wireframes() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(dir.path())
            .unwrap()
            .with_options(PipelineOptions::new().with_wireframes(false));
        let (output, error) = pipeline.process_page(&grid_page());
        assert!(error.is_none());

        assert_eq!(output.report.vectors.len(), 1);
        assert!(!dir.path().join("page_1_table_wireframe.svg").exists());
    }

    #[test]
    fn test_suppressed_renders_counted() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(dir.path())
            .unwrap()
            .with_options(PipelineOptions::new().with_min_vector_elements(5));
        let (output, error) = pipeline.process_page(&grid_page());
        assert!(error.is_none());

        // 7 wireframe lines pass the gate, the single rectangle does not
        assert_eq!(output.report.suppressed_renders, 1);
        assert_eq!(
            output.report.vectors,
            vec![dir.path().join("page_1_table_wireframe.svg")]
        );
    }

    #[test]
    fn test_blocked_image_does_not_stop_later_fragments() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("page_1_image_1.png")).unwrap();
        let pipeline = Pipeline::new(dir.path()).unwrap();

        let mut page = PageContent::letter(0);
        page.add_image(RawImage::new(vec![1, 2, 3], "png", 0.0));
        page.add_image(RawImage::new(vec![4, 5, 6], "png", 400.0));
        let (output, error) = pipeline.process_page(&page);

        assert!(matches!(error, Some(Error::Io(_))));
        assert_eq!(
            output.report.images,
            vec![dir.path().join("page_1_image_2.png")]
        );
        assert_eq!(
            std::fs::read(dir.path().join("page_1_image_2.png")).unwrap(),
            vec![4, 5, 6]
        );
    }

    #[test]
    fn test_sequential_matches_parallel() {
        let mut second = grid_page();
        second.add_table(TableGrid::from_strings(vec![vec!["a", "b"], vec!["1", "2"]]));
        let source = MemorySource::new(vec![grid_page(), second, PageContent::a4(0)]);

        let run = |options: PipelineOptions| {
            let dir = tempfile::tempdir().unwrap();
            let report = Pipeline::new(dir.path())
                .unwrap()
                .with_options(options)
                .run(&source)
                .unwrap();
            let text = std::fs::read_to_string(&report.document).unwrap();
            (report.page_count(), report.grid_bearing_pages(), text)
        };

        assert_eq!(
            run(PipelineOptions::new()),
            run(PipelineOptions::new().sequential())
        );
    }

    #[test]
    fn test_invalid_options_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(dir.path())
            .unwrap()
            .with_options(PipelineOptions::new().with_max_merge_gap(-5.0));
        let source = MemorySource::new(vec![PageContent::letter(0)]);
        assert!(matches!(pipeline.run(&source), Err(Error::Config(_))));
    }
}
