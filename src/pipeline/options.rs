//! Pipeline options and configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::assets::DEFAULT_MAX_GAP;
use crate::error::{Error, Result};
use crate::vector::ClassifierConfig;

/// An inclusive range of zero-based page indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRange {
    pub start: usize,
    pub end: usize,
}

impl PageRange {
    /// Create a range; `start` must not exceed `end`.
    pub fn new(start: usize, end: usize) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidPageRange(format!(
                "start {} is after end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Every page of a document with `page_count` pages, or `None` when it
    /// has none.
    pub fn all(page_count: usize) -> Option<Self> {
        page_count.checked_sub(1).map(|end| Self { start: 0, end })
    }

    /// Parse a 1-indexed page range as typed by users: "3", "1-10", "all".
    pub fn parse(s: &str) -> Result<Option<Self>> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Ok(None);
        }

        let (start, end) = match s.split_once('-') {
            Some((start, end)) => (parse_page_number(start)?, parse_page_number(end)?),
            None => {
                let page = parse_page_number(s)?;
                (page, page)
            }
        };
        Self::new(start - 1, end - 1).map(Some)
    }

    /// Number of pages in the range.
    pub fn page_count(&self) -> usize {
        self.end - self.start + 1
    }

    /// Check if a page index lies in the range.
    pub fn contains(&self, page: usize) -> bool {
        (self.start..=self.end).contains(&page)
    }

    /// Page indices in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> {
        self.start..=self.end
    }

    /// Check the range against a document's page count.
    pub fn validate(&self, page_count: usize) -> Result<()> {
        if self.end >= page_count {
            return Err(Error::PageOutOfRange(self.end, page_count));
        }
        Ok(())
    }
}

fn parse_page_number(s: &str) -> Result<usize> {
    match s.trim().parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(Error::InvalidPageRange(format!(
            "'{}' is not a page number (pages start at 1)",
            s.trim()
        ))),
    }
}

/// Options controlling a pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    /// Grid classifier settings
    pub classifier: ClassifierConfig,

    /// Minimum element count for an SVG render to be written
    pub min_vector_elements: usize,

    /// Maximum vertical gap between raster fragments of one figure
    pub max_merge_gap: f32,

    /// Pages to process (all pages when unset)
    pub pages: Option<PageRange>,

    /// Whether to derive page assets in parallel
    pub parallel: bool,

    /// Whether to write table wireframe renders
    pub write_wireframes: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            classifier: ClassifierConfig::default(),
            min_vector_elements: 0,
            max_merge_gap: DEFAULT_MAX_GAP,
            pages: None,
            parallel: true,
            write_wireframes: true,
        }
    }
}

impl PipelineOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load options from a JSON file; missing fields take their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Set the classifier configuration.
    pub fn with_classifier(mut self, config: ClassifierConfig) -> Self {
        self.classifier = config;
        self
    }

    /// Set the minimum line count per axis for a grid.
    pub fn with_min_lines(mut self, min_lines: usize) -> Self {
        self.classifier.min_lines = min_lines;
        self
    }

    /// Set the alignment tolerance.
    pub fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.classifier.tolerance = tolerance;
        self
    }

    /// Set the SVG minimum-content gate.
    pub fn with_min_vector_elements(mut self, min: usize) -> Self {
        self.min_vector_elements = min;
        self
    }

    /// Set the raster merge gap.
    pub fn with_max_merge_gap(mut self, gap: f32) -> Self {
        self.max_merge_gap = gap;
        self
    }

    /// Restrict processing to a page range.
    pub fn with_pages(mut self, range: PageRange) -> Self {
        self.pages = Some(range);
        self
    }

    /// Enable or disable parallel processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Enable or disable wireframe renders.
    pub fn with_wireframes(mut self, write: bool) -> Self {
        self.write_wireframes = write;
        self
    }

    /// Check option values.
    pub fn validate(&self) -> Result<()> {
        if !self.classifier.tolerance.is_finite() || self.classifier.tolerance < 0.0 {
            return Err(Error::Config(format!(
                "tolerance must be a non-negative number, got {}",
                self.classifier.tolerance
            )));
        }
        if !self.max_merge_gap.is_finite() || self.max_merge_gap < 0.0 {
            return Err(Error::Config(format!(
                "max_merge_gap must be a non-negative number, got {}",
                self.max_merge_gap
            )));
        }
        Ok(())
    }

    /// The page range to process for a document of `page_count` pages.
    pub fn resolve_pages(&self, page_count: usize) -> Result<Option<PageRange>> {
        match self.pages {
            Some(range) => {
                range.validate(page_count)?;
                Ok(Some(range))
            }
            None => Ok(PageRange::all(page_count)),
        }
    }
}
