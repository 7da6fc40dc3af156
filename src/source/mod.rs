//! Document sources: where page content comes from.
//!
//! The pipeline only sees [`DocumentSource`]. [`LopdfSource`] interprets real
//! PDF files; [`MemorySource`] serves pages built in code.

mod backend;
mod detect;
mod interpret;
mod pdf;
mod table_detector;

pub use backend::{decode_content, decode_text_simple, ContentOp, PdfValue};
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_pdf_bytes};
pub use interpret::{
    ContentInterpreter, ImagePlacement, Matrix, PageGraphics, SimpleDecoder, TextDecoder, TextSpan,
};
pub use pdf::LopdfSource;
pub use table_detector::{TableDetector, TableDetectorConfig};

use crate::error::{Error, Result};
use crate::model::PageContent;

/// A paginated document.
pub trait DocumentSource {
    /// Number of pages.
    fn page_count(&self) -> usize;

    /// Load the page at zero-based `index`.
    fn load_page(&self, index: usize) -> Result<PageContent>;
}

/// Pages held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pages: Vec<PageContent>,
}

impl MemorySource {
    /// Create a source from pages; their indices are reassigned in order.
    pub fn new(pages: Vec<PageContent>) -> Self {
        let mut source = Self::default();
        for page in pages {
            source.push(page);
        }
        source
    }

    /// Append a page.
    pub fn push(&mut self, mut page: PageContent) {
        page.index = self.pages.len();
        self.pages.push(page);
    }
}

impl DocumentSource for MemorySource {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn load_page(&self, index: usize) -> Result<PageContent> {
        self.pages
            .get(index)
            .cloned()
            .ok_or(Error::PageOutOfRange(index, self.pages.len()))
    }
}

impl<S: DocumentSource + ?Sized> DocumentSource for &S {
    fn page_count(&self) -> usize {
        (**self).page_count()
    }

    fn load_page(&self, index: usize) -> Result<PageContent> {
        (**self).load_page(index)
    }
}
