//! Page-level types.

use super::{DrawingItem, RawImage, TableGrid};
use serde::{Deserialize, Serialize};

/// Everything a document source yields for a single page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageContent {
    /// Page index (0-indexed)
    pub index: usize,

    /// Page width in points (1 point = 1/72 inch)
    pub width: f32,

    /// Page height in points
    pub height: f32,

    /// Raw page text
    pub text: String,

    /// Drawing items in paint order
    pub drawings: Vec<DrawingItem>,

    /// Images in extraction order
    pub images: Vec<RawImage>,

    /// Tables detected on the page
    pub tables: Vec<TableGrid>,
}

impl PageContent {
    /// Create a new empty page with the given dimensions.
    pub fn new(index: usize, width: f32, height: f32) -> Self {
        Self {
            index,
            width,
            height,
            text: String::new(),
            drawings: Vec::new(),
            images: Vec::new(),
            tables: Vec::new(),
        }
    }

    /// Create a new page with standard Letter size (8.5 x 11 inches).
    pub fn letter(index: usize) -> Self {
        Self::new(index, 612.0, 792.0)
    }

    /// Create a new page with standard A4 size (210 x 297 mm).
    pub fn a4(index: usize) -> Self {
        Self::new(index, 595.0, 842.0)
    }

    /// Set the page text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Add a drawing item.
    pub fn add_drawing(&mut self, item: DrawingItem) {
        self.drawings.push(item);
    }

    /// Add an image.
    pub fn add_image(&mut self, image: RawImage) {
        self.images.push(image);
    }

    /// Add a table.
    pub fn add_table(&mut self, table: TableGrid) {
        self.tables.push(table);
    }

    /// Page number for display and file names (1-indexed).
    pub fn number(&self) -> usize {
        self.index + 1
    }

    /// Text with blank and whitespace-only lines removed.
    pub fn filtered_text(&self) -> String {
        self.text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Check if the page carries no text, drawings, images or tables.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
            && self.drawings.is_empty()
            && self.images.is_empty()
            && self.tables.iter().all(TableGrid::is_empty)
    }

    /// Get page dimensions as (width, height) tuple.
    pub fn dimensions(&self) -> (f32, f32) {
        (self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_new() {
        let page = PageContent::new(0, 612.0, 792.0);
        assert_eq!(page.number(), 1);
        assert_eq!(page.dimensions(), (612.0, 792.0));
        assert!(page.is_empty());
    }

    #[test]
    fn test_filtered_text_drops_blank_lines() {
        let page = PageContent::letter(0).with_text("Title\n\n   \nBody line\n\t\nEnd");
        assert_eq!(page.filtered_text(), "Title\nBody line\nEnd");
    }

    #[test]
    fn test_filtered_text_empty() {
        assert_eq!(PageContent::a4(3).filtered_text(), "");
    }
}
