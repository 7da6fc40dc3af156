//! Raster image types.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// An image as yielded by a document source, before it is written anywhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawImage {
    /// Encoded image bytes
    #[serde(skip_serializing)]
    pub data: Vec<u8>,

    /// Format tag, used as file extension (e.g. "jpg", "png")
    pub format: String,

    /// Vertical position on the page (document space)
    pub y: f32,
}

impl RawImage {
    /// Create a new raw image.
    pub fn new(data: Vec<u8>, format: impl Into<String>, y: f32) -> Self {
        Self {
            data,
            format: format.into(),
            y,
        }
    }

    /// Create a raw image, deriving the format tag from the data's magic bytes.
    pub fn detect(data: Vec<u8>, y: f32) -> Self {
        let format = detect_extension(&data).unwrap_or("raw");
        Self::new(data, format, y)
    }

    /// Get the size of the image data in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// A file-backed raster image realized in the output directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterAsset {
    /// Location of the encoded image
    pub path: PathBuf,

    /// Format tag (file extension)
    pub format: String,

    /// Vertical position on the page (document space)
    pub y: f32,

    /// Whether this asset was produced by fusing several fragments
    pub combined: bool,
}

impl RasterAsset {
    /// Create a new asset for an extracted fragment.
    pub fn new(path: impl Into<PathBuf>, format: impl Into<String>, y: f32) -> Self {
        Self {
            path: path.into(),
            format: format.into(),
            y,
            combined: false,
        }
    }

    /// Create a combined asset.
    pub fn combined(path: impl Into<PathBuf>, format: impl Into<String>, y: f32) -> Self {
        Self {
            combined: true,
            ..Self::new(path, format, y)
        }
    }

    /// File name of the asset, if any.
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }

    /// Asset path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Detect a file extension from data magic bytes.
pub fn detect_extension(data: &[u8]) -> Option<&'static str> {
    if data.len() < 8 {
        return None;
    }

    // JPEG: FF D8 FF
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("jpg");
    }

    // PNG: 89 50 4E 47 0D 0A 1A 0A
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Some("png");
    }

    if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        return Some("gif");
    }

    // TIFF, either byte order
    if data.starts_with(&[0x49, 0x49, 0x2A, 0x00]) || data.starts_with(&[0x4D, 0x4D, 0x00, 0x2A])
    {
        return Some("tiff");
    }

    if data.starts_with(b"BM") {
        return Some("bmp");
    }

    // JPEG 2000: 00 00 00 0C 6A 50 20 20
    if data.starts_with(&[0x00, 0x00, 0x00, 0x0C, 0x6A, 0x50, 0x20, 0x20]) {
        return Some("jp2");
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_extension() {
        let jpeg_data = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46];
        assert_eq!(detect_extension(&jpeg_data), Some("jpg"));

        let png_data = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(detect_extension(&png_data), Some("png"));

        assert_eq!(detect_extension(&[0x00, 0x00, 0x00, 0x00]), None);
    }

    #[test]
    fn test_raw_image_detect() {
        let img = RawImage::detect(vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A], 10.0);
        assert_eq!(img.format, "png");

        let unknown = RawImage::detect(vec![1, 2, 3], 0.0);
        assert_eq!(unknown.format, "raw");
    }

    #[test]
    fn test_asset_file_name() {
        let asset = RasterAsset::new("/tmp/out/page_1_image_1.png", "png", 0.0);
        assert_eq!(asset.file_name(), Some("page_1_image_1.png"));
        assert!(!asset.combined);
    }
}
