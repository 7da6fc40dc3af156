//! Raster fragment merging.
//!
//! Documents often store one figure as several horizontal strips. When every
//! gap between consecutive fragments is small, the fragments are stacked back
//! into one image and the strips are removed.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, GenericImage, ImageFormat, RgbImage};

use crate::error::{Error, Result};
use crate::model::RasterAsset;
use crate::output::write_atomic;

/// Default maximum vertical gap between fragments of one figure.
pub const DEFAULT_MAX_GAP: f32 = 50.0;

/// Decides whether a page's fragments form one figure, and fuses them.
#[derive(Debug, Clone)]
pub struct RasterMerger {
    max_gap: f32,
}

impl Default for RasterMerger {
    fn default() -> Self {
        Self {
            max_gap: DEFAULT_MAX_GAP,
        }
    }
}

impl RasterMerger {
    /// Create a merger with the default gap threshold.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum gap.
    pub fn with_max_gap(mut self, max_gap: f32) -> Self {
        self.max_gap = max_gap;
        self
    }

    /// Get the maximum gap.
    pub fn max_gap(&self) -> f32 {
        self.max_gap
    }

    /// True when there are at least two positions and every consecutive gap
    /// is within the threshold.
    pub fn should_merge(&self, positions: &[f32]) -> bool {
        if positions.len() < 2 {
            return false;
        }
        positions
            .windows(2)
            .all(|pair| (pair[1] - pair[0]).abs() <= self.max_gap)
    }

    /// Stack `assets` top-to-bottom into one JPEG at `output`.
    ///
    /// The canvas is as wide as the widest fragment and as tall as all
    /// fragments together; each fragment is placed at x = 0.
    pub fn combine(&self, assets: &[RasterAsset], output: &Path) -> Result<RasterAsset> {
        if assets.is_empty() {
            return Err(Error::ImageMerge("no images to combine".to_string()));
        }

        let images = assets
            .iter()
            .map(|asset| {
                image::open(&asset.path).map_err(|e| {
                    Error::ImageMerge(format!("{}: {}", asset.path.display(), e))
                })
            })
            .collect::<Result<Vec<DynamicImage>>>()?;

        let width = images.iter().map(|i| i.width()).max().unwrap_or(0);
        let height: u32 = images.iter().map(|i| i.height()).sum();

        let mut canvas = RgbImage::new(width, height);
        let mut y_offset = 0;
        for img in &images {
            canvas.copy_from(&img.to_rgb8(), 0, y_offset)?;
            y_offset += img.height();
        }

        let mut encoded = Vec::new();
        DynamicImage::ImageRgb8(canvas)
            .write_to(&mut Cursor::new(&mut encoded), ImageFormat::Jpeg)?;
        write_atomic(output, &encoded)?;

        log::info!(
            "Combined {} images into {} ({}x{})",
            assets.len(),
            output.display(),
            width,
            height
        );

        Ok(RasterAsset::combined(output, "jpg", assets[0].y))
    }

    /// Merge the page's fragments into `output` when they qualify, deleting
    /// the fragments afterwards; otherwise, or if merging fails, return the
    /// fragments unchanged.
    pub fn combine_or_keep(&self, assets: Vec<RasterAsset>, output: &Path) -> Vec<RasterAsset> {
        let positions: Vec<f32> = assets.iter().map(|a| a.y).collect();
        if !self.should_merge(&positions) {
            return assets;
        }

        match self.combine(&assets, output) {
            Ok(combined) => {
                for asset in &assets {
                    if let Err(e) = fs::remove_file(&asset.path) {
                        log::warn!(
                            "Failed to remove merged fragment {}: {}",
                            asset.path.display(),
                            e
                        );
                    }
                }
                vec![combined]
            }
            Err(e) => {
                log::warn!("Keeping {} images separate: {}", assets.len(), e);
                assets
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn write_png(path: &Path, width: u32, height: u32, color: [u8; 3]) {
        RgbImage::from_pixel(width, height, Rgb(color))
            .save_with_format(path, ImageFormat::Png)
            .unwrap();
    }

    #[test]
    fn test_threshold_boundary() {
        let merger = RasterMerger::new();
        assert!(merger.should_merge(&[0.0, 50.0, 100.0]));
        assert!(!merger.should_merge(&[0.0, 51.0, 100.0]));
    }

    #[test]
    fn test_fewer_than_two_never_merge() {
        let merger = RasterMerger::new();
        assert!(!merger.should_merge(&[]));
        assert!(!merger.should_merge(&[10.0]));
    }

    #[test]
    fn test_gap_direction_does_not_matter() {
        let merger = RasterMerger::new().with_max_gap(10.0);
        assert!(merger.should_merge(&[100.0, 90.0, 95.0]));
        assert!(!merger.should_merge(&[100.0, 90.0, 70.0]));
    }

    #[test]
    fn test_combine_stacks_vertically() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.png");
        let b = dir.path().join("b.png");
        write_png(&a, 20, 10, [255, 0, 0]);
        write_png(&b, 30, 15, [0, 0, 255]);

        let assets = vec![
            RasterAsset::new(&a, "png", 0.0),
            RasterAsset::new(&b, "png", 10.0),
        ];
        let out = dir.path().join("combined.jpg");
        let combined = RasterMerger::new().combine(&assets, &out).unwrap();

        assert!(combined.combined);
        assert_eq!(combined.format, "jpg");
        let img = image::open(&out).unwrap();
        assert_eq!((img.width(), img.height()), (30, 25));
    }

    #[test]
    fn test_combine_or_keep_deletes_fragments() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.png");
        let b = dir.path().join("b.png");
        write_png(&a, 8, 8, [0, 255, 0]);
        write_png(&b, 8, 8, [0, 255, 0]);

        let assets = vec![
            RasterAsset::new(&a, "png", 100.0),
            RasterAsset::new(&b, "png", 120.0),
        ];
        let out = dir.path().join("combined.jpg");
        let result = RasterMerger::new().combine_or_keep(assets, &out);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].path, out);
        assert!(!a.exists());
        assert!(!b.exists());
    }

    #[test]
    fn test_decode_failure_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.raw");
        let b = dir.path().join("b.raw");
        std::fs::write(&a, b"not an image").unwrap();
        std::fs::write(&b, b"still not an image").unwrap();

        let assets = vec![
            RasterAsset::new(&a, "raw", 0.0),
            RasterAsset::new(&b, "raw", 5.0),
        ];
        let out = dir.path().join("combined.jpg");
        let result = RasterMerger::new().combine_or_keep(assets.clone(), &out);

        assert_eq!(result, assets);
        assert!(a.exists());
        assert!(!out.exists());
    }

    #[test]
    fn test_combine_empty_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("combined.jpg");
        assert!(RasterMerger::new().combine(&[], &out).is_err());
    }
}
