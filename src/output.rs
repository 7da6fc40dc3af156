//! Output directory layout and atomic file writes.
//!
//! Every file is written to a temporary sibling first and renamed into place,
//! so readers never observe a partially written asset.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{Error, Result};

/// File name of the assembled document.
pub const DOCUMENT_FILE: &str = "content.txt";

/// Deterministic names for every asset the pipeline produces.
///
/// Page numbers in file names are 1-indexed.
#[derive(Debug, Clone)]
pub struct OutputDir {
    root: PathBuf,
}

impl OutputDir {
    /// Use an existing directory as output root.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("output directory does not exist: {}", root.display()),
            )));
        }
        Ok(Self { root })
    }

    /// Output root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Raster fragment `k` (0-indexed) of page `page` (0-indexed).
    pub fn image_path(&self, page: usize, k: usize, ext: &str) -> PathBuf {
        self.root
            .join(format!("page_{}_image_{}.{}", page + 1, k + 1, ext))
    }

    /// Combined raster of a page.
    pub fn combined_image_path(&self, page: usize) -> PathBuf {
        self.root
            .join(format!("page_{}_combined_image.jpg", page + 1))
    }

    /// Illustration render of a page.
    pub fn vector_path(&self, page: usize) -> PathBuf {
        self.root.join(format!("page_{}_vector.svg", page + 1))
    }

    /// Table wireframe render of a page.
    pub fn wireframe_path(&self, page: usize) -> PathBuf {
        self.root
            .join(format!("page_{}_table_wireframe.svg", page + 1))
    }

    /// Stitched table over the requested range (both ends 0-indexed).
    pub fn table_path(&self, start: usize, end: usize) -> PathBuf {
        self.root
            .join(format!("combined_table_{}_to_{}.csv", start + 1, end + 1))
    }

    /// The assembled document.
    pub fn document_path(&self) -> PathBuf {
        self.root.join(DOCUMENT_FILE)
    }

    /// Reference to a file as it appears in the assembled document.
    pub fn reference(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .into_owned()
    }
}

/// Write `data` to `path` through a temporary file in the same directory.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.flush()?;
    tmp.persist(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_one_indexed() {
        let dir = tempfile::tempdir().unwrap();
        let out = OutputDir::open(dir.path()).unwrap();

        assert!(out.image_path(0, 1, "png").ends_with("page_1_image_2.png"));
        assert!(out.combined_image_path(2).ends_with("page_3_combined_image.jpg"));
        assert!(out.vector_path(0).ends_with("page_1_vector.svg"));
        assert!(out.wireframe_path(4).ends_with("page_5_table_wireframe.svg"));
        assert!(out.table_path(0, 12).ends_with("combined_table_1_to_13.csv"));
    }

    #[test]
    fn test_reference_is_relative() {
        let dir = tempfile::tempdir().unwrap();
        let out = OutputDir::open(dir.path()).unwrap();
        assert_eq!(out.reference(&out.vector_path(0)), "page_1_vector.svg");
    }

    #[test]
    fn test_missing_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(OutputDir::open(missing), Err(Error::Io(_))));
    }

    #[test]
    fn test_write_atomic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
        // No stray temp files left behind
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
