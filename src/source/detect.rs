//! PDF header detection.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{Error, Result};

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
const VERSION_LEN: usize = 3;

/// Read the header of `path` and return the declared PDF version.
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<String> {
    let mut header = Vec::with_capacity(16);
    File::open(path)?.take(16).read_to_end(&mut header)?;
    detect_format_from_bytes(&header)
}

/// Check the `%PDF-x.y` header and return the version (e.g. "1.7").
pub fn detect_format_from_bytes(data: &[u8]) -> Result<String> {
    if data.len() < PDF_MAGIC.len() + VERSION_LEN || !data.starts_with(PDF_MAGIC) {
        return Err(Error::UnknownFormat);
    }

    let version = &data[PDF_MAGIC.len()..PDF_MAGIC.len() + VERSION_LEN];
    match version {
        [major, b'.', minor] if major.is_ascii_digit() && minor.is_ascii_digit() => {
            Ok(String::from_utf8_lossy(version).into_owned())
        }
        _ => Err(Error::UnknownFormat),
    }
}

/// Check if bytes start with a PDF header.
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    detect_format_from_bytes(data).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_valid_pdf() {
        assert_eq!(detect_format_from_bytes(b"%PDF-1.7\n%\xe2\xe3").unwrap(), "1.7");
        assert_eq!(detect_format_from_bytes(b"%PDF-2.0\n").unwrap(), "2.0");
    }

    #[test]
    fn test_detect_invalid_format() {
        assert!(matches!(
            detect_format_from_bytes(b"<!DOCTYPE html>"),
            Err(Error::UnknownFormat)
        ));
        assert!(matches!(detect_format_from_bytes(b"%PDF"), Err(Error::UnknownFormat)));
        assert!(matches!(detect_format_from_bytes(b"%PDF-x.y"), Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_detect_from_short_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.pdf");
        std::fs::write(&path, b"%PDF-1.4").unwrap();
        assert_eq!(detect_format_from_path(&path).unwrap(), "1.4");

        std::fs::write(&path, b"GIF89a").unwrap();
        assert!(!is_pdf_bytes(&std::fs::read(&path).unwrap()));
        assert!(detect_format_from_path(&path).is_err());
    }
}
