//! Content stream decoding.
//!
//! Converts `lopdf` operations into library-neutral [`ContentOp`]s so the
//! interpreter can be driven from raw bytes in tests.

use lopdf::Object;

use crate::error::{Error, Result};

/// A value from a content stream operand.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfValue {
    Integer(i64),
    Real(f32),
    Name(Vec<u8>),
    Str(Vec<u8>),
    Array(Vec<PdfValue>),
    Other,
}

impl PdfValue {
    /// Numeric value, if any.
    pub fn as_number(&self) -> Option<f32> {
        match self {
            PdfValue::Integer(i) => Some(*i as f32),
            PdfValue::Real(r) => Some(*r),
            _ => None,
        }
    }

    /// Name bytes, if any.
    pub fn as_name(&self) -> Option<&[u8]> {
        match self {
            PdfValue::Name(n) => Some(n),
            _ => None,
        }
    }
}

/// A single operation from a content stream.
#[derive(Debug, Clone)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<PdfValue>,
}

impl ContentOp {
    /// The trailing `n` operands as numbers, or `None` if any is missing or
    /// not numeric.
    pub fn numbers(&self, n: usize) -> Option<Vec<f32>> {
        if self.operands.len() < n {
            return None;
        }
        self.operands[self.operands.len() - n..]
            .iter()
            .map(PdfValue::as_number)
            .collect()
    }
}

/// Parse raw (decompressed) content stream bytes.
pub fn decode_content(data: &[u8]) -> Result<Vec<ContentOp>> {
    let content =
        lopdf::content::Content::decode(data).map_err(|e| Error::PdfParse(e.to_string()))?;

    Ok(content
        .operations
        .into_iter()
        .map(|op| ContentOp {
            operator: op.operator,
            operands: op.operands.iter().map(convert_object).collect(),
        })
        .collect())
}

/// Convert a `lopdf::Object` to [`PdfValue`].
fn convert_object(obj: &Object) -> PdfValue {
    match obj {
        Object::Integer(i) => PdfValue::Integer(*i),
        Object::Real(r) => PdfValue::Real(*r),
        Object::Name(n) => PdfValue::Name(n.clone()),
        Object::String(b, _) => PdfValue::Str(b.clone()),
        Object::Array(arr) => PdfValue::Array(arr.iter().map(convert_object).collect()),
        _ => PdfValue::Other,
    }
}

/// Text decoding fallback when the font's encoding is unavailable.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    // UTF-16BE with BOM
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}
