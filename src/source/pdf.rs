//! PDF document source backed by lopdf.

use std::collections::{BTreeMap, HashMap};
use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId, Stream};

use crate::error::{Error, Result};
use crate::model::{PageContent, RawImage};

use super::backend::{decode_content, decode_text_simple};
use super::detect::{detect_format_from_bytes, detect_format_from_path};
use super::interpret::{ContentInterpreter, PageGraphics, TextDecoder, TextSpan};
use super::table_detector::TableDetector;
use super::DocumentSource;

/// Inherited page attributes are looked up at most this many levels up.
const MAX_INHERIT_DEPTH: usize = 32;

/// US Letter, used when a page has no usable MediaBox.
const DEFAULT_PAGE_SIZE: (f32, f32) = (612.0, 792.0);

/// A PDF file opened with lopdf.
pub struct LopdfSource {
    doc: LopdfDocument,
    /// (page number, object id) in page order
    pages: Vec<(u32, ObjectId)>,
    detector: TableDetector,
}

impl LopdfSource {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        detect_format_from_path(path)?;
        Self::from_document(LopdfDocument::load(path)?)
    }

    /// Parse a PDF from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        detect_format_from_bytes(data)?;
        Self::from_document(LopdfDocument::load_mem(data)?)
    }

    fn from_document(doc: LopdfDocument) -> Result<Self> {
        if doc.is_encrypted() {
            return Err(Error::Encrypted);
        }
        let pages = doc.get_pages().into_iter().collect();
        Ok(Self {
            doc,
            pages,
            detector: TableDetector::new(),
        })
    }

    /// Replace the table detector.
    pub fn with_table_detector(mut self, detector: TableDetector) -> Self {
        self.detector = detector;
        self
    }

    /// PDF version string.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    fn resolve<'a>(&'a self, obj: &'a Object) -> Option<&'a Object> {
        match obj {
            Object::Reference(id) => self.doc.get_object(*id).ok(),
            other => Some(other),
        }
    }

    fn resolve_dict<'a>(&'a self, obj: &'a Object) -> Option<&'a Dictionary> {
        self.resolve(obj).and_then(|o| o.as_dict().ok())
    }

    /// Look up a page attribute, following `/Parent` for inherited ones.
    fn inherited(&self, page_id: ObjectId, key: &[u8]) -> Option<&Object> {
        let mut current = self.doc.get_dictionary(page_id).ok();
        for _ in 0..MAX_INHERIT_DEPTH {
            let dict = current?;
            if let Ok(value) = dict.get(key) {
                return self.resolve(value);
            }
            current = dict
                .get(b"Parent")
                .ok()
                .and_then(|p| p.as_reference().ok())
                .and_then(|id| self.doc.get_dictionary(id).ok());
        }
        None
    }

    fn page_dimensions(&self, page_id: ObjectId) -> (f32, f32) {
        let media_box = self
            .inherited(page_id, b"MediaBox")
            .and_then(|o| o.as_array().ok())
            .filter(|arr| arr.len() >= 4)
            .map(|arr| {
                arr.iter()
                    .map(|o| self.resolve(o).and_then(|o| o.as_float().ok()).unwrap_or(0.0))
                    .collect::<Vec<f32>>()
            });

        match media_box {
            Some(v) => ((v[2] - v[0]).abs(), (v[3] - v[1]).abs()),
            None => DEFAULT_PAGE_SIZE,
        }
    }

    /// Decompressed content of a page; a page without `/Contents` is blank.
    fn page_content(&self, page_id: ObjectId) -> Result<Vec<u8>> {
        let page_dict = self.doc.get_dictionary(page_id)?;
        let Ok(contents) = page_dict.get(b"Contents") else {
            return Ok(Vec::new());
        };

        let streams: Vec<&Object> = match self.resolve(contents) {
            Some(Object::Array(arr)) => arr.iter().collect(),
            Some(obj) => vec![obj],
            None => return Err(Error::PdfParse("Invalid content stream".to_string())),
        };

        let mut content = Vec::new();
        for obj in streams {
            if let Some(Object::Stream(s)) = self.resolve(obj) {
                let data = s
                    .decompressed_content()
                    .unwrap_or_else(|_| s.content.clone());
                content.extend_from_slice(&data);
                content.push(b' ');
            }
        }
        Ok(content)
    }

    /// `/ca` of every ExtGState resource.
    fn fill_alpha(&self, resources: Option<&Dictionary>) -> HashMap<Vec<u8>, f32> {
        let mut alpha = HashMap::new();
        let Some(states) = resources
            .and_then(|r| r.get(b"ExtGState").ok())
            .and_then(|o| self.resolve_dict(o))
        else {
            return alpha;
        };

        for (name, obj) in states.iter() {
            if let Some(ca) = self
                .resolve_dict(obj)
                .and_then(|d| d.get(b"ca").ok())
                .and_then(|o| o.as_float().ok())
            {
                alpha.insert(name.clone(), ca);
            }
        }
        alpha
    }

    fn image_stream<'a>(
        &'a self,
        resources: Option<&'a Dictionary>,
        name: &[u8],
    ) -> Option<&'a Stream> {
        let xobjects = self.resolve_dict(resources?.get(b"XObject").ok()?)?;
        let stream = self.resolve(xobjects.get(name).ok()?)?.as_stream().ok()?;
        let subtype = stream.dict.get(b"Subtype").and_then(Object::as_name).ok();
        (subtype == Some(b"Image".as_slice())).then_some(stream)
    }

    fn page_text(&self, number: u32, spans: &[TextSpan]) -> String {
        match self.doc.extract_text(&[number]) {
            Ok(text) => text,
            Err(e) => {
                log::warn!("Text extraction failed on page {}: {}; using spans", number, e);
                join_spans(spans)
            }
        }
    }
}

impl DocumentSource for LopdfSource {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn load_page(&self, index: usize) -> Result<PageContent> {
        let &(number, page_id) = self
            .pages
            .get(index)
            .ok_or(Error::PageOutOfRange(index, self.pages.len()))?;

        let (width, height) = self.page_dimensions(page_id);
        let mut page = PageContent::new(index, width, height);

        let resources = self
            .inherited(page_id, b"Resources")
            .and_then(|o| o.as_dict().ok());
        let decoder = FontDecoder {
            doc: &self.doc,
            fonts: self.doc.get_page_fonts(page_id).unwrap_or_default(),
        };
        let interpreter = ContentInterpreter::new()
            .with_fill_alpha(self.fill_alpha(resources))
            .with_decoder(&decoder);

        let graphics = match self
            .page_content(page_id)
            .and_then(|data| decode_content(&data))
        {
            Ok(ops) => interpreter.run(&ops),
            Err(e) => {
                log::warn!("Skipping content of page {}: {}", number, e);
                PageGraphics::default()
            }
        };

        for placement in &graphics.placements {
            match self.image_stream(resources, &placement.name) {
                Some(stream) => page.add_image(image_from_stream(stream, placement.top)),
                None => log::debug!(
                    "XObject {} on page {} is not an image; skipped",
                    String::from_utf8_lossy(&placement.name),
                    number
                ),
            }
        }

        page.text = self.page_text(number, &graphics.spans);
        for table in self.detector.detect(&graphics.spans) {
            page.add_table(table);
        }
        page.drawings = graphics.drawings;

        log::debug!(
            "Loaded page {}: {} drawings, {} images, {} tables",
            number,
            page.drawings.len(),
            page.images.len(),
            page.tables.len()
        );

        Ok(page)
    }
}

/// Decodes strings with the page's font encodings.
struct FontDecoder<'a> {
    doc: &'a LopdfDocument,
    fonts: BTreeMap<Vec<u8>, &'a Dictionary>,
}

impl TextDecoder for FontDecoder<'_> {
    fn decode(&self, font: &[u8], bytes: &[u8]) -> String {
        self.fonts
            .get(font)
            .and_then(|dict| dict.get_font_encoding(self.doc).ok())
            .and_then(|enc| LopdfDocument::decode_text(&enc, bytes).ok())
            .unwrap_or_else(|| decode_text_simple(bytes))
    }
}

/// Encoded bytes and format tag for an image XObject.
///
/// JPEG and JPEG 2000 data are kept verbatim; 8-bit gray and RGB samples are
/// re-encoded as PNG; anything else is kept as decoded bytes.
fn image_from_stream(stream: &Stream, top: f32) -> RawImage {
    let filter = match stream.dict.get(b"Filter") {
        Ok(Object::Name(name)) => Some(name.as_slice()),
        Ok(Object::Array(arr)) => arr.last().and_then(|o| o.as_name().ok()),
        _ => None,
    };

    match filter {
        Some(b"DCTDecode") => RawImage::new(stream.content.clone(), "jpg", top),
        Some(b"JPXDecode") => RawImage::new(stream.content.clone(), "jp2", top),
        _ => {
            let data = stream
                .decompressed_content()
                .unwrap_or_else(|_| stream.content.clone());
            match samples_to_png(&stream.dict, &data) {
                Some(png) => RawImage::new(png, "png", top),
                None => RawImage::detect(data, top),
            }
        }
    }
}

fn samples_to_png(dict: &Dictionary, data: &[u8]) -> Option<Vec<u8>> {
    let dim = |key: &[u8]| -> Option<u32> {
        dict.get(key).ok()?.as_i64().ok().and_then(|v| u32::try_from(v).ok())
    };
    let (width, height) = (dim(b"Width")?, dim(b"Height")?);
    if dim(b"BitsPerComponent")? != 8 {
        return None;
    }

    let pixels = width as usize * height as usize;
    let image = match dict.get(b"ColorSpace").and_then(Object::as_name).ok()? {
        b"DeviceGray" => {
            let samples = data.get(..pixels)?.to_vec();
            DynamicImage::ImageLuma8(GrayImage::from_raw(width, height, samples)?)
        }
        b"DeviceRGB" => DynamicImage::ImageRgb8(RgbImage::from_raw(
            width,
            height,
            data.get(..pixels * 3)?.to_vec(),
        )?),
        _ => return None,
    };

    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .ok()?;
    Some(png)
}

/// Spans joined line by line, top to bottom.
fn join_spans(spans: &[TextSpan]) -> String {
    let mut out = String::new();
    let mut last_y: Option<f32> = None;
    for span in spans {
        match last_y {
            Some(y) if (y - span.y).abs() < span.font_size * 0.5 => out.push(' '),
            Some(_) => out.push('\n'),
            None => {}
        }
        out.push_str(&span.text);
        last_y = Some(span.y);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    #[test]
    fn test_rejects_non_pdf() {
        assert!(matches!(
            LopdfSource::from_bytes(b"not a pdf at all"),
            Err(Error::UnknownFormat)
        ));
    }

    #[test]
    fn test_jpeg_kept_verbatim() {
        let stream = Stream::new(
            dictionary! { "Subtype" => "Image", "Filter" => "DCTDecode" },
            vec![0xFF, 0xD8, 0xFF, 0xE0],
        );
        let image = image_from_stream(&stream, 700.0);
        assert_eq!(image.format, "jpg");
        assert_eq!(image.data, vec![0xFF, 0xD8, 0xFF, 0xE0]);
        assert_eq!(image.y, 700.0);
    }

    #[test]
    fn test_gray_samples_become_png() {
        let stream = Stream::new(
            dictionary! {
                "Subtype" => "Image",
                "Width" => 2,
                "Height" => 2,
                "BitsPerComponent" => 8,
                "ColorSpace" => "DeviceGray",
            },
            vec![0, 64, 128, 255],
        );
        let image = image_from_stream(&stream, 10.0);
        assert_eq!(image.format, "png");
        let decoded = image::load_from_memory(&image.data).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (2, 2));
    }

    #[test]
    fn test_unknown_samples_stay_raw() {
        let stream = Stream::new(
            dictionary! {
                "Subtype" => "Image",
                "Width" => 2,
                "Height" => 2,
                "BitsPerComponent" => 1,
            },
            vec![0b1010_0000, 0b0101_0000],
        );
        assert_eq!(image_from_stream(&stream, 0.0).format, "raw");
    }

    #[test]
    fn test_join_spans() {
        let spans = vec![
            TextSpan::new("Hello", 72.0, 700.0, 12.0),
            TextSpan::new("World", 120.0, 700.0, 12.0),
            TextSpan::new("Next", 72.0, 680.0, 12.0),
        ];
        assert_eq!(join_spans(&spans), "Hello World\nNext");
    }
}
