//! Content stream interpreter.
//!
//! Tracks the graphics state stack and the current path, and turns painting
//! operators into [`DrawingItem`]s, `Do` invocations into image placements and
//! text showing operators into positioned spans. All coordinates are page
//! space with the origin at the bottom-left.

use std::collections::HashMap;

use crate::model::{DrawingItem, DrawingKind, FillColor, Point, Primitive};

use super::backend::{decode_text_simple, ContentOp, PdfValue};

const AXIS_EPSILON: f32 = 1e-6;

/// TJ adjustments beyond this (thousandths of text space) become a space.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Average glyph advance as a fraction of font size.
const GLYPH_ADVANCE: f32 = 0.5;

/// An affine transform `[a b c d e f]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }
}

impl Matrix {
    pub fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub fn translation(tx: f32, ty: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    fn from_slice(v: &[f32]) -> Self {
        Self::new(v[0], v[1], v[2], v[3], v[4], v[5])
    }

    /// `self × other`: apply `self`, then `other`.
    pub fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    /// Transform a point.
    pub fn apply(&self, x: f32, y: f32) -> Point {
        Point::new(
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    fn is_axis_aligned(&self) -> bool {
        self.b.abs() < AXIS_EPSILON && self.c.abs() < AXIS_EPSILON
    }

    fn vertical_scale(&self) -> f32 {
        (self.b * self.b + self.d * self.d).sqrt()
    }
}

/// An image XObject invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePlacement {
    /// XObject resource name
    pub name: Vec<u8>,
    /// Top edge of the placement in page space
    pub top: f32,
}

/// A run of text at a position.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    pub text: String,
    /// Left edge
    pub x: f32,
    /// Baseline
    pub y: f32,
    /// Estimated width
    pub width: f32,
    pub font_size: f32,
}

impl TextSpan {
    pub fn new(text: impl Into<String>, x: f32, y: f32, font_size: f32) -> Self {
        let text = text.into();
        let width = text.chars().count() as f32 * font_size * GLYPH_ADVANCE;
        Self {
            text,
            x,
            y,
            width,
            font_size,
        }
    }
}

/// Everything the interpreter collected from one page.
#[derive(Debug, Clone, Default)]
pub struct PageGraphics {
    pub drawings: Vec<DrawingItem>,
    pub placements: Vec<ImagePlacement>,
    pub spans: Vec<TextSpan>,
}

/// Decodes string operands of text showing operators.
pub trait TextDecoder {
    /// Decode `bytes` shown with font resource `font`.
    fn decode(&self, font: &[u8], bytes: &[u8]) -> String;
}

/// Decoder that ignores fonts.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleDecoder;

impl TextDecoder for SimpleDecoder {
    fn decode(&self, _font: &[u8], bytes: &[u8]) -> String {
        decode_text_simple(bytes)
    }
}

#[derive(Debug, Clone)]
struct GraphicsState {
    ctm: Matrix,
    fill: FillColor,
    fill_alpha: f32,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: Matrix::default(),
            fill: FillColor::black(),
            fill_alpha: 1.0,
        }
    }
}

#[derive(Debug, Default)]
struct PathBuilder {
    primitives: Vec<Primitive>,
    current: Option<Point>,
    start: Option<Point>,
}

impl PathBuilder {
    fn move_to(&mut self, p: Point) {
        self.current = Some(p);
        self.start = Some(p);
    }

    fn line_to(&mut self, p: Point) {
        match self.current {
            Some(from) => self.primitives.push(Primitive::line(from, p)),
            None => log::debug!("lineto without current point; treated as moveto"),
        }
        self.current = Some(p);
        if self.start.is_none() {
            self.start = Some(p);
        }
    }

    fn curve_to(&mut self, ctrl1: Option<Point>, ctrl2: Option<Point>, end: Point) {
        let Some(from) = self.current else {
            log::debug!("curveto without current point; skipped");
            self.move_to(end);
            return;
        };
        self.primitives.push(Primitive::Curve {
            p0: from,
            ctrl1: ctrl1.unwrap_or(from),
            ctrl2: ctrl2.unwrap_or(end),
            p1: end,
        });
        self.current = Some(end);
    }

    fn close(&mut self) {
        if let (Some(current), Some(start)) = (self.current, self.start) {
            if current != start {
                self.primitives.push(Primitive::line(current, start));
            }
            self.current = Some(start);
        }
    }

    fn take(&mut self) -> Vec<Primitive> {
        self.current = None;
        self.start = None;
        std::mem::take(&mut self.primitives)
    }
}

#[derive(Debug, Clone)]
struct TextState {
    tm: Matrix,
    tlm: Matrix,
    font: Vec<u8>,
    font_size: f32,
    leading: Option<f32>,
    in_text: bool,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            tm: Matrix::default(),
            tlm: Matrix::default(),
            font: Vec::new(),
            font_size: 12.0,
            leading: None,
            in_text: false,
        }
    }
}

impl TextState {
    fn move_line(&mut self, tx: f32, ty: f32) {
        self.tlm = Matrix::translation(tx, ty).multiply(&self.tlm);
        self.tm = self.tlm;
    }

    fn next_line(&mut self) {
        let leading = self.leading.unwrap_or(self.font_size * 1.2);
        self.move_line(0.0, -leading);
    }

    fn advance(&mut self, chars: usize) {
        let tx = chars as f32 * self.font_size * GLYPH_ADVANCE;
        self.tm = Matrix::translation(tx, 0.0).multiply(&self.tm);
    }
}

/// Interprets a page's content operations.
pub struct ContentInterpreter<'r> {
    fill_alpha: HashMap<Vec<u8>, f32>,
    decoder: &'r dyn TextDecoder,
}

impl Default for ContentInterpreter<'_> {
    fn default() -> Self {
        Self {
            fill_alpha: HashMap::new(),
            decoder: &SimpleDecoder,
        }
    }
}

impl<'r> ContentInterpreter<'r> {
    /// Create an interpreter with no page resources.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the `/ca` values of the page's ExtGState resources.
    pub fn with_fill_alpha(mut self, fill_alpha: HashMap<Vec<u8>, f32>) -> Self {
        self.fill_alpha = fill_alpha;
        self
    }

    /// Set the decoder used for text strings.
    pub fn with_decoder(mut self, decoder: &'r dyn TextDecoder) -> Self {
        self.decoder = decoder;
        self
    }

    /// Run the operations and collect drawings, placements and spans.
    pub fn run(&self, ops: &[ContentOp]) -> PageGraphics {
        let mut out = PageGraphics::default();
        let mut state = GraphicsState::default();
        let mut stack: Vec<GraphicsState> = Vec::new();
        let mut path = PathBuilder::default();
        let mut text = TextState::default();

        for op in ops {
            match op.operator.as_str() {
                // Graphics state
                "q" => stack.push(state.clone()),
                "Q" => match stack.pop() {
                    Some(saved) => state = saved,
                    None => log::debug!("Q with empty graphics state stack"),
                },
                "cm" => {
                    if let Some(v) = numbers(op, 6) {
                        state.ctm = Matrix::from_slice(&v).multiply(&state.ctm);
                    }
                }
                "gs" => {
                    if let Some(alpha) = op
                        .operands
                        .first()
                        .and_then(PdfValue::as_name)
                        .and_then(|name| self.fill_alpha.get(name))
                    {
                        state.fill_alpha = *alpha;
                    }
                }

                // Fill color
                "g" => {
                    if let Some(v) = numbers(op, 1) {
                        state.fill = FillColor::new(v[0], v[0], v[0]);
                    }
                }
                "rg" => {
                    if let Some(v) = numbers(op, 3) {
                        state.fill = FillColor::new(v[0], v[1], v[2]);
                    }
                }
                "k" => {
                    if let Some(v) = numbers(op, 4) {
                        state.fill = cmyk_to_rgb(v[0], v[1], v[2], v[3]);
                    }
                }
                "sc" | "scn" => {
                    let v: Vec<f32> = op.operands.iter().filter_map(PdfValue::as_number).collect();
                    match v.len() {
                        1 => state.fill = FillColor::new(v[0], v[0], v[0]),
                        3 => state.fill = FillColor::new(v[0], v[1], v[2]),
                        4 => state.fill = cmyk_to_rgb(v[0], v[1], v[2], v[3]),
                        _ => {}
                    }
                }

                // Path construction
                "m" => {
                    if let Some(v) = numbers(op, 2) {
                        path.move_to(state.ctm.apply(v[0], v[1]));
                    }
                }
                "l" => {
                    if let Some(v) = numbers(op, 2) {
                        path.line_to(state.ctm.apply(v[0], v[1]));
                    }
                }
                "c" => {
                    if let Some(v) = numbers(op, 6) {
                        let ctm = &state.ctm;
                        path.curve_to(
                            Some(ctm.apply(v[0], v[1])),
                            Some(ctm.apply(v[2], v[3])),
                            ctm.apply(v[4], v[5]),
                        );
                    }
                }
                "v" => {
                    if let Some(v) = numbers(op, 4) {
                        let ctm = &state.ctm;
                        path.curve_to(None, Some(ctm.apply(v[0], v[1])), ctm.apply(v[2], v[3]));
                    }
                }
                "y" => {
                    if let Some(v) = numbers(op, 4) {
                        let ctm = &state.ctm;
                        path.curve_to(Some(ctm.apply(v[0], v[1])), None, ctm.apply(v[2], v[3]));
                    }
                }
                "re" => {
                    if let Some(v) = numbers(op, 4) {
                        append_rect(&mut path, &state.ctm, v[0], v[1], v[2], v[3]);
                    }
                }
                "h" => path.close(),

                // Path painting
                "S" => paint(&mut out, &mut path, &state, DrawingKind::Stroke),
                "s" => {
                    path.close();
                    paint(&mut out, &mut path, &state, DrawingKind::Stroke);
                }
                "f" | "F" | "f*" => paint(&mut out, &mut path, &state, DrawingKind::Fill),
                "B" | "B*" => paint(&mut out, &mut path, &state, DrawingKind::FillStroke),
                "b" | "b*" => {
                    path.close();
                    paint(&mut out, &mut path, &state, DrawingKind::FillStroke);
                }
                "n" => {
                    path.take();
                }

                // XObjects
                "Do" => match op.operands.first().and_then(PdfValue::as_name) {
                    Some(name) => out.placements.push(ImagePlacement {
                        name: name.to_vec(),
                        top: placement_top(&state.ctm),
                    }),
                    None => log::debug!("Do without a name operand; skipped"),
                },

                // Text
                "BT" => {
                    text.in_text = true;
                    text.tm = Matrix::default();
                    text.tlm = Matrix::default();
                }
                "ET" => text.in_text = false,
                "Tf" => {
                    if op.operands.len() >= 2 {
                        if let Some(name) = op.operands[0].as_name() {
                            text.font = name.to_vec();
                        }
                        text.font_size = op.operands[1].as_number().unwrap_or(12.0);
                    } else {
                        log::debug!("Tf with {} operands; skipped", op.operands.len());
                    }
                }
                "TL" => {
                    if let Some(v) = numbers(op, 1) {
                        text.leading = Some(v[0]);
                    }
                }
                "Td" => {
                    if let Some(v) = numbers(op, 2) {
                        text.move_line(v[0], v[1]);
                    }
                }
                "TD" => {
                    if let Some(v) = numbers(op, 2) {
                        text.leading = Some(-v[1]);
                        text.move_line(v[0], v[1]);
                    }
                }
                "Tm" => {
                    if let Some(v) = numbers(op, 6) {
                        text.tlm = Matrix::from_slice(&v);
                        text.tm = text.tlm;
                    }
                }
                "T*" => text.next_line(),
                "Tj" => {
                    if let Some(PdfValue::Str(bytes)) = op.operands.first() {
                        let s = self.decoder.decode(&text.font, bytes);
                        self.show(&mut out, &mut text, &state, s);
                    }
                }
                "TJ" => {
                    if let Some(PdfValue::Array(items)) = op.operands.first() {
                        let s = self.decode_tj(&text.font, items);
                        self.show(&mut out, &mut text, &state, s);
                    }
                }
                "'" | "\"" => {
                    text.next_line();
                    if let Some(PdfValue::Str(bytes)) = op.operands.last() {
                        let s = self.decoder.decode(&text.font, bytes);
                        self.show(&mut out, &mut text, &state, s);
                    }
                }
                _ => {}
            }
        }

        if !path.primitives.is_empty() {
            log::debug!(
                "{} path primitives never painted; discarded",
                path.primitives.len()
            );
        }

        out
    }

    fn decode_tj(&self, font: &[u8], items: &[PdfValue]) -> String {
        let mut combined = String::new();
        for item in items {
            match item {
                PdfValue::Str(bytes) => combined.push_str(&self.decoder.decode(font, bytes)),
                other => {
                    let Some(n) = other.as_number() else { continue };
                    // Negative adjustments move right; large ones are word gaps
                    if -n > TJ_SPACE_THRESHOLD
                        && combined
                            .chars()
                            .last()
                            .is_some_and(|c| !c.is_whitespace() && !is_spaceless_script_char(c))
                    {
                        combined.push(' ');
                    }
                }
            }
        }
        combined
    }

    fn show(&self, out: &mut PageGraphics, text: &mut TextState, state: &GraphicsState, s: String) {
        if !text.in_text {
            log::debug!("text shown outside BT/ET; skipped");
            return;
        }
        let chars = s.chars().count();
        if !s.trim().is_empty() {
            let trm = text.tm.multiply(&state.ctm);
            let origin = trm.apply(0.0, 0.0);
            let size = text.font_size * trm.vertical_scale();
            out.spans.push(TextSpan::new(s, origin.x, origin.y, size));
        }
        text.advance(chars);
    }
}

fn numbers(op: &ContentOp, n: usize) -> Option<Vec<f32>> {
    let values = op.numbers(n);
    if values.is_none() {
        log::debug!(
            "operator {} expects {} numeric operands, got {:?}; skipped",
            op.operator,
            n,
            op.operands
        );
    }
    values
}

fn paint(out: &mut PageGraphics, path: &mut PathBuilder, state: &GraphicsState, kind: DrawingKind) {
    let primitives = path.take();
    if primitives.is_empty() {
        return;
    }
    let mut item = DrawingItem::new(kind, primitives);
    if kind.has_fill() {
        item = item.with_fill(state.fill).with_opacity(state.fill_alpha);
    }
    out.drawings.push(item);
}

fn append_rect(path: &mut PathBuilder, ctm: &Matrix, x: f32, y: f32, w: f32, h: f32) {
    let corners = [
        ctm.apply(x, y),
        ctm.apply(x + w, y),
        ctm.apply(x + w, y + h),
        ctm.apply(x, y + h),
    ];

    if ctm.is_axis_aligned() {
        let min_x = corners.iter().map(|p| p.x).fold(f32::INFINITY, f32::min);
        let max_x = corners.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max);
        let min_y = corners.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
        let max_y = corners.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max);
        path.primitives
            .push(Primitive::rect(min_x, min_y, max_x - min_x, max_y - min_y));
    } else {
        // Rotated or skewed: keep the outline as lines
        for i in 0..4 {
            path.primitives
                .push(Primitive::line(corners[i], corners[(i + 1) % 4]));
        }
    }
    path.move_to(corners[0]);
}

/// Top edge of the unit square under `ctm`.
fn placement_top(ctm: &Matrix) -> f32 {
    [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)]
        .iter()
        .map(|&(x, y)| ctm.apply(x, y).y)
        .fold(f32::NEG_INFINITY, f32::max)
}

/// Naive CMYK conversion, no color management.
fn cmyk_to_rgb(c: f32, m: f32, y: f32, k: f32) -> FillColor {
    FillColor::new((1.0 - c) * (1.0 - k), (1.0 - m) * (1.0 - k), (1.0 - y) * (1.0 - k))
}

/// Scripts written without spaces between words (Chinese, Japanese kana).
fn is_spaceless_script_char(c: char) -> bool {
    matches!(c as u32,
        0x4E00..=0x9FFF
        | 0x3400..=0x4DBF
        | 0x20000..=0x2EBEF
        | 0x3040..=0x30FF
        | 0x3000..=0x303F)
}
