//! Drawing primitives and drawing items.

use serde::{Deserialize, Serialize};

/// A point in document space (origin bottom-left, y grows upward).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    /// Create a new point.
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One atomic vector shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Primitive {
    /// Straight segment between two points.
    Line { p0: Point, p1: Point },

    /// Cubic Bezier curve.
    Curve {
        p0: Point,
        ctrl1: Point,
        ctrl2: Point,
        p1: Point,
    },

    /// Axis-aligned rectangle; `(x, y)` is the bottom-left corner.
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
}

impl Primitive {
    /// Create a line primitive.
    pub fn line(p0: Point, p1: Point) -> Self {
        Primitive::Line { p0, p1 }
    }

    /// Create a curve from a point list.
    ///
    /// Returns `None` unless exactly four points are given.
    pub fn curve_from_points(points: &[Point]) -> Option<Self> {
        match points {
            [p0, ctrl1, ctrl2, p1] => Some(Primitive::Curve {
                p0: *p0,
                ctrl1: *ctrl1,
                ctrl2: *ctrl2,
                p1: *p1,
            }),
            _ => None,
        }
    }

    /// Create a rectangle primitive.
    pub fn rect(x: f32, y: f32, width: f32, height: f32) -> Self {
        Primitive::Rect {
            x,
            y,
            width,
            height,
        }
    }

    /// Check if this primitive is a line.
    pub fn is_line(&self) -> bool {
        matches!(self, Primitive::Line { .. })
    }

    /// Return the endpoints if this primitive is a line.
    pub fn as_line(&self) -> Option<(Point, Point)> {
        match self {
            Primitive::Line { p0, p1 } => Some((*p0, *p1)),
            _ => None,
        }
    }
}

/// How a drawing item was painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawingKind {
    /// Stroked outline
    #[default]
    Stroke,
    /// Filled area
    Fill,
    /// Filled and stroked
    FillStroke,
}

impl DrawingKind {
    /// Check if the item carries a fill.
    pub fn has_fill(&self) -> bool {
        matches!(self, DrawingKind::Fill | DrawingKind::FillStroke)
    }
}

/// RGB fill color with normalized (0.0-1.0) components.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FillColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl FillColor {
    /// Create a new color.
    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Black.
    pub fn black() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Components scaled to 0-255.
    pub fn to_rgb8(&self) -> (u8, u8, u8) {
        (scale_channel(self.r), scale_channel(self.g), scale_channel(self.b))
    }
}

fn scale_channel(c: f32) -> u8 {
    (c * 255.0).round().clamp(0.0, 255.0) as u8
}

/// A painted path: a kind, its primitives and optional fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawingItem {
    /// Painting kind
    pub kind: DrawingKind,

    /// Primitives in path order
    pub primitives: Vec<Primitive>,

    /// Fill color, if the item is filled
    pub fill: Option<FillColor>,

    /// Fill opacity (0.0-1.0)
    pub fill_opacity: f32,
}

impl DrawingItem {
    /// Create a new item with no fill.
    pub fn new(kind: DrawingKind, primitives: Vec<Primitive>) -> Self {
        Self {
            kind,
            primitives,
            fill: None,
            fill_opacity: 1.0,
        }
    }

    /// Create a stroked item.
    pub fn stroke(primitives: Vec<Primitive>) -> Self {
        Self::new(DrawingKind::Stroke, primitives)
    }

    /// Create a filled item.
    pub fn filled(primitives: Vec<Primitive>, color: FillColor) -> Self {
        Self::new(DrawingKind::Fill, primitives).with_fill(color)
    }

    /// Set the fill color.
    pub fn with_fill(mut self, color: FillColor) -> Self {
        self.fill = Some(color);
        self
    }

    /// Set the fill opacity.
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.fill_opacity = opacity;
        self
    }

    /// Iterate over the line primitives of this item.
    pub fn lines(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        self.primitives.iter().filter_map(Primitive::as_line)
    }

    /// Check if the item owns at least one line primitive.
    pub fn has_lines(&self) -> bool {
        self.primitives.iter().any(Primitive::is_line)
    }

    /// Check if the item has no primitives.
    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }
}
