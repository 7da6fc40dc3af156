//! SVG rendering of classified drawing items.
//!
//! Document space has its origin at the bottom-left; SVG at the top-left, so
//! every y coordinate is flipped against the page height.

use std::fmt::Write as _;

use crate::model::{DrawingItem, FillColor, Point, Primitive};
use crate::vector::flip_y;

/// A rendered, self-contained SVG document.
#[derive(Debug, Clone, PartialEq)]
pub struct SvgDocument {
    /// SVG markup
    pub content: String,

    /// Number of emitted `<path>` and `<rect>` elements
    pub element_count: usize,
}

/// Renders drawing items to SVG, suppressing near-empty output.
#[derive(Debug, Clone, Default)]
pub struct SvgRenderer {
    min_elements: usize,
}

impl SvgRenderer {
    /// Create a renderer with the gate disabled (any non-empty output passes).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum element count below which nothing is produced.
    pub fn with_min_elements(mut self, min_elements: usize) -> Self {
        self.min_elements = min_elements;
        self
    }

    /// Render items onto a `width` x `height` canvas.
    ///
    /// Returns `None` when fewer elements than the gate requires (and always
    /// when nothing at all was emitted).
    pub fn render<'a, I>(&self, items: I, width: f32, height: f32) -> Option<SvgDocument>
    where
        I: IntoIterator<Item = &'a DrawingItem>,
    {
        let mut lines = vec![format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = width,
            h = height
        )];
        let mut element_count = 0;

        for item in items {
            let mut path_data: Vec<String> = Vec::new();

            for primitive in &item.primitives {
                match *primitive {
                    Primitive::Line { p0, p1 } => {
                        let (a, b) = (flip(p0, height), flip(p1, height));
                        path_data.push(format!("M{} {} L{} {}", a.x, a.y, b.x, b.y));
                    }
                    Primitive::Curve {
                        p0,
                        ctrl1,
                        ctrl2,
                        p1,
                    } => {
                        let [a, c1, c2, b] = [p0, ctrl1, ctrl2, p1].map(|p| flip(p, height));
                        path_data.push(format!(
                            "M{} {} C{} {}, {} {}, {} {}",
                            a.x, a.y, c1.x, c1.y, c2.x, c2.y, b.x, b.y
                        ));
                    }
                    Primitive::Rect {
                        x,
                        y,
                        width: w,
                        height: h,
                    } => {
                        lines.push(rect_element(item, x, y, w, h, height));
                        element_count += 1;
                    }
                }
            }

            if !path_data.is_empty() {
                lines.push(format!(
                    r#"<path d="{}" stroke="black" fill="none" />"#,
                    path_data.join(" ")
                ));
                element_count += 1;
            }
        }

        if element_count == 0 || element_count < self.min_elements {
            log::debug!(
                "SvgRenderer: {} elements, below gate of {}; nothing rendered",
                element_count,
                self.min_elements.max(1)
            );
            return None;
        }

        lines.push("</svg>".to_string());
        Some(SvgDocument {
            content: lines.join("\n"),
            element_count,
        })
    }
}

fn flip(p: Point, page_height: f32) -> Point {
    Point::new(p.x, flip_y(p.y, page_height))
}

fn rect_element(item: &DrawingItem, x: f32, y: f32, w: f32, h: f32, page_height: f32) -> String {
    let (r, g, b) = item.fill.unwrap_or_else(FillColor::black).to_rgb8();
    let mut out = String::new();
    let _ = write!(
        out,
        r#"<rect x="{}" y="{}" width="{}" height="{}" fill="rgb({}, {}, {})" fill-opacity="{}" />"#,
        x,
        flip_y(y + h, page_height),
        w,
        h,
        r,
        g,
        b,
        item.fill_opacity
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DrawingKind;

    fn hline(y: f32) -> DrawingItem {
        DrawingItem::stroke(vec![Primitive::line(
            Point::new(0.0, y),
            Point::new(100.0, y),
        )])
    }

    #[test]
    fn test_line_is_flipped() {
        let svg = SvgRenderer::new().render(&[hline(10.0)], 200.0, 100.0).unwrap();
        assert!(svg.content.contains(r#"d="M0 90 L100 90""#));
        let header = concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" "#,
            r#"width="200" height="100" viewBox="0 0 200 100">"#,
        );
        assert!(svg.content.starts_with(header));
        assert!(svg.content.ends_with("</svg>"));
        assert_eq!(svg.element_count, 1);
    }

    #[test]
    fn test_one_path_per_item() {
        let item = DrawingItem::stroke(vec![
            Primitive::line(Point::new(0.0, 0.0), Point::new(10.0, 0.0)),
            Primitive::line(Point::new(10.0, 0.0), Point::new(10.0, 10.0)),
        ]);
        let svg = SvgRenderer::new().render(&[item], 20.0, 20.0).unwrap();
        assert_eq!(svg.content.matches("<path").count(), 1);
        assert!(svg.content.contains("M0 20 L10 20 M10 20 L10 10"));
    }

    #[test]
    fn test_curve_command() {
        let item = DrawingItem::stroke(vec![Primitive::Curve {
            p0: Point::new(0.0, 0.0),
            ctrl1: Point::new(1.0, 5.0),
            ctrl2: Point::new(2.0, 5.0),
            p1: Point::new(3.0, 0.0),
        }]);
        let svg = SvgRenderer::new().render(&[item], 10.0, 10.0).unwrap();
        assert!(svg.content.contains("M0 10 C1 5, 2 5, 3 10"));
    }

    #[test]
    fn test_rect_element() {
        let item = DrawingItem::filled(
            vec![Primitive::rect(10.0, 20.0, 30.0, 40.0)],
            FillColor::new(1.0, 0.0, 0.5),
        )
        .with_opacity(0.5);
        let svg = SvgRenderer::new().render(&[item], 100.0, 100.0).unwrap();
        let expected = concat!(
            r#"<rect x="10" y="40" width="30" height="40" "#,
            r#"fill="rgb(255, 0, 128)" fill-opacity="0.5" />"#,
        );
        assert!(svg.content.contains(expected));
        // A rect-only item emits no path
        assert_eq!(svg.content.matches("<path").count(), 0);
        assert_eq!(svg.element_count, 1);
    }

    #[test]
    fn test_rect_without_fill_is_black() {
        let item = DrawingItem::new(DrawingKind::Stroke, vec![Primitive::rect(0.0, 0.0, 1.0, 1.0)]);
        let svg = SvgRenderer::new().render(&[item], 10.0, 10.0).unwrap();
        assert!(svg.content.contains(r#"fill="rgb(0, 0, 0)" fill-opacity="1""#));
    }

    #[test]
    fn test_empty_input_renders_nothing() {
        assert!(SvgRenderer::new()
            .render(std::iter::empty(), 10.0, 10.0)
            .is_none());
        let empty_item = DrawingItem::stroke(vec![]);
        assert!(SvgRenderer::new().render(&[empty_item], 10.0, 10.0).is_none());
    }

    #[test]
    fn test_min_elements_gate() {
        let items: Vec<_> = (0..4).map(|i| hline(i as f32)).collect();
        let strict = SvgRenderer::new().with_min_elements(5);
        assert!(strict.render(&items, 100.0, 100.0).is_none());

        let lenient = SvgRenderer::new().with_min_elements(4);
        assert_eq!(lenient.render(&items, 100.0, 100.0).unwrap().element_count, 4);
    }
}
