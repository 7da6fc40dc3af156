//! Alignment and axis tests over line endpoints.

use crate::model::Point;

/// Default tolerance for alignment and axis tests, in document units.
pub const DEFAULT_TOLERANCE: f32 = 2.0;

/// A line segment as a pair of endpoints.
pub type Segment = (Point, Point);

/// Orientation of an axis-aligned segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Check whether two segments sit on the same horizontal or vertical band.
///
/// Corresponding endpoints are compared: the segments are aligned when both
/// y differences are below `tolerance`, or both x differences are.
pub fn alignment(a: Segment, b: Segment, tolerance: f32) -> bool {
    let (a0, a1) = a;
    let (b0, b1) = b;

    let horizontal = (a0.y - b0.y).abs() < tolerance && (a1.y - b1.y).abs() < tolerance;
    let vertical = (a0.x - b0.x).abs() < tolerance && (a1.x - b1.x).abs() < tolerance;

    horizontal || vertical
}

/// Check whether a segment is horizontal within `tolerance`.
pub fn is_horizontal(line: Segment, tolerance: f32) -> bool {
    (line.0.y - line.1.y).abs() < tolerance
}

/// Check whether a segment is vertical within `tolerance`.
pub fn is_vertical(line: Segment, tolerance: f32) -> bool {
    (line.0.x - line.1.x).abs() < tolerance
}

/// Classify a segment by axis; diagonal segments have none.
///
/// A degenerate segment satisfies both tests and reports `Horizontal`.
pub fn axis_of(line: Segment, tolerance: f32) -> Option<Axis> {
    if is_horizontal(line, tolerance) {
        Some(Axis::Horizontal)
    } else if is_vertical(line, tolerance) {
        Some(Axis::Vertical)
    } else {
        None
    }
}

/// Flip a y coordinate between bottom-left and top-left origins.
///
/// The transform is its own inverse for a fixed page height.
pub fn flip_y(y: f32, page_height: f32) -> f32 {
    page_height - y
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(x0: f32, y0: f32, x1: f32, y1: f32) -> Segment {
        (Point::new(x0, y0), Point::new(x1, y1))
    }

    #[test]
    fn test_alignment_horizontal_band() {
        let a = seg(0.0, 10.0, 100.0, 10.0);
        let b = seg(200.0, 11.0, 300.0, 11.5);
        assert!(alignment(a, b, DEFAULT_TOLERANCE));
    }

    #[test]
    fn test_alignment_vertical_band() {
        // Same x extents, different heights
        let a = seg(0.0, 0.0, 100.0, 0.0);
        let b = seg(0.0, 30.0, 100.0, 30.0);
        assert!(alignment(a, b, DEFAULT_TOLERANCE));
    }

    #[test]
    fn test_alignment_tolerance_is_strict() {
        let a = seg(0.0, 0.0, 10.0, 0.0);
        let b = seg(50.0, 2.0, 60.0, 2.0);
        assert!(!alignment(a, b, 2.0));
        assert!(alignment(a, b, 2.1));
    }

    #[test]
    fn test_alignment_is_symmetric() {
        let lines = [
            seg(0.0, 0.0, 100.0, 0.0),
            seg(0.0, 1.5, 100.0, 1.0),
            seg(5.0, 0.0, 5.0, 80.0),
            seg(6.0, 10.0, 6.5, 90.0),
            seg(0.0, 0.0, 40.0, 40.0),
            seg(100.0, 3.0, 0.0, 3.0),
        ];
        for a in lines {
            for b in lines {
                assert_eq!(
                    alignment(a, b, DEFAULT_TOLERANCE),
                    alignment(b, a, DEFAULT_TOLERANCE)
                );
            }
        }
    }

    #[test]
    fn test_axis_of() {
        assert_eq!(
            axis_of(seg(0.0, 5.0, 100.0, 6.0), DEFAULT_TOLERANCE),
            Some(Axis::Horizontal)
        );
        assert_eq!(
            axis_of(seg(5.0, 0.0, 6.0, 100.0), DEFAULT_TOLERANCE),
            Some(Axis::Vertical)
        );
        assert_eq!(axis_of(seg(0.0, 0.0, 50.0, 50.0), DEFAULT_TOLERANCE), None);
    }

    #[test]
    fn test_degenerate_segment_is_both() {
        let dot = seg(3.0, 3.0, 3.5, 3.5);
        assert!(is_horizontal(dot, DEFAULT_TOLERANCE));
        assert!(is_vertical(dot, DEFAULT_TOLERANCE));
        assert_eq!(axis_of(dot, DEFAULT_TOLERANCE), Some(Axis::Horizontal));
    }

    #[test]
    fn test_flip_round_trip() {
        let height = 792.0;
        for &(x, y) in &[(0.0f32, 0.0f32), (12.5, 700.25), (612.0, 792.0), (3.0, -4.0)] {
            let flipped = flip_y(y, height);
            assert_eq!((x, flip_y(flipped, height)), (x, y));
        }
    }
}
