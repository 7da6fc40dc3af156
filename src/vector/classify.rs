//! Grid classification of a page's drawing items.
//!
//! A page is "grid-bearing" when its axis-aligned lines show enough mutual
//! alignment to look like a table wireframe. On such a page every item that
//! owns a line goes to the structural group; everything else is illustration.

use serde::{Deserialize, Serialize};

use crate::model::DrawingItem;

use super::geometry::{alignment, is_horizontal, is_vertical, Segment, DEFAULT_TOLERANCE};

/// Which side of the partition a group is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKind {
    /// Table wireframe lines
    Structural,
    /// Free-form vector art
    Illustrative,
}

/// An ordered set of item indices into a page's drawing list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedGroup {
    pub kind: GroupKind,
    pub indices: Vec<usize>,
}

impl ClassifiedGroup {
    fn new(kind: GroupKind) -> Self {
        Self {
            kind,
            indices: Vec::new(),
        }
    }

    /// Resolve the indices against the page's items.
    pub fn items<'a>(&'a self, all: &'a [DrawingItem]) -> impl Iterator<Item = &'a DrawingItem> {
        self.indices.iter().filter_map(move |&i| all.get(i))
    }

    /// Number of items in the group.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Check if the group is empty.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Result of classifying one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Whether the grid predicate fired
    pub grid_bearing: bool,
    pub structural: ClassifiedGroup,
    pub illustrative: ClassifiedGroup,
}

/// Grid classifier configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Minimum horizontal and vertical line count before alignment is tested
    pub min_lines: usize,
    /// Tolerance for axis and alignment tests (document units)
    pub tolerance: f32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            min_lines: 3,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

/// Partitions drawing items into structural and illustrative groups.
#[derive(Debug, Clone, Default)]
pub struct GridClassifier {
    config: ClassifierConfig,
}

impl GridClassifier {
    /// Create a classifier with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a classifier with custom configuration.
    pub fn with_config(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify a page's items.
    pub fn classify(&self, items: &[DrawingItem]) -> Classification {
        let lines: Vec<Segment> = items.iter().flat_map(DrawingItem::lines).collect();
        let grid_bearing = self.is_grid(&lines);

        let mut structural = ClassifiedGroup::new(GroupKind::Structural);
        let mut illustrative = ClassifiedGroup::new(GroupKind::Illustrative);

        for (index, item) in items.iter().enumerate() {
            if grid_bearing && item.has_lines() {
                structural.indices.push(index);
            } else {
                illustrative.indices.push(index);
            }
        }

        log::debug!(
            "GridClassifier: {} lines, grid_bearing={}, structural={}, illustrative={}",
            lines.len(),
            grid_bearing,
            structural.len(),
            illustrative.len()
        );

        Classification {
            grid_bearing,
            structural,
            illustrative,
        }
    }

    /// Grid predicate over a page's line segments.
    pub fn is_grid(&self, lines: &[Segment]) -> bool {
        let tolerance = self.config.tolerance;
        let horizontal: Vec<Segment> = lines
            .iter()
            .copied()
            .filter(|l| is_horizontal(*l, tolerance))
            .collect();
        let vertical: Vec<Segment> = lines
            .iter()
            .copied()
            .filter(|l| is_vertical(*l, tolerance))
            .collect();

        if horizontal.len() < self.config.min_lines || vertical.len() < self.config.min_lines {
            return false;
        }

        self.has_aligned_cluster(&horizontal) || self.has_aligned_cluster(&vertical)
    }

    /// True when some line aligns with more than one other line of the set.
    fn has_aligned_cluster(&self, lines: &[Segment]) -> bool {
        lines.iter().enumerate().any(|(i, line)| {
            let aligned = lines
                .iter()
                .enumerate()
                .filter(|(j, other)| *j != i && alignment(*line, **other, self.config.tolerance))
                .count();
            aligned > 1
        })
    }
}
