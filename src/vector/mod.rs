//! Vector graphics analysis: line geometry and grid classification.

mod classify;
pub mod geometry;

pub use classify::{
    Classification, ClassifiedGroup, ClassifierConfig, GridClassifier, GroupKind,
};
pub use geometry::{alignment, axis_of, flip_y, Axis, Segment, DEFAULT_TOLERANCE};
