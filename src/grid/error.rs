use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum GridError {
    #[error("survey contains no points")]
    EmptySurvey,

    #[error("coordinate arrays differ in length (x: {x}, y: {y}, z: {z})")]
    LengthMismatch { x: usize, y: usize, z: usize },

    #[error("non-finite {axis} coordinate at point {index}")]
    NonFinite { axis: Axis, index: usize },

    #[error("need at least 2 distinct {axis} values to infer spacing, found {found}")]
    DegenerateAxis { axis: Axis, found: usize },

    #[error("invalid {axis} grid spacing {spacing}")]
    InvalidSpacing { axis: Axis, spacing: f64 },

    #[error("spacing dx = {dx}, dy = {dy} needs more than {limit} template cells")]
    TemplateTooLarge { dx: f64, dy: f64, limit: usize },

    #[error("{points} points cannot be reshaped to {rows} rows x {cols} columns")]
    ShapeMismatch {
        points: usize,
        rows: usize,
        cols: usize,
    },

    #[error("point {index} breaks the row-major scan order of the survey")]
    ScanOrder { index: usize },

    #[error(
        "the overlap between grid nodes and template grid nodes is short: {found} {axis} lines (need 3)"
    )]
    InsufficientOverlap { axis: Axis, found: usize },

    #[error("{axis} value {value} does not fit onto the template grid lines")]
    OffLattice { axis: Axis, value: f64 },

    #[error("{axis} values {first} and {second} snap to the same template grid line")]
    Collision { axis: Axis, first: f64, second: f64 },

    #[error("survey extends past the template grid: {overlap} of {native} {axis} lines fit")]
    ExtentMismatch {
        axis: Axis,
        native: usize,
        overlap: usize,
    },
}
