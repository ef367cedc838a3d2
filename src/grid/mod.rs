//! Placement of scattered survey grids onto the fixed archive template grid.
//!
//! A survey arrives as flat `(x, y, z)` columns in row-major scan order. Its distinct x and y
//! values define the native lattice; the template grid is built from the archive bounds at the
//! native spacing, the survey lattice is matched against the template lines and the elevations are
//! copied in. Every template cell also gets geographic and state plane coordinates.

use ndarray::{Array1, Array2};

use crate::metadata::SurveyMetadata;

pub mod error;
pub mod spacing;
pub mod template;

pub use error::{Axis, GridError};
pub use spacing::{linspace, max_spacing, median_spacing, unique_sorted};
pub use template::{GridTemplate, MAX_TEMPLATE_CELLS, Spacing};

/// Sub-rectangle of the template grid covered by a survey (inclusive index ranges).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlapRegion {
    pub first_x: usize,
    pub last_x: usize,
    pub first_y: usize,
    pub last_y: usize,
}

impl OverlapRegion {
    pub fn contains(&self, row: usize, col: usize) -> bool {
        (self.first_y..=self.last_y).contains(&row) && (self.first_x..=self.last_x).contains(&col)
    }

    pub fn shape(&self) -> (usize, usize) {
        (
            self.last_y - self.first_y + 1,
            self.last_x - self.first_x + 1,
        )
    }
}

/// Template-shaped survey product. All 2-D fields are `(y, x)` indexed.
#[derive(Debug, Clone)]
pub struct FilledGrid {
    pub x: Array1<f64>,
    pub y: Array1<f64>,
    pub elevation: Array2<f64>,
    pub lon: Array2<f64>,
    pub lat: Array2<f64>,
    pub easting: Array2<f64>,
    pub northing: Array2<f64>,
    pub overlap: OverlapRegion,
    pub fill_value: f64,
    /// Native resolution the template was built with.
    pub spacing: Spacing,
    pub metadata: SurveyMetadata,
}

impl FilledGrid {
    pub fn shape(&self) -> (usize, usize) {
        self.elevation.dim()
    }

    /// Number of cells that hold survey data.
    pub fn valid_cell_count(&self) -> usize {
        self.elevation
            .iter()
            .filter(|&&z| z != self.fill_value)
            .count()
    }
}
