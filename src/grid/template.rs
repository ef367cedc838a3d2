use ndarray::{Array1, Array2};
use serde::Deserialize;
use tracing::debug;

use super::spacing::{linspace, max_spacing, median_spacing, unique_sorted};
use super::{Axis, FilledGrid, GridError, OverlapRegion};
use crate::bbox::Bbox;
use crate::coords::{CoordinateSystem, Facility};
use crate::metadata::SurveyMetadata;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Spacing {
    pub dx: f64,
    pub dy: f64,
}

/// Fixed archive grid definition shared by every survey in a run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GridTemplate {
    pub bbox: Bbox,
    pub fill_value: f64,
    /// Largest distance (m) between a survey coordinate and a template line for the two to be
    /// treated as the same line. Zero requires exact equality.
    pub snap_tolerance: f64,
    /// Overrides the spacing inferred from the survey.
    pub spacing: Option<Spacing>,
}

impl Default for GridTemplate {
    fn default() -> Self {
        Self {
            bbox: Bbox::frf_archive(),
            fill_value: -999.0,
            snap_tolerance: 1e-6,
            spacing: None,
        }
    }
}

/// Template axes at a given spacing.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetGrid {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

/// Largest template a single survey may produce.
pub const MAX_TEMPLATE_CELLS: usize = 25_000_000;

// Kept in f64 so absurd spacings are caught before any integer conversion.
fn line_count(span: f64, spacing: f64, axis: Axis) -> Result<f64, GridError> {
    if !spacing.is_finite() || spacing <= 0.0 {
        return Err(GridError::InvalidSpacing { axis, spacing });
    }
    Ok((span / spacing).round() + 1.0)
}

impl TargetGrid {
    pub fn new(bbox: &Bbox, spacing: Spacing) -> Result<Self, GridError> {
        let nx = line_count(bbox.x_span(), spacing.dx, Axis::X)?;
        let ny = line_count(bbox.y_span(), spacing.dy, Axis::Y)?;

        let cells = nx * ny;
        if !cells.is_finite() || cells > MAX_TEMPLATE_CELLS as f64 {
            return Err(GridError::TemplateTooLarge {
                dx: spacing.dx,
                dy: spacing.dy,
                limit: MAX_TEMPLATE_CELLS,
            });
        }

        Ok(Self {
            x: linspace(bbox.xmin, bbox.xmax, nx as usize),
            y: linspace(bbox.ymin, bbox.ymax, ny as usize),
        })
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.y.len(), self.x.len())
    }
}

fn nearest_line(axis: &[f64], value: f64, tolerance: f64) -> Option<usize> {
    let (first, last) = (*axis.first()?, *axis.last()?);
    let index = if axis.len() == 1 {
        0.0
    } else {
        ((value - first) / ((last - first) / (axis.len() - 1) as f64)).round()
    };

    if index < 0.0 || index >= axis.len() as f64 {
        return None;
    }
    let index = index as usize;
    ((axis[index] - value).abs() <= tolerance).then_some(index)
}

/// Match native lines against template lines, returning `(native index, template index)` pairs.
fn snap_axis(
    native: &[f64],
    target: &[f64],
    tolerance: f64,
    axis: Axis,
) -> Result<Vec<(usize, usize)>, GridError> {
    let snapped: Vec<Option<usize>> = native
        .iter()
        .map(|&v| nearest_line(target, v, tolerance))
        .collect();
    let pairs: Vec<(usize, usize)> = snapped
        .iter()
        .enumerate()
        .filter_map(|(i, t)| t.map(|t| (i, t)))
        .collect();

    if pairs.len() < 3 {
        return Err(GridError::InsufficientOverlap {
            axis,
            found: pairs.len(),
        });
    }

    let (low, high) = (target[0] - tolerance, target[target.len() - 1] + tolerance);
    if let Some((i, _)) = snapped
        .iter()
        .enumerate()
        .find(|(i, t)| t.is_none() && (low..=high).contains(&native[*i]))
    {
        return Err(GridError::OffLattice {
            axis,
            value: native[i],
        });
    }

    if pairs.len() != native.len() {
        return Err(GridError::ExtentMismatch {
            axis,
            native: native.len(),
            overlap: pairs.len(),
        });
    }

    if let Some(w) = pairs.windows(2).find(|w| w[0].1 >= w[1].1) {
        return Err(GridError::Collision {
            axis,
            first: native[w[0].0],
            second: native[w[1].0],
        });
    }

    Ok(pairs)
}

// Cheap overlap test against the bounds, run before the template axes are allocated.
fn check_coverage(
    bbox: &Bbox,
    native: &[f64],
    tolerance: f64,
    axis: Axis,
) -> Result<(), GridError> {
    let found = native
        .iter()
        .filter(|&&v| match axis {
            Axis::X => bbox.contains_x(v, tolerance),
            Axis::Y => bbox.contains_y(v, tolerance),
        })
        .count();

    if found < 3 {
        return Err(GridError::InsufficientOverlap { axis, found });
    }
    Ok(())
}

fn check_finite(values: &[f64], axis: Axis) -> Result<(), GridError> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(GridError::NonFinite { axis, index }),
        None => Ok(()),
    }
}

impl GridTemplate {
    /// Native resolution of a survey: median x gap and largest y gap, unless overridden.
    pub fn native_spacing(&self, unique_x: &[f64], unique_y: &[f64]) -> Result<Spacing, GridError> {
        match self.spacing {
            Some(spacing) => Ok(spacing),
            None => Ok(Spacing {
                dx: median_spacing(unique_x, Axis::X)?,
                dy: max_spacing(unique_y, Axis::Y)?,
            }),
        }
    }

    /// Slot one survey into the template grid.
    ///
    /// `xs`, `ys` and `elevations` are parallel columns in row-major scan order (x varies fastest).
    /// Cells outside the survey keep `fill_value`. Coordinates are computed for every template cell.
    pub fn fill(
        &self,
        facility: &Facility,
        xs: &[f64],
        ys: &[f64],
        elevations: &[f64],
        metadata: SurveyMetadata,
    ) -> Result<FilledGrid, GridError> {
        if xs.len() != ys.len() || xs.len() != elevations.len() {
            return Err(GridError::LengthMismatch {
                x: xs.len(),
                y: ys.len(),
                z: elevations.len(),
            });
        }
        if xs.is_empty() {
            return Err(GridError::EmptySurvey);
        }
        check_finite(xs, Axis::X)?;
        check_finite(ys, Axis::Y)?;

        let unique_x = unique_sorted(xs);
        let unique_y = unique_sorted(ys);
        let spacing = self.native_spacing(&unique_x, &unique_y)?;
        debug!(
            "native grid {} x {} at dx = {}, dy = {}",
            unique_x.len(),
            unique_y.len(),
            spacing.dx,
            spacing.dy
        );

        let (rows, cols) = (unique_y.len(), unique_x.len());
        if elevations.len() != rows * cols {
            return Err(GridError::ShapeMismatch {
                points: elevations.len(),
                rows,
                cols,
            });
        }
        if let Some(index) =
            (0..xs.len()).find(|&k| xs[k] != unique_x[k % cols] || ys[k] != unique_y[k / cols])
        {
            return Err(GridError::ScanOrder { index });
        }

        check_coverage(&self.bbox, &unique_x, self.snap_tolerance, Axis::X)?;
        check_coverage(&self.bbox, &unique_y, self.snap_tolerance, Axis::Y)?;

        let target = TargetGrid::new(&self.bbox, spacing)?;
        let x_pairs = snap_axis(&unique_x, &target.x, self.snap_tolerance, Axis::X)?;
        let y_pairs = snap_axis(&unique_y, &target.y, self.snap_tolerance, Axis::Y)?;

        let mut elevation = Array2::from_elem(target.shape(), self.fill_value);
        for &(row, target_row) in &y_pairs {
            for &(col, target_col) in &x_pairs {
                elevation[[target_row, target_col]] = elevations[row * cols + col];
            }
        }

        let overlap = OverlapRegion {
            first_x: x_pairs[0].1,
            last_x: x_pairs[x_pairs.len() - 1].1,
            first_y: y_pairs[0].1,
            last_y: y_pairs[y_pairs.len() - 1].1,
        };

        let coords = Array2::from_shape_fn(target.shape(), |(row, col)| {
            facility.transform(CoordinateSystem::Frf, target.x[col], target.y[row])
        });

        Ok(FilledGrid {
            lon: coords.mapv(|c| c.lon),
            lat: coords.mapv(|c| c.lat),
            easting: coords.mapv(|c| c.easting),
            northing: coords.mapv(|c| c.northing),
            x: Array1::from(target.x),
            y: Array1::from(target.y),
            elevation,
            overlap,
            fill_value: self.fill_value,
            spacing,
            metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{Instrument, Platform};
    use chrono::NaiveDate;

    fn sample_metadata() -> SurveyMetadata {
        SurveyMetadata {
            survey_date: NaiveDate::from_ymd_opt(2016, 5, 12).unwrap(),
            survey_number: 1113,
            project: "FRF".to_string(),
            datum: Some("NAVD88".to_string()),
            platform: Platform::Larc,
            instrument: Instrument::Gps,
            version_date: NaiveDate::from_ymd_opt(2016, 5, 18).unwrap(),
        }
    }

    // Row-major scan of the lattice `xs` x `ys` with elevation `f(row, col)`.
    fn scan(xs: &[f64], ys: &[f64], f: impl Fn(usize, usize) -> f64) -> [Vec<f64>; 3] {
        let (mut x, mut y, mut z) = (Vec::new(), Vec::new(), Vec::new());
        for (i, &yv) in ys.iter().enumerate() {
            for (j, &xv) in xs.iter().enumerate() {
                x.push(xv);
                y.push(yv);
                z.push(f(i, j));
            }
        }
        [x, y, z]
    }

    fn fill(template: &GridTemplate, survey: &[Vec<f64>; 3]) -> Result<FilledGrid, GridError> {
        template.fill(
            &Facility::default(),
            &survey[0],
            &survey[1],
            &survey[2],
            sample_metadata(),
        )
    }

    #[test]
    fn test_three_by_three_survey_lands_at_its_indices() {
        let survey = scan(&[100.0, 110.0, 120.0], &[200.0, 210.0, 220.0], |i, j| {
            (i * 3 + j) as f64
        });
        let grid = fill(&GridTemplate::default(), &survey).unwrap();

        assert_eq!(grid.shape(), (121, 91));
        assert_eq!(grid.x[5], 100.0);
        assert_eq!(grid.y[30], 200.0);
        assert_eq!(
            grid.overlap,
            OverlapRegion {
                first_x: 5,
                last_x: 7,
                first_y: 30,
                last_y: 32
            }
        );

        for i in 0..3 {
            for j in 0..3 {
                assert_eq!(grid.elevation[[30 + i, 5 + j]], (i * 3 + j) as f64);
            }
        }

        for ((row, col), &z) in grid.elevation.indexed_iter() {
            if !grid.overlap.contains(row, col) {
                assert_eq!(z, -999.0, "cell ({}, {}) lost the fill value", row, col);
            }
        }
        assert_eq!(grid.valid_cell_count(), 9);
        assert_eq!(grid.metadata, sample_metadata());
    }

    #[test]
    fn test_full_extent_is_copied_unchanged() {
        let xs: Vec<f64> = (0..20).map(|k| 300.0 + 10.0 * k as f64).collect();
        let ys: Vec<f64> = (0..35).map(|k| -50.0 + 10.0 * k as f64).collect();
        let survey = scan(&xs, &ys, |i, j| -8.0 + 0.01 * (i * 20 + j) as f64);
        let grid = fill(&GridTemplate::default(), &survey).unwrap();

        assert_eq!(grid.overlap.shape(), (35, 20));
        let (row0, col0) = (grid.overlap.first_y, grid.overlap.first_x);
        for i in 0..35 {
            for j in 0..20 {
                assert_eq!(
                    grid.elevation[[row0 + i, col0 + j]],
                    -8.0 + 0.01 * (i * 20 + j) as f64
                );
            }
        }
        assert_eq!(grid.valid_cell_count(), 700);
    }

    #[test]
    fn test_coordinates_cover_every_template_cell() {
        let survey = scan(&[100.0, 110.0, 120.0], &[200.0, 210.0, 220.0], |_, _| 1.0);
        let grid = fill(&GridTemplate::default(), &survey).unwrap();
        let facility = Facility::default();

        let corner = facility.transform(CoordinateSystem::Frf, 50.0, -100.0);
        assert_eq!(grid.lon[[0, 0]], corner.lon);
        assert_eq!(grid.lat[[0, 0]], corner.lat);
        assert_eq!(grid.easting[[0, 0]], corner.easting);
        assert_eq!(grid.northing[[0, 0]], corner.northing);

        let far = facility.transform(CoordinateSystem::Frf, 950.0, 1100.0);
        assert_eq!(grid.lat[[120, 90]], far.lat);
        assert!(grid.lon.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_sparse_overlap_is_rejected() {
        let survey = scan(&[940.0, 950.0, 960.0, 970.0], &[200.0, 210.0, 220.0], |_, _| {
            0.0
        });
        assert_eq!(
            fill(&GridTemplate::default(), &survey).unwrap_err(),
            GridError::InsufficientOverlap {
                axis: Axis::X,
                found: 2
            }
        );

        let survey = scan(&[100.0, 110.0, 120.0], &[-120.0, -110.0, -100.0], |_, _| {
            0.0
        });
        assert_eq!(
            fill(&GridTemplate::default(), &survey).unwrap_err(),
            GridError::InsufficientOverlap {
                axis: Axis::Y,
                found: 1
            }
        );
    }

    #[test]
    fn test_survey_past_the_template_edge() {
        let survey = scan(&[930.0, 940.0, 950.0, 960.0], &[200.0, 210.0, 220.0], |_, _| {
            0.0
        });
        assert_eq!(
            fill(&GridTemplate::default(), &survey).unwrap_err(),
            GridError::ExtentMismatch {
                axis: Axis::X,
                native: 4,
                overlap: 3
            }
        );
    }

    #[test]
    fn test_shape_mismatch() {
        let mut survey = scan(&[100.0, 110.0, 120.0], &[200.0, 210.0, 220.0], |_, _| 0.0);
        for column in survey.iter_mut() {
            column.pop();
        }
        assert_eq!(
            fill(&GridTemplate::default(), &survey).unwrap_err(),
            GridError::ShapeMismatch {
                points: 8,
                rows: 3,
                cols: 3
            }
        );
    }

    #[test]
    fn test_column_major_input_is_rejected() {
        let [x, y, z] = scan(&[100.0, 110.0, 120.0], &[200.0, 210.0, 220.0], |_, _| 0.0);
        // swapping the roles of x and y turns the scan column-major
        let survey = [y.iter().map(|v| v - 100.0).collect(), x.iter().map(|v| v + 100.0).collect(), z];
        assert_eq!(
            fill(&GridTemplate::default(), &survey).unwrap_err(),
            GridError::ScanOrder { index: 1 }
        );
    }

    #[test]
    fn test_off_lattice_value_inside_the_template() {
        // median dx is 10, so 125 falls between template lines
        let survey = scan(&[100.0, 110.0, 120.0, 125.0], &[200.0, 210.0, 220.0], |_, _| {
            0.0
        });
        assert_eq!(
            fill(&GridTemplate::default(), &survey).unwrap_err(),
            GridError::OffLattice {
                axis: Axis::X,
                value: 125.0
            }
        );
    }

    #[test]
    fn test_snap_tolerance() {
        let xs = [100.0 + 1e-9, 110.0 - 1e-9, 120.0];
        let survey = scan(&xs, &[200.0, 210.0, 220.0], |i, j| (i * 3 + j) as f64);

        let grid = fill(&GridTemplate::default(), &survey).unwrap();
        assert_eq!(grid.elevation[[30, 5]], 0.0);
        assert_eq!(grid.elevation[[30, 6]], 1.0);

        let exact = GridTemplate {
            snap_tolerance: 0.0,
            ..GridTemplate::default()
        };
        assert_eq!(
            fill(&exact, &survey).unwrap_err(),
            GridError::InsufficientOverlap {
                axis: Axis::X,
                found: 1
            }
        );
    }

    #[test]
    fn test_spacing_override_places_survey_on_every_other_line() {
        let template = GridTemplate {
            spacing: Some(Spacing { dx: 5.0, dy: 10.0 }),
            ..GridTemplate::default()
        };
        let survey = scan(&[100.0, 110.0, 120.0], &[200.0, 210.0, 220.0], |i, j| {
            (i * 3 + j) as f64
        });
        let grid = fill(&template, &survey).unwrap();

        assert_eq!(grid.shape(), (121, 181));
        assert_eq!(grid.elevation[[30, 10]], 0.0);
        assert_eq!(grid.elevation[[30, 11]], -999.0);
        assert_eq!(grid.elevation[[30, 12]], 1.0);
        assert_eq!(grid.overlap.first_x, 10);
        assert_eq!(grid.overlap.last_x, 14);
    }

    #[test]
    fn test_y_spacing_uses_the_widest_row_gap() {
        // dy = 20 from the 200 -> 220 gap puts 210 between template rows
        let survey = scan(
            &[100.0, 110.0, 120.0],
            &[180.0, 200.0, 210.0, 220.0],
            |_, _| 0.0,
        );
        assert_eq!(
            fill(&GridTemplate::default(), &survey).unwrap_err(),
            GridError::OffLattice {
                axis: Axis::Y,
                value: 210.0
            }
        );
    }

    #[test]
    fn test_sub_nanometre_spacing_outside_the_bounds() {
        let survey = scan(&[0.0, 1e-17, 2e-17], &[200.0, 210.0, 220.0], |_, _| 0.0);
        assert_eq!(
            fill(&GridTemplate::default(), &survey).unwrap_err(),
            GridError::InsufficientOverlap {
                axis: Axis::X,
                found: 0
            }
        );
    }

    #[test]
    fn test_tiny_spacing_inside_the_bounds_is_too_large() {
        let survey = scan(
            &[100.0, 100.0 + 1e-9, 100.0 + 2e-9],
            &[200.0, 210.0, 220.0],
            |_, _| 0.0,
        );
        assert!(matches!(
            fill(&GridTemplate::default(), &survey),
            Err(GridError::TemplateTooLarge {
                limit: MAX_TEMPLATE_CELLS,
                ..
            })
        ));
    }

    #[test]
    fn test_target_grid_rejects_overflowing_line_counts() {
        assert_eq!(
            TargetGrid::new(&Bbox::frf_archive(), Spacing { dx: 1e-17, dy: 10.0 }),
            Err(GridError::TemplateTooLarge {
                dx: 1e-17,
                dy: 10.0,
                limit: MAX_TEMPLATE_CELLS
            })
        );
        assert!(TargetGrid::new(&Bbox::frf_archive(), Spacing { dx: 0.5, dy: 0.5 }).is_ok());
    }

    #[test]
    fn test_target_grid_counts_round_to_whole_steps() {
        let grid = TargetGrid::new(&Bbox::frf_archive(), Spacing { dx: 10.0, dy: 10.0 }).unwrap();
        assert_eq!(grid.shape(), (121, 91));

        assert_eq!(
            TargetGrid::new(&Bbox::frf_archive(), Spacing { dx: 0.0, dy: 10.0 }),
            Err(GridError::InvalidSpacing {
                axis: Axis::X,
                spacing: 0.0
            })
        );
    }
}
