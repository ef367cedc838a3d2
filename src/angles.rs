//! Angle wrapping and the rotation between geographic and wave-model grid directions.
//!
//! All angles are in degrees. `normalize_*` maps values into `[0, 360)`; NaN is left untouched so
//! that missing directions survive the round trip.

use ndarray::{Array1, ArrayBase, DataMut, Dimension};
use std::f64::consts::TAU;
use thiserror::Error;
use tracing::warn;

/// Shore-normal pier orientation at the FRF, degrees from true north.
pub const FRF_PIER_ANGLE: f64 = 71.8;

#[derive(Debug, Error, PartialEq)]
pub enum AngleError {
    #[error("angle arrays of {0} dimensions are not supported (maximum 3)")]
    Dimensionality(usize),
}

pub fn normalize_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Wrap every element of a scalar (0-d) to 3-d array into `[0, 360)` in place.
pub fn normalize_array<S, D>(angles: &mut ArrayBase<S, D>) -> Result<(), AngleError>
where
    S: DataMut<Elem = f64>,
    D: Dimension,
{
    if angles.ndim() > 3 {
        return Err(AngleError::Dimensionality(angles.ndim()));
    }

    if angles.iter().all(|&a| a == 0.0) {
        return Ok(());
    }

    if angles.iter().filter(|a| !a.is_nan()).all(|a| a.abs() < TAU) {
        warn!("angles are all < 2pi, ensure that angles are in degrees not radians");
    }

    angles.mapv_inplace(normalize_degrees);

    debug_assert!(
        angles
            .iter()
            .all(|a| a.is_nan() || (0.0..360.0).contains(a))
    );
    Ok(())
}

/// Rotate geographic directions into the wave-model grid convention (0 = onshore, counter-clockwise
/// positive, "towards"). With `met_in` the inputs are meteorological "coming from" directions.
/// With `signed_out` the result is folded into `(-180, 180]`.
pub fn geo_to_stwave(geo: &[f64], pier_angle: f64, met_in: bool, signed_out: bool) -> Array1<f64> {
    let azimuth = 270.0 - pier_angle;
    let rotate = normalize_degrees(90.0 - azimuth);

    geo.iter()
        .map(|&angle| {
            let ocean = if met_in {
                normalize_degrees(angle + 180.0)
            } else {
                angle
            };
            let grid = normalize_degrees(rotate - ocean);
            if signed_out && grid > 180.0 {
                grid - 360.0
            } else {
                grid
            }
        })
        .collect()
}

/// Inverse of [`geo_to_stwave`]; with `met_out` the result is a meteorological "coming from"
/// direction.
pub fn stwave_to_geo(grid: &[f64], pier_angle: f64, met_out: bool) -> Array1<f64> {
    let azimuth = 270.0 - pier_angle;
    let rotate = normalize_degrees(90.0 - azimuth);
    let offset = if met_out { 180.0 } else { 0.0 };

    grid.iter()
        .map(|&angle| normalize_degrees(rotate - angle + offset))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array3, arr0, arr1, arr2};

    #[test]
    fn test_normalize_scalar() {
        assert_eq!(normalize_degrees(370.0), 10.0);
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(360.0), 0.0);
        assert_eq!(normalize_degrees(-720.0), 0.0);
        assert_eq!(normalize_degrees(-1e-20), 0.0);
        assert!(normalize_degrees(f64::NAN).is_nan());
    }

    #[test]
    fn test_normalize_arrays_of_each_rank() {
        let mut scalar = arr0(-45.0);
        normalize_array(&mut scalar).unwrap();
        assert_eq!(scalar[()], 315.0);

        let mut line = arr1(&[-10.0, 725.0, 359.5, 0.0]);
        normalize_array(&mut line).unwrap();
        assert_eq!(line, arr1(&[350.0, 5.0, 359.5, 0.0]));

        let mut plane = arr2(&[[-360.0, 400.0], [90.0, -1.0]]);
        normalize_array(&mut plane).unwrap();
        assert_eq!(plane, arr2(&[[0.0, 40.0], [90.0, 359.0]]));

        let mut cube = Array3::from_elem((2, 3, 4), -370.0);
        normalize_array(&mut cube).unwrap();
        assert!(cube.iter().all(|&a| a == 350.0));
    }

    #[test]
    fn test_normalize_rejects_four_dimensions() {
        let mut hyper = ndarray::Array4::<f64>::zeros((1, 1, 1, 2));
        assert_eq!(normalize_array(&mut hyper), Err(AngleError::Dimensionality(4)));
    }

    #[test]
    fn test_normalize_keeps_nan() {
        let mut line = arr1(&[f64::NAN, -30.0]);
        normalize_array(&mut line).unwrap();
        assert!(line[0].is_nan());
        assert_eq!(line[1], 330.0);
    }

    #[test]
    fn test_shore_normal_waves_are_zero_in_the_grid() {
        // Waves coming from the pier heading travel straight onshore
        let grid = geo_to_stwave(&[FRF_PIER_ANGLE], FRF_PIER_ANGLE, true, false);
        assert!(grid[0].abs() < 1e-9 || (grid[0] - 360.0).abs() < 1e-9);
    }

    #[test]
    fn test_grid_angle_round_trip() {
        let geo = [10.0, 71.8, 135.0, 200.0, 300.0];
        let grid = geo_to_stwave(&geo, FRF_PIER_ANGLE, true, false);
        let back = stwave_to_geo(grid.as_slice().unwrap(), FRF_PIER_ANGLE, true);

        for (a, b) in geo.iter().zip(back.iter()) {
            assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
        }
    }

    #[test]
    fn test_signed_grid_output() {
        let grid = geo_to_stwave(&[0.0, 180.0], FRF_PIER_ANGLE, true, true);
        assert!(grid.iter().all(|&a| a > -180.0 && a <= 180.0));
    }
}
