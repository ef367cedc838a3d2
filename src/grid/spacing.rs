//! Native resolution inference.
//!
//! x uses the median gap and y the largest gap. The two are not interchangeable.

use super::{Axis, GridError};

/// Sorted distinct values. Inputs must already be finite.
pub fn unique_sorted(values: &[f64]) -> Vec<f64> {
    let mut unique = values.to_vec();
    unique.sort_by(f64::total_cmp);
    unique.dedup();
    unique
}

fn gaps(unique: &[f64], axis: Axis) -> Result<Vec<f64>, GridError> {
    if unique.len() < 2 {
        return Err(GridError::DegenerateAxis {
            axis,
            found: unique.len(),
        });
    }

    Ok(unique.windows(2).map(|w| w[1] - w[0]).collect())
}

/// Median gap between consecutive distinct values; robust to one irregular gap.
pub fn median_spacing(unique: &[f64], axis: Axis) -> Result<f64, GridError> {
    let mut diffs = gaps(unique, axis)?;
    diffs.sort_by(f64::total_cmp);

    let mid = diffs.len() / 2;
    let median = if diffs.len() % 2 == 0 {
        (diffs[mid - 1] + diffs[mid]) / 2.0
    } else {
        diffs[mid]
    };
    Ok(median)
}

/// Largest gap between consecutive distinct values.
pub fn max_spacing(unique: &[f64], axis: Axis) -> Result<f64, GridError> {
    let diffs = gaps(unique, axis)?;
    Ok(diffs.into_iter().fold(f64::NEG_INFINITY, f64::max))
}

/// `count` evenly spaced values from `start` to `stop`, both ends included.
pub fn linspace(start: f64, stop: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (count - 1) as f64;
            let mut values: Vec<f64> = (0..count).map(|i| start + i as f64 * step).collect();
            values[count - 1] = stop;
            values
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_sorted() {
        assert_eq!(
            unique_sorted(&[120.0, 100.0, 110.0, 100.0, 120.0]),
            vec![100.0, 110.0, 120.0]
        );
    }

    #[test]
    fn test_median_spacing_ignores_one_irregular_gap() {
        let xs = [0.0, 5.0, 10.0, 15.0, 40.0];
        assert_eq!(median_spacing(&xs, Axis::X).unwrap(), 5.0);
    }

    #[test]
    fn test_median_spacing_even_gap_count() {
        let xs = [0.0, 2.0, 6.0];
        assert_eq!(median_spacing(&xs, Axis::X).unwrap(), 3.0);
    }

    #[test]
    fn test_max_spacing_takes_the_widest_row_gap() {
        let ys = [0.0, 5.0, 10.0, 15.0, 40.0];
        assert_eq!(max_spacing(&ys, Axis::Y).unwrap(), 25.0);
    }

    #[test]
    fn test_spacing_needs_two_values() {
        assert_eq!(
            median_spacing(&[3.0], Axis::X),
            Err(GridError::DegenerateAxis {
                axis: Axis::X,
                found: 1
            })
        );
        assert!(max_spacing(&[], Axis::Y).is_err());
    }

    #[test]
    fn test_linspace_is_endpoint_inclusive() {
        let axis = linspace(50.0, 950.0, 91);
        assert_eq!(axis.len(), 91);
        assert_eq!(axis[0], 50.0);
        assert_eq!(axis[5], 100.0);
        assert_eq!(axis[90], 950.0);

        assert_eq!(linspace(1.0, 2.0, 1), vec![1.0]);
        assert!(linspace(1.0, 2.0, 0).is_empty());
    }
}
