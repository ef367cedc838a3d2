//! Model skill and bulk wave statistics. None of this is used by the gridding path.

pub mod bryant;
pub mod error;
pub mod time_match;
pub mod wave;

pub use bryant::{BryantStats, bryant_stats};
pub use error::StatsError;
pub use time_match::{TimeMatch, time_match};
pub use wave::{BulkWaveStats, DEFAULT_HIGH_FREQ, DEFAULT_LOW_FREQ, bulk_wave_stats};

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    match sorted.len() {
        0 => f64::NAN,
        n if n % 2 == 0 => (sorted[mid - 1] + sorted[mid]) / 2.0,
        _ => sorted[mid],
    }
}

fn diff(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| w[1] - w[0]).collect()
}

// Index of the first maximum, NaN never wins.
fn argmax<'a>(values: impl IntoIterator<Item = &'a f64>) -> usize {
    let mut best = 0;
    let mut best_value = f64::NEG_INFINITY;
    for (index, &value) in values.into_iter().enumerate() {
        if value > best_value {
            best = index;
            best_value = value;
        }
    }
    best
}
