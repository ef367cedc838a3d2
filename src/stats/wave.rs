use ndarray::{Array1, Array2, Array3, Axis};

use super::{StatsError, argmax, diff, median};
use crate::angles::normalize_degrees;

pub const DEFAULT_LOW_FREQ: f64 = 0.05;
pub const DEFAULT_HIGH_FREQ: f64 = 0.5;

/// Bulk parameters per spectrum record. Periods in s, directions in degrees clockwise from true
/// north.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkWaveStats {
    /// Significant wave height, `4 sqrt(m0)`.
    pub hm0: Array1<f64>,
    /// Peak period, `1 / fp`.
    pub tp: Array1<f64>,
    /// Mean period from moments 0 and 2.
    pub tm02: Array1<f64>,
    /// Average period from the first moment.
    pub tm01: Array1<f64>,
    /// Mean absolute period from the -1 moment.
    pub tm10: Array1<f64>,
    /// Peak direction at the peak frequency.
    pub dp: Array1<f64>,
    /// Mean wave direction (Kuik 1988).
    pub dm: Array1<f64>,
    /// Mean direction at the peak frequency.
    pub dmp: Array1<f64>,
    pub vector_mean_dir: Array1<f64>,
    /// Frequency spread `(m0 m4 - m2^2) / (m0 m4)`.
    pub spread_freq: Array1<f64>,
    pub spread_dir: Array1<f64>,
}

/// Bulk statistics of frequency-direction spectra shaped `(record, frequency, direction)`.
///
/// Frequency bins may vary in width; direction bins are assumed uniform. The zeroth moment uses
/// every frequency, higher moments only `low..=high` Hz.
pub fn bulk_wave_stats(
    spectra: &Array3<f64>,
    freq_bins: &[f64],
    dir_bins: &[f64],
    low: f64,
    high: f64,
) -> Result<BulkWaveStats, StatsError> {
    let (records, n_freq, n_dir) = spectra.dim();
    if freq_bins.len() != n_freq {
        return Err(StatsError::BinMismatch {
            axis: "frequency",
            expected: n_freq,
            found: freq_bins.len(),
        });
    }
    if dir_bins.len() != n_dir {
        return Err(StatsError::BinMismatch {
            axis: "direction",
            expected: n_dir,
            found: dir_bins.len(),
        });
    }
    if n_dir < 2 {
        return Err(StatsError::TooFewSamples(n_dir));
    }
    if spectra.iter().all(|&v| v == 0.0) {
        return Err(StatsError::NoEnergy);
    }

    // first bin has zero width
    let df: Vec<f64> = (0..n_freq)
        .map(|i| if i == 0 { 0.0 } else { freq_bins[i] - freq_bins[i - 1] })
        .collect();
    let dd = median(&diff(dir_bins)).abs();

    let band: Vec<usize> = (0..n_freq)
        .filter(|&i| (low..=high).contains(&freq_bins[i]))
        .collect();
    if band.is_empty() {
        return Err(StatsError::EmptyBand { low, high });
    }

    let fspec: Array2<f64> = spectra.sum_axis(Axis(2)) * dd;
    let rad: Vec<f64> = dir_bins.iter().map(|d| d.to_radians()).collect();

    let mut stats = BulkWaveStats {
        hm0: Array1::zeros(records),
        tp: Array1::zeros(records),
        tm02: Array1::zeros(records),
        tm01: Array1::zeros(records),
        tm10: Array1::zeros(records),
        dp: Array1::zeros(records),
        dm: Array1::zeros(records),
        dmp: Array1::zeros(records),
        vector_mean_dir: Array1::zeros(records),
        spread_freq: Array1::zeros(records),
        spread_dir: Array1::zeros(records),
    };

    for r in 0..records {
        let f = fspec.row(r);
        let moment = |power: i32| -> f64 {
            band.iter()
                .map(|&i| f[i] * df[i] * freq_bins[i].powi(power))
                .sum()
        };

        let m0: f64 = (0..n_freq).map(|i| f[i] * df[i]).sum();
        let m1 = moment(1);
        let m2 = moment(2);
        let m4 = moment(4);
        let m_1 = moment(-1);

        let ipf = argmax(f.iter());
        stats.hm0[r] = 4.0 * m0.sqrt();
        stats.tp[r] = 1.0 / freq_bins[ipf];
        stats.tm02[r] = (m0 / m2).sqrt();
        stats.tm01[r] = m0 / m1;
        stats.tm10[r] = m_1 / m0;
        stats.spread_freq[r] = (m0 * m4 - m2 * m2) / (m0 * m4);

        let record = spectra.index_axis(Axis(0), r);
        let ds: Vec<f64> = (0..n_dir)
            .map(|d| (0..n_freq).map(|i| record[[i, d]] * df[i]).sum())
            .collect();
        let dsp = record.row(ipf);
        stats.dp[r] = dir_bins[argmax(dsp.iter())];

        let weight: f64 = (0..n_dir).map(|d| ds[d] * dir_bins[d]).sum();
        let x_comp = (0..n_dir)
            .map(|d| rad[d].sin() * ds[d] * dir_bins[d])
            .sum::<f64>()
            / weight;
        let y_comp = (0..n_dir)
            .map(|d| rad[d].cos() * ds[d] * dir_bins[d])
            .sum::<f64>()
            / weight;
        stats.dm[r] = normalize_degrees(x_comp.atan2(y_comp).to_degrees());
        stats.spread_dir[r] = (2.0 * (1.0 - (x_comp.powi(2) + y_comp.powi(2)).sqrt()))
            .sqrt()
            .to_degrees();

        let (mut x_sum, mut y_sum) = (0.0, 0.0);
        for i in 0..n_freq {
            for d in 0..n_dir {
                x_sum += rad[d].cos() * df[i] * record[[i, d]];
                y_sum += rad[d].sin() * df[i] * record[[i, d]];
            }
        }
        stats.vector_mean_dir[r] = normalize_degrees(y_sum.atan2(x_sum).to_degrees());

        let peak_x: f64 = (0..n_dir).map(|d| rad[d].sin() * dsp[d] * dir_bins[d]).sum();
        let peak_y: f64 = (0..n_dir).map(|d| rad[d].cos() * dsp[d] * dir_bins[d]).sum();
        stats.dmp[r] = normalize_degrees(peak_x.atan2(peak_y).to_degrees());
    }

    Ok(stats)
}
