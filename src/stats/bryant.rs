use super::StatsError;

/// Non-directional skill statistics after Bryant et al. (2016), ERDC/CHL CHETN-I-91.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BryantStats {
    pub bias: f64,
    pub rmse_demeaned: f64,
    pub rmse: f64,
    pub rmse_norm: f64,
    pub scatter_index: f64,
    pub sym_slope: f64,
    pub corr: f64,
    /// Willmott (1985) index of agreement.
    pub willmott: f64,
    pub imeds: f64,
}

pub fn bryant_stats(observations: &[f64], models: &[f64]) -> Result<BryantStats, StatsError> {
    if observations.len() != models.len() {
        return Err(StatsError::LengthMismatch {
            observations: observations.len(),
            models: models.len(),
        });
    }
    let n = observations.len();
    if n < 2 {
        return Err(StatsError::TooFewSamples(n));
    }
    let count = n as f64;

    let residuals: Vec<f64> = models
        .iter()
        .zip(observations)
        .map(|(m, o)| m - o)
        .collect();
    let sum_sq = |values: &[f64]| values.iter().map(|v| v * v).sum::<f64>();

    let bias = residuals.iter().sum::<f64>() / count;
    let rmse_demeaned = (residuals.iter().map(|r| (r - bias).powi(2)).sum::<f64>()
        / (count - 1.0))
        .sqrt();
    let rmse = (sum_sq(&residuals) / count).sqrt();
    let rmse_norm = (sum_sq(&residuals) / sum_sq(observations)).sqrt();

    let obs_mean = observations.iter().sum::<f64>() / count;
    let model_mean = models.iter().sum::<f64>() / count;
    let scatter_index = rmse / obs_mean;
    let sym_slope = (sum_sq(models) / sum_sq(observations)).sqrt();

    let covariance: f64 = observations
        .iter()
        .zip(models)
        .map(|(o, m)| (o - obs_mean) * (m - model_mean))
        .sum();
    let obs_spread = observations
        .iter()
        .map(|o| (o - obs_mean).powi(2))
        .sum::<f64>()
        .sqrt();
    let model_spread = models
        .iter()
        .map(|m| (m - model_mean).powi(2))
        .sum::<f64>()
        .sqrt();
    let corr = covariance / (obs_spread * model_spread);

    let top: f64 = residuals.iter().map(|r| r.abs()).sum();
    let bottom: f64 = observations
        .iter()
        .zip(models)
        .map(|(o, m)| (m - obs_mean).abs() + (o - obs_mean).abs())
        .sum();
    let willmott = 1.0 - top / bottom;

    let x_rms = (sum_sq(observations) / count).sqrt();
    let p_rms = 1.0 - rmse / x_rms;
    let p_bias = 1.0 - bias.abs() / x_rms;
    let imeds = (p_rms + p_bias) / 2.0;

    Ok(BryantStats {
        bias,
        rmse_demeaned,
        rmse,
        rmse_norm,
        scatter_index,
        sym_slope,
        corr,
        willmott,
        imeds,
    })
}
