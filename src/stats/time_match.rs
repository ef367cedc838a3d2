use super::{StatsError, diff, median};

/// Model and observation values paired on the model time axis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeMatch {
    pub time: Vec<f64>,
    pub observations: Vec<f64>,
    pub models: Vec<f64>,
}

// seconds shaved off the half-interval matching window
const WINDOW_MARGIN: f64 = 43.0;

/// Pair each model record with the nearest observation in time.
///
/// Times are epoch seconds and `obs_time` must be sorted. A model record with no observation on
/// both sides, or whose nearest observation is further than half the median sampling interval
/// (minus a 43 s margin) of either series, is dropped, as are pairs with a NaN on either side.
pub fn time_match(
    obs_time: &[f64],
    obs_data: &[f64],
    model_time: &[f64],
    model_data: &[f64],
) -> Result<TimeMatch, StatsError> {
    if obs_time.len() != obs_data.len() {
        return Err(StatsError::LengthMismatch {
            observations: obs_time.len(),
            models: obs_data.len(),
        });
    }
    if model_time.len() != model_data.len() {
        return Err(StatsError::LengthMismatch {
            observations: model_time.len(),
            models: model_data.len(),
        });
    }
    for series in [obs_time, model_time] {
        if series.len() < 2 {
            return Err(StatsError::TooFewSamples(series.len()));
        }
    }
    if obs_time.windows(2).any(|w| w[1] < w[0]) {
        return Err(StatsError::Unsorted);
    }

    let threshold = (median(&diff(obs_time)) / 2.0 - WINDOW_MARGIN)
        .min(median(&diff(model_time)) / 2.0 - WINDOW_MARGIN);

    let mut matched = TimeMatch::default();

    for (&t, &model) in model_time.iter().zip(model_data) {
        let before = obs_time.partition_point(|&o| o <= t).checked_sub(1);
        let after = obs_time.partition_point(|&o| o < t);
        let (Some(before), true) = (before, after < obs_time.len()) else {
            continue;
        };

        let index = if before == after {
            after
        } else {
            let d1 = t - obs_time[before];
            let d2 = obs_time[after] - t;
            if d1.min(d2) > threshold {
                continue;
            }
            if d1 <= d2 { before } else { after }
        };

        let observation = obs_data[index];
        if observation.is_nan() || model.is_nan() {
            continue;
        }

        matched.time.push(t);
        matched.observations.push(observation);
        matched.models.push(model);
    }

    Ok(matched)
}
