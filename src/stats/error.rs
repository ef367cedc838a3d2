use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum StatsError {
    #[error("observations ({observations}) and models ({models}) differ in length")]
    LengthMismatch { observations: usize, models: usize },

    #[error("need at least 2 samples, got {0}")]
    TooFewSamples(usize),

    #[error("spectra must have energy to calculate statistics, all values are 0")]
    NoEnergy,

    #[error("{axis} bins ({found}) do not match the spectra ({expected})")]
    BinMismatch {
        axis: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("no frequency bins between {low} and {high} Hz")]
    EmptyBand { low: f64, high: f64 },

    #[error("observation times must be sorted")]
    Unsorted,
}
