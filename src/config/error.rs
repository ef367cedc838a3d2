use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid bbox: {0}")]
    Bbox(String),

    #[error("snap_tolerance should be a finite number >= 0, got {0}")]
    SnapTolerance(f64),

    #[error("spacing override should be positive, got dx = {dx}, dy = {dy}")]
    Spacing { dx: f64, dy: f64 },

    #[error("{field} should contain '{{}}', got '{pattern}'")]
    FilenamePattern {
        field: &'static str,
        pattern: String,
    },

    #[error("invalid input pattern '{pattern}': {source}")]
    GridPattern {
        pattern: String,
        source: glob::PatternError,
    },

    #[error("{0} cannot be empty")]
    Empty(&'static str),
}
