use chrono::NaiveDateTime;
use std::fmt;
use thiserror::Error;

pub trait SurveyReader {
    fn read_points(&self) -> Result<SurveyPoints, IngestError>;
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("file format not understood: line {line} has {columns} columns")]
    Format { line: u64, columns: usize },

    #[error("line {line}: '{value}' is not a number")]
    Number { line: u64, value: String },

    #[error("unknown survey file type: {0}")]
    UnknownFileType(String),

    #[error("{0} is a transect file, not a gridded survey")]
    NotGridded(String),

    #[error("{0} has no points with a readable timestamp")]
    NoPoints(String),
}

/// Flat survey columns as read from disk. `lon`/`lat` are only filled for 5-column files.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SurveyPoints {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    pub lon: Vec<f64>,
    pub lat: Vec<f64>,
    /// Point count from the optional single-value header row.
    pub declared_count: Option<usize>,
}

/// One surveyed transect point.
#[derive(Debug, Clone, PartialEq)]
pub struct TransectPoint {
    pub locality: String,
    pub profile: i64,
    pub survey_number: i64,
    pub lat: f64,
    pub lon: f64,
    pub northing: f64,
    pub easting: f64,
    pub x: f64,
    pub y: f64,
    pub elevation: f64,
    /// NaN when the file leaves it blank.
    pub ellipsoid: f64,
    /// UTC collection time.
    pub time: NaiveDateTime,
}

/// Transect points in time order, and how many rows were dropped for a bad timestamp.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TransectPoints {
    pub points: Vec<TransectPoint>,
    pub dropped: usize,
}

impl TransectPoints {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

pub enum FileType {
    GridText,
    Transect,
}

impl SurveyPoints {
    pub fn len(&self) -> usize {
        self.z.len()
    }

    pub fn is_empty(&self) -> bool {
        self.z.is_empty()
    }
}

impl fmt::Display for SurveyPoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let min_value = self
            .z
            .iter()
            .copied()
            .filter(|z| !z.is_nan())
            .fold(f64::INFINITY, f64::min);
        let max_value = self
            .z
            .iter()
            .copied()
            .filter(|z| !z.is_nan())
            .fold(f64::NEG_INFINITY, f64::max);

        write!(
            f,
            "Points: {}\nWith lon/lat: {}\nMin elevation: {}\nMax elevation: {}",
            self.len(),
            !self.lon.is_empty(),
            min_value,
            max_value,
        )
    }
}
