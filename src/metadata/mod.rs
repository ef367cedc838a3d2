//! Survey metadata recovered from the archive file naming convention.

use chrono::{NaiveDate, NaiveTime};
use std::fmt::Display;

pub mod error;
pub mod grammar;

pub use error::MetadataError;
pub use grammar::{FieldKind, FilenameGrammar};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Crab,
    Larc,
}

impl Platform {
    pub fn from_token(token: &str) -> Result<Self, MetadataError> {
        if token.eq_ignore_ascii_case("crab") {
            Ok(Platform::Crab)
        } else if token.eq_ignore_ascii_case("larc") {
            Ok(Platform::Larc)
        } else {
            Err(MetadataError::UnknownPlatform(token.to_string()))
        }
    }

    /// Integer flag stored in the output file.
    pub fn code(&self) -> u8 {
        match self {
            Platform::Crab => 0,
            Platform::Larc => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instrument {
    Level,
    Zeiss,
    Geodimeter,
    Gps,
}

impl Instrument {
    pub fn from_token(token: &str) -> Result<Self, MetadataError> {
        match token.to_ascii_lowercase().as_str() {
            "level" => Ok(Instrument::Level),
            "zeiss" => Ok(Instrument::Zeiss),
            "geodimeter" => Ok(Instrument::Geodimeter),
            "gps" => Ok(Instrument::Gps),
            _ => Err(MetadataError::UnknownInstrument(token.to_string())),
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            Instrument::Level => 0,
            Instrument::Zeiss => 1,
            Instrument::Geodimeter => 2,
            Instrument::Gps => 3,
        }
    }
}

impl Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Crab => write!(f, "CRAB"),
            Platform::Larc => write!(f, "LARC"),
        }
    }
}

impl Display for Instrument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Instrument::Level => write!(f, "Level"),
            Instrument::Zeiss => write!(f, "Zeiss"),
            Instrument::Geodimeter => write!(f, "Geodimeter"),
            Instrument::Gps => write!(f, "GPS"),
        }
    }
}

/// Vessel named in a transect file. Transects use their own code table, and vessels outside it
/// are recorded as `Other` rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransectPlatform {
    Larc,
    Crab,
    CrabSled,
    Topo,
    Other(String),
}

impl TransectPlatform {
    pub fn from_token(token: &str) -> Self {
        match token.to_ascii_lowercase().as_str() {
            "larc" => TransectPlatform::Larc,
            "crab" => TransectPlatform::Crab,
            "crab-sled" => TransectPlatform::CrabSled,
            "topo" => TransectPlatform::Topo,
            _ => TransectPlatform::Other(token.to_string()),
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            TransectPlatform::Larc => 1,
            TransectPlatform::Crab => 2,
            TransectPlatform::CrabSled => 3,
            TransectPlatform::Topo => 4,
            TransectPlatform::Other(_) => 5,
        }
    }
}

impl Display for TransectPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransectPlatform::Larc => write!(f, "LARC"),
            TransectPlatform::Crab => write!(f, "CRAB"),
            TransectPlatform::CrabSled => write!(f, "CRAB-Sled"),
            TransectPlatform::Topo => write!(f, "Topo"),
            TransectPlatform::Other(token) => write!(f, "{}", token),
        }
    }
}

/// What a transect file name carries.
#[derive(Debug, Clone, PartialEq)]
pub struct TransectMetadata {
    pub survey_date: NaiveDate,
    pub platform: TransectPlatform,
}

impl TransectMetadata {
    pub fn date_token(&self) -> String {
        self.survey_date.format("%Y%m%d").to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SurveyMetadata {
    pub survey_date: NaiveDate,
    pub survey_number: u16,
    pub project: String,
    pub datum: Option<String>,
    pub platform: Platform,
    pub instrument: Instrument,
    pub version_date: NaiveDate,
}

fn epoch_seconds(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

impl SurveyMetadata {
    /// Survey date as seconds since 1970-01-01 UTC.
    pub fn time(&self) -> i64 {
        epoch_seconds(self.survey_date)
    }

    pub fn version_time(&self) -> i64 {
        epoch_seconds(self.version_date)
    }

    /// `YYYYMMDD`, used to name the output file.
    pub fn date_token(&self) -> String {
        self.survey_date.format("%Y%m%d").to_string()
    }
}

impl Display for SurveyMetadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Survey {} ({}) on {}, {} / {}, version {}",
            self.survey_number,
            self.project,
            self.survey_date,
            self.platform,
            self.instrument,
            self.version_date
        )
    }
}
