use std::path::PathBuf;
use thiserror::Error;

use crate::encoder::EncodeError;
use crate::grid::GridError;
use crate::metadata::MetadataError;
use crate::readers::IngestError;

/// Failure converting one survey file. The batch records it and moves on.
#[derive(Debug, Error)]
pub enum SurveyError {
    #[error("bad file name: {0}")]
    Metadata(#[from] MetadataError),

    #[error("could not read survey: {0}")]
    Ingest(#[from] IngestError),

    #[error("could not grid survey: {0}")]
    Grid(#[from] GridError),

    #[error("could not write output: {0}")]
    Encode(#[from] EncodeError),
}

/// Failures that stop the whole batch.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("cannot create output directory {path}: {source}")]
    OutputDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot write batch report {path}: {source}")]
    Report {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("input directory {0} does not exist")]
    MissingInput(PathBuf),

    #[error("invalid input pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("cannot load encoding schema: {0}")]
    Schema(#[from] EncodeError),
}
