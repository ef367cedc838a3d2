pub mod error;
pub mod runner;

pub use error::{BatchError, SurveyError};
pub use runner::{BatchRunner, BatchSummary};
