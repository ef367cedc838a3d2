use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum MetadataError {
    #[error("file name has no {field} token (expected at position {index})")]
    MissingField { field: &'static str, index: usize },

    #[error("filename grammar does not define a {0} field")]
    UndefinedField(&'static str),

    #[error("expected token '{expected}' at position {index}, found '{found}'")]
    LiteralMismatch {
        index: usize,
        expected: String,
        found: String,
    },

    #[error("do not understand survey platform '{0}'")]
    UnknownPlatform(String),

    #[error("do not understand instrumentation '{0}'")]
    UnknownInstrument(String),

    #[error("invalid {field} token '{token}'")]
    InvalidDate { field: &'static str, token: String },

    #[error("invalid survey number token '{0}' (expected 4 digits)")]
    InvalidSurveyNumber(String),

    #[error("file name '{0}' is not valid UTF-8")]
    NonUtf8(String),
}
