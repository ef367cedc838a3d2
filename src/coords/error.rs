use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CoordError {
    #[error("could not determine the coordinate system of ({p1}, {p2})")]
    DetectionAmbiguous { p1: f64, p2: f64 },

    #[error("non-finite coordinate ({p1}, {p2})")]
    NonFinite { p1: f64, p2: f64 },
}
