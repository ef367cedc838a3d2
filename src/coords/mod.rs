//! Conversions between the three coordinate systems used at the facility.
//!
//! Every point is carried through a polar offset from the FRF origin: the radius is shared by all
//! three frames, only the bearing differs (the FRF frame, the state-plane grid and true north are
//! rotated by fixed angles relative to each other).

use serde::Deserialize;
use std::fmt;

pub mod error;
pub mod facility;

pub use error::CoordError;
pub use facility::Facility;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateSystem {
    /// Local cross-shore (X) / alongshore (Y) frame, metres.
    Frf,
    /// NAD83 North Carolina state plane easting / northing, metres.
    StatePlane,
    /// Longitude / latitude, decimal degrees.
    Geographic,
}

impl fmt::Display for CoordinateSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordinateSystem::Frf => write!(f, "FRF"),
            CoordinateSystem::StatePlane => write!(f, "state plane"),
            CoordinateSystem::Geographic => write!(f, "geographic"),
        }
    }
}

/// One point expressed in all three frames at once.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateTriple {
    pub easting: f64,
    pub northing: f64,
    pub x: f64,
    pub y: f64,
    pub lat: f64,
    /// Signed degrees east (the facility sits at about -75.75).
    pub lon: f64,
}

impl CoordinateTriple {
    pub const NAN: CoordinateTriple = CoordinateTriple {
        easting: f64::NAN,
        northing: f64::NAN,
        x: f64::NAN,
        y: f64::NAN,
        lat: f64::NAN,
        lon: f64::NAN,
    };

    /// False for the sentinel record returned on failed detection.
    pub fn is_valid(&self) -> bool {
        [
            self.easting,
            self.northing,
            self.x,
            self.y,
            self.lat,
            self.lon,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

impl fmt::Display for CoordinateTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FRF X: {:.3}\nFRF Y: {:.3}\nEasting: {:.3}\nNorthing: {:.3}\nLat: {:.8}\nLon: {:.8}",
            self.x, self.y, self.easting, self.northing, self.lat, self.lon
        )
    }
}
