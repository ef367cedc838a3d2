use serde::Deserialize;
use tracing::warn;

use super::{CoordError, CoordinateSystem, CoordinateTriple};

/// Survey fit constants for one facility.
///
/// The defaults are the November 2014 fit for the Field Research Facility at Duck, NC (NAD83-2011).
/// Angles are stored in degrees as they appear in survey documentation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Facility {
    pub origin_easting: f64,
    pub origin_northing: f64,
    pub origin_lat: f64,
    /// Degrees west, positive.
    pub origin_lon_west: f64,
    pub metres_per_degree_lat: f64,
    pub metres_per_degree_lon: f64,
    /// Rotation of the FRF Y axis from true north.
    pub grid_angle_deg: f64,
    /// Angle from the FRF frame to the state plane grid.
    pub state_plane_angle_deg: f64,
    pub state_plane_min_easting: f64,
    pub state_plane_min_northing: f64,
    pub frf_max_abs: f64,
}

impl Default for Facility {
    fn default() -> Self {
        Self {
            origin_easting: 901951.6805,
            origin_northing: 274093.1562,
            origin_lat: 36.1775975,
            origin_lon_west: 75.7496860,
            metres_per_degree_lat: 110963.35726,
            metres_per_degree_lon: 89953.36413,
            grid_angle_deg: 18.1465,
            state_plane_angle_deg: 69.974707831,
            state_plane_min_easting: 800000.0,
            state_plane_min_northing: 200000.0,
            frf_max_abs: 10000.0,
        }
    }
}

// Offset from the FRF origin; `bearing` is in radians clockwise from the FRF +Y axis.
#[derive(Debug, Clone, Copy)]
struct PolarOffset {
    radius: f64,
    bearing: f64,
}

impl Facility {
    fn grid_angle(&self) -> f64 {
        self.grid_angle_deg.to_radians()
    }

    fn state_plane_rotation(&self) -> f64 {
        (90.0 - self.state_plane_angle_deg).to_radians()
    }

    /// Classify a pair by value range. Rules are tried in order and the first match wins.
    pub fn detect(&self, p1: f64, p2: f64) -> Option<CoordinateSystem> {
        let lon_degree = self.origin_lon_west.abs().floor();
        let lat_degree = self.origin_lat.floor();
        let frf_range = -self.frf_max_abs..=self.frf_max_abs;

        if p1.abs().floor() == lon_degree && p2.floor() == lat_degree {
            Some(CoordinateSystem::Geographic)
        } else if p1 > self.state_plane_min_easting && p2 > self.state_plane_min_northing {
            Some(CoordinateSystem::StatePlane)
        } else if frf_range.contains(&p1) && frf_range.contains(&p2) {
            Some(CoordinateSystem::Frf)
        } else {
            None
        }
    }

    /// Convert a pair whose frame is known. Geographic input is (lon, lat) with either sign of
    /// longitude; state plane input is (easting, northing); FRF input is (x, y).
    pub fn transform(&self, system: CoordinateSystem, p1: f64, p2: f64) -> CoordinateTriple {
        let polar = match system {
            CoordinateSystem::Frf => self.polar_from_frf(p1, p2),
            CoordinateSystem::StatePlane => self.polar_from_state_plane(p1, p2),
            CoordinateSystem::Geographic => self.polar_from_geographic(p1, p2),
        };
        let mut triple = self.triple(polar);

        // The input frame is reported exactly as given.
        match system {
            CoordinateSystem::Frf => {
                triple.x = p1;
                triple.y = p2;
            }
            CoordinateSystem::StatePlane => {
                triple.easting = p1;
                triple.northing = p2;
            }
            CoordinateSystem::Geographic => {
                triple.lon = -p1.abs();
                triple.lat = p2;
            }
        }
        triple
    }

    /// Use `system` when the caller knows it, otherwise fall back to range detection.
    pub fn resolve(
        &self,
        p1: f64,
        p2: f64,
        system: Option<CoordinateSystem>,
    ) -> Result<CoordinateTriple, CoordError> {
        if !p1.is_finite() || !p2.is_finite() {
            return Err(CoordError::NonFinite { p1, p2 });
        }

        let system = system
            .or_else(|| self.detect(p1, p2))
            .ok_or(CoordError::DetectionAmbiguous { p1, p2 })?;

        Ok(self.transform(system, p1, p2))
    }

    /// Untagged conversion. Returns `CoordinateTriple::NAN` when the frame cannot be determined;
    /// check `is_valid` before using the result.
    pub fn frf_coord(&self, p1: f64, p2: f64) -> CoordinateTriple {
        match self.resolve(p1, p2, None) {
            Ok(triple) => triple,
            Err(e) => {
                warn!("{}, returning NaNs", e);
                CoordinateTriple::NAN
            }
        }
    }

    fn polar_from_frf(&self, x: f64, y: f64) -> PolarOffset {
        PolarOffset {
            radius: x.hypot(y),
            bearing: x.atan2(y),
        }
    }

    fn polar_from_state_plane(&self, easting: f64, northing: f64) -> PolarOffset {
        let d_east = easting - self.origin_easting;
        let d_north = northing - self.origin_northing;

        PolarOffset {
            radius: d_east.hypot(d_north),
            bearing: d_east.atan2(d_north) + self.state_plane_rotation(),
        }
    }

    fn polar_from_geographic(&self, lon: f64, lat: f64) -> PolarOffset {
        let lat_len = (lat - self.origin_lat) * self.metres_per_degree_lat;
        // West positive, so distance east of the origin is negative of the degree difference.
        let lon_len = -(lon.abs() - self.origin_lon_west) * self.metres_per_degree_lon;

        PolarOffset {
            radius: lon_len.hypot(lat_len),
            bearing: lon_len.atan2(lat_len) + self.grid_angle(),
        }
    }

    fn triple(&self, polar: PolarOffset) -> CoordinateTriple {
        let PolarOffset { radius, bearing } = polar;

        let from_north = bearing - self.grid_angle();
        let lat = radius * from_north.cos() / self.metres_per_degree_lat + self.origin_lat;
        let lon_west = radius * (-from_north).sin() / self.metres_per_degree_lon + self.origin_lon_west;

        let from_grid_north = bearing - self.state_plane_rotation();

        CoordinateTriple {
            easting: radius * from_grid_north.sin() + self.origin_easting,
            northing: radius * from_grid_north.cos() + self.origin_northing,
            x: radius * bearing.sin(),
            y: radius * bearing.cos(),
            lat,
            lon: -lon_west,
        }
    }
}
