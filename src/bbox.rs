use serde::Deserialize;

/// Axis-aligned bounds in the local FRF frame (metres).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Bbox {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl Bbox {
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Result<Self, String> {
        if ![xmin, xmax, ymin, ymax].iter().all(|v| v.is_finite()) {
            return Err("Bounds must be finite numbers".to_string());
        }

        if xmin >= xmax || ymin >= ymax {
            return Err("Min values must be < max values".to_string());
        }

        Ok(Bbox {
            xmin,
            xmax,
            ymin,
            ymax,
        })
    }

    /// Facility-wide archive extent used for every gridded survey DEM.
    pub fn frf_archive() -> Self {
        Bbox {
            xmin: 50.0,
            xmax: 950.0,
            ymin: -100.0,
            ymax: 1100.0,
        }
    }

    pub fn x_span(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn y_span(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// Whether `x` lies within the x bounds widened by `tolerance` on both sides.
    pub fn contains_x(&self, x: f64, tolerance: f64) -> bool {
        (self.xmin - tolerance..=self.xmax + tolerance).contains(&x)
    }

    pub fn contains_y(&self, y: f64, tolerance: f64) -> bool {
        (self.ymin - tolerance..=self.ymax + tolerance).contains(&y)
    }
}

impl Default for Bbox {
    fn default() -> Self {
        Self::frf_archive()
    }
}
