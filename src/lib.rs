//! Conversion of Field Research Facility survey grids and transects into the archive products.
//!
//! The gridded pipeline is: file name grammar ([`metadata`]) and text ingest ([`readers`]),
//! placement on the fixed archive grid ([`grid`]) with per-cell coordinates from [`coords`], then
//! schema-driven encoding ([`encoder`]). Transect files skip the grid and are encoded point by
//! point in time order. [`batch`] runs both over a directory. [`angles`] and [`stats`] are the
//! supporting directional and skill utilities.

pub mod angles;
pub mod batch;
pub mod bbox;
pub mod config;
pub mod coords;
pub mod encoder;
pub mod grid;
pub mod metadata;
pub mod readers;
pub mod stats;

pub use batch::{BatchError, BatchRunner, BatchSummary, SurveyError};
pub use config::{Config, ConfigError};
pub use coords::{CoordinateSystem, CoordinateTriple, Facility};
pub use grid::{FilledGrid, GridTemplate};

/// Install the global `tracing` subscriber. `RUST_LOG` overrides the default `info` level.
pub fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(false).init();
}
