//! Schema-driven encoding of converted surveys.
//!
//! A conversion produces a [`Record`] of named fields. An [`EncodingSchema`] lists which fields
//! become output variables, their units and attributes, and which fields are promoted to global
//! attributes. [`EncodingSchema::plan`] resolves the two into an [`EncodePlan`] that any
//! [`GridWriter`] can persist.

use std::path::Path;

pub mod error;
#[cfg(feature = "gdal")]
pub mod gdal_writer;
pub mod json_writer;
pub mod record;
pub mod schema;

pub use error::EncodeError;
#[cfg(feature = "gdal")]
pub use gdal_writer::GdalWriter;
pub use json_writer::JsonWriter;
pub use record::{Field, Record};
pub use schema::{AxisPlan, BandPlan, EncodePlan, EncodingSchema, VariableSchema};

/// Persists a resolved plan. Implementations must not leave a partial file at `path` when they
/// fail.
pub trait GridWriter {
    fn write(&self, plan: &EncodePlan<'_>, path: &Path) -> Result<(), EncodeError>;
}
