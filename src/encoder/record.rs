use chrono::NaiveTime;
use ndarray::{Array1, Array2, Axis};
use std::collections::{BTreeMap, BTreeSet};

use crate::grid::FilledGrid;
use crate::metadata::TransectMetadata;
use crate::readers::{TransectPoint, TransectPoints};

/// Width of the fixed-length project string in the archive files.
const PROJECT_WIDTH: usize = 16;

/// One named value handed to the encoder.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Grid(Array2<f64>),
    Axis(Array1<f64>),
    Scalar(f64),
    Text(String),
}

/// Named fields produced by a conversion, keyed by the names a schema's `source` refers to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: BTreeMap<String, Field>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, field: Field) {
        self.fields.insert(name.into(), field);
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.fields.get(name) {
            Some(Field::Text(value)) => Some(value),
            _ => None,
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FilledGrid {
    /// Flatten the product into the named fields the archive schema writes.
    pub fn to_record(&self) -> Record {
        let mut record = Record::new();
        let meta = &self.metadata;

        record.insert("elevation", Field::Grid(self.elevation.clone()));
        record.insert("latitude", Field::Grid(self.lat.clone()));
        record.insert("longitude", Field::Grid(self.lon.clone()));
        record.insert("easting", Field::Grid(self.easting.clone()));
        record.insert("northing", Field::Grid(self.northing.clone()));
        record.insert("xFRF", Field::Axis(self.x.clone()));
        record.insert("yFRF", Field::Axis(self.y.clone()));
        record.insert("time", Field::Scalar(meta.time() as f64));
        record.insert(
            "surveyNumber",
            Field::Scalar(f64::from(meta.survey_number)),
        );
        record.insert(
            "surveyVehicle",
            Field::Scalar(f64::from(meta.platform.code())),
        );
        record.insert(
            "surveyInstrumentation",
            Field::Scalar(f64::from(meta.instrument.code())),
        );
        record.insert("versionDate", Field::Scalar(meta.version_time() as f64));
        record.insert(
            "project",
            Field::Text(format!("{:<width$}", meta.project, width = PROJECT_WIDTH)),
        );
        if let Some(datum) = &meta.datum {
            record.insert("datum", Field::Text(datum.clone()));
        }

        record
    }
}

// Per-point columns become one-row grids so transects go through the same writers as DEMs.
fn series(points: &[TransectPoint], value: impl Fn(&TransectPoint) -> f64) -> Field {
    let column: Array1<f64> = points.iter().map(value).collect();
    Field::Grid(column.insert_axis(Axis(0)))
}

impl TransectPoints {
    /// Named fields of the transect product, one value per point in time order.
    pub fn to_record(&self, metadata: &TransectMetadata) -> Record {
        let mut record = Record::new();
        let points = &self.points;

        record.insert(
            "time",
            series(points, |p| p.time.and_utc().timestamp_millis() as f64 / 1000.0),
        );
        record.insert(
            "date",
            series(points, |p| {
                p.time.date().and_time(NaiveTime::MIN).and_utc().timestamp() as f64
            }),
        );
        record.insert("xFRF", series(points, |p| p.x));
        record.insert("yFRF", series(points, |p| p.y));
        record.insert("elevation", series(points, |p| p.elevation));
        record.insert("latitude", series(points, |p| p.lat));
        record.insert("longitude", series(points, |p| p.lon));
        record.insert("easting", series(points, |p| p.easting));
        record.insert("northing", series(points, |p| p.northing));
        record.insert("ellipsoid", series(points, |p| p.ellipsoid));
        record.insert("profileNumber", series(points, |p| p.profile as f64));
        record.insert("surveyNumber", series(points, |p| p.survey_number as f64));
        record.insert(
            "surveyVehicle",
            Field::Scalar(f64::from(metadata.platform.code())),
        );

        let localities: BTreeSet<&str> = points.iter().map(|p| p.locality.as_str()).collect();
        record.insert(
            "locality",
            Field::Text(localities.into_iter().collect::<Vec<_>>().join(",")),
        );

        record
    }
}
