use chrono::NaiveDate;
use ndarray::{Array1, Array2};
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

use super::{EncodeError, Field, Record};

const BUILTIN_SCHEMA: &str = include_str!("../../data/schema/grid.json");
const BUILTIN_TRANSECT_SCHEMA: &str = include_str!("../../data/schema/transect.json");

/// Output variable description.
#[derive(Debug, Clone, Deserialize)]
pub struct VariableSchema {
    /// Record field the data comes from.
    pub source: String,
    /// Name in the output file.
    pub name: String,
    pub units: String,
    #[serde(default)]
    pub fill_value: Option<f64>,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, Value>,
}

/// Declarative description of an output file: global attributes, record fields promoted to
/// global attributes and the variables to write.
#[derive(Debug, Clone, Deserialize)]
pub struct EncodingSchema {
    #[serde(default)]
    pub global_attributes: BTreeMap<String, Value>,
    #[serde(default)]
    pub data_attributes: Vec<String>,
    #[serde(default)]
    pub x_axis: Option<String>,
    #[serde(default)]
    pub y_axis: Option<String>,
    pub variables: Vec<VariableSchema>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BandPlan<'a> {
    pub name: String,
    pub data: &'a Array2<f64>,
    pub fill_value: Option<f64>,
    pub attributes: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AxisPlan<'a> {
    pub name: String,
    pub data: &'a Array1<f64>,
}

/// Everything a writer needs, resolved from a schema and a record. Metadata keys are plain;
/// writers add any driver specific prefix.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodePlan<'a> {
    pub shape: (usize, usize),
    pub bands: Vec<BandPlan<'a>>,
    pub axes: Vec<AxisPlan<'a>>,
    pub metadata: Vec<(String, String)>,
    x_axis: Option<usize>,
    y_axis: Option<usize>,
}

fn attribute_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn join(values: &Array1<f64>) -> String {
    let items: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    format!("{{{}}}", items.join(","))
}

impl EncodingSchema {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, EncodeError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let schema: EncodingSchema = serde_json::from_reader(reader)?;
        schema.validate()?;
        Ok(schema)
    }

    /// Archive gridded product layout.
    pub fn builtin() -> Result<Self, EncodeError> {
        Self::parse_str(BUILTIN_SCHEMA)
    }

    /// Archive transect product layout.
    pub fn builtin_transect() -> Result<Self, EncodeError> {
        Self::parse_str(BUILTIN_TRANSECT_SCHEMA)
    }

    fn parse_str(text: &str) -> Result<Self, EncodeError> {
        let schema: EncodingSchema = serde_json::from_str(text)?;
        schema.validate()?;
        Ok(schema)
    }

    pub fn validate(&self) -> Result<(), EncodeError> {
        if self.variables.is_empty() {
            return Err(EncodeError::Schema("no variables declared".to_string()));
        }

        let mut names = HashSet::new();
        for variable in &self.variables {
            if variable.name.is_empty() || variable.source.is_empty() {
                return Err(EncodeError::Schema(
                    "variables need both a source and a name".to_string(),
                ));
            }
            if !names.insert(variable.name.as_str()) {
                return Err(EncodeError::Schema(format!(
                    "variable '{}' declared twice",
                    variable.name
                )));
            }
        }

        for axis in [&self.x_axis, &self.y_axis].into_iter().flatten() {
            if !names.contains(axis.as_str()) {
                return Err(EncodeError::Schema(format!(
                    "axis '{}' is not a declared variable",
                    axis
                )));
            }
        }

        Ok(())
    }

    /// Resolve the schema against `record`. Variables whose source is absent from the record are
    /// skipped; `created` stamps `date_created` and `date_issued`.
    pub fn plan<'a>(
        &self,
        record: &'a Record,
        created: NaiveDate,
    ) -> Result<EncodePlan<'a>, EncodeError> {
        let mut metadata: Vec<(String, String)> = self
            .global_attributes
            .iter()
            .filter_map(|(k, v)| attribute_string(v).map(|s| (k.clone(), s)))
            .collect();

        let stamp = created.format("%Y-%m-%d").to_string();
        metadata.push(("date_created".to_string(), stamp.clone()));
        metadata.push(("date_issued".to_string(), stamp));

        for name in &self.data_attributes {
            match record.get(name) {
                Some(Field::Text(value)) => metadata.push((name.clone(), value.clone())),
                Some(Field::Scalar(value)) => metadata.push((name.clone(), value.to_string())),
                _ => debug!("Data attribute '{}' not present in record", name),
            }
        }

        let mut shape = None;
        let mut bands = Vec::new();
        let mut axes = Vec::new();

        for variable in &self.variables {
            let Some(field) = record.get(&variable.source) else {
                debug!("Skipping variable '{}': no source data", variable.name);
                continue;
            };

            let mut attributes = vec![("units".to_string(), variable.units.clone())];
            if let Some(short) = &variable.short_name {
                attributes.push(("short_name".to_string(), short.clone()));
            }
            attributes.extend(
                variable
                    .attributes
                    .iter()
                    .filter_map(|(k, v)| attribute_string(v).map(|s| (k.clone(), s))),
            );

            match field {
                Field::Grid(data) => {
                    let found = data.dim();
                    match shape {
                        None => shape = Some(found),
                        Some(expected) if expected != found => {
                            return Err(EncodeError::ShapeMismatch {
                                name: variable.name.clone(),
                                expected,
                                found,
                            });
                        }
                        Some(_) => {}
                    }
                    bands.push(BandPlan {
                        name: variable.name.clone(),
                        data,
                        fill_value: variable.fill_value,
                        attributes,
                    });
                }
                Field::Axis(data) => {
                    metadata.push((variable.name.clone(), join(data)));
                    for (key, value) in attributes {
                        metadata.push((format!("{}#{}", variable.name, key), value));
                    }
                    axes.push(AxisPlan {
                        name: variable.name.clone(),
                        data,
                    });
                }
                Field::Scalar(value) => {
                    metadata.push((variable.name.clone(), value.to_string()));
                    for (key, value) in attributes {
                        metadata.push((format!("{}#{}", variable.name, key), value));
                    }
                }
                Field::Text(value) => {
                    metadata.push((variable.name.clone(), value.clone()));
                    for (key, value) in attributes {
                        metadata.push((format!("{}#{}", variable.name, key), value));
                    }
                }
            }
        }

        let shape = shape.ok_or(EncodeError::NoGrid)?;
        let position = |name: &Option<String>| {
            name.as_ref()
                .and_then(|n| axes.iter().position(|a| &a.name == n))
        };
        let x_axis = position(&self.x_axis);
        let y_axis = position(&self.y_axis);

        for (index, expected) in [(x_axis, shape.1), (y_axis, shape.0)] {
            if let Some(index) = index {
                let axis = &axes[index];
                if axis.data.len() != expected {
                    return Err(EncodeError::ShapeMismatch {
                        name: axis.name.clone(),
                        expected: (expected, 1),
                        found: (axis.data.len(), 1),
                    });
                }
            }
        }

        Ok(EncodePlan {
            shape,
            bands,
            axes,
            metadata,
            x_axis,
            y_axis,
        })
    }
}

impl EncodePlan<'_> {
    /// Cell-edge geotransform built from the declared x and y axes, when both are present and
    /// have at least two values.
    pub fn geo_transform(&self) -> Option<[f64; 6]> {
        let x = self.axes.get(self.x_axis?)?.data;
        let y = self.axes.get(self.y_axis?)?.data;
        if x.len() < 2 || y.len() < 2 {
            return None;
        }
        let dx = x[1] - x[0];
        let dy = y[1] - y[0];
        Some([x[0] - dx / 2.0, dx, 0.0, y[0] - dy / 2.0, 0.0, dy])
    }

    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn created() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn sample_record() -> Record {
        let mut record = Record::new();
        record.insert(
            "elevation",
            Field::Grid(array![[-1.0, -999.0, -2.0], [-1.5, -2.5, -999.0]]),
        );
        record.insert("latitude", Field::Grid(Array2::zeros((2, 3))));
        record.insert("xFRF", Field::Axis(array![100.0, 110.0, 120.0]));
        record.insert("yFRF", Field::Axis(array![200.0, 205.0]));
        record.insert("time", Field::Scalar(1463011200.0));
        record.insert("project", Field::Text("FRF".to_string()));
        record
    }

    #[test]
    fn test_builtin_schema_loads() {
        let schema = EncodingSchema::builtin().unwrap();
        assert!(schema.variables.iter().any(|v| v.name == "elevation"));
        assert_eq!(schema.x_axis.as_deref(), Some("xFRF"));
    }

    #[test]
    fn test_plan_builds_bands_and_metadata() {
        let schema = EncodingSchema::builtin().unwrap();
        let record = sample_record();
        let plan = schema.plan(&record, created()).unwrap();

        assert_eq!(plan.shape, (2, 3));
        let names: Vec<&str> = plan.bands.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["elevation", "latitude"]);
        assert_eq!(plan.bands[0].fill_value, Some(-999.0));
        assert!(
            plan.bands[0]
                .attributes
                .contains(&("units".to_string(), "m".to_string()))
        );

        assert_eq!(plan.metadata_value("date_created"), Some("2024-03-01"));
        assert_eq!(plan.metadata_value("date_issued"), Some("2024-03-01"));
        assert_eq!(plan.metadata_value("project"), Some("FRF"));
        assert_eq!(plan.metadata_value("time"), Some("1463011200"));
        assert_eq!(plan.metadata_value("xFRF"), Some("{100,110,120}"));
        // null attributes are dropped
        assert_eq!(plan.metadata_value("references"), None);
    }

    #[test]
    fn test_geo_transform_is_cell_edge() {
        let schema = EncodingSchema::builtin().unwrap();
        let record = sample_record();
        let plan = schema.plan(&record, created()).unwrap();

        assert_eq!(
            plan.geo_transform(),
            Some([95.0, 10.0, 0.0, 197.5, 0.0, 5.0])
        );
    }

    #[test]
    fn test_transect_schema_plans_one_row_bands() {
        let schema = EncodingSchema::builtin_transect().unwrap();
        assert_eq!(schema.x_axis, None);

        let mut record = Record::new();
        record.insert("time", Field::Grid(array![[10.0, 20.0, 30.0]]));
        record.insert("elevation", Field::Grid(array![[-1.0, -2.0, -3.0]]));
        record.insert("surveyVehicle", Field::Scalar(5.0));
        record.insert("locality", Field::Text("39".to_string()));

        let plan = schema.plan(&record, created()).unwrap();
        assert_eq!(plan.shape, (1, 3));
        let names: Vec<&str> = plan.bands.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["time", "elevation"]);
        assert_eq!(plan.metadata_value("surveyVehicle"), Some("5"));
        assert_eq!(plan.metadata_value("locality"), Some("39"));
        assert_eq!(plan.metadata_value("featureType"), Some("trajectory"));
        assert_eq!(plan.geo_transform(), None);
    }

    #[test]
    fn test_mismatched_grids_are_rejected() {
        let schema = EncodingSchema::builtin().unwrap();
        let mut record = sample_record();
        record.insert("latitude", Field::Grid(Array2::zeros((3, 3))));

        assert!(matches!(
            schema.plan(&record, created()),
            Err(EncodeError::ShapeMismatch { ref name, .. }) if name == "latitude"
        ));
    }

    #[test]
    fn test_record_without_grid() {
        let schema = EncodingSchema::builtin().unwrap();
        let mut record = Record::new();
        record.insert("time", Field::Scalar(0.0));

        assert!(matches!(
            schema.plan(&record, created()),
            Err(EncodeError::NoGrid)
        ));
    }

    #[test]
    fn test_schema_from_file_rejects_duplicates() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"variables": [
                {{"source": "elevation", "name": "z", "units": "m"}},
                {{"source": "latitude", "name": "z", "units": "deg"}}
            ]}}"#
        )
        .unwrap();

        assert!(matches!(
            EncodingSchema::from_file(file.path()),
            Err(EncodeError::Schema(_))
        ));
    }

    #[test]
    fn test_schema_axis_must_be_declared() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"x_axis": "x", "variables": [{{"source": "elevation", "name": "z", "units": "m"}}]}}"#
        )
        .unwrap();

        assert!(matches!(
            EncodingSchema::from_file(file.path()),
            Err(EncodeError::Schema(_))
        ));
    }
}
