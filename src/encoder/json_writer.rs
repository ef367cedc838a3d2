use serde_json::{Map, Value, json};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use super::{EncodeError, EncodePlan, GridWriter};

/// Writes the plan as a JSON document. Used when GDAL is unavailable and for inspecting what a
/// schema produces.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonWriter;

fn number(value: f64) -> Value {
    // NaN and infinities have no JSON form
    serde_json::Number::from_f64(value).map_or(Value::Null, Value::Number)
}

pub fn plan_to_json(plan: &EncodePlan<'_>) -> Value {
    let attributes: Map<String, Value> = plan
        .metadata
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();

    let axes: Map<String, Value> = plan
        .axes
        .iter()
        .map(|axis| (axis.name.clone(), axis.data.iter().copied().map(number).collect()))
        .collect();

    let variables: Map<String, Value> = plan
        .bands
        .iter()
        .map(|band| {
            let rows: Vec<Value> = band
                .data
                .rows()
                .into_iter()
                .map(|row| row.iter().copied().map(number).collect())
                .collect();
            let attributes: Map<String, Value> = band
                .attributes
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect();
            (
                band.name.clone(),
                json!({
                    "fill_value": band.fill_value.map(number),
                    "attributes": attributes,
                    "data": rows,
                }),
            )
        })
        .collect();

    json!({
        "shape": [plan.shape.0, plan.shape.1],
        "attributes": attributes,
        "axes": axes,
        "variables": variables,
    })
}

impl GridWriter for JsonWriter {
    fn write(&self, plan: &EncodePlan<'_>, path: &Path) -> Result<(), EncodeError> {
        let document = plan_to_json(plan);
        let staging = path.with_extension("partial");

        let result = File::create(&staging)
            .map_err(EncodeError::from)
            .and_then(|file| {
                let mut writer = BufWriter::new(file);
                serde_json::to_writer(&mut writer, &document)?;
                writer.flush()?;
                Ok(())
            })
            .and_then(|_| fs::rename(&staging, path).map_err(EncodeError::from));

        if result.is_err() && staging.exists() {
            fs::remove_file(&staging)?;
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::{EncodingSchema, Field, Record};
    use chrono::NaiveDate;
    use ndarray::array;
    use tempfile::tempdir;

    #[test]
    fn test_writes_plan_document() {
        let mut record = Record::new();
        record.insert("elevation", Field::Grid(array![[1.0, -999.0], [f64::NAN, 2.5]]));
        record.insert("xFRF", Field::Axis(array![0.0, 10.0]));
        record.insert("yFRF", Field::Axis(array![0.0, 10.0]));

        let schema = EncodingSchema::builtin().unwrap();
        let plan = schema
            .plan(&record, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
            .unwrap();

        let dir = tempdir().unwrap();
        let path = dir.path().join("dem.json");
        JsonWriter.write(&plan, &path).unwrap();

        let value: Value = serde_json::from_reader(File::open(&path).unwrap()).unwrap();
        assert_eq!(value["shape"], json!([2, 2]));
        assert_eq!(value["variables"]["elevation"]["fill_value"], json!(-999.0));
        assert_eq!(value["variables"]["elevation"]["data"][0][0], json!(1.0));
        assert_eq!(value["variables"]["elevation"]["data"][1][0], Value::Null);
        assert_eq!(value["attributes"]["date_created"], json!("2024-01-01"));
        assert!(!dir.path().join("dem.partial").exists());
    }

    #[test]
    fn test_failed_write_leaves_nothing() {
        let mut record = Record::new();
        record.insert("elevation", Field::Grid(array![[1.0]]));
        let schema = EncodingSchema::builtin().unwrap();
        let plan = schema
            .plan(&record, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
            .unwrap();

        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("dem.json");
        assert!(JsonWriter.write(&plan, &path).is_err());
        assert!(!path.exists());
    }
}
