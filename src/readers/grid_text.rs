use super::{IngestError, SurveyPoints, SurveyReader};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::path::PathBuf;
use tracing::warn;

/// Comma separated gridded survey text product.
///
/// Rows are either `x,y,z` or `lon,lat,z,x,y`. A single-value row is the point count written by
/// some gridding tools; blank rows are skipped.
pub struct GridTextReader {
    pub file_name: PathBuf,
}

pub(super) fn number(record: &StringRecord, index: usize, line: u64) -> Result<f64, IngestError> {
    let field = record.get(index).unwrap_or_default();
    field.parse().map_err(|_| IngestError::Number {
        line,
        value: field.to_string(),
    })
}

impl SurveyReader for GridTextReader {
    fn read_points(&self) -> Result<SurveyPoints, IngestError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_path(&self.file_name)?;

        let mut points = SurveyPoints::default();

        for result in reader.records() {
            let record = result?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();

            match record.len() {
                0 => continue,
                1 if record[0].is_empty() => continue,
                1 => {
                    let count = record[0].parse().map_err(|_| IngestError::Number {
                        line,
                        value: record[0].to_string(),
                    })?;
                    points.declared_count = Some(count);
                }
                3 => {
                    points.x.push(number(&record, 0, line)?);
                    points.y.push(number(&record, 1, line)?);
                    points.z.push(number(&record, 2, line)?);
                }
                5 => {
                    points.lon.push(number(&record, 0, line)?);
                    points.lat.push(number(&record, 1, line)?);
                    points.z.push(number(&record, 2, line)?);
                    points.x.push(number(&record, 3, line)?);
                    points.y.push(number(&record, 4, line)?);
                }
                columns => return Err(IngestError::Format { line, columns }),
            }
        }

        if let Some(count) = points.declared_count
            && count != points.len()
        {
            warn!(
                "{} declares {} points but contains {}",
                self.file_name.display(),
                count,
                points.len()
            );
        }

        Ok(points)
    }
}
