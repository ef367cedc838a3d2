use super::grid_text::number;
use super::{IngestError, TransectPoint, TransectPoints};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Comma separated transect product, one surveyed point per row and no header:
///
/// `locality, profile, survey, lat, lon, northing, easting, xFRF, yFRF, elevation, ellipsoid,
/// YYYYMMDD, hhmmss.ff[, seconds past midnight]`
///
/// Rows whose date and time do not form a timestamp are dropped. The remaining points are
/// returned in time order.
pub struct TransectReader {
    pub file_name: PathBuf,
}

fn integer(record: &StringRecord, index: usize, line: u64) -> Result<i64, IngestError> {
    let field = record.get(index).unwrap_or_default();
    field.parse().map_err(|_| IngestError::Number {
        line,
        value: field.to_string(),
    })
}

fn timestamp(date: &str, time: &str) -> Option<NaiveDateTime> {
    let date = NaiveDate::parse_from_str(date, "%Y%m%d").ok()?;
    let time = NaiveTime::parse_from_str(time, "%H%M%S%.f").ok()?;
    Some(date.and_time(time))
}

impl TransectReader {
    pub fn read_transect(&self) -> Result<TransectPoints, IngestError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_path(&self.file_name)?;

        let mut transect = TransectPoints::default();

        for result in reader.records() {
            let record = result?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();

            match record.len() {
                0 => continue,
                1 if record[0].is_empty() => continue,
                13 | 14 => {}
                columns => return Err(IngestError::Format { line, columns }),
            }

            let locality = record[0].to_string();
            let profile = integer(&record, 1, line)?;
            let survey_number = integer(&record, 2, line)?;
            let lat = number(&record, 3, line)?;
            let lon = number(&record, 4, line)?;
            let northing = number(&record, 5, line)?;
            let easting = number(&record, 6, line)?;
            let x = number(&record, 7, line)?;
            let y = number(&record, 8, line)?;
            let elevation = number(&record, 9, line)?;
            // the ellipsoid column is optional
            let ellipsoid = if record[10].is_empty() {
                f64::NAN
            } else {
                number(&record, 10, line)?
            };

            let Some(time) = timestamp(&record[11], &record[12]) else {
                debug!(
                    "line {}: '{} {}' is not a timestamp",
                    line, &record[11], &record[12]
                );
                transect.dropped += 1;
                continue;
            };

            transect.points.push(TransectPoint {
                locality,
                profile,
                survey_number,
                lat,
                lon,
                northing,
                easting,
                x,
                y,
                elevation,
                ellipsoid,
                time,
            });
        }

        if transect.dropped > 0 {
            warn!(
                "{}: dropped {} rows with unreadable timestamps",
                self.file_name.display(),
                transect.dropped
            );
        }
        if transect.points.is_empty() {
            return Err(IngestError::NoPoints(self.file_name.display().to_string()));
        }

        transect.points.sort_by_key(|p| p.time);
        Ok(transect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::readers::{create_reader, read_transect_file};
    use std::fs;
    use tempfile::tempdir;

    fn row(profile: i64, x: f64, time: &str) -> String {
        format!(
            "39,{},1113,36.18,-75.75,274000.0,902000.0,{},500.0,-1.25,,20160512,{},0\n",
            profile, x, time
        )
    }

    #[test]
    fn test_points_are_sorted_by_time() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("transect.csv");
        let text = [
            row(62, 120.0, "143010.50"),
            row(62, 100.0, "143000.00"),
            row(64, 110.0, "143005.25"),
        ]
        .concat();
        fs::write(&path, text).unwrap();

        let transect = TransectReader { file_name: path }.read_transect().unwrap();

        assert_eq!(transect.len(), 3);
        assert_eq!(transect.dropped, 0);
        let xs: Vec<f64> = transect.points.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![100.0, 110.0, 120.0]);

        let first = &transect.points[0];
        assert_eq!(first.locality, "39");
        assert_eq!(first.profile, 62);
        assert_eq!(first.survey_number, 1113);
        assert_eq!(first.elevation, -1.25);
        assert!(first.ellipsoid.is_nan());
        assert_eq!(
            first.time,
            NaiveDate::from_ymd_opt(2016, 5, 12)
                .unwrap()
                .and_hms_opt(14, 30, 0)
                .unwrap()
        );
        assert_eq!(
            transect.points[1].time.and_utc().timestamp_millis() % 1000,
            250
        );
    }

    #[test]
    fn test_bad_timestamps_are_dropped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("transect.csv");
        let text = [
            row(62, 100.0, "143000.00"),
            row(62, 105.0, "996100.00"),
            row(62, 110.0, "not-a-time"),
            row(62, 115.0, "143001.00"),
        ]
        .concat();
        fs::write(&path, text).unwrap();

        let transect = read_transect_file(&path).unwrap();
        assert_eq!(transect.len(), 2);
        assert_eq!(transect.dropped, 2);
    }

    #[test]
    fn test_only_bad_timestamps_fails_the_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("transect.csv");
        fs::write(&path, row(62, 100.0, "xx")).unwrap();

        assert!(matches!(
            read_transect_file(&path),
            Err(IngestError::NoPoints(_))
        ));
    }

    #[test]
    fn test_malformed_rows_fail_the_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("short.csv");
        fs::write(&path, "39,62,1113,36.18,-75.75\n").unwrap();
        assert!(matches!(
            read_transect_file(&path),
            Err(IngestError::Format {
                line: 1,
                columns: 5
            })
        ));

        let path = dir.path().join("profile.csv");
        fs::write(&path, row(62, 100.0, "143000.00").replacen(",62,", ",6x,", 1)).unwrap();
        assert!(matches!(
            read_transect_file(&path),
            Err(IngestError::Number { line: 1, ref value }) if value == "6x"
        ));
    }

    #[test]
    fn test_transects_are_not_grids() {
        assert!(matches!(
            create_reader(PathBuf::from("FRF_20160512_transect.csv")),
            Err(IngestError::NotGridded(_))
        ));
    }
}
