use chrono::NaiveDate;
use serde::Deserialize;
use std::path::Path;

use super::{
    Instrument, MetadataError, Platform, SurveyMetadata, TransectMetadata, TransectPlatform,
};

/// Meaning of one underscore-delimited file name token.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Ignore,
    Literal(String),
    SurveyDate,
    SurveyNumber,
    Project,
    Datum,
    Platform,
    Instrument,
    VersionDate,
}

/// Ordered list of token kinds, one per position in `stem.split('_')`. Tokens past the end of the
/// grammar are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct FilenameGrammar {
    fields: Vec<FieldKind>,
}

impl Default for FilenameGrammar {
    /// `FRF_<date>_<number>_<project>_<datum>_<platform>_<instrument>_<tz>_v<date>_...`
    fn default() -> Self {
        Self {
            fields: vec![
                FieldKind::Ignore,
                FieldKind::SurveyDate,
                FieldKind::SurveyNumber,
                FieldKind::Project,
                FieldKind::Datum,
                FieldKind::Platform,
                FieldKind::Instrument,
                FieldKind::Ignore,
                FieldKind::VersionDate,
            ],
        }
    }
}

fn parse_date(token: &str, field: &'static str) -> Result<NaiveDate, MetadataError> {
    let invalid = || MetadataError::InvalidDate {
        field,
        token: token.to_string(),
    };

    if token.len() != 8 || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(token, "%Y%m%d").map_err(|_| invalid())
}

impl FilenameGrammar {
    // Token at the position of `kind`, failing when the grammar has no such field or the name is
    // too short.
    fn token<'a>(
        &self,
        tokens: &[&'a str],
        kind: &FieldKind,
        field: &'static str,
    ) -> Result<Option<&'a str>, MetadataError> {
        let Some(index) = self.fields.iter().position(|f| f == kind) else {
            return Ok(None);
        };
        tokens
            .get(index)
            .copied()
            .filter(|t| !t.is_empty())
            .map(Some)
            .ok_or(MetadataError::MissingField { field, index })
    }

    fn required<'a>(
        &self,
        tokens: &[&'a str],
        kind: FieldKind,
        field: &'static str,
    ) -> Result<&'a str, MetadataError> {
        self.token(tokens, &kind, field)?
            .ok_or(MetadataError::UndefinedField(field))
    }

    // Underscore tokens of the file stem, after the literal fields have been checked.
    fn tokens<'a>(&self, path: &'a Path) -> Result<Vec<&'a str>, MetadataError> {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| MetadataError::NonUtf8(path.to_string_lossy().to_string()))?;
        let tokens: Vec<&str> = stem.split('_').collect();

        for (index, kind) in self.fields.iter().enumerate() {
            if let FieldKind::Literal(expected) = kind {
                let found = tokens.get(index).copied().unwrap_or_default();
                if found != expected {
                    return Err(MetadataError::LiteralMismatch {
                        index,
                        expected: expected.clone(),
                        found: found.to_string(),
                    });
                }
            }
        }

        Ok(tokens)
    }

    fn survey_date(&self, tokens: &[&str]) -> Result<NaiveDate, MetadataError> {
        parse_date(
            self.required(tokens, FieldKind::SurveyDate, "survey date")?,
            "survey date",
        )
    }

    /// Parse the stem of `path` (extension removed) into survey metadata.
    pub fn parse<P: AsRef<Path>>(&self, path: P) -> Result<SurveyMetadata, MetadataError> {
        let tokens = self.tokens(path.as_ref())?;
        let survey_date = self.survey_date(&tokens)?;

        let number = self.required(&tokens, FieldKind::SurveyNumber, "survey number")?;
        if number.len() != 4 || !number.bytes().all(|b| b.is_ascii_digit()) {
            return Err(MetadataError::InvalidSurveyNumber(number.to_string()));
        }
        let survey_number = number
            .parse()
            .map_err(|_| MetadataError::InvalidSurveyNumber(number.to_string()))?;

        let project = self
            .required(&tokens, FieldKind::Project, "project")?
            .to_string();
        let datum = self
            .token(&tokens, &FieldKind::Datum, "datum")?
            .map(str::to_string);
        let platform =
            Platform::from_token(self.required(&tokens, FieldKind::Platform, "platform")?)?;
        let instrument = Instrument::from_token(self.required(
            &tokens,
            FieldKind::Instrument,
            "instrument",
        )?)?;

        let version = self.required(&tokens, FieldKind::VersionDate, "version")?;
        let version_date = match version.strip_prefix('v') {
            Some(digits) => parse_date(digits, "version")?,
            None => {
                return Err(MetadataError::InvalidDate {
                    field: "version",
                    token: version.to_string(),
                });
            }
        };

        Ok(SurveyMetadata {
            survey_date,
            survey_number,
            project,
            datum,
            platform,
            instrument,
            version_date,
        })
    }

    /// Transect files only name their date and vessel; everything else is per point.
    pub fn parse_transect<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<TransectMetadata, MetadataError> {
        let tokens = self.tokens(path.as_ref())?;
        let survey_date = self.survey_date(&tokens)?;
        let platform =
            TransectPlatform::from_token(self.required(&tokens, FieldKind::Platform, "platform")?);

        Ok(TransectMetadata {
            survey_date,
            platform,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAME: &str = "FRF_20160512_1113_FRF_NAVD88_LARC_GPS_UTC_v20160518_grid_latlon.txt";

    #[test]
    fn test_parse_archive_name() {
        let meta = FilenameGrammar::default().parse(NAME).unwrap();

        assert_eq!(
            meta.survey_date,
            NaiveDate::from_ymd_opt(2016, 5, 12).unwrap()
        );
        assert_eq!(meta.survey_number, 1113);
        assert_eq!(meta.project, "FRF");
        assert_eq!(meta.datum.as_deref(), Some("NAVD88"));
        assert_eq!(meta.platform, Platform::Larc);
        assert_eq!(meta.instrument, Instrument::Gps);
        assert_eq!(
            meta.version_date,
            NaiveDate::from_ymd_opt(2016, 5, 18).unwrap()
        );
    }

    #[test]
    fn test_parse_uses_file_name_only() {
        let path = Path::new("/data/archive/2016").join(NAME);
        assert!(FilenameGrammar::default().parse(path).is_ok());
    }

    #[test]
    fn test_unknown_platform_is_a_field_error() {
        let name = "FRF_20160512_1113_FRF_NAVD88_JETSKI_GPS_UTC_v20160518_grid_latlon.txt";
        assert_eq!(
            FilenameGrammar::default().parse(name),
            Err(MetadataError::UnknownPlatform("JETSKI".to_string()))
        );
    }

    #[test]
    fn test_unknown_instrument_is_a_field_error() {
        let name = "FRF_20160512_1113_FRF_NAVD88_CRAB_LIDAR_UTC_v20160518_grid_latlon.txt";
        assert_eq!(
            FilenameGrammar::default().parse(name),
            Err(MetadataError::UnknownInstrument("LIDAR".to_string()))
        );
    }

    #[test]
    fn test_bad_dates_and_numbers() {
        let grammar = FilenameGrammar::default();

        let bad_date = "FRF_20161312_1113_FRF_NAVD88_CRAB_GPS_UTC_v20160518.txt";
        assert!(matches!(
            grammar.parse(bad_date),
            Err(MetadataError::InvalidDate {
                field: "survey date",
                ..
            })
        ));

        let bad_version = "FRF_20160512_1113_FRF_NAVD88_CRAB_GPS_UTC_20160518.txt";
        assert!(matches!(
            grammar.parse(bad_version),
            Err(MetadataError::InvalidDate {
                field: "version",
                ..
            })
        ));

        let bad_number = "FRF_20160512_113_FRF_NAVD88_CRAB_GPS_UTC_v20160518.txt";
        assert_eq!(
            grammar.parse(bad_number),
            Err(MetadataError::InvalidSurveyNumber("113".to_string()))
        );
    }

    #[test]
    fn test_short_name_reports_missing_field() {
        let short = "FRF_20160512_1113_FRF_NAVD88_CRAB_GPS.txt";
        assert_eq!(
            FilenameGrammar::default().parse(short),
            Err(MetadataError::MissingField {
                field: "version",
                index: 8
            })
        );
    }

    #[test]
    fn test_parse_transect_name() {
        let grammar = FilenameGrammar::default();

        let meta = grammar
            .parse_transect("FRF_20160512_1113_FRF_NAVD88_CRAB-Sled_GPS_UTC_v20160518.csv")
            .unwrap();
        assert_eq!(
            meta.survey_date,
            NaiveDate::from_ymd_opt(2016, 5, 12).unwrap()
        );
        assert_eq!(meta.platform, TransectPlatform::CrabSled);
        assert_eq!(meta.date_token(), "20160512");

        // vessels outside the known list are kept, and the instrument token is not read
        let meta = grammar
            .parse_transect("FRF_20160512_1113_FRF_NAVD88_JETSKI_LIDAR_UTC_v20160518.csv")
            .unwrap();
        assert_eq!(meta.platform, TransectPlatform::Other("JETSKI".to_string()));

        assert!(matches!(
            grammar.parse_transect("FRF_2016_1113_FRF_NAVD88_LARC.csv"),
            Err(MetadataError::InvalidDate { .. })
        ));
    }

    #[test]
    fn test_custom_grammar_from_json() {
        let grammar: FilenameGrammar = serde_json::from_str(
            r#"[{"literal": "DUCK"}, "platform", "instrument", "survey_date", "survey_number",
                "project", "version_date"]"#,
        )
        .unwrap();

        let meta = grammar
            .parse("DUCK_crab_zeiss_19991004_0042_Nourish_v20000101.xyz")
            .unwrap();
        assert_eq!(meta.platform, Platform::Crab);
        assert_eq!(meta.instrument, Instrument::Zeiss);
        assert_eq!(meta.survey_number, 42);
        assert_eq!(meta.datum, None);

        assert!(matches!(
            grammar.parse("FRF_crab_zeiss_19991004_0042_Nourish_v20000101.xyz"),
            Err(MetadataError::LiteralMismatch { index: 0, .. })
        ));
    }
}
