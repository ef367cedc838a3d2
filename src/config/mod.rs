use glob::Pattern;
use serde::Deserialize;
use serde::Deserializer;
use serde::de::Error;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::bbox::Bbox;
use crate::coords::Facility;
use crate::grid::GridTemplate;
use crate::metadata::FilenameGrammar;

pub mod error;
pub use error::ConfigError;

const DEFAULT_GRID_PATTERN: &str = "FRF_*latlon.txt";
const DEFAULT_TRANSECT_PATTERN: &str = "FRF_*.csv";
const DEFAULT_LOG_FILE: &str = "Bathy_LOG.log";
const DEFAULT_OUTPUT_STEM: &str = "FRF_geomorphology_DEMs_surveyDEM_{}";
const DEFAULT_TRANSECT_OUTPUT_STEM: &str = "FRF-geomorphology_elevationTransects_survey_{}";
const DEFAULT_DRIVER: &str = "netCDF";

/// Extension given to default output names for `driver`.
fn extension(driver: &str) -> &'static str {
    match driver.to_ascii_lowercase().as_str() {
        "json" => "json",
        "gtiff" => "tif",
        _ => "nc",
    }
}

fn output_pattern(
    pattern: Option<String>,
    stem: &str,
    driver: &str,
    field: &'static str,
) -> Result<String, ConfigError> {
    let pattern = pattern.unwrap_or_else(|| format!("{}.{}", stem, extension(driver)));
    if !pattern.contains("{}") {
        return Err(ConfigError::FilenamePattern { field, pattern });
    }
    Ok(pattern)
}

/// Immutable run configuration. Everything a batch needs is here, including the facility
/// constants and target grid, so several configurations can coexist in one process.
#[derive(Debug, Clone)]
pub struct Config {
    input_directory: PathBuf,
    output_directory: PathBuf,
    grid_pattern: Pattern,
    transect_pattern: Pattern,
    recursive: bool,
    log_file: String,
    output_filename_pattern: String,
    transect_filename_pattern: String,
    schema: Option<PathBuf>,
    transect_schema: Option<PathBuf>,
    driver: String,
    template: GridTemplate,
    facility: Facility,
    filename_grammar: FilenameGrammar,
}

fn validate_template(template: &GridTemplate) -> Result<(), ConfigError> {
    let b = template.bbox;
    Bbox::new(b.xmin, b.xmax, b.ymin, b.ymax).map_err(ConfigError::Bbox)?;

    if !template.snap_tolerance.is_finite() || template.snap_tolerance < 0.0 {
        return Err(ConfigError::SnapTolerance(template.snap_tolerance));
    }

    if let Some(spacing) = template.spacing {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(spacing.dx) || !positive(spacing.dy) {
            return Err(ConfigError::Spacing {
                dx: spacing.dx,
                dy: spacing.dy,
            });
        }
    }

    Ok(())
}

fn compile_pattern(pattern: &str) -> Result<Pattern, ConfigError> {
    Pattern::new(pattern).map_err(|source| ConfigError::GridPattern {
        pattern: pattern.to_string(),
        source,
    })
}

// Deserializes into a helper first, then validates the bounds, tolerance, spacing and file name
// patterns before building the public record.
impl<'de> Deserialize<'de> for Config {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct ConfigHelper {
            input_directory: PathBuf,
            output_directory: PathBuf,
            grid_pattern: Option<String>,
            transect_pattern: Option<String>,
            #[serde(default)]
            recursive: bool,
            log_file: Option<String>,
            output_filename_pattern: Option<String>,
            transect_filename_pattern: Option<String>,
            schema: Option<PathBuf>,
            transect_schema: Option<PathBuf>,
            driver: Option<String>,
            #[serde(default)]
            template: GridTemplate,
            #[serde(default)]
            facility: Facility,
            #[serde(default)]
            filename_grammar: FilenameGrammar,
        }

        let helper = ConfigHelper::deserialize(deserializer)?;

        validate_template(&helper.template).map_err(D::Error::custom)?;

        let grid_pattern = helper
            .grid_pattern
            .unwrap_or_else(|| DEFAULT_GRID_PATTERN.to_string());
        let grid_pattern = compile_pattern(&grid_pattern).map_err(D::Error::custom)?;
        let transect_pattern = helper
            .transect_pattern
            .unwrap_or_else(|| DEFAULT_TRANSECT_PATTERN.to_string());
        let transect_pattern = compile_pattern(&transect_pattern).map_err(D::Error::custom)?;

        let log_file = helper
            .log_file
            .unwrap_or_else(|| DEFAULT_LOG_FILE.to_string());
        if log_file.is_empty() {
            return Err(D::Error::custom(ConfigError::Empty("log_file")));
        }

        let driver = helper
            .driver
            .unwrap_or_else(|| DEFAULT_DRIVER.to_string());
        if driver.is_empty() {
            return Err(D::Error::custom(ConfigError::Empty("driver")));
        }

        let output_filename_pattern = output_pattern(
            helper.output_filename_pattern,
            DEFAULT_OUTPUT_STEM,
            &driver,
            "output_filename_pattern",
        )
        .map_err(D::Error::custom)?;
        let transect_filename_pattern = output_pattern(
            helper.transect_filename_pattern,
            DEFAULT_TRANSECT_OUTPUT_STEM,
            &driver,
            "transect_filename_pattern",
        )
        .map_err(D::Error::custom)?;

        Ok(Config {
            input_directory: helper.input_directory,
            output_directory: helper.output_directory,
            grid_pattern,
            transect_pattern,
            recursive: helper.recursive,
            log_file,
            output_filename_pattern,
            transect_filename_pattern,
            schema: helper.schema,
            transect_schema: helper.transect_schema,
            driver,
            template: helper.template,
            facility: helper.facility,
            filename_grammar: helper.filename_grammar,
        })
    }
}

impl Config {
    /// Defaults for everything except the two directories.
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(input_directory: P, output_directory: Q) -> Self {
        Self {
            input_directory: input_directory.into(),
            output_directory: output_directory.into(),
            grid_pattern: Pattern::new(DEFAULT_GRID_PATTERN).unwrap_or_default(),
            transect_pattern: Pattern::new(DEFAULT_TRANSECT_PATTERN).unwrap_or_default(),
            recursive: false,
            log_file: DEFAULT_LOG_FILE.to_string(),
            output_filename_pattern: format!("{}.{}", DEFAULT_OUTPUT_STEM, extension(DEFAULT_DRIVER)),
            transect_filename_pattern: format!(
                "{}.{}",
                DEFAULT_TRANSECT_OUTPUT_STEM,
                extension(DEFAULT_DRIVER)
            ),
            schema: None,
            transect_schema: None,
            driver: DEFAULT_DRIVER.to_string(),
            template: GridTemplate::default(),
            facility: Facility::default(),
            filename_grammar: FilenameGrammar::default(),
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let config: Config = serde_json::from_reader(reader).map_err(ConfigError::from)?;

        Ok(config)
    }

    /// Copy of this configuration reading from another directory.
    pub fn with_input_directory<P: Into<PathBuf>>(&self, input_directory: P) -> Self {
        Self {
            input_directory: input_directory.into(),
            ..self.clone()
        }
    }

    pub fn input_directory(&self) -> &Path {
        &self.input_directory
    }

    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    pub fn grid_pattern(&self) -> &Pattern {
        &self.grid_pattern
    }

    pub fn transect_pattern(&self) -> &Pattern {
        &self.transect_pattern
    }

    pub fn recursive(&self) -> bool {
        self.recursive
    }

    pub fn schema(&self) -> Option<&Path> {
        self.schema.as_deref()
    }

    pub fn transect_schema(&self) -> Option<&Path> {
        self.transect_schema.as_deref()
    }

    pub fn driver(&self) -> &str {
        &self.driver
    }

    pub fn template(&self) -> &GridTemplate {
        &self.template
    }

    pub fn facility(&self) -> &Facility {
        &self.facility
    }

    pub fn filename_grammar(&self) -> &FilenameGrammar {
        &self.filename_grammar
    }

    pub fn log_path(&self) -> PathBuf {
        self.output_directory.join(&self.log_file)
    }

    /// Output file for a survey, `{}` in the pattern replaced by `date_token`.
    pub fn output_path(&self, date_token: &str) -> PathBuf {
        self.output_directory
            .join(self.output_filename_pattern.replace("{}", date_token))
    }

    pub fn transect_output_path(&self, date_token: &str) -> PathBuf {
        self.output_directory
            .join(self.transect_filename_pattern.replace("{}", date_token))
    }
}
