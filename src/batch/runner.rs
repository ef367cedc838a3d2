use chrono::Local;
use glob::{Pattern, glob};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use super::{BatchError, SurveyError};
use crate::config::Config;
use crate::encoder::{EncodingSchema, GridWriter};
use crate::readers::{FileType, read_grid_file, read_transect_file, reader_from_filetype};

const REPORT_SEPARATOR: &str = "----------------------------";

/// Outcome of a batch: converted outputs and the per-file failures written to the report.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub converted: Vec<PathBuf>,
    pub failures: Vec<(PathBuf, SurveyError)>,
    pub report: PathBuf,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.converted.len() + self.failures.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct BatchRunner<W: GridWriter> {
    config: Config,
    schema: EncodingSchema,
    transect_schema: EncodingSchema,
    writer: W,
}

impl<W: GridWriter> BatchRunner<W> {
    pub fn new(config: Config, writer: W) -> Result<Self, BatchError> {
        let schema = match config.schema() {
            Some(path) => EncodingSchema::from_file(path)?,
            None => EncodingSchema::builtin()?,
        };
        let transect_schema = match config.transect_schema() {
            Some(path) => EncodingSchema::from_file(path)?,
            None => EncodingSchema::builtin_transect()?,
        };

        Ok(BatchRunner {
            config,
            schema,
            transect_schema,
            writer,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    fn patterns(&self) -> [&Pattern; 2] {
        [self.config.grid_pattern(), self.config.transect_pattern()]
    }

    /// Survey files under the input directory whose name matches the grid or the transect
    /// pattern, sorted.
    pub fn discover(&self) -> Result<Vec<PathBuf>, BatchError> {
        let dir = self.config.input_directory();
        if !dir.is_dir() {
            return Err(BatchError::MissingInput(dir.to_path_buf()));
        }
        let patterns = self.patterns();

        let mut files: Vec<PathBuf> = if self.config.recursive() {
            WalkDir::new(dir)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| {
                    let name = e.file_name().to_string_lossy();
                    e.file_type().is_file() && patterns.iter().any(|p| p.matches(&name))
                })
                .map(|e| e.into_path())
                .collect()
        } else {
            let root = Pattern::escape(&dir.to_string_lossy());
            let mut files = Vec::new();
            for pattern in patterns {
                let full = format!("{}/{}", root, pattern.as_str());
                files.extend(
                    glob(&full)?
                        .filter_map(|entry| match entry {
                            Ok(path) => Some(path),
                            Err(e) => {
                                warn!("Skipping unreadable entry: {}", e);
                                None
                            }
                        })
                        .filter(|path| path.is_file()),
                );
            }
            files
        };

        files.sort();
        files.dedup();
        Ok(files)
    }

    /// Convert one survey file and return the output path. The extension picks the gridded or
    /// the transect product.
    ///
    /// The file name is parsed before any data is read so naming problems fail fast. Nothing is
    /// written unless the product is complete.
    pub fn convert(&self, path: &Path) -> Result<PathBuf, SurveyError> {
        match reader_from_filetype(path)? {
            FileType::GridText => self.convert_grid(path),
            FileType::Transect => self.convert_transect(path),
        }
    }

    fn convert_grid(&self, path: &Path) -> Result<PathBuf, SurveyError> {
        let metadata = self.config.filename_grammar().parse(path)?;
        let output = self.config.output_path(&metadata.date_token());
        info!("Making {}", output.display());
        debug!("{}", metadata);

        let points = read_grid_file(path)?;
        debug!("{}", points);

        let grid = self.config.template().fill(
            self.config.facility(),
            &points.x,
            &points.y,
            &points.z,
            metadata,
        )?;
        debug!(
            "{} of {} template cells hold survey data",
            grid.valid_cell_count(),
            grid.elevation.len()
        );

        let record = grid.to_record();
        let plan = self.schema.plan(&record, Local::now().date_naive())?;
        self.writer.write(&plan, &output)?;

        Ok(output)
    }

    fn convert_transect(&self, path: &Path) -> Result<PathBuf, SurveyError> {
        let metadata = self.config.filename_grammar().parse_transect(path)?;
        let output = self
            .config
            .transect_output_path(&metadata.date_token());
        info!("Making {}", output.display());

        let transect = read_transect_file(path)?;
        debug!(
            "{} transect points from {}, {} dropped",
            transect.len(),
            metadata.platform,
            transect.dropped
        );

        let record = transect.to_record(&metadata);
        let plan = self
            .transect_schema
            .plan(&record, Local::now().date_naive())?;
        self.writer.write(&plan, &output)?;

        Ok(output)
    }

    /// Convert every discovered file. Per-file failures are logged, written to the report and
    /// returned in the summary; only setup and report I/O failures abort the batch.
    pub fn run(&self) -> Result<BatchSummary, BatchError> {
        let files = self.discover()?;
        if files.is_empty() {
            let [grid, transect] = self.patterns();
            warn!(
                "No files matching {} or {} in {}",
                grid,
                transect,
                self.config.input_directory().display()
            );
        } else {
            info!("Found {} survey files", files.len());
        }

        let output_dir = self.config.output_directory();
        fs::create_dir_all(output_dir).map_err(|source| BatchError::OutputDirectory {
            path: output_dir.to_path_buf(),
            source,
        })?;

        let report_path = self.config.log_path();
        let report_err = |source: std::io::Error| BatchError::Report {
            path: report_path.clone(),
            source,
        };
        let mut report = BufWriter::new(File::create(&report_path).map_err(report_err)?);
        writeln!(report, "File, Error").map_err(report_err)?;

        let mut summary = BatchSummary {
            report: report_path.clone(),
            ..Default::default()
        };

        for path in files {
            match self.convert(&path) {
                Ok(output) => {
                    info!("Wrote {}", output.display());
                    summary.converted.push(output);
                }
                Err(err) => {
                    error!("{}: {}", path.display(), err);
                    write!(
                        report,
                        "{},\n {}\n{}\n\n",
                        path.display(),
                        err,
                        REPORT_SEPARATOR
                    )
                    .map_err(report_err)?;
                    summary.failures.push((path, err));
                }
            }
        }

        report.flush().map_err(report_err)?;

        info!(
            "Converted {} of {} files, report in {}",
            summary.converted.len(),
            summary.total(),
            summary.report.display()
        );

        Ok(summary)
    }
}
