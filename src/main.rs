use clap::{Parser, Subcommand, ValueEnum};
use std::error::Error;
use std::path::PathBuf;
use tracing::{info, warn};

use frf_survey::angles::{FRF_PIER_ANGLE, geo_to_stwave, normalize_degrees, stwave_to_geo};
use frf_survey::encoder::JsonWriter;
use frf_survey::{BatchRunner, BatchSummary, Config, CoordinateSystem, Facility, init_logging};

#[derive(Parser, Debug)]
#[command(name = "frf-survey", about = "Grid FRF surveys onto the archive DEM template")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert every matching survey file in the input directory
    Convert {
        /// JSON run configuration
        #[arg(short, long)]
        config: PathBuf,

        /// Override the configured input directory
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Express a point in the FRF, state plane and geographic frames
    Coord {
        #[arg(allow_negative_numbers = true)]
        p1: f64,

        #[arg(allow_negative_numbers = true)]
        p2: f64,

        /// Frame of the input; detected from the value range when omitted
        #[arg(short, long, value_enum)]
        system: Option<SystemArg>,
    },

    /// Wrap angles into [0, 360) or rotate them to or from the wave-model grid
    Angle {
        #[arg(required = true, allow_negative_numbers = true)]
        values: Vec<f64>,

        /// Geographic "coming from" directions to wave-model grid directions
        #[arg(long, conflicts_with = "from_stwave")]
        to_stwave: bool,

        /// Wave-model grid directions to geographic "coming from" directions
        #[arg(long)]
        from_stwave: bool,

        #[arg(long, default_value_t = FRF_PIER_ANGLE, allow_negative_numbers = true)]
        pier_angle: f64,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SystemArg {
    Frf,
    StatePlane,
    Geographic,
}

impl From<SystemArg> for CoordinateSystem {
    fn from(arg: SystemArg) -> Self {
        match arg {
            SystemArg::Frf => CoordinateSystem::Frf,
            SystemArg::StatePlane => CoordinateSystem::StatePlane,
            SystemArg::Geographic => CoordinateSystem::Geographic,
        }
    }
}

#[cfg(feature = "gdal")]
fn run_gdal(config: Config) -> Result<BatchSummary, Box<dyn Error>> {
    let writer = frf_survey::encoder::GdalWriter::new(config.driver());
    info!("Writing through the GDAL {} driver", writer.driver());
    Ok(BatchRunner::new(config, writer)?.run()?)
}

#[cfg(not(feature = "gdal"))]
fn run_gdal(config: Config) -> Result<BatchSummary, Box<dyn Error>> {
    Err(format!(
        "driver '{}' needs a build with the gdal feature (or set \"driver\": \"json\")",
        config.driver()
    )
    .into())
}

fn convert(config: PathBuf, input: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
    let mut config = Config::from_file(&config)?;
    if let Some(input) = input {
        config = config.with_input_directory(input);
    }

    let summary = if config.driver().eq_ignore_ascii_case("json") {
        BatchRunner::new(config, JsonWriter)?.run()?
    } else {
        run_gdal(config)?
    };

    if summary.is_clean() {
        info!("All {} files converted", summary.total());
    } else {
        warn!(
            "{} of {} files failed, see {}",
            summary.failures.len(),
            summary.total(),
            summary.report.display()
        );
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    init_logging();

    match Cli::parse().command {
        Command::Convert { config, input } => convert(config, input)?,
        Command::Coord { p1, p2, system } => {
            let triple = Facility::default().resolve(p1, p2, system.map(CoordinateSystem::from))?;
            println!("{}", triple);
        }
        Command::Angle {
            values,
            to_stwave,
            from_stwave,
            pier_angle,
        } => {
            let angles: Vec<f64> = if to_stwave {
                geo_to_stwave(&values, pier_angle, true, false).to_vec()
            } else if from_stwave {
                stwave_to_geo(&values, pier_angle, true).to_vec()
            } else {
                values.into_iter().map(normalize_degrees).collect()
            };
            for angle in angles {
                println!("{}", angle);
            }
        }
    }

    Ok(())
}
