pub mod grid_text;
pub mod transect;
pub mod types;
pub mod utils;

use std::path::{Path, PathBuf};

pub use grid_text::GridTextReader;
pub use transect::TransectReader;
pub use types::{
    FileType, IngestError, SurveyPoints, SurveyReader, TransectPoint, TransectPoints,
};
pub use utils::reader_from_filetype;

pub fn create_reader(file_name: PathBuf) -> Result<Box<dyn SurveyReader>, IngestError> {
    match reader_from_filetype(&file_name)? {
        FileType::GridText => Ok(Box::new(GridTextReader { file_name })),
        FileType::Transect => Err(IngestError::NotGridded(file_name.display().to_string())),
    }
}

/// Read a survey file with the reader its extension selects.
pub fn read_grid_file<P: AsRef<Path>>(path: P) -> Result<SurveyPoints, IngestError> {
    create_reader(path.as_ref().to_path_buf())?.read_points()
}

pub fn read_transect_file<P: AsRef<Path>>(path: P) -> Result<TransectPoints, IngestError> {
    TransectReader {
        file_name: path.as_ref().to_path_buf(),
    }
    .read_transect()
}
