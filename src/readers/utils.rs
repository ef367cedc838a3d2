use super::types::{FileType, IngestError};
use std::path::Path;

pub fn reader_from_filetype(path: &Path) -> Result<FileType, IngestError> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("txt") | Some("xyz") => Ok(FileType::GridText),
        Some("csv") => Ok(FileType::Transect),
        _ => Err(IngestError::UnknownFileType(path.display().to_string())),
    }
}
