use std::fs::File;
use std::io;
use std::path::Path;

use crate::api::models::FileDescriptor;
use crate::util::mime::detect_content_type;

/// True when a stat of `path` succeeds. Any stat error, not only
/// "not found", counts as missing.
pub fn path_exists(path: &Path) -> bool {
    match std::fs::metadata(path) {
        Ok(_) => true,
        Err(e) if e.kind() == io::ErrorKind::NotFound => false,
        Err(e) => {
            log::debug!("stat {} failed: {}", path.display(), e);
            false
        }
    }
}

/// Base name of `path` as sent to the upload API.
pub fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Reasons a local file cannot be prepared for upload.
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("Error opening file: {0}")]
    Open(#[source] io::Error),

    #[error("Error fetching file info: {0}")]
    Stat(#[source] io::Error),

    #[error("Error rewinding file after type detection: {0}")]
    Rewind(#[source] io::Error),

    #[error("{0} is not a regular file")]
    NotAFile(String),
}

/// Opens `path` once and derives its [`FileDescriptor`].
///
/// The returned handle is positioned at offset 0, ready to be streamed.
pub fn open_for_upload(path: &Path) -> Result<(FileDescriptor, File), FileError> {
    let mut file = File::open(path).map_err(FileError::Open)?;
    let metadata = file.metadata().map_err(FileError::Stat)?;

    if !metadata.is_file() {
        return Err(FileError::NotAFile(path.display().to_string()));
    }

    let mime_type = detect_content_type(&mut file).map_err(FileError::Rewind)?;

    let descriptor = FileDescriptor {
        path: path.to_path_buf(),
        size: metadata.len(),
        mime_type,
        name: base_name(path),
    };

    Ok((descriptor, file))
}
