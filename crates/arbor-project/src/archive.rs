use std::fs::File;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("failed to open {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path} is not a valid archive: {message}")]
    Invalid { path: PathBuf, message: String },
}

/// Check that `path` opens as a zip archive before it is recorded as a
/// library reference. Catches truncated downloads and plain files renamed to
/// `.jar`; it does not inspect the class files inside.
pub fn validate_archive(path: &Path) -> Result<(), ArchiveError> {
    let file = File::open(path).map_err(|source| ArchiveError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    zip::ZipArchive::new(file)
        .map(|_| ())
        .map_err(|err| ArchiveError::Invalid {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
}
