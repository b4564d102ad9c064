//! Mutations over the Arbor tree: new class, new package, rename, delete to
//! trash, library registration, and project scaffolding.
//!
//! Every operation runs as a transaction: validate inputs and backend
//! readiness, apply the file-system effect, then refresh the smallest
//! enclosing tree scope. Failed validation leaves disk and tree untouched;
//! a failed multi-step effect rolls back what it already created. Operations
//! inside the same workspace folder are serialized so their effects never
//! interleave; a post-effect refresh failure is logged, not surfaced, since
//! the effect itself is already durable.

mod engine;
mod locks;
mod template;

use std::io;
use std::path::PathBuf;

use arbor_backend::BackendError;
use arbor_core::PackageNameError;
use arbor_model::ModelError;
use arbor_project::{ArchiveError, MetadataError};

pub use engine::{LibraryFolderReport, OpsEngine, SkippedLibrary};
pub use template::ProjectTemplate;

#[derive(Debug, thiserror::Error)]
pub enum OpError {
    #[error("analysis backend is not ready")]
    NotReady,
    #[error("operation cancelled")]
    Cancelled,
    #[error("{path} already exists")]
    NameCollision { path: PathBuf },
    #[error("`{name}` is not a valid name")]
    InvalidIdentifier { name: String },
    #[error("invalid package name: {source}")]
    InvalidPackageName {
        #[source]
        source: PackageNameError,
    },
    #[error("{path} is not a valid target for this operation")]
    InvalidTarget { path: PathBuf },
    #[error("a conflicting edit is in progress for {path}")]
    EditConflict { path: PathBuf },
    #[error("library {path} is already referenced")]
    DuplicateLibrary { path: PathBuf },
    #[error("{path} is not a valid archive: {message}")]
    InvalidArchive { path: PathBuf, message: String },
    #[error("target directory {path} is not empty")]
    TargetNotEmpty { path: PathBuf },
    #[error("metadata unavailable for {path}: {message}")]
    Metadata { path: PathBuf, message: String },
    #[error("I/O failure on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("backend request failed: {message}")]
    Backend { message: String },
}

impl OpError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        OpError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<BackendError> for OpError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::NotReady => OpError::NotReady,
            BackendError::MetadataUnavailable { path, message } => {
                OpError::Metadata { path, message }
            }
            BackendError::EditConflict { path } => OpError::EditConflict { path },
            BackendError::Io { path, source } => OpError::Io { path, source },
            BackendError::Request { message } => OpError::Backend { message },
        }
    }
}

impl From<ArchiveError> for OpError {
    fn from(err: ArchiveError) -> Self {
        match err {
            ArchiveError::Io { path, source } => OpError::Io { path, source },
            ArchiveError::Invalid { path, message } => OpError::InvalidArchive { path, message },
        }
    }
}

impl From<MetadataError> for OpError {
    fn from(err: MetadataError) -> Self {
        match err {
            MetadataError::Io { path, source } => OpError::Io { path, source },
            other => OpError::Metadata {
                path: other.path().to_path_buf(),
                message: other.to_string(),
            },
        }
    }
}

impl From<ModelError> for OpError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::NotReady => OpError::NotReady,
            ModelError::Cancelled => OpError::Cancelled,
            ModelError::NodeGone => OpError::Backend {
                message: "tree node no longer exists".to_string(),
            },
            ModelError::Metadata { path, message } => OpError::Metadata { path, message },
            ModelError::Io { path, message } => OpError::Io {
                path,
                source: io::Error::new(io::ErrorKind::Other, message),
            },
            ModelError::Backend { message } => OpError::Backend { message },
        }
    }
}
