//! The Arbor tree model.
//!
//! Nodes mirror the build structure of opened workspace folders: projects,
//! their containers and source roots, packages, files, declared types, and
//! library jars. Children are computed lazily and cached; a refresh replaces
//! the child list of one node and invalidates everything below it while
//! expansion state, kept in a side map by node identity, survives for keys
//! that still exist. At most one refresh runs per node; concurrent requests
//! for the same node coalesce into the in-flight one, and refreshes of
//! disjoint subtrees proceed in parallel.

mod inflight;
mod model;
mod node;
mod packages;
mod types;

use std::path::PathBuf;

pub use model::{ModelOptions, RootTieBreak, TreeModel};
pub use node::{ContainerKind, FileKind, NodeInfo, NodeKey, NodeKind, NodeTag, TypeKind};
pub use types::{extract_types, TypeDecl};

/// Labeled failures out of the tree model. `Clone` so a coalesced refresh
/// can hand every waiter the initiator's outcome; I/O causes are carried as
/// rendered messages for the same reason.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("analysis backend is not ready")]
    NotReady,
    #[error("refresh cancelled")]
    Cancelled,
    #[error("node no longer exists in the tree")]
    NodeGone,
    #[error("metadata unavailable for {path}: {message}")]
    Metadata { path: PathBuf, message: String },
    #[error("I/O failure on {path}: {message}")]
    Io { path: PathBuf, message: String },
    #[error("backend request failed: {message}")]
    Backend { message: String },
}

impl ModelError {
    pub(crate) fn io(path: impl Into<PathBuf>, err: &std::io::Error) -> Self {
        ModelError::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

impl From<arbor_backend::BackendError> for ModelError {
    fn from(err: arbor_backend::BackendError) -> Self {
        use arbor_backend::BackendError;
        match err {
            BackendError::NotReady => ModelError::NotReady,
            BackendError::MetadataUnavailable { path, message } => {
                ModelError::Metadata { path, message }
            }
            BackendError::EditConflict { path } => ModelError::Backend {
                message: format!("conflicting edit in progress for {}", path.display()),
            },
            BackendError::Io { path, source } => ModelError::Io {
                path,
                message: source.to_string(),
            },
            BackendError::Request { message } => ModelError::Backend { message },
        }
    }
}

impl From<arbor_project::MetadataError> for ModelError {
    fn from(err: arbor_project::MetadataError) -> Self {
        ModelError::Metadata {
            path: err.path().to_path_buf(),
            message: err.to_string(),
        }
    }
}
