//! Project metadata for Arbor: which directories are Java projects, what
//! kind they are, where their sources and libraries live, and the persisted
//! per-project library index.
//!
//! Kind detection is purely local (descriptor file names at the project
//! root). Layout and dependency resolution go through the
//! [`arbor_backend::AnalysisBackend`] trait; [`LocalBackend`] is the
//! heuristic implementation used by the CLI and tests.

mod archive;
mod backend;
mod discover;
mod kind;
mod layout;
mod library;
mod maven;

use std::path::PathBuf;

pub use archive::{validate_archive, ArchiveError};
pub use backend::LocalBackend;
pub use discover::{discover_projects, ProjectDescriptor};
pub use kind::{
    categorize_path, detect_project_kind, is_build_descriptor, ChangeCategory, ProjectKind,
    BUILD_FILE_NAMES,
};
pub use layout::standard_source_roots;
pub use library::LibraryIndex;
pub use maven::{parse_pom, MavenDependency, Pom};

#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}")]
    Xml {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },
    #[error("failed to parse {path}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl MetadataError {
    /// The file the error is about.
    pub fn path(&self) -> &std::path::Path {
        match self {
            MetadataError::Io { path, .. }
            | MetadataError::Xml { path, .. }
            | MetadataError::Json { path, .. } => path,
        }
    }
}
