//! The seam between Arbor and whatever actually understands Java projects.
//!
//! The tree model and mutation engine never resolve source roots or
//! classpaths themselves; they ask an [`AnalysisBackend`] once the
//! [`ReadinessGate`] reports the backend has finished initializing. The CLI
//! and tests plug in the heuristic local backend from `arbor-project`;
//! editor hosts substitute a remote analyzer behind the same trait.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

mod gate;

pub use gate::{ReadinessGate, WaitPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceRootKind {
    Main,
    Test,
}

/// One source root of a project, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRoot {
    pub kind: SourceRootKind,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClasspathEntryKind {
    Directory,
    Jar,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClasspathEntry {
    pub kind: ClasspathEntryKind,
    pub path: PathBuf,
}

/// Backend-resolved view of one project: where its sources live and which
/// dependencies are on its classpath.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectLayout {
    pub source_roots: Vec<SourceRoot>,
    pub dependencies: Vec<ClasspathEntry>,
}

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("analysis backend is not ready")]
    NotReady,
    #[error("metadata unavailable for {path}: {message}")]
    MetadataUnavailable { path: PathBuf, message: String },
    #[error("a conflicting edit is in progress for {path}")]
    EditConflict { path: PathBuf },
    #[error("backend I/O error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("backend request failed: {message}")]
    Request { message: String },
}

/// Everything Arbor needs from a Java analyzer.
///
/// Implementations are synchronous; callers run them off the async executor
/// and gate them behind [`ReadinessGate`].
pub trait AnalysisBackend: Send + Sync {
    /// Source roots and resolved dependencies for the project at `project_root`.
    fn project_layout(&self, project_root: &Path) -> Result<ProjectLayout, BackendError>;

    /// Record a user-added library archive so analysis sees its classes.
    fn register_library(&self, project_root: &Path, archive: &Path) -> Result<(), BackendError>;

    /// Called before a rename touches disk. Backends report `EditConflict`
    /// when they have an edit in flight for the same file; the mutation is
    /// then aborted without any file-system effect.
    fn prepare_rename(&self, path: &Path) -> Result<(), BackendError>;

    /// The file at `from` now lives at `to`.
    fn notify_renamed(&self, from: &Path, to: &Path) -> Result<(), BackendError>;

    /// The file at `path` was moved to trash.
    fn notify_deleted(&self, path: &Path) -> Result<(), BackendError>;
}
