use std::path::{Path, PathBuf};

/// A normalized file-system change, as delivered by whatever watcher the host
/// wires in. Arbor never talks to an OS watcher itself; hosts and tests feed
/// these values in directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChange {
    Created(PathBuf),
    Modified(PathBuf),
    Deleted(PathBuf),
    Moved { from: PathBuf, to: PathBuf },
}

impl FileChange {
    /// The path refresh scoping keys off: the new location for moves.
    pub fn primary_path(&self) -> &Path {
        match self {
            FileChange::Created(path)
            | FileChange::Modified(path)
            | FileChange::Deleted(path) => path,
            FileChange::Moved { to, .. } => to,
        }
    }

    /// Every path the change touches, old and new.
    pub fn paths(&self) -> Vec<&Path> {
        match self {
            FileChange::Created(path)
            | FileChange::Modified(path)
            | FileChange::Deleted(path) => vec![path],
            FileChange::Moved { from, to } => vec![from, to],
        }
    }
}
