//! File-system access for Arbor: a small trait the tree model and mutation
//! engine go through, a local implementation, a recoverable workspace-local
//! trash, and the change-event values auto-refresh consumes.

mod change;
mod fs;
mod trash;

pub use change::FileChange;
pub use fs::{remove_empty_dir_best_effort, remove_file_best_effort, FileSystem, LocalFs};
pub use trash::Trash;
