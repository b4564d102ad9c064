use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File system abstraction for Arbor.
///
/// The trait is intentionally small so it can be implemented for different
/// backends (local FS, overlays, read-only fixtures in tests).
pub trait FileSystem: Send + Sync {
    /// Reads the file contents as UTF-8 text.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Returns whether a path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Returns whether a path exists and is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Lists directory entries, sorted by path so listings are deterministic.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;

    /// Creates a directory and all of its missing parents.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Writes a new file, failing with `AlreadyExists` if the path is taken.
    fn write_new(&self, path: &Path, contents: &str) -> io::Result<()>;

    /// Overwrites an existing file in place.
    fn write(&self, path: &Path, contents: &str) -> io::Result<()>;

    /// Renames a file or directory.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Removes a single file.
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Removes a directory that must be empty.
    fn remove_empty_dir(&self, path: &Path) -> io::Result<()>;
}

/// Local OS file system implementation.
#[derive(Debug, Clone, Default)]
pub struct LocalFs;

impl LocalFs {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for LocalFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let mut out = Vec::new();
        for entry in fs::read_dir(path)? {
            out.push(entry?.path());
        }
        out.sort();
        Ok(out)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn write_new(&self, path: &Path, contents: &str) -> io::Result<()> {
        use std::io::Write;

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)?;
        file.write_all(contents.as_bytes())
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        fs::write(path, contents)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn remove_empty_dir(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir(path)
    }
}

/// Remove a file, tolerating it already being gone. Other failures are logged
/// and swallowed; callers use this for rollback paths where the original error
/// matters more than the cleanup error.
pub fn remove_file_best_effort(fs: &dyn FileSystem, path: &Path) {
    match fs.remove_file(path) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => {
            tracing::debug!(
                target: "arbor.fs",
                path = %path.display(),
                reason = %err,
                "failed to remove file during cleanup"
            );
        }
    }
}

/// Remove an empty directory, tolerating it already being gone or non-empty.
pub fn remove_empty_dir_best_effort(fs: &dyn FileSystem, path: &Path) {
    match fs.remove_empty_dir(path) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => {
            tracing::debug!(
                target: "arbor.fs",
                path = %path.display(),
                reason = %err,
                "failed to remove directory during cleanup"
            );
        }
    }
}
