use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Recursively collect files under `root` that have `extension`, sorted by
/// path.
///
/// Missing directories are treated as empty, and directories that vanish
/// mid-walk are skipped.
pub fn collect_files_with_extension(root: &Path, extension: &str) -> io::Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err)
                if err
                    .io_error()
                    .is_some_and(|io| io.kind() == io::ErrorKind::NotFound) =>
            {
                continue
            }
            Err(err) => return Err(err.into()),
        };
        if entry.file_type().is_file()
            && entry.path().extension().is_some_and(|ext| ext == extension)
        {
            files.push(entry.into_path());
        }
    }
    files.sort();

    Ok(files)
}

/// `true` when at least one `.java` file exists anywhere below `root`.
///
/// Stops at the first hit; unreadable or vanished directories are skipped.
pub fn contains_java_sources(root: &Path) -> bool {
    if !root.is_dir() {
        return false;
    }

    WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
        .any(|entry| {
            entry.file_type().is_file()
                && entry.path().extension().is_some_and(|ext| ext == "java")
        })
}
