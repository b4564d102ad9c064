use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use arbor_fs::FileSystem;

use crate::ModelError;

/// Find every populated package directory below `root`: a directory holding
/// at least one immediate `.java` file. Directories with no Java anywhere
/// below them never materialize, in either presentation.
///
/// `excludes` are proper descendants that belong to sibling source roots
/// (e.g. `src/test/java` nested inside an invisible project's `src` root);
/// their subtrees are skipped. Hidden directories and directories whose
/// name is not a valid package segment are skipped too, subtree included,
/// since no valid dotted name can pass through them.
pub(crate) fn scan_populated_packages(
    fs: &dyn FileSystem,
    root: &Path,
    excludes: &[PathBuf],
) -> Result<Vec<PathBuf>, ModelError> {
    let mut populated = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let entries = match fs.read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue,
            Err(err) => return Err(ModelError::io(&dir, &err)),
        };

        let mut has_unit = false;
        for entry in entries {
            if fs.is_dir(&entry) {
                let Some(name) = entry.file_name().and_then(|n| n.to_str()) else {
                    continue;
                };
                if name.starts_with('.') {
                    continue;
                }
                if excludes.iter().any(|ex| ex == &entry) {
                    continue;
                }
                if !arbor_core::is_valid_identifier(name) {
                    tracing::debug!(
                        target: "arbor.model",
                        path = %entry.display(),
                        "skipping directory that is not a valid package segment"
                    );
                    continue;
                }
                pending.push(entry);
            } else if entry.extension().is_some_and(|ext| ext == "java") {
                has_unit = true;
            }
        }

        if has_unit && dir != root {
            populated.push(dir);
        }
    }

    populated.sort();
    Ok(populated)
}

/// The distinct next-level package directories under `base` on the way to
/// the populated packages, sorted. Drives hierarchical grouping.
pub(crate) fn child_segments(base: &Path, populated: &[PathBuf]) -> Vec<PathBuf> {
    let mut segments = BTreeSet::new();
    for package in populated {
        let Ok(rel) = package.strip_prefix(base) else {
            continue;
        };
        if let Some(first) = rel.components().next() {
            segments.insert(base.join(first));
        }
    }
    segments.into_iter().collect()
}

/// Immediate plain files of a directory, in listing order. A missing
/// directory is treated as empty so a subtree vanishing mid-refresh does
/// not fail the whole pass.
pub(crate) fn immediate_files(
    fs: &dyn FileSystem,
    dir: &Path,
) -> Result<Vec<PathBuf>, ModelError> {
    let entries = match fs.read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(ModelError::io(dir, &err)),
    };
    Ok(entries.into_iter().filter(|e| !fs.is_dir(e)).collect())
}

/// Dotted package name of `dir` relative to its source root, when every
/// component is a plain UTF-8 segment.
pub(crate) fn dotted_name(root: &Path, dir: &Path) -> Option<String> {
    let rel = dir.strip_prefix(root).ok()?;
    arbor_core::path_to_package(rel).filter(|name| !name.is_empty())
}
