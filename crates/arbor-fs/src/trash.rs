use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

const TRASH_DIR: &str = ".arbor/trash";
const MANIFEST_NAME: &str = "manifest.json";

/// Recoverable trash rooted inside the workspace.
///
/// Deleted files are moved (never unlinked) into `.arbor/trash/` under a
/// unique name, and the original path is remembered so the most recent
/// deletion of a path can be restored. Trashing the same path repeatedly
/// stacks entries; restore pops the newest first.
///
/// The bookkeeping persists as a manifest beside the stored files, so a new
/// registry over the same workspace picks up where the last one left off. A
/// failed manifest write limits restore to the current session and is logged,
/// not surfaced.
pub struct Trash {
    dir: PathBuf,
    seq: AtomicU64,
    /// Original path → stored copies, oldest first.
    items: Mutex<BTreeMap<PathBuf, Vec<PathBuf>>>,
}

impl Trash {
    pub fn new(workspace_root: &Path) -> Self {
        let dir = workspace_root.join(TRASH_DIR);
        let mut entries = load_manifest(&dir);
        entries.retain(|original, stored| {
            stored.retain(|path| {
                let present = path.exists();
                if !present {
                    tracing::debug!(
                        target: "arbor.fs",
                        original = %original.display(),
                        stored = %path.display(),
                        "dropping trash entry whose stored file is gone"
                    );
                }
                present
            });
            !stored.is_empty()
        });

        let mut next_seq = 0;
        for stored in entries.values().flatten() {
            if let Some(seq) = stored_seq(stored) {
                next_seq = next_seq.max(seq + 1);
            }
        }

        Self {
            dir,
            seq: AtomicU64::new(next_seq),
            items: Mutex::new(entries),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Move `path` into the trash, returning its location there.
    pub fn trash_file(&self, path: &Path) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unnamed");
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        let trashed = self.dir.join(format!("{seq:04}-{file_name}"));

        move_file(path, &trashed)?;
        tracing::debug!(
            target: "arbor.fs",
            path = %path.display(),
            trashed = %trashed.display(),
            "moved file to trash"
        );

        let mut items = self.items.lock();
        items
            .entry(path.to_path_buf())
            .or_default()
            .push(trashed.clone());
        save_manifest(&self.dir, &items);
        Ok(trashed)
    }

    /// Restore the most recently trashed entry for `original` back to it.
    ///
    /// Fails with `NotFound` when nothing was trashed for that path and with
    /// `AlreadyExists` when the original path has been recreated since.
    pub fn restore(&self, original: &Path) -> io::Result<()> {
        let trashed = {
            let mut items = self.items.lock();
            let entries = items.get_mut(original).ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no trashed entry for {}", original.display()),
                )
            })?;
            let trashed = entries.pop().ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no trashed entry for {}", original.display()),
                )
            })?;
            if entries.is_empty() {
                items.remove(original);
            }
            trashed
        };

        if original.exists() {
            // Put the bookkeeping back so a later restore can still succeed.
            self.push_back(original, trashed);
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} exists; refusing to overwrite on restore", original.display()),
            ));
        }

        match move_file(&trashed, original) {
            Ok(()) => {
                let items = self.items.lock();
                save_manifest(&self.dir, &items);
                Ok(())
            }
            Err(err) => {
                self.push_back(original, trashed);
                Err(err)
            }
        }
    }

    pub fn contains(&self, original: &Path) -> bool {
        self.items
            .lock()
            .get(original)
            .is_some_and(|entries| !entries.is_empty())
    }

    fn push_back(&self, original: &Path, trashed: PathBuf) {
        self.items
            .lock()
            .entry(original.to_path_buf())
            .or_default()
            .push(trashed);
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Manifest {
    #[serde(default)]
    entries: BTreeMap<PathBuf, Vec<PathBuf>>,
}

fn load_manifest(dir: &Path) -> BTreeMap<PathBuf, Vec<PathBuf>> {
    let path = dir.join(MANIFEST_NAME);
    let contents = match fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return BTreeMap::new(),
        Err(err) => {
            tracing::warn!(
                target: "arbor.fs",
                path = %path.display(),
                error = %err,
                "failed to read trash manifest; starting empty"
            );
            return BTreeMap::new();
        }
    };
    match serde_json::from_str::<Manifest>(&contents) {
        Ok(manifest) => manifest.entries,
        Err(err) => {
            tracing::warn!(
                target: "arbor.fs",
                path = %path.display(),
                error = %err,
                "malformed trash manifest; starting empty"
            );
            BTreeMap::new()
        }
    }
}

fn save_manifest(dir: &Path, entries: &BTreeMap<PathBuf, Vec<PathBuf>>) {
    let path = dir.join(MANIFEST_NAME);
    let manifest = Manifest {
        entries: entries.clone(),
    };
    let contents = match serde_json::to_string_pretty(&manifest) {
        Ok(contents) => contents,
        Err(err) => {
            tracing::warn!(
                target: "arbor.fs",
                path = %path.display(),
                error = %err,
                "failed to encode trash manifest"
            );
            return;
        }
    };
    if let Err(err) = fs::write(&path, contents) {
        tracing::warn!(
            target: "arbor.fs",
            path = %path.display(),
            error = %err,
            "failed to persist trash manifest; restore is limited to this session"
        );
    }
}

fn stored_seq(stored: &Path) -> Option<u64> {
    let name = stored.file_name()?.to_str()?;
    let (prefix, _) = name.split_once('-')?;
    prefix.parse().ok()
}

/// Rename, falling back to copy-and-remove when the trash lives on another
/// file system than the source.
fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(_) => {
            fs::copy(from, to)?;
            fs::remove_file(from)
        }
    }
}
