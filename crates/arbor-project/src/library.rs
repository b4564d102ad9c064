use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::MetadataError;

const INDEX_REL_PATH: &str = ".arbor/libraries.json";

/// Persisted per-project library references backing the Referenced Libraries
/// container.
///
/// Stored as pretty JSON under `.arbor/libraries.json` with the entries in
/// path order, so the file diffs cleanly and reloads reproduce the same
/// container. A missing file is an empty index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryIndex {
    path: PathBuf,
    libraries: BTreeSet<PathBuf>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct IndexFile {
    #[serde(default)]
    libraries: Vec<PathBuf>,
}

impl LibraryIndex {
    pub fn index_path(project_root: &Path) -> PathBuf {
        project_root.join(INDEX_REL_PATH)
    }

    pub fn load(project_root: &Path) -> Result<Self, MetadataError> {
        let path = Self::index_path(project_root);
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Ok(Self {
                    path,
                    libraries: BTreeSet::new(),
                })
            }
            Err(source) => return Err(MetadataError::Io { path, source }),
        };

        let file: IndexFile = serde_json::from_str(&contents).map_err(|source| {
            MetadataError::Json {
                path: path.clone(),
                source,
            }
        })?;

        Ok(Self {
            path,
            libraries: file.libraries.into_iter().collect(),
        })
    }

    pub fn save(&self) -> Result<(), MetadataError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| MetadataError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let file = IndexFile {
            libraries: self.libraries.iter().cloned().collect(),
        };
        let contents = serde_json::to_string_pretty(&file).map_err(|source| {
            MetadataError::Json {
                path: self.path.clone(),
                source,
            }
        })?;
        std::fs::write(&self.path, contents).map_err(|source| MetadataError::Io {
            path: self.path.clone(),
            source,
        })
    }

    pub fn contains(&self, archive: &Path) -> bool {
        self.libraries.contains(archive)
    }

    /// Record an archive. Returns `false` when it was already present.
    pub fn add(&mut self, archive: PathBuf) -> bool {
        self.libraries.insert(archive)
    }

    pub fn remove(&mut self, archive: &Path) -> bool {
        self.libraries.remove(archive)
    }

    pub fn libraries(&self) -> impl Iterator<Item = &Path> {
        self.libraries.iter().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.libraries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.libraries.is_empty()
    }
}
