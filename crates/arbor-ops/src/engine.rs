use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arbor_backend::{AnalysisBackend, ReadinessGate};
use arbor_core::{
    class_to_file_name, collect_files_with_extension, package_to_path, validate_identifier,
    validate_package_name,
};
use arbor_fs::{remove_empty_dir_best_effort, remove_file_best_effort, FileSystem, Trash};
use arbor_model::{ContainerKind, ModelError, NodeKey, NodeKind, NodeTag, TreeModel};
use arbor_project::{validate_archive, LibraryIndex};
use parking_lot::Mutex;
use regex::Regex;

use crate::locks::PathLocks;
use crate::template::ProjectTemplate;
use crate::OpError;

/// Outcome of [`OpsEngine::add_library_folder`]: which archives were
/// recorded, and which were skipped with the reason per entry.
#[derive(Debug, Default)]
pub struct LibraryFolderReport {
    pub added: Vec<PathBuf>,
    pub skipped: Vec<SkippedLibrary>,
}

#[derive(Debug)]
pub struct SkippedLibrary {
    pub path: PathBuf,
    pub reason: OpError,
}

/// Executes tree mutations against the file system, the analysis backend,
/// and the tree model.
///
/// The engine keeps a trash and a mutation lock per workspace folder. Every
/// operation resolves its lock to the owning folder, so mutations inside one
/// folder are strictly ordered while separate folders stay independent. The
/// scoped refresh after a successful effect is best effort: a refresh
/// failure is logged, never surfaced, because the effect itself is already
/// durable on disk.
pub struct OpsEngine {
    fs: Arc<dyn FileSystem>,
    backend: Arc<dyn AnalysisBackend>,
    gate: Arc<ReadinessGate>,
    model: TreeModel,
    locks: PathLocks,
    trashes: Mutex<HashMap<PathBuf, Arc<Trash>>>,
}

impl OpsEngine {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        backend: Arc<dyn AnalysisBackend>,
        gate: Arc<ReadinessGate>,
        model: TreeModel,
    ) -> Self {
        Self {
            fs,
            backend,
            gate,
            model,
            locks: PathLocks::new(),
            trashes: Mutex::new(HashMap::new()),
        }
    }

    /// Create `<name>.java` under `target_dir` with a package declaration
    /// derived from the target's tree node. The target must resolve to a
    /// package or a source root.
    pub async fn new_class(&self, target_dir: &Path, name: &str) -> Result<PathBuf, OpError> {
        validate_identifier(name).map_err(|_| OpError::InvalidIdentifier {
            name: name.to_string(),
        })?;
        self.ready().await?;
        let _guard = self.mutation_lock(target_dir).await;

        let package = self.package_of(target_dir).await?;
        let path = target_dir.join(class_to_file_name(name));

        let mut contents = String::new();
        if !package.is_empty() {
            contents.push_str(&format!("package {package};\n\n"));
        }
        contents.push_str(&format!("public class {name} {{\n\n}}\n"));

        self.fs.write_new(&path, &contents).map_err(|err| {
            if err.kind() == io::ErrorKind::AlreadyExists {
                OpError::NameCollision { path: path.clone() }
            } else {
                OpError::io(&path, err)
            }
        })?;
        tracing::info!(
            target: "arbor.ops",
            class = name,
            path = %path.display(),
            "created class"
        );

        self.refresh_scope(&path).await;
        Ok(path)
    }

    /// Create the directory chain for a dotted package name under a source
    /// root. A failure partway through removes the directories this call
    /// created, so a retry starts clean.
    pub async fn new_package(&self, root_dir: &Path, name: &str) -> Result<PathBuf, OpError> {
        validate_package_name(name).map_err(|source| OpError::InvalidPackageName { source })?;
        self.ready().await?;
        let _guard = self.mutation_lock(root_dir).await;

        match self.model.find_node_for_path(root_dir).await? {
            Some(key) if key.tag == NodeTag::PackageRoot => {}
            _ => {
                return Err(OpError::InvalidTarget {
                    path: root_dir.to_path_buf(),
                })
            }
        }

        let target = root_dir.join(package_to_path(name));
        if self.fs.exists(&target) {
            return Err(OpError::NameCollision { path: target });
        }

        let mut created: Vec<PathBuf> = Vec::new();
        let mut current = root_dir.to_path_buf();
        for segment in name.split('.') {
            current.push(segment);
            if self.fs.exists(&current) {
                continue;
            }
            if let Err(err) = self.fs.create_dir_all(&current) {
                for dir in created.iter().rev() {
                    remove_empty_dir_best_effort(self.fs.as_ref(), dir);
                }
                return Err(OpError::io(&current, err));
            }
            created.push(current.clone());
        }
        tracing::info!(
            target: "arbor.ops",
            package = name,
            path = %target.display(),
            "created package"
        );

        self.refresh_scope(&target).await;
        Ok(target)
    }

    /// Rename a file. For a `.java` file the declaration of the type named
    /// after the old file stem is rewritten to the new name; other files
    /// keep their contents. The backend is consulted first and can veto the
    /// rename with an edit conflict, in which case nothing touches disk.
    pub async fn rename(&self, file: &Path, new_name: &str) -> Result<PathBuf, OpError> {
        let is_java = file.extension().is_some_and(|ext| ext == "java");
        let file_name = if is_java {
            validate_identifier(new_name).map_err(|_| OpError::InvalidIdentifier {
                name: new_name.to_string(),
            })?;
            class_to_file_name(new_name)
        } else {
            if new_name.is_empty() || new_name.contains(['/', '\\']) {
                return Err(OpError::InvalidIdentifier {
                    name: new_name.to_string(),
                });
            }
            new_name.to_string()
        };
        self.ready().await?;
        let _guard = self.mutation_lock(file).await;

        if self.fs.is_dir(file) {
            return Err(OpError::InvalidTarget {
                path: file.to_path_buf(),
            });
        }
        let target = file.with_file_name(&file_name);
        if target == file {
            return Ok(target);
        }
        if self.fs.exists(&target) {
            return Err(OpError::NameCollision { path: target });
        }

        {
            let backend = Arc::clone(&self.backend);
            let path = file.to_path_buf();
            run_blocking(move || backend.prepare_rename(&path)).await?;
        }

        let stem = file.file_stem().and_then(|s| s.to_str());
        let rewritten = match (is_java, stem) {
            (true, Some(stem)) => {
                let source = self
                    .fs
                    .read_to_string(file)
                    .map_err(|err| OpError::io(file, err))?;
                rewrite_primary_type(&source, stem, new_name)
            }
            _ => None,
        };

        self.fs
            .rename(file, &target)
            .map_err(|err| OpError::io(file, err))?;
        if let Some(contents) = rewritten {
            if let Err(err) = self.fs.write(&target, &contents) {
                // Put the old name back; the write failure wins.
                if let Err(undo) = self.fs.rename(&target, file) {
                    tracing::warn!(
                        target: "arbor.ops",
                        path = %file.display(),
                        error = %undo,
                        "failed to undo rename after a write failure"
                    );
                }
                return Err(OpError::io(&target, err));
            }
        }

        {
            let backend = Arc::clone(&self.backend);
            let (from, to) = (file.to_path_buf(), target.clone());
            if let Err(err) = run_blocking(move || backend.notify_renamed(&from, &to)).await {
                tracing::warn!(
                    target: "arbor.ops",
                    error = %err,
                    "backend rename notification failed"
                );
            }
        }
        tracing::info!(
            target: "arbor.ops",
            from = %file.display(),
            to = %target.display(),
            "renamed file"
        );

        self.refresh_scope(&target).await;
        Ok(target)
    }

    /// Move a file into the owning workspace folder's trash and notify the
    /// backend. Directories are rejected. Returns the path of the stored
    /// trash copy.
    pub async fn delete(&self, path: &Path) -> Result<PathBuf, OpError> {
        self.ready().await?;
        let _guard = self.mutation_lock(path).await;

        let Some(folder) = self.owning_folder(path) else {
            return Err(OpError::InvalidTarget {
                path: path.to_path_buf(),
            });
        };
        if self.fs.is_dir(path) {
            return Err(OpError::InvalidTarget {
                path: path.to_path_buf(),
            });
        }

        let trash = self.trash_for(&folder);
        let stored = {
            let path = path.to_path_buf();
            run_blocking(move || trash.trash_file(&path).map_err(|err| OpError::io(&path, err)))
                .await?
        };

        {
            let backend = Arc::clone(&self.backend);
            let deleted = path.to_path_buf();
            if let Err(err) = run_blocking(move || backend.notify_deleted(&deleted)).await {
                tracing::warn!(
                    target: "arbor.ops",
                    error = %err,
                    "backend delete notification failed"
                );
            }
        }
        tracing::info!(
            target: "arbor.ops",
            path = %path.display(),
            stored = %stored.display(),
            "moved file to trash"
        );

        self.refresh_scope(path).await;
        Ok(stored)
    }

    /// Restore a trashed file to its original path. Fails with
    /// [`OpError::NameCollision`] when the original path is occupied again,
    /// and with [`OpError::InvalidTarget`] when nothing was trashed for it.
    pub async fn restore(&self, original: &Path) -> Result<(), OpError> {
        let _guard = self.mutation_lock(original).await;

        let Some(folder) = self.owning_folder(original) else {
            return Err(OpError::InvalidTarget {
                path: original.to_path_buf(),
            });
        };
        let trash = self.trash_for(&folder);
        {
            let original = original.to_path_buf();
            run_blocking(move || {
                trash.restore(&original).map_err(|err| match err.kind() {
                    io::ErrorKind::AlreadyExists => OpError::NameCollision {
                        path: original.clone(),
                    },
                    io::ErrorKind::NotFound => OpError::InvalidTarget {
                        path: original.clone(),
                    },
                    _ => OpError::io(&original, err),
                })
            })
            .await?;
        }
        tracing::info!(
            target: "arbor.ops",
            path = %original.display(),
            "restored file from trash"
        );

        self.refresh_scope(original).await;
        Ok(())
    }

    /// Record a jar as a referenced library of the project at `project_root`
    /// and register it with the backend. The reference persists in the
    /// project's library index.
    pub async fn add_library(&self, project_root: &Path, archive: &Path) -> Result<(), OpError> {
        self.ready().await?;
        let _guard = self.mutation_lock(project_root).await;

        let mut index = load_index(project_root).await?;
        self.add_one_library(&mut index, project_root, archive)
            .await?;
        save_index(index).await?;
        tracing::info!(
            target: "arbor.ops",
            jar = %archive.display(),
            project = %project_root.display(),
            "added library reference"
        );

        self.refresh_libraries(project_root).await;
        Ok(())
    }

    /// Add every `*.jar` under `dir`, recursively. Entries that fail
    /// validation, are already referenced, or are refused by the backend are
    /// reported per entry; the rest are recorded.
    pub async fn add_library_folder(
        &self,
        project_root: &Path,
        dir: &Path,
    ) -> Result<LibraryFolderReport, OpError> {
        self.ready().await?;
        let _guard = self.mutation_lock(project_root).await;

        let jars = {
            let dir = dir.to_path_buf();
            run_blocking(move || {
                collect_files_with_extension(&dir, "jar").map_err(|err| OpError::io(&dir, err))
            })
            .await?
        };

        let mut index = load_index(project_root).await?;
        let mut report = LibraryFolderReport::default();
        for jar in jars {
            match self.add_one_library(&mut index, project_root, &jar).await {
                Ok(()) => report.added.push(jar),
                Err(reason) => report.skipped.push(SkippedLibrary { path: jar, reason }),
            }
        }
        if !report.added.is_empty() {
            save_index(index).await?;
        }
        tracing::info!(
            target: "arbor.ops",
            dir = %dir.display(),
            added = report.added.len(),
            skipped = report.skipped.len(),
            "added libraries from folder"
        );

        self.refresh_libraries(project_root).await;
        Ok(report)
    }

    /// Scaffold a project at `target` from a template. The directory may be
    /// missing or empty; anything else is refused. A partial scaffold left
    /// by a failed write is removed before the error surfaces.
    pub async fn create_project(
        &self,
        template: ProjectTemplate,
        target: &Path,
        name: &str,
    ) -> Result<(), OpError> {
        if name.is_empty() || name.contains(['/', '\\']) {
            return Err(OpError::InvalidIdentifier {
                name: name.to_string(),
            });
        }
        let _guard = self.mutation_lock(target).await;

        if self.fs.exists(target) {
            if !self.fs.is_dir(target) {
                return Err(OpError::TargetNotEmpty {
                    path: target.to_path_buf(),
                });
            }
            let entries = self
                .fs
                .read_dir(target)
                .map_err(|err| OpError::io(target, err))?;
            if !entries.is_empty() {
                return Err(OpError::TargetNotEmpty {
                    path: target.to_path_buf(),
                });
            }
        }

        let mut created_dirs = Vec::new();
        let mut created_files = Vec::new();
        if let Err(err) =
            self.write_scaffold(template, target, name, &mut created_dirs, &mut created_files)
        {
            for file in created_files.iter().rev() {
                remove_file_best_effort(self.fs.as_ref(), file);
            }
            for dir in created_dirs.iter().rev() {
                remove_empty_dir_best_effort(self.fs.as_ref(), dir);
            }
            return Err(err);
        }
        tracing::info!(
            target: "arbor.ops",
            template = ?template,
            path = %target.display(),
            "created project"
        );

        self.refresh_scope(target).await;
        Ok(())
    }

    fn write_scaffold(
        &self,
        template: ProjectTemplate,
        target: &Path,
        name: &str,
        created_dirs: &mut Vec<PathBuf>,
        created_files: &mut Vec<PathBuf>,
    ) -> Result<(), OpError> {
        if !self.fs.exists(target) {
            self.fs
                .create_dir_all(target)
                .map_err(|err| OpError::io(target, err))?;
            created_dirs.push(target.to_path_buf());
        }
        for rel in template.directories() {
            // Track every newly created level so rollback removes them
            // innermost first.
            let mut current = target.to_path_buf();
            for component in Path::new(rel).components() {
                current.push(component);
                if self.fs.exists(&current) {
                    continue;
                }
                self.fs
                    .create_dir_all(&current)
                    .map_err(|err| OpError::io(&current, err))?;
                created_dirs.push(current.clone());
            }
        }
        for file in template.files(name) {
            let path = target.join(file.rel_path);
            self.fs.write_new(&path, &file.contents).map_err(|err| {
                if err.kind() == io::ErrorKind::AlreadyExists {
                    OpError::NameCollision { path: path.clone() }
                } else {
                    OpError::io(&path, err)
                }
            })?;
            created_files.push(path);
        }
        Ok(())
    }

    /// Validate, register, then record one archive. Registration precedes
    /// the index entry so the index never references an archive the backend
    /// refused; a save that fails afterwards re-registers idempotently on
    /// retry.
    async fn add_one_library(
        &self,
        index: &mut LibraryIndex,
        project_root: &Path,
        archive: &Path,
    ) -> Result<(), OpError> {
        if index.contains(archive) {
            return Err(OpError::DuplicateLibrary {
                path: archive.to_path_buf(),
            });
        }
        {
            let archive = archive.to_path_buf();
            run_blocking(move || validate_archive(&archive)).await?;
        }
        {
            let backend = Arc::clone(&self.backend);
            let (root, jar) = (project_root.to_path_buf(), archive.to_path_buf());
            run_blocking(move || backend.register_library(&root, &jar)).await?;
        }
        index.add(archive.to_path_buf());
        Ok(())
    }

    async fn ready(&self) -> Result<(), OpError> {
        self.gate.ready(self.model.options().wait_policy).await?;
        Ok(())
    }

    /// Per-folder serialization scope: the owning workspace folder, or the
    /// path itself when it lies outside every open folder.
    async fn mutation_lock(&self, path: &Path) -> tokio::sync::OwnedMutexGuard<()> {
        let scope = self
            .owning_folder(path)
            .unwrap_or_else(|| path.to_path_buf());
        self.locks.lock(&scope).await
    }

    fn owning_folder(&self, path: &Path) -> Option<PathBuf> {
        self.model
            .workspace_folders()
            .into_iter()
            .filter(|folder| path.starts_with(folder.path()))
            .max_by_key(|folder| folder.path().components().count())
            .map(|folder| folder.key.path)
    }

    fn trash_for(&self, folder: &Path) -> Arc<Trash> {
        let mut trashes = self.trashes.lock();
        Arc::clone(
            trashes
                .entry(folder.to_path_buf())
                .or_insert_with(|| Arc::new(Trash::new(folder))),
        )
    }

    /// Dotted package name for `dir`, from its node in the tree. A source
    /// root maps to the default package.
    async fn package_of(&self, dir: &Path) -> Result<String, OpError> {
        let Some(key) = self.model.find_node_for_path(dir).await? else {
            return Err(OpError::InvalidTarget {
                path: dir.to_path_buf(),
            });
        };
        let Some(info) = self.model.node(&key) else {
            return Err(OpError::InvalidTarget {
                path: dir.to_path_buf(),
            });
        };
        match info.kind {
            NodeKind::Package { name } => Ok(name),
            NodeKind::PackageRoot { .. } => Ok(String::new()),
            _ => Err(OpError::InvalidTarget {
                path: dir.to_path_buf(),
            }),
        }
    }

    /// Refresh the smallest loaded node enclosing `path`. Failures are
    /// logged; the mutation already took effect on disk.
    async fn refresh_scope(&self, path: &Path) {
        let Some(scope) = self.model.refresh_scope_for_path(path) else {
            return;
        };
        if let Err(err) = self.model.refresh(&scope).await {
            tracing::warn!(
                target: "arbor.ops",
                path = %path.display(),
                error = %err,
                "refresh after mutation failed"
            );
        }
    }

    async fn refresh_libraries(&self, project_root: &Path) {
        let key = NodeKey::container(project_root, ContainerKind::ReferencedLibraries);
        match self.model.refresh(&key).await {
            // NodeGone means the container was never materialized.
            Ok(()) | Err(ModelError::NodeGone) => {}
            Err(err) => tracing::warn!(
                target: "arbor.ops",
                project = %project_root.display(),
                error = %err,
                "library container refresh failed"
            ),
        }
    }
}

async fn load_index(project_root: &Path) -> Result<LibraryIndex, OpError> {
    let root = project_root.to_path_buf();
    run_blocking(move || LibraryIndex::load(&root)).await
}

async fn save_index(index: LibraryIndex) -> Result<(), OpError> {
    run_blocking(move || index.save()).await
}

/// Run blocking work off the executor, mapping its error into [`OpError`].
/// A torn-down runtime surfaces as [`OpError::Cancelled`].
async fn run_blocking<T, E, F>(f: F) -> Result<T, OpError>
where
    T: Send + 'static,
    E: Into<OpError> + Send + 'static,
    F: FnOnce() -> Result<T, E> + Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result.map_err(Into::into),
        Err(_) => Err(OpError::Cancelled),
    }
}

/// Rewrite the declaration of the type named after the old file stem.
///
/// Only the first matching declaration changes; other occurrences of the
/// name (references, javadoc, strings) stay as they are. Returns `None` when
/// the file declares no type by that name, in which case the rename keeps
/// the contents untouched.
fn rewrite_primary_type(source: &str, old_name: &str, new_name: &str) -> Option<String> {
    let pattern = format!(
        r"(?m)^[^\n]*\b(?:class|interface|enum|record)\s+(?P<name>{})\b",
        regex::escape(old_name)
    );
    let re = Regex::new(&pattern).expect("valid regex");
    let caps = re.captures(source)?;
    let name = caps.name("name")?;

    let mut out = String::with_capacity(source.len());
    out.push_str(&source[..name.start()]);
    out.push_str(new_name);
    out.push_str(&source[name.end()..]);
    Some(out)
}
