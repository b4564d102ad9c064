use std::path::{Path, PathBuf};

use arbor_backend::{
    AnalysisBackend, BackendError, ClasspathEntry, ClasspathEntryKind, ProjectLayout,
};

use crate::kind::{detect_project_kind, ProjectKind};
use crate::layout::standard_source_roots;
use crate::maven::{default_maven_repo, parse_pom};
use crate::MetadataError;

/// Heuristic [`AnalysisBackend`] over build-file conventions.
///
/// No build tool runs and no sources are analyzed: source roots come from
/// the standard layouts, Maven dependencies from jars already present in
/// the local repository. Good enough for the CLI and tests; editor hosts
/// put a real analyzer behind the same trait.
#[derive(Debug, Clone)]
pub struct LocalBackend {
    maven_repo: Option<PathBuf>,
}

impl Default for LocalBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalBackend {
    pub fn new() -> Self {
        Self {
            maven_repo: default_maven_repo(),
        }
    }

    /// Resolve Maven dependencies against `repo` instead of `~/.m2`.
    pub fn with_maven_repo(repo: PathBuf) -> Self {
        Self {
            maven_repo: Some(repo),
        }
    }

    fn maven_dependencies(&self, project_root: &Path) -> Result<Vec<ClasspathEntry>, BackendError> {
        let pom = parse_pom(&project_root.join("pom.xml")).map_err(metadata_unavailable)?;

        let Some(repo) = self.maven_repo.as_deref() else {
            return Ok(Vec::new());
        };

        // Only jars already sitting in the local repository; nothing is fetched.
        let mut entries: Vec<ClasspathEntry> = pom
            .dependencies
            .iter()
            .filter_map(|dep| dep.jar_path(repo))
            .filter(|jar| jar.is_file())
            .map(|jar| ClasspathEntry {
                kind: ClasspathEntryKind::Jar,
                path: jar,
            })
            .collect();
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        entries.dedup_by(|a, b| a.path == b.path);
        Ok(entries)
    }
}

impl AnalysisBackend for LocalBackend {
    fn project_layout(&self, project_root: &Path) -> Result<ProjectLayout, BackendError> {
        let kind = detect_project_kind(project_root);
        let source_roots = standard_source_roots(kind, project_root);

        let dependencies = match kind {
            ProjectKind::Maven => self.maven_dependencies(project_root)?,
            // Resolving Gradle dependencies would mean executing Gradle;
            // the local backend reports none.
            ProjectKind::Gradle | ProjectKind::Invisible | ProjectKind::Unmanaged => Vec::new(),
        };

        Ok(ProjectLayout {
            source_roots,
            dependencies,
        })
    }

    fn register_library(&self, project_root: &Path, archive: &Path) -> Result<(), BackendError> {
        tracing::debug!(
            target: "arbor.project",
            project = %project_root.display(),
            archive = %archive.display(),
            "registered library archive"
        );
        Ok(())
    }

    fn prepare_rename(&self, _path: &Path) -> Result<(), BackendError> {
        Ok(())
    }

    fn notify_renamed(&self, from: &Path, to: &Path) -> Result<(), BackendError> {
        tracing::debug!(
            target: "arbor.project",
            from = %from.display(),
            to = %to.display(),
            "source file renamed"
        );
        Ok(())
    }

    fn notify_deleted(&self, path: &Path) -> Result<(), BackendError> {
        tracing::debug!(
            target: "arbor.project",
            path = %path.display(),
            "source file deleted"
        );
        Ok(())
    }
}

fn metadata_unavailable(err: MetadataError) -> BackendError {
    BackendError::MetadataUnavailable {
        path: err.path().to_path_buf(),
        message: err.to_string(),
    }
}
