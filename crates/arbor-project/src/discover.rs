use std::path::{Path, PathBuf};

use crate::kind::{detect_project_kind, ProjectKind, BUILD_FILE_NAMES};
use crate::maven::parse_pom;
use crate::MetadataError;

/// One discovered project: enough to build its tree node, nothing more.
/// Layout and dependencies are the backend's business.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDescriptor {
    pub name: String,
    pub root: PathBuf,
    pub kind: ProjectKind,
}

/// Discover the projects under one workspace folder.
///
/// The folder root itself is a candidate, plus Maven `<modules>` declared in
/// the root pom and immediate child directories carrying a recognized
/// descriptor. Results are ordered root-first, then by path, deduplicated by
/// root. An unmanaged folder yields an empty list.
pub fn discover_projects(folder: &Path) -> Result<Vec<ProjectDescriptor>, MetadataError> {
    let mut projects = Vec::new();

    let root_kind = detect_project_kind(folder);
    if root_kind != ProjectKind::Unmanaged {
        projects.push(descriptor_for(folder, root_kind));
    }

    if root_kind == ProjectKind::Maven {
        for module_root in maven_module_roots(folder) {
            let kind = detect_project_kind(&module_root);
            if kind != ProjectKind::Unmanaged {
                projects.push(descriptor_for(&module_root, kind));
            }
        }
    }

    for child in descriptor_bearing_children(folder)? {
        let kind = detect_project_kind(&child);
        projects.push(descriptor_for(&child, kind));
    }

    let (root_entries, mut nested): (Vec<_>, Vec<_>) =
        projects.into_iter().partition(|p| p.root == folder);
    nested.sort_by(|a, b| a.root.cmp(&b.root));
    nested.dedup_by(|a, b| a.root == b.root);

    let mut out = root_entries;
    out.truncate(1);
    out.extend(nested);
    Ok(out)
}

fn descriptor_for(root: &Path, kind: ProjectKind) -> ProjectDescriptor {
    let name = root
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("project")
        .to_string();
    ProjectDescriptor {
        name,
        root: root.to_path_buf(),
        kind,
    }
}

/// Module roots declared in the folder's `pom.xml`. A malformed pom is
/// logged and treated as declaring none; the root project itself still
/// appears and reports its metadata problem when the layout is queried.
fn maven_module_roots(folder: &Path) -> Vec<PathBuf> {
    let pom_path = folder.join("pom.xml");
    match parse_pom(&pom_path) {
        Ok(pom) => pom
            .modules
            .iter()
            .map(|module| folder.join(module))
            .filter(|root| root.is_dir())
            .collect(),
        Err(err) => {
            tracing::warn!(
                target: "arbor.project",
                path = %pom_path.display(),
                error = %err,
                "skipping module discovery for malformed pom"
            );
            Vec::new()
        }
    }
}

fn descriptor_bearing_children(folder: &Path) -> Result<Vec<PathBuf>, MetadataError> {
    let entries = std::fs::read_dir(folder).map_err(|source| MetadataError::Io {
        path: folder.to_path_buf(),
        source,
    })?;

    let mut children = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| MetadataError::Io {
            path: folder.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        if BUILD_FILE_NAMES
            .iter()
            .any(|name| path.join(name).is_file())
        {
            children.push(path);
        }
    }
    Ok(children)
}
