use std::path::{Path, PathBuf};

use arbor_backend::SourceRootKind;
use arbor_project::ProjectKind;
use serde::Serialize;

/// Discriminant-only node kind, part of the identity key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeTag {
    WorkspaceFolder,
    Project,
    Container,
    PackageRoot,
    Package,
    File,
    Jar,
    Type,
}

/// Identity of a node: its file-system path plus its kind.
///
/// `member` disambiguates nodes that share a path: the type name for Type
/// nodes (several types live in one file), the container label for
/// Containers (both sit on the project root), and the root kind for
/// PackageRoots (a directory can be declared as more than one root).
/// Uniqueness is guaranteed among siblings after every refresh.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeKey {
    pub path: PathBuf,
    pub tag: NodeTag,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member: Option<String>,
}

impl NodeKey {
    fn new(path: impl Into<PathBuf>, tag: NodeTag) -> Self {
        Self {
            path: path.into(),
            tag,
            member: None,
        }
    }

    pub fn workspace_folder(path: impl Into<PathBuf>) -> Self {
        Self::new(path, NodeTag::WorkspaceFolder)
    }

    pub fn project(path: impl Into<PathBuf>) -> Self {
        Self::new(path, NodeTag::Project)
    }

    pub fn container(project_root: impl Into<PathBuf>, kind: ContainerKind) -> Self {
        Self {
            path: project_root.into(),
            tag: NodeTag::Container,
            member: Some(kind.label().to_string()),
        }
    }

    pub fn package_root(path: impl Into<PathBuf>, kind: SourceRootKind) -> Self {
        let member = match kind {
            SourceRootKind::Main => "main",
            SourceRootKind::Test => "test",
        };
        Self {
            path: path.into(),
            tag: NodeTag::PackageRoot,
            member: Some(member.to_string()),
        }
    }

    pub fn package(path: impl Into<PathBuf>) -> Self {
        Self::new(path, NodeTag::Package)
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::new(path, NodeTag::File)
    }

    pub fn jar(path: impl Into<PathBuf>) -> Self {
        Self::new(path, NodeTag::Jar)
    }

    pub fn type_in_file(file: impl Into<PathBuf>, type_name: impl Into<String>) -> Self {
        Self {
            path: file.into(),
            tag: NodeTag::Type,
            member: Some(type_name.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    ReferencedLibraries,
    Dependencies,
}

impl ContainerKind {
    pub fn label(self) -> &'static str {
        match self {
            ContainerKind::ReferencedLibraries => "Referenced Libraries",
            ContainerKind::Dependencies => "Dependencies",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    /// A `.java` compilation unit.
    Source,
    /// Anything else living inside a package or source root.
    Resource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Record,
    Annotation,
}

/// Payload of a node. The closed set of things the tree can show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum NodeKind {
    WorkspaceFolder {
        name: String,
    },
    Project {
        name: String,
        kind: ProjectKind,
    },
    Container {
        kind: ContainerKind,
    },
    PackageRoot {
        kind: SourceRootKind,
    },
    /// `name` is always the full dotted package name of the directory,
    /// regardless of presentation.
    Package {
        name: String,
    },
    File {
        kind: FileKind,
    },
    Jar,
    Type {
        kind: TypeKind,
    },
}

/// Snapshot of one node handed to hosts; the internal node stays private.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeInfo {
    pub key: NodeKey,
    pub kind: NodeKind,
    pub label: String,
    pub expanded: bool,
}

impl NodeInfo {
    pub fn path(&self) -> &Path {
        &self.key.path
    }
}
