use std::path::Path;

use serde::{Deserialize, Serialize};

/// The build descriptors Arbor recognizes, checked at the project root only.
/// Exactly these literal names decide project kind; Gradle Kotlin scripts or
/// nested descriptors do not.
pub const BUILD_FILE_NAMES: &[&str] = &["pom.xml", "build.gradle"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectKind {
    Maven,
    Gradle,
    /// Java sources without any recognized build descriptor.
    Invisible,
    /// Neither a descriptor nor Java sources. Discovery yields no project
    /// for such folders; the variant exists for hosts that tag them.
    Unmanaged,
}

impl ProjectKind {
    pub fn is_managed(self) -> bool {
        matches!(self, ProjectKind::Maven | ProjectKind::Gradle)
    }

    pub fn label(self) -> &'static str {
        match self {
            ProjectKind::Maven => "maven",
            ProjectKind::Gradle => "gradle",
            ProjectKind::Invisible => "invisible",
            ProjectKind::Unmanaged => "unmanaged",
        }
    }
}

/// Decide the project kind for `root`. Maven wins over Gradle when both
/// descriptors are present.
pub fn detect_project_kind(root: &Path) -> ProjectKind {
    if root.join("pom.xml").is_file() {
        ProjectKind::Maven
    } else if root.join("build.gradle").is_file() {
        ProjectKind::Gradle
    } else if arbor_core::contains_java_sources(root) {
        ProjectKind::Invisible
    } else {
        ProjectKind::Unmanaged
    }
}

/// What a changed path means for refresh scoping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeCategory {
    /// A recognized build descriptor; the project kind itself may have
    /// changed, so the refresh widens to the workspace folder.
    BuildDescriptor,
    JavaSource,
    Other,
}

pub fn is_build_descriptor(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| BUILD_FILE_NAMES.contains(&name))
}

pub fn categorize_path(path: &Path) -> ChangeCategory {
    if is_build_descriptor(path) {
        ChangeCategory::BuildDescriptor
    } else if path.extension().is_some_and(|ext| ext == "java") {
        ChangeCategory::JavaSource
    } else {
        ChangeCategory::Other
    }
}
