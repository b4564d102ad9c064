use std::path::{Path, PathBuf};

use crate::MetadataError;

/// The parts of a `pom.xml` Arbor cares about: the artifact id for project
/// naming, `<modules>` for nested project discovery, and `<dependencies>`
/// for local classpath resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pom {
    pub artifact_id: Option<String>,
    pub modules: Vec<String>,
    pub dependencies: Vec<MavenDependency>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MavenDependency {
    pub group_id: String,
    pub artifact_id: String,
    pub version: Option<String>,
}

impl MavenDependency {
    /// Path of this dependency's jar inside a local Maven repository, or
    /// `None` when the version is absent or still a `${…}` placeholder.
    pub fn jar_path(&self, maven_repo: &Path) -> Option<PathBuf> {
        let version = self.version.as_deref()?;
        if version.contains("${") {
            return None;
        }

        let mut path = maven_repo.to_path_buf();
        for part in self.group_id.split('.') {
            path.push(part);
        }
        path.push(&self.artifact_id);
        path.push(version);
        path.push(format!("{}-{}.jar", self.artifact_id, version));
        Some(path)
    }
}

pub fn parse_pom(path: &Path) -> Result<Pom, MetadataError> {
    let contents = std::fs::read_to_string(path).map_err(|source| MetadataError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let doc = roxmltree::Document::parse(&contents).map_err(|source| MetadataError::Xml {
        path: path.to_path_buf(),
        source,
    })?;

    let project = doc.root_element();

    let mut pom = Pom {
        artifact_id: child_text(&project, "artifactId"),
        ..Pom::default()
    };

    if let Some(modules_node) = child_element(&project, "modules") {
        pom.modules = modules_node
            .children()
            .filter(|n| n.is_element() && n.has_tag_name("module"))
            .filter_map(|n| n.text())
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
    }

    if let Some(deps_node) = child_element(&project, "dependencies") {
        pom.dependencies = deps_node
            .children()
            .filter(|n| n.is_element() && n.has_tag_name("dependency"))
            .filter_map(|dep_node| {
                Some(MavenDependency {
                    group_id: child_text(&dep_node, "groupId")?,
                    artifact_id: child_text(&dep_node, "artifactId")?,
                    version: child_text(&dep_node, "version"),
                })
            })
            .collect();
    }

    Ok(pom)
}

pub(crate) fn default_maven_repo() -> Option<PathBuf> {
    let home = std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)?;
    Some(home.join(".m2/repository"))
}

fn child_element<'a>(
    node: &'a roxmltree::Node<'a, 'a>,
    name: &str,
) -> Option<roxmltree::Node<'a, 'a>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

fn child_text(node: &roxmltree::Node<'_, '_>, name: &str) -> Option<String> {
    child_element(node, name)
        .and_then(|n| n.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}
