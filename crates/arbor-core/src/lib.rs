//! Shared vocabulary for the Arbor workspace: Java package / identifier
//! validation, package-name ↔ path conversion, and small file-system scan
//! helpers used by project discovery and the tree model.

pub mod package;
pub mod scan;

/// How packages are grouped for display. A toggle over the same set of
/// materialized packages: `Flat` shows each populated package by its full
/// dotted name, `Hierarchical` nests per name segment.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PackagePresentation {
    #[default]
    Flat,
    Hierarchical,
}

pub use package::{
    class_to_file_name, is_valid_identifier, is_valid_package_name, package_to_path,
    path_to_package, validate_identifier, validate_package_name, PackageNameError,
};
pub use scan::{collect_files_with_extension, contains_java_sources};
