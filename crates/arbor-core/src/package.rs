use std::path::{Component, Path, PathBuf};

/// Reserved words that can never be used as a package segment or type name.
///
/// Includes the unused-but-reserved `const`/`goto`, the boolean/null literals,
/// and the single underscore (reserved since Java 9). Contextual keywords such
/// as `var`, `record`, or `sealed` remain valid identifiers.
const RESERVED: &[&str] = &[
    "abstract",
    "assert",
    "boolean",
    "break",
    "byte",
    "case",
    "catch",
    "char",
    "class",
    "const",
    "continue",
    "default",
    "do",
    "double",
    "else",
    "enum",
    "extends",
    "false",
    "final",
    "finally",
    "float",
    "for",
    "goto",
    "if",
    "implements",
    "import",
    "instanceof",
    "int",
    "interface",
    "long",
    "native",
    "new",
    "null",
    "package",
    "private",
    "protected",
    "public",
    "return",
    "short",
    "static",
    "strictfp",
    "super",
    "switch",
    "synchronized",
    "this",
    "throw",
    "throws",
    "transient",
    "true",
    "try",
    "void",
    "volatile",
    "while",
    "_",
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PackageNameError {
    #[error("package name is empty")]
    Empty,
    #[error("package name `{name}` contains an empty segment")]
    EmptySegment { name: String },
    #[error("`{segment}` is not a valid Java identifier")]
    InvalidSegment { segment: String },
    #[error("`{segment}` is a reserved word")]
    ReservedWord { segment: String },
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_identifier_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// `true` when `name` is a well-formed, non-reserved Java identifier.
pub fn is_valid_identifier(name: &str) -> bool {
    validate_identifier(name).is_ok()
}

pub fn validate_identifier(name: &str) -> Result<(), PackageNameError> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err(PackageNameError::Empty);
    };
    if !is_identifier_start(first) || !chars.all(is_identifier_part) {
        return Err(PackageNameError::InvalidSegment {
            segment: name.to_string(),
        });
    }
    if RESERVED.contains(&name) {
        return Err(PackageNameError::ReservedWord {
            segment: name.to_string(),
        });
    }
    Ok(())
}

/// Validate a dotted package name (`com.example.app`).
///
/// Empty segments cover leading, trailing, and doubled dots. Each segment must
/// be a valid identifier in its own right.
pub fn validate_package_name(name: &str) -> Result<(), PackageNameError> {
    if name.is_empty() {
        return Err(PackageNameError::Empty);
    }
    for segment in name.split('.') {
        if segment.is_empty() {
            return Err(PackageNameError::EmptySegment {
                name: name.to_string(),
            });
        }
        validate_identifier(segment)?;
    }
    Ok(())
}

pub fn is_valid_package_name(name: &str) -> bool {
    validate_package_name(name).is_ok()
}

/// Map a dotted package name onto a relative directory path.
pub fn package_to_path(name: &str) -> PathBuf {
    let mut path = PathBuf::new();
    for segment in name.split('.').filter(|s| !s.is_empty()) {
        path.push(segment);
    }
    path
}

/// Map a relative directory path back onto a dotted package name.
///
/// Returns `None` for absolute paths, paths containing `.`/`..` components,
/// or components that are not valid UTF-8. The empty path maps to the default
/// package (empty string).
pub fn path_to_package(relative: &Path) -> Option<String> {
    let mut segments = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(os) => segments.push(os.to_str()?),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(segments.join("."))
}

/// File name for a top-level type, `App` → `App.java`.
pub fn class_to_file_name(type_name: &str) -> String {
    format!("{type_name}.java")
}
