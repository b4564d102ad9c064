use std::sync::OnceLock;

use regex::Regex;

use crate::node::TypeKind;

/// A top-level type declaration found in a source file, in declaration
/// order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    pub name: String,
    pub kind: TypeKind,
}

/// Scrape type declarations out of Java source text.
///
/// A line-anchored regex, not a parser: good enough to label the types a
/// file declares without pulling in syntax analysis. Nested types match too;
/// the tree only needs names and kinds.
pub fn extract_types(source: &str) -> Vec<TypeDecl> {
    static TYPE_RE: OnceLock<Regex> = OnceLock::new();
    let re = TYPE_RE.get_or_init(|| {
        Regex::new(
            r"(?m)^\s*(?:public\s+|protected\s+|private\s+)?(?:abstract\s+|final\s+|static\s+|sealed\s+|non-sealed\s+)*(class|interface|enum|record|@interface)\s+([A-Za-z_$][A-Za-z0-9_$]*)",
        )
        .expect("valid type declaration regex")
    });

    let mut out = Vec::new();
    for cap in re.captures_iter(source) {
        let kind = match cap.get(1).map(|m| m.as_str()) {
            Some("class") => TypeKind::Class,
            Some("interface") => TypeKind::Interface,
            Some("enum") => TypeKind::Enum,
            Some("record") => TypeKind::Record,
            Some("@interface") => TypeKind::Annotation,
            _ => continue,
        };
        let Some(name) = cap.get(2) else {
            continue;
        };
        out.push(TypeDecl {
            name: name.as_str().to_string(),
            kind,
        });
    }
    out
}
