use std::path::Path;

use arbor_backend::{SourceRoot, SourceRootKind};

use crate::kind::ProjectKind;

/// Source roots by convention for a project of `kind` rooted at `root`.
///
/// Maven and Gradle use the standard `src/main/java` / `src/test/java`
/// layout. Invisible projects get `src/` when it exists, falling back to the
/// project root itself when Java files sit directly below it. Only existing
/// directories are reported.
pub fn standard_source_roots(kind: ProjectKind, root: &Path) -> Vec<SourceRoot> {
    let mut roots = Vec::new();

    match kind {
        ProjectKind::Maven | ProjectKind::Gradle => {
            push_source_root(&mut roots, root, SourceRootKind::Main, "src/main/java");
            push_source_root(&mut roots, root, SourceRootKind::Test, "src/test/java");
        }
        ProjectKind::Invisible => {
            let src = root.join("src");
            if src.is_dir() {
                roots.push(SourceRoot {
                    kind: SourceRootKind::Main,
                    path: src,
                });
                push_source_root(&mut roots, root, SourceRootKind::Test, "src/test/java");
            } else if arbor_core::contains_java_sources(root) {
                roots.push(SourceRoot {
                    kind: SourceRootKind::Main,
                    path: root.to_path_buf(),
                });
            }
        }
        ProjectKind::Unmanaged => {}
    }

    roots
}

fn push_source_root(out: &mut Vec<SourceRoot>, root: &Path, kind: SourceRootKind, rel: &str) {
    let path = root.join(rel);
    if path.is_dir() {
        out.push(SourceRoot { kind, path });
    }
}
