use std::path::PathBuf;
use std::sync::Arc;

use arbor_backend::{ClasspathEntry, ClasspathEntryKind, ProjectLayout, SourceRoot, SourceRootKind};
use arbor_core::PackagePresentation;
use arbor_fs::LocalFs;
use arbor_model::{
    ContainerKind, FileKind, ModelError, ModelOptions, NodeInfo, NodeKey, NodeKind, NodeTag,
    TreeModel, TypeKind,
};
use arbor_project::{LibraryIndex, ProjectKind};
use tempfile::tempdir;

use super::fixtures::{local_model, maven_app, ready_gate, write_file, StaticBackend};

async fn children_of(model: &TreeModel, key: &NodeKey) -> Vec<NodeInfo> {
    model.list_children(key).await.expect("list children")
}

fn labels(children: &[NodeInfo]) -> Vec<&str> {
    children.iter().map(|c| c.label.as_str()).collect()
}

fn child_labeled<'a>(children: &'a [NodeInfo], label: &str) -> &'a NodeInfo {
    children
        .iter()
        .find(|c| c.label == label)
        .unwrap_or_else(|| panic!("no child labeled {label:?} in {:?}", labels(children)))
}

#[tokio::test(flavor = "current_thread")]
async fn folder_lists_discovered_projects() {
    let dir = tempdir().expect("tempdir");
    let folder = dir.path().join("demo");
    maven_app(&folder);

    let model = local_model(ModelOptions::default());
    let folder_key = model.open_folder(&folder, "demo");

    let projects = children_of(&model, &folder_key).await;
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].key, NodeKey::project(&folder));
    assert_eq!(
        projects[0].kind,
        NodeKind::Project {
            name: "demo".to_string(),
            kind: ProjectKind::Maven,
        }
    );
}

#[tokio::test(flavor = "current_thread")]
async fn folder_lists_root_project_before_nested_ones() {
    let dir = tempdir().expect("tempdir");
    let folder = dir.path().join("ws");
    maven_app(&folder.join("lib-a"));

    let model = local_model(ModelOptions::default());
    let folder_key = model.open_folder(&folder, "ws");

    let projects = children_of(&model, &folder_key).await;
    assert_eq!(labels(&projects), vec!["ws", "lib-a"]);
    // The folder root has no descriptor but holds Java sources below it.
    assert_eq!(
        projects[0].kind,
        NodeKind::Project {
            name: "ws".to_string(),
            kind: ProjectKind::Invisible,
        }
    );
    assert_eq!(
        projects[1].kind,
        NodeKind::Project {
            name: "lib-a".to_string(),
            kind: ProjectKind::Maven,
        }
    );
}

#[tokio::test(flavor = "current_thread")]
async fn managed_project_shows_containers_then_source_roots() {
    let dir = tempdir().expect("tempdir");
    let folder = dir.path().join("demo");
    maven_app(&folder);
    std::fs::create_dir_all(folder.join("src/test/java")).expect("test root");

    let model = local_model(ModelOptions::default());
    let folder_key = model.open_folder(&folder, "demo");
    let project = children_of(&model, &folder_key).await.remove(0);

    let children = children_of(&model, &project.key).await;
    assert_eq!(
        labels(&children),
        vec![
            "Referenced Libraries",
            "Dependencies",
            "src/main/java",
            "src/test/java",
        ]
    );
    assert_eq!(
        children[0].key,
        NodeKey::container(&folder, ContainerKind::ReferencedLibraries)
    );
    assert_eq!(
        children[2].key,
        NodeKey::package_root(folder.join("src/main/java"), SourceRootKind::Main)
    );
    assert_eq!(
        children[3].key,
        NodeKey::package_root(folder.join("src/test/java"), SourceRootKind::Test)
    );
}

#[tokio::test(flavor = "current_thread")]
async fn flat_presentation_lists_populated_packages_by_dotted_name() {
    let dir = tempdir().expect("tempdir");
    let folder = dir.path().join("demo");
    maven_app(&folder);

    let model = local_model(ModelOptions::default());
    let folder_key = model.open_folder(&folder, "demo");
    let project = children_of(&model, &folder_key).await.remove(0);
    let root = child_labeled(&children_of(&model, &project.key).await, "src/main/java").clone();

    let packages = children_of(&model, &root.key).await;
    // `com` and `com.example` hold no compilation units of their own.
    assert_eq!(labels(&packages), vec!["com.example.app", "com.example.app.impl"]);
    assert_eq!(
        packages[0].kind,
        NodeKind::Package {
            name: "com.example.app".to_string(),
        }
    );

    let files = children_of(&model, &packages[0].key).await;
    assert_eq!(labels(&files), vec!["App.java"]);
    assert_eq!(files[0].kind, NodeKind::File { kind: FileKind::Source });
}

#[tokio::test(flavor = "current_thread")]
async fn hierarchical_presentation_nests_segments() {
    let dir = tempdir().expect("tempdir");
    let folder = dir.path().join("demo");
    maven_app(&folder);

    let model = local_model(ModelOptions {
        presentation: PackagePresentation::Hierarchical,
        ..ModelOptions::default()
    });
    let folder_key = model.open_folder(&folder, "demo");
    let project = children_of(&model, &folder_key).await.remove(0);
    let root = child_labeled(&children_of(&model, &project.key).await, "src/main/java").clone();

    let top = children_of(&model, &root.key).await;
    assert_eq!(labels(&top), vec!["com"]);

    let example = children_of(&model, &top[0].key).await;
    assert_eq!(labels(&example), vec!["example"]);

    let app = children_of(&model, &example[0].key).await;
    assert_eq!(labels(&app), vec!["app"]);
    // Labels show one segment; the payload still carries the dotted name.
    assert_eq!(
        app[0].kind,
        NodeKind::Package {
            name: "com.example.app".to_string(),
        }
    );

    let inside_app = children_of(&model, &app[0].key).await;
    assert_eq!(labels(&inside_app), vec!["impl", "App.java"]);

    let inside_impl = children_of(&model, &inside_app[0].key).await;
    assert_eq!(labels(&inside_impl), vec!["Impl.java"]);
}

#[tokio::test(flavor = "current_thread")]
async fn default_package_files_and_resources_list_after_packages() {
    let dir = tempdir().expect("tempdir");
    let folder = dir.path().join("demo");
    maven_app(&folder);
    write_file(
        &folder.join("src/main/java/Main.java"),
        "public class Main {\n}\n",
    );
    write_file(
        &folder.join("src/main/java/com/example/app/notes.txt"),
        "scratch\n",
    );

    let model = local_model(ModelOptions::default());
    let folder_key = model.open_folder(&folder, "demo");
    let project = children_of(&model, &folder_key).await.remove(0);
    let root = child_labeled(&children_of(&model, &project.key).await, "src/main/java").clone();

    let children = children_of(&model, &root.key).await;
    assert_eq!(
        labels(&children),
        vec!["com.example.app", "com.example.app.impl", "Main.java"]
    );

    let app = children_of(&model, &children[0].key).await;
    assert_eq!(labels(&app), vec!["App.java", "notes.txt"]);
    assert_eq!(app[1].kind, NodeKind::File { kind: FileKind::Resource });
}

#[tokio::test(flavor = "current_thread")]
async fn type_nodes_follow_declaration_order() {
    let dir = tempdir().expect("tempdir");
    let folder = dir.path().join("demo");
    maven_app(&folder);
    let shapes = folder.join("src/main/java/com/example/app/Shapes.java");
    write_file(
        &shapes,
        "package com.example.app;\n\ninterface Shape {\n}\n\npublic class Shapes {\n}\n",
    );

    let model = local_model(ModelOptions::default());
    let folder_key = model.open_folder(&folder, "demo");
    let project = children_of(&model, &folder_key).await.remove(0);
    let root = child_labeled(&children_of(&model, &project.key).await, "src/main/java").clone();
    let packages = children_of(&model, &root.key).await;
    let file = child_labeled(&children_of(&model, &packages[0].key).await, "Shapes.java").clone();

    let types = children_of(&model, &file.key).await;
    assert_eq!(labels(&types), vec!["Shape", "Shapes"]);
    assert_eq!(types[0].kind, NodeKind::Type { kind: TypeKind::Interface });
    assert_eq!(types[1].kind, NodeKind::Type { kind: TypeKind::Class });
    assert_eq!(types[0].key, NodeKey::type_in_file(&shapes, "Shape"));
}

#[tokio::test(flavor = "current_thread")]
async fn invisible_project_has_no_dependencies_container() {
    let dir = tempdir().expect("tempdir");
    let folder = dir.path().join("plain");
    write_file(&folder.join("src/Main.java"), "public class Main {\n}\n");

    let model = local_model(ModelOptions::default());
    let folder_key = model.open_folder(&folder, "plain");

    let projects = children_of(&model, &folder_key).await;
    assert_eq!(
        projects[0].kind,
        NodeKind::Project {
            name: "plain".to_string(),
            kind: ProjectKind::Invisible,
        }
    );

    let children = children_of(&model, &projects[0].key).await;
    assert_eq!(labels(&children), vec!["Referenced Libraries", "src"]);
    assert_eq!(children[1].key.tag, NodeTag::PackageRoot);
}

#[tokio::test(flavor = "current_thread")]
async fn nested_root_subtree_stays_with_the_nested_root() {
    let dir = tempdir().expect("tempdir");
    let folder = dir.path().join("plain");
    write_file(&folder.join("src/Main.java"), "public class Main {\n}\n");
    write_file(
        &folder.join("src/test/java/AppTest.java"),
        "class AppTest {\n}\n",
    );

    let model = local_model(ModelOptions::default());
    let folder_key = model.open_folder(&folder, "plain");
    let project = children_of(&model, &folder_key).await.remove(0);
    let roots = children_of(&model, &project.key).await;
    assert_eq!(labels(&roots), vec!["Referenced Libraries", "src", "src/test/java"]);

    // The test root's subtree does not leak into the outer root's listing.
    let main_children = children_of(&model, &roots[1].key).await;
    assert_eq!(labels(&main_children), vec!["Main.java"]);

    let test_children = children_of(&model, &roots[2].key).await;
    assert_eq!(labels(&test_children), vec!["AppTest.java"]);
}

#[tokio::test(flavor = "current_thread")]
async fn referenced_libraries_lists_indexed_jars() {
    let dir = tempdir().expect("tempdir");
    let folder = dir.path().join("demo");
    maven_app(&folder);

    let mut index = LibraryIndex::load(&folder).expect("load index");
    index.add(PathBuf::from("/libs/tools.jar"));
    index.save().expect("save index");

    let model = local_model(ModelOptions::default());
    let folder_key = model.open_folder(&folder, "demo");
    let project = children_of(&model, &folder_key).await.remove(0);
    let container =
        child_labeled(&children_of(&model, &project.key).await, "Referenced Libraries").clone();

    let jars = children_of(&model, &container.key).await;
    assert_eq!(labels(&jars), vec!["tools.jar"]);
    assert_eq!(jars[0].kind, NodeKind::Jar);
    assert_eq!(jars[0].key.tag, NodeTag::Jar);
}

#[tokio::test(flavor = "current_thread")]
async fn corrupt_library_index_fails_the_container_listing() {
    let dir = tempdir().expect("tempdir");
    let folder = dir.path().join("demo");
    maven_app(&folder);
    write_file(&LibraryIndex::index_path(&folder), "not json");

    let model = local_model(ModelOptions::default());
    let folder_key = model.open_folder(&folder, "demo");
    let project = children_of(&model, &folder_key).await.remove(0);
    let container =
        child_labeled(&children_of(&model, &project.key).await, "Referenced Libraries").clone();

    let err = model
        .list_children(&container.key)
        .await
        .expect_err("corrupt index");
    assert!(matches!(err, ModelError::Metadata { .. }));
}

#[tokio::test(flavor = "current_thread")]
async fn dependencies_container_lists_only_jar_entries() {
    let dir = tempdir().expect("tempdir");
    let folder = dir.path().join("demo");
    maven_app(&folder);

    let layout = ProjectLayout {
        source_roots: vec![SourceRoot {
            kind: SourceRootKind::Main,
            path: folder.join("src/main/java"),
        }],
        dependencies: vec![
            ClasspathEntry {
                kind: ClasspathEntryKind::Jar,
                path: PathBuf::from("/repo/guava.jar"),
            },
            ClasspathEntry {
                kind: ClasspathEntryKind::Directory,
                path: PathBuf::from("/out/classes"),
            },
        ],
    };
    let model = TreeModel::new(
        Arc::new(LocalFs::new()),
        Arc::new(StaticBackend::single(&folder, layout)),
        ready_gate(),
        ModelOptions::default(),
    );

    let folder_key = model.open_folder(&folder, "demo");
    let project = children_of(&model, &folder_key).await.remove(0);
    let container =
        child_labeled(&children_of(&model, &project.key).await, "Dependencies").clone();

    let deps = children_of(&model, &container.key).await;
    assert_eq!(labels(&deps), vec!["guava.jar"]);
}
