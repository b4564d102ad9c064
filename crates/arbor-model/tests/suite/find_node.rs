use std::sync::Arc;

use arbor_backend::{ProjectLayout, SourceRoot, SourceRootKind};
use arbor_fs::LocalFs;
use arbor_model::{ModelOptions, NodeKey, RootTieBreak, TreeModel};
use tempfile::tempdir;

use super::fixtures::{local_model, maven_app, ready_gate, write_file, StaticBackend};

#[tokio::test(flavor = "current_thread")]
async fn resolves_a_source_file_through_its_package() {
    let dir = tempdir().expect("tempdir");
    let folder = dir.path().join("demo");
    maven_app(&folder);
    let app_java = folder.join("src/main/java/com/example/app/App.java");

    let model = local_model(ModelOptions::default());
    let folder_key = model.open_folder(&folder, "demo");

    let found = model
        .find_node_for_path(&app_java)
        .await
        .expect("find")
        .expect("node for App.java");
    assert_eq!(found, NodeKey::file(&app_java));

    assert_eq!(
        model.ancestors(&found),
        vec![
            folder_key,
            NodeKey::project(&folder),
            NodeKey::package_root(folder.join("src/main/java"), SourceRootKind::Main),
            NodeKey::package(folder.join("src/main/java/com/example/app")),
        ]
    );
}

#[tokio::test(flavor = "current_thread")]
async fn resolves_a_package_directory() {
    let dir = tempdir().expect("tempdir");
    let folder = dir.path().join("demo");
    maven_app(&folder);
    let impl_dir = folder.join("src/main/java/com/example/app/impl");

    let model = local_model(ModelOptions::default());
    model.open_folder(&folder, "demo");

    let found = model
        .find_node_for_path(&impl_dir)
        .await
        .expect("find")
        .expect("node for package dir");
    assert_eq!(found, NodeKey::package(&impl_dir));
}

#[tokio::test(flavor = "current_thread")]
async fn resolves_folder_and_project_roots_to_their_nodes() {
    let dir = tempdir().expect("tempdir");
    let folder = dir.path().join("ws");
    let nested = folder.join("lib-a");
    maven_app(&nested);

    let model = local_model(ModelOptions::default());
    let folder_key = model.open_folder(&folder, "ws");

    assert_eq!(
        model.find_node_for_path(&folder).await.expect("find folder"),
        Some(folder_key)
    );
    assert_eq!(
        model.find_node_for_path(&nested).await.expect("find project"),
        Some(NodeKey::project(&nested))
    );
}

#[tokio::test(flavor = "current_thread")]
async fn paths_outside_source_roots_resolve_to_none() {
    let dir = tempdir().expect("tempdir");
    let folder = dir.path().join("demo");
    maven_app(&folder);
    write_file(&folder.join("target/classes/App.class"), "");

    let model = local_model(ModelOptions::default());
    model.open_folder(&folder, "demo");

    assert_eq!(
        model
            .find_node_for_path(&folder.join("target/classes/App.class"))
            .await
            .expect("find"),
        None
    );
    assert_eq!(
        model
            .find_node_for_path(dir.path().join("elsewhere/X.java").as_path())
            .await
            .expect("find"),
        None
    );
}

#[tokio::test(flavor = "current_thread")]
async fn equal_roots_resolve_by_declaration_order() {
    let dir = tempdir().expect("tempdir");
    let folder = dir.path().join("demo");
    maven_app(&folder);
    let src = folder.join("src");
    write_file(&src.join("a/C.java"), "package a;\n\nclass C {\n}\n");

    // The same directory declared as both a main and a test root.
    let layout = ProjectLayout {
        source_roots: vec![
            SourceRoot {
                kind: SourceRootKind::Main,
                path: src.clone(),
            },
            SourceRoot {
                kind: SourceRootKind::Test,
                path: src.clone(),
            },
        ],
        dependencies: Vec::new(),
    };
    let target = src.join("a/C.java");

    let first = TreeModel::new(
        Arc::new(LocalFs::new()),
        Arc::new(StaticBackend::single(&folder, layout.clone())),
        ready_gate(),
        ModelOptions::default(),
    );
    first.open_folder(&folder, "demo");
    let found = first
        .find_node_for_path(&target)
        .await
        .expect("find")
        .expect("node");
    assert!(first
        .ancestors(&found)
        .contains(&NodeKey::package_root(&src, SourceRootKind::Main)));

    let last = TreeModel::new(
        Arc::new(LocalFs::new()),
        Arc::new(StaticBackend::single(&folder, layout)),
        ready_gate(),
        ModelOptions {
            root_tie_break: RootTieBreak::LastDeclared,
            ..ModelOptions::default()
        },
    );
    last.open_folder(&folder, "demo");
    let found = last
        .find_node_for_path(&target)
        .await
        .expect("find")
        .expect("node");
    assert!(last
        .ancestors(&found)
        .contains(&NodeKey::package_root(&src, SourceRootKind::Test)));
}

#[tokio::test(flavor = "current_thread")]
async fn deeper_root_wins_regardless_of_declaration_order() {
    let dir = tempdir().expect("tempdir");
    let folder = dir.path().join("plain");
    write_file(&folder.join("src/Main.java"), "public class Main {\n}\n");
    let test_file = folder.join("src/test/java/AppTest.java");
    write_file(&test_file, "class AppTest {\n}\n");

    let model = local_model(ModelOptions::default());
    model.open_folder(&folder, "plain");

    let found = model
        .find_node_for_path(&test_file)
        .await
        .expect("find")
        .expect("node");
    assert_eq!(found, NodeKey::file(&test_file));
    assert!(model.ancestors(&found).contains(&NodeKey::package_root(
        folder.join("src/test/java"),
        SourceRootKind::Test,
    )));
}

#[tokio::test(flavor = "current_thread")]
async fn files_created_after_listing_appear_once_refreshed() {
    let dir = tempdir().expect("tempdir");
    let folder = dir.path().join("demo");
    maven_app(&folder);
    let app_dir = folder.join("src/main/java/com/example/app");

    let model = local_model(ModelOptions::default());
    model.open_folder(&folder, "demo");
    let app_key = model
        .find_node_for_path(&app_dir)
        .await
        .expect("find")
        .expect("package node");
    model.list_children(&app_key).await.expect("materialize");

    let extra = app_dir.join("Extra.java");
    write_file(&extra, "package com.example.app;\n\nclass Extra {\n}\n");

    // The cached child list predates the file.
    assert_eq!(model.find_node_for_path(&extra).await.expect("find"), None);

    model.refresh(&app_key).await.expect("refresh package");
    assert_eq!(
        model.find_node_for_path(&extra).await.expect("find"),
        Some(NodeKey::file(&extra))
    );
}
