use std::sync::Arc;
use std::time::Duration;

use arbor_backend::{ProjectLayout, ReadinessGate, SourceRoot, SourceRootKind, WaitPolicy};
use arbor_fs::{FileChange, FileSystem, LocalFs};
use arbor_model::{ModelError, ModelOptions, NodeKey, TreeModel};
use arbor_project::LocalBackend;
use tempfile::tempdir;

use super::fixtures::{
    local_model, maven_app, ready_gate, write_file, BlockingFs, CountingFs, StaticBackend,
    UnavailableBackend,
};

async fn main_root_key(model: &TreeModel, folder_key: &NodeKey) -> NodeKey {
    let project = model
        .list_children(folder_key)
        .await
        .expect("projects")
        .remove(0);
    model
        .list_children(&project.key)
        .await
        .expect("project children")
        .into_iter()
        .find(|c| c.label == "src/main/java")
        .expect("main source root")
        .key
}

#[tokio::test(flavor = "current_thread")]
async fn concurrent_refreshes_coalesce_into_one_scan() {
    let dir = tempdir().expect("tempdir");
    let folder = dir.path().join("demo");
    maven_app(&folder);

    let fs = Arc::new(BlockingFs::new());
    let model = TreeModel::new(
        Arc::clone(&fs) as Arc<dyn FileSystem>,
        Arc::new(LocalBackend::new()),
        ready_gate(),
        ModelOptions::default(),
    );
    let folder_key = model.open_folder(&folder, "demo");
    let root_key = main_root_key(&model, &folder_key).await;

    model.refresh(&root_key).await.expect("baseline refresh");
    let single = fs.read_dir_count();
    assert!(single > 0);
    fs.reset_count();

    // Hold the scan open so the second request provably arrives while the
    // first is still in flight.
    fs.hold();
    let first = tokio::spawn({
        let model = model.clone();
        let root_key = root_key.clone();
        async move { model.refresh(&root_key).await }
    });
    tokio::task::yield_now().await;
    let second = tokio::spawn({
        let model = model.clone();
        let root_key = root_key.clone();
        async move { model.refresh(&root_key).await }
    });
    tokio::task::yield_now().await;
    fs.release();

    first.await.expect("join").expect("initiating refresh");
    second.await.expect("join").expect("coalesced refresh");
    assert_eq!(
        fs.read_dir_count(),
        single,
        "two concurrent refreshes must share one scan"
    );
}

#[tokio::test(flavor = "current_thread")]
async fn listings_are_cached_until_refreshed() {
    let dir = tempdir().expect("tempdir");
    let folder = dir.path().join("demo");
    maven_app(&folder);

    let fs = Arc::new(CountingFs::new());
    let model = TreeModel::new(
        Arc::clone(&fs) as Arc<dyn FileSystem>,
        Arc::new(LocalBackend::new()),
        ready_gate(),
        ModelOptions::default(),
    );
    let folder_key = model.open_folder(&folder, "demo");
    let root_key = main_root_key(&model, &folder_key).await;

    model.list_children(&root_key).await.expect("first listing");
    assert!(fs.read_dir_count() > 0);

    fs.reset();
    model.list_children(&root_key).await.expect("cached listing");
    assert_eq!(fs.read_dir_count(), 0);

    model.refresh(&root_key).await.expect("refresh");
    assert!(fs.read_dir_count() > 0);
}

#[tokio::test(flavor = "current_thread")]
async fn refresh_picks_up_new_packages_and_keeps_expansion() {
    let dir = tempdir().expect("tempdir");
    let folder = dir.path().join("demo");
    maven_app(&folder);

    let model = local_model(ModelOptions::default());
    let folder_key = model.open_folder(&folder, "demo");
    let root_key = main_root_key(&model, &folder_key).await;

    let packages = model.list_children(&root_key).await.expect("packages");
    let app_key = packages[0].key.clone();
    assert!(model.set_expanded(&app_key, true));

    write_file(
        &folder.join("src/main/java/com/example/extra/Extra.java"),
        "package com.example.extra;\n\nclass Extra {\n}\n",
    );
    model.refresh(&root_key).await.expect("refresh root");

    let labels: Vec<String> = model
        .list_children(&root_key)
        .await
        .expect("packages")
        .into_iter()
        .map(|c| c.label)
        .collect();
    assert_eq!(
        labels,
        vec!["com.example.app", "com.example.app.impl", "com.example.extra"]
    );
    // Same identity, so the expansion flag carries across the refresh.
    assert!(model.is_expanded(&app_key));
}

#[tokio::test(flavor = "current_thread")]
async fn closing_the_folder_cancels_an_inflight_refresh() {
    let dir = tempdir().expect("tempdir");
    let folder = dir.path().join("demo");
    maven_app(&folder);

    let fs = Arc::new(BlockingFs::new());
    let model = TreeModel::new(
        Arc::clone(&fs) as Arc<dyn FileSystem>,
        Arc::new(LocalBackend::new()),
        ready_gate(),
        ModelOptions::default(),
    );
    let folder_key = model.open_folder(&folder, "demo");
    let root_key = main_root_key(&model, &folder_key).await;

    fs.hold();
    let task = tokio::spawn({
        let model = model.clone();
        let root_key = root_key.clone();
        async move { model.refresh(&root_key).await }
    });
    tokio::task::yield_now().await;

    assert!(model.close_folder(&folder));
    fs.release();

    let result = task.await.expect("join refresh task");
    assert_eq!(result, Err(ModelError::Cancelled));
    assert!(model.node(&root_key).is_none());
    assert_eq!(
        model.refresh(&root_key).await,
        Err(ModelError::NodeGone)
    );
}

#[tokio::test(flavor = "current_thread")]
async fn metadata_failure_degrades_the_project_to_its_containers() {
    let dir = tempdir().expect("tempdir");
    let folder = dir.path().join("demo");
    maven_app(&folder);

    let model = TreeModel::new(
        Arc::new(LocalFs::new()),
        Arc::new(UnavailableBackend),
        ready_gate(),
        ModelOptions::default(),
    );
    let folder_key = model.open_folder(&folder, "demo");
    let project = model
        .list_children(&folder_key)
        .await
        .expect("projects")
        .remove(0);

    let labels: Vec<String> = model
        .list_children(&project.key)
        .await
        .expect("degraded listing")
        .into_iter()
        .map(|c| c.label)
        .collect();
    assert_eq!(labels, vec!["Referenced Libraries", "Dependencies"]);
}

#[tokio::test(flavor = "current_thread")]
async fn fail_fast_reports_not_ready_until_the_gate_opens() {
    let dir = tempdir().expect("tempdir");
    let folder = dir.path().join("demo");
    maven_app(&folder);

    let gate = Arc::new(ReadinessGate::new());
    let model = TreeModel::new(
        Arc::new(LocalFs::new()),
        Arc::new(LocalBackend::new()),
        Arc::clone(&gate),
        ModelOptions {
            wait_policy: WaitPolicy::FailFast,
            ..ModelOptions::default()
        },
    );
    let folder_key = model.open_folder(&folder, "demo");

    // Project discovery never consults the backend.
    let project = model
        .list_children(&folder_key)
        .await
        .expect("projects")
        .remove(0);

    assert_eq!(
        model.list_children(&project.key).await,
        Err(ModelError::NotReady)
    );

    gate.mark_ready();
    let children = model
        .list_children(&project.key)
        .await
        .expect("listing after ready");
    assert!(!children.is_empty());
}

#[tokio::test(flavor = "current_thread")]
async fn waiting_refreshes_release_when_the_gate_opens() {
    let dir = tempdir().expect("tempdir");
    let folder = dir.path().join("demo");
    maven_app(&folder);

    let gate = Arc::new(ReadinessGate::new());
    let model = TreeModel::new(
        Arc::new(LocalFs::new()),
        Arc::new(LocalBackend::new()),
        Arc::clone(&gate),
        ModelOptions::default(),
    );
    let folder_key = model.open_folder(&folder, "demo");
    let project = model
        .list_children(&folder_key)
        .await
        .expect("projects")
        .remove(0);

    let task = tokio::spawn({
        let model = model.clone();
        let key = project.key.clone();
        async move { model.list_children(&key).await }
    });
    tokio::task::yield_now().await;
    assert!(!task.is_finished());

    gate.mark_ready();
    let children = tokio::time::timeout(Duration::from_secs(1), task)
        .await
        .expect("released by gate")
        .expect("join")
        .expect("listing");
    assert!(!children.is_empty());
}

#[tokio::test(flavor = "current_thread")]
async fn duplicate_source_root_declarations_collapse() {
    let dir = tempdir().expect("tempdir");
    let folder = dir.path().join("demo");
    maven_app(&folder);
    let src = folder.join("src/main/java");

    let layout = ProjectLayout {
        source_roots: vec![
            SourceRoot {
                kind: SourceRootKind::Main,
                path: src.clone(),
            },
            SourceRoot {
                kind: SourceRootKind::Main,
                path: src.clone(),
            },
        ],
        dependencies: Vec::new(),
    };
    let model = TreeModel::new(
        Arc::new(LocalFs::new()),
        Arc::new(StaticBackend::single(&folder, layout)),
        ready_gate(),
        ModelOptions::default(),
    );
    let folder_key = model.open_folder(&folder, "demo");
    let project = model
        .list_children(&folder_key)
        .await
        .expect("projects")
        .remove(0);

    let children = model
        .list_children(&project.key)
        .await
        .expect("project children");
    let roots: Vec<_> = children
        .iter()
        .filter(|c| c.key == NodeKey::package_root(&src, SourceRootKind::Main))
        .collect();
    assert_eq!(roots.len(), 1);
    assert_eq!(children.len(), 3);
}

#[tokio::test(flavor = "current_thread")]
async fn build_descriptor_changes_scope_to_the_owning_folder() {
    let dir = tempdir().expect("tempdir");
    let folder = dir.path().join("demo");
    maven_app(&folder);

    let model = local_model(ModelOptions::default());
    let folder_key = model.open_folder(&folder, "demo");
    let root_key = main_root_key(&model, &folder_key).await;
    let packages = model.list_children(&root_key).await.expect("packages");
    let app_key = packages[0].key.clone();

    assert_eq!(
        model.refresh_scope_for_path(&folder.join("pom.xml")),
        Some(folder_key.clone())
    );
    assert_eq!(
        model.refresh_scope_for_path(&app_key.path.join("Extra.java")),
        Some(app_key)
    );
}

#[tokio::test(flavor = "current_thread")]
async fn scope_falls_back_to_the_folder_until_children_load() {
    let dir = tempdir().expect("tempdir");
    let folder = dir.path().join("demo");
    maven_app(&folder);

    let model = local_model(ModelOptions::default());
    let folder_key = model.open_folder(&folder, "demo");

    assert_eq!(
        model.refresh_scope_for_path(&folder.join("src/main/java/com/example/app/App.java")),
        Some(folder_key)
    );
}

#[tokio::test(flavor = "current_thread")]
async fn file_changes_refresh_the_enclosing_package() {
    let dir = tempdir().expect("tempdir");
    let folder = dir.path().join("demo");
    maven_app(&folder);

    let model = local_model(ModelOptions::default());
    let folder_key = model.open_folder(&folder, "demo");
    let root_key = main_root_key(&model, &folder_key).await;
    let packages = model.list_children(&root_key).await.expect("packages");
    let app_key = packages[0].key.clone();
    model.list_children(&app_key).await.expect("materialize");

    let extra = app_key.path.join("Extra.java");
    write_file(&extra, "package com.example.app;\n\nclass Extra {\n}\n");

    let scopes = model
        .handle_file_change(&FileChange::Created(extra.clone()))
        .await
        .expect("auto refresh");
    assert_eq!(scopes, vec![app_key.clone()]);

    let labels: Vec<String> = model
        .list_children(&app_key)
        .await
        .expect("package files")
        .into_iter()
        .map(|c| c.label)
        .collect();
    assert_eq!(labels, vec!["App.java", "Extra.java"]);
}

#[tokio::test(flavor = "current_thread")]
async fn auto_refresh_can_be_disabled() {
    let dir = tempdir().expect("tempdir");
    let folder = dir.path().join("demo");
    maven_app(&folder);

    let model = local_model(ModelOptions {
        auto_refresh: false,
        ..ModelOptions::default()
    });
    let folder_key = model.open_folder(&folder, "demo");
    let root_key = main_root_key(&model, &folder_key).await;
    let packages = model.list_children(&root_key).await.expect("packages");
    let app_key = packages[0].key.clone();
    model.list_children(&app_key).await.expect("materialize");

    let extra = app_key.path.join("Extra.java");
    write_file(&extra, "package com.example.app;\n\nclass Extra {\n}\n");

    let scopes = model
        .handle_file_change(&FileChange::Created(extra))
        .await
        .expect("no-op");
    assert!(scopes.is_empty());

    let labels: Vec<String> = model
        .list_children(&app_key)
        .await
        .expect("package files")
        .into_iter()
        .map(|c| c.label)
        .collect();
    assert_eq!(labels, vec!["App.java"]);
}
