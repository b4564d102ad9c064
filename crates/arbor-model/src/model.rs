use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arbor_backend::{
    AnalysisBackend, BackendError, ClasspathEntryKind, ProjectLayout, ReadinessGate, WaitPolicy,
};
use arbor_core::PackagePresentation;
use arbor_fs::{FileChange, FileSystem};
use arbor_project::{
    categorize_path, discover_projects, ChangeCategory, LibraryIndex, ProjectKind,
};
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::inflight::{await_coalesced, Begin, InflightRegistry};
use crate::node::{ContainerKind, FileKind, NodeInfo, NodeKey, NodeKind, NodeTag};
use crate::packages::{child_segments, dotted_name, immediate_files, scan_populated_packages};
use crate::types::extract_types;
use crate::ModelError;

/// Which source root claims a path when two roots match it with equal
/// specificity (the same directory declared as more than one root).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RootTieBreak {
    #[default]
    FirstDeclared,
    LastDeclared,
}

#[derive(Debug, Clone, Copy)]
pub struct ModelOptions {
    pub presentation: PackagePresentation,
    pub root_tie_break: RootTieBreak,
    /// How backend-dependent listings behave while the gate is pending.
    pub wait_policy: WaitPolicy,
    pub auto_refresh: bool,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            presentation: PackagePresentation::Flat,
            root_tie_break: RootTieBreak::FirstDeclared,
            wait_policy: WaitPolicy::Wait,
            auto_refresh: true,
        }
    }
}

struct Node {
    key: NodeKey,
    kind: NodeKind,
    label: String,
    parent: Option<NodeKey>,
    /// `None` until the first listing; refresh replaces the whole vector.
    children: Option<Vec<NodeKey>>,
}

#[derive(Default)]
struct TreeState {
    folders: Vec<NodeKey>,
    nodes: HashMap<NodeKey, Node>,
    /// Expansion lives outside the nodes so it survives child replacement.
    expanded: HashSet<NodeKey>,
    selection: Option<NodeKey>,
}

struct ChildSpec {
    key: NodeKey,
    kind: NodeKind,
    label: String,
}

struct ModelInner {
    fs: Arc<dyn FileSystem>,
    backend: Arc<dyn AnalysisBackend>,
    gate: Arc<ReadinessGate>,
    options: ModelOptions,
    state: Mutex<TreeState>,
    inflight: InflightRegistry,
}

/// The tree over every opened workspace folder. Cheap to clone; all clones
/// share one state.
#[derive(Clone)]
pub struct TreeModel {
    inner: Arc<ModelInner>,
}

impl TreeModel {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        backend: Arc<dyn AnalysisBackend>,
        gate: Arc<ReadinessGate>,
        options: ModelOptions,
    ) -> Self {
        Self {
            inner: Arc::new(ModelInner {
                fs,
                backend,
                gate,
                options,
                state: Mutex::new(TreeState::default()),
                inflight: InflightRegistry::new(),
            }),
        }
    }

    pub fn options(&self) -> ModelOptions {
        self.inner.options
    }

    /// Register a workspace folder. Projects below it are discovered lazily
    /// on the first listing. Re-opening an already-open folder is a no-op.
    pub fn open_folder(&self, path: impl Into<PathBuf>, name: impl Into<String>) -> NodeKey {
        let path = path.into();
        let name = name.into();
        let key = NodeKey::workspace_folder(&path);

        let mut st = self.inner.state.lock();
        if !st.nodes.contains_key(&key) {
            st.nodes.insert(
                key.clone(),
                Node {
                    key: key.clone(),
                    kind: NodeKind::WorkspaceFolder { name: name.clone() },
                    label: name,
                    parent: None,
                    children: None,
                },
            );
            st.folders.push(key.clone());
            tracing::info!(
                target: "arbor.model",
                folder = %path.display(),
                "opened workspace folder"
            );
        }
        key
    }

    /// Tear down a folder's subtree and cancel its in-flight refreshes.
    pub fn close_folder(&self, path: &Path) -> bool {
        self.inner.inflight.cancel_under(path);

        let mut st = self.inner.state.lock();
        let key = NodeKey::workspace_folder(path);
        let Some(pos) = st.folders.iter().position(|k| *k == key) else {
            return false;
        };
        st.folders.remove(pos);

        let subtree = collect_subtree(&st, &key);
        for k in &subtree {
            st.nodes.remove(k);
            st.expanded.remove(k);
        }
        if st
            .selection
            .as_ref()
            .is_some_and(|sel| !st.nodes.contains_key(sel))
        {
            st.selection = None;
        }
        tracing::info!(
            target: "arbor.model",
            folder = %path.display(),
            removed = subtree.len(),
            "closed workspace folder"
        );
        true
    }

    pub fn workspace_folders(&self) -> Vec<NodeInfo> {
        let st = self.inner.state.lock();
        st.folders
            .iter()
            .filter_map(|key| snapshot(&st, key))
            .collect()
    }

    pub fn node(&self, key: &NodeKey) -> Option<NodeInfo> {
        let st = self.inner.state.lock();
        snapshot(&st, key)
    }

    /// Ancestor chain of a node, outermost first, excluding the node itself.
    pub fn ancestors(&self, key: &NodeKey) -> Vec<NodeKey> {
        let st = self.inner.state.lock();
        let mut out = Vec::new();
        let mut cur = st.nodes.get(key).and_then(|n| n.parent.clone());
        while let Some(k) = cur {
            cur = st.nodes.get(&k).and_then(|n| n.parent.clone());
            out.push(k);
        }
        out.reverse();
        out
    }

    /// Returns `false` when the node is gone.
    pub fn set_expanded(&self, key: &NodeKey, expanded: bool) -> bool {
        let mut st = self.inner.state.lock();
        if !st.nodes.contains_key(key) {
            return false;
        }
        if expanded {
            st.expanded.insert(key.clone());
        } else {
            st.expanded.remove(key);
        }
        true
    }

    pub fn is_expanded(&self, key: &NodeKey) -> bool {
        self.inner.state.lock().expanded.contains(key)
    }

    pub fn selection(&self) -> Option<NodeKey> {
        self.inner.state.lock().selection.clone()
    }

    /// Returns `false` when selecting a node the tree does not hold.
    pub fn select(&self, key: Option<NodeKey>) -> bool {
        let mut st = self.inner.state.lock();
        if let Some(k) = &key {
            if !st.nodes.contains_key(k) {
                return false;
            }
        }
        st.selection = key;
        true
    }

    /// Children of a node, computing and caching them on first access.
    pub async fn list_children(&self, key: &NodeKey) -> Result<Vec<NodeInfo>, ModelError> {
        let cached = {
            let st = self.inner.state.lock();
            st.nodes
                .get(key)
                .ok_or(ModelError::NodeGone)?
                .children
                .clone()
        };
        if cached.is_none() {
            self.refresh(key).await?;
        }

        let st = self.inner.state.lock();
        let node = st.nodes.get(key).ok_or(ModelError::NodeGone)?;
        Ok(node
            .children
            .clone()
            .unwrap_or_default()
            .iter()
            .filter_map(|k| snapshot(&st, k))
            .collect())
    }

    /// Rebuild the subtree rooted at `key`: recompute its child list and
    /// drop descendant caches. Concurrent requests for the same node
    /// coalesce into the running one and share its outcome.
    pub async fn refresh(&self, key: &NodeKey) -> Result<(), ModelError> {
        match self.inner.inflight.begin(key.clone()) {
            Begin::Coalesced(rx) => {
                tracing::debug!(
                    target: "arbor.model",
                    path = %key.path.display(),
                    node = ?key.tag,
                    "coalescing into in-flight refresh"
                );
                await_coalesced(rx).await
            }
            Begin::Started(guard) => {
                let token = guard.token();
                let result = self.perform_refresh(key, &token).await;
                if let Err(err) = &result {
                    tracing::debug!(
                        target: "arbor.model",
                        path = %key.path.display(),
                        node = ?key.tag,
                        error = %err,
                        "refresh failed"
                    );
                }
                guard.complete(result.clone());
                result
            }
        }
    }

    /// Refresh every open workspace folder.
    pub async fn refresh_all(&self) -> Result<(), ModelError> {
        let folders = self.inner.state.lock().folders.clone();
        for folder in folders {
            self.refresh(&folder).await?;
        }
        Ok(())
    }

    /// Resolve a file-system path to its deepest matching node.
    ///
    /// Walks folder → project → the package root with the longest matching
    /// prefix (ties broken by declaration order per the model options) →
    /// packages and files, materializing children along the way. Paths that
    /// land under a project but inside no package root resolve to `None`.
    pub async fn find_node_for_path(&self, path: &Path) -> Result<Option<NodeKey>, ModelError> {
        let folder = {
            let st = self.inner.state.lock();
            st.folders
                .iter()
                .filter(|k| path.starts_with(&k.path))
                .max_by_key(|k| k.path.components().count())
                .cloned()
        };
        let Some(folder) = folder else {
            return Ok(None);
        };
        if folder.path == path {
            return Ok(Some(folder));
        }

        let project = self
            .ensure_children_keys(&folder)
            .await?
            .into_iter()
            .filter(|k| k.tag == NodeTag::Project && path.starts_with(&k.path))
            .max_by_key(|k| k.path.components().count());
        let Some(project) = project else {
            return Ok(None);
        };
        if project.path == path {
            return Ok(Some(project));
        }

        let mut best: Option<NodeKey> = None;
        for key in self
            .ensure_children_keys(&project)
            .await?
            .into_iter()
            .filter(|k| k.tag == NodeTag::PackageRoot && path.starts_with(&k.path))
        {
            let better = match &best {
                None => true,
                Some(cur) => {
                    let depth = key.path.components().count();
                    let cur_depth = cur.path.components().count();
                    depth > cur_depth
                        || (depth == cur_depth
                            && self.inner.options.root_tie_break == RootTieBreak::LastDeclared)
                }
            };
            if better {
                best = Some(key);
            }
        }
        let Some(mut current) = best else {
            return Ok(None);
        };

        loop {
            if current.path == path {
                return Ok(Some(current));
            }
            let next = self
                .ensure_children_keys(&current)
                .await?
                .into_iter()
                .filter(|k| k.tag != NodeTag::Type && path.starts_with(&k.path))
                .max_by_key(|k| k.path.components().count());
            match next {
                Some(n) => current = n,
                None => return Ok(None),
            }
        }
    }

    /// Smallest loaded node a changed path should refresh: the workspace
    /// folder for build-descriptor changes (the project kind itself may
    /// change), otherwise the deepest structural node strictly above the
    /// path. `None` when the path is outside every open folder or nothing
    /// containing it is loaded yet.
    pub fn refresh_scope_for_path(&self, path: &Path) -> Option<NodeKey> {
        let st = self.inner.state.lock();
        if categorize_path(path) == ChangeCategory::BuildDescriptor {
            return st
                .folders
                .iter()
                .filter(|k| path.starts_with(&k.path))
                .max_by_key(|k| k.path.components().count())
                .cloned();
        }

        let mut best: Option<&NodeKey> = None;
        for key in st.nodes.keys() {
            if !matches!(
                key.tag,
                NodeTag::Package | NodeTag::PackageRoot | NodeTag::Project | NodeTag::WorkspaceFolder
            ) {
                continue;
            }
            if key.path == path || !path.starts_with(&key.path) {
                continue;
            }
            if best.is_none_or(|b| key.path.components().count() > b.path.components().count()) {
                best = Some(key);
            }
        }
        best.cloned()
    }

    /// React to a file change when auto refresh is enabled: refresh the
    /// scope of every touched path. Returns the refreshed scopes.
    pub async fn handle_file_change(
        &self,
        change: &FileChange,
    ) -> Result<Vec<NodeKey>, ModelError> {
        if !self.inner.options.auto_refresh {
            return Ok(Vec::new());
        }

        let scopes: BTreeSet<NodeKey> = change
            .paths()
            .into_iter()
            .filter_map(|p| self.refresh_scope_for_path(p))
            .collect();
        let scopes: Vec<NodeKey> = scopes.into_iter().collect();
        for scope in &scopes {
            self.refresh(scope).await?;
        }
        Ok(scopes)
    }

    async fn ensure_children_keys(&self, key: &NodeKey) -> Result<Vec<NodeKey>, ModelError> {
        {
            let st = self.inner.state.lock();
            let node = st.nodes.get(key).ok_or(ModelError::NodeGone)?;
            if let Some(children) = &node.children {
                return Ok(children.clone());
            }
        }
        self.refresh(key).await?;

        let st = self.inner.state.lock();
        let node = st.nodes.get(key).ok_or(ModelError::NodeGone)?;
        Ok(node.children.clone().unwrap_or_default())
    }

    async fn perform_refresh(
        &self,
        key: &NodeKey,
        token: &CancellationToken,
    ) -> Result<(), ModelError> {
        let (kind, excludes) = {
            let st = self.inner.state.lock();
            let node = st.nodes.get(key).ok_or(ModelError::NodeGone)?;
            let excludes = match key.tag {
                NodeTag::PackageRoot | NodeTag::Package => nested_root_excludes(&st, node),
                _ => Vec::new(),
            };
            (node.kind.clone(), excludes)
        };

        let specs = self.compute_children(key, &kind, excludes, token).await?;
        if token.is_cancelled() {
            return Err(ModelError::Cancelled);
        }
        self.apply_children(key, specs)
    }

    async fn compute_children(
        &self,
        key: &NodeKey,
        kind: &NodeKind,
        excludes: Vec<PathBuf>,
        token: &CancellationToken,
    ) -> Result<Vec<ChildSpec>, ModelError> {
        match kind {
            NodeKind::WorkspaceFolder { .. } => {
                self.folder_children(key.path.clone(), token).await
            }
            NodeKind::Project { kind, .. } => {
                self.project_children(key.path.clone(), *kind, token).await
            }
            NodeKind::Container { kind } => {
                self.container_children(key.path.clone(), *kind, token).await
            }
            NodeKind::PackageRoot { .. } => {
                self.directory_children(key.path.clone(), String::new(), excludes, token)
                    .await
            }
            NodeKind::Package { name } => {
                self.directory_children(key.path.clone(), name.clone(), excludes, token)
                    .await
            }
            NodeKind::File { kind: FileKind::Source } => {
                self.file_children(key.path.clone(), token).await
            }
            NodeKind::File { .. } | NodeKind::Jar | NodeKind::Type { .. } => Ok(Vec::new()),
        }
    }

    async fn folder_children(
        &self,
        folder: PathBuf,
        token: &CancellationToken,
    ) -> Result<Vec<ChildSpec>, ModelError> {
        let descriptors =
            run_blocking(token, move || discover_projects(&folder)).await??;
        Ok(descriptors
            .into_iter()
            .map(|d| ChildSpec {
                key: NodeKey::project(&d.root),
                kind: NodeKind::Project {
                    name: d.name.clone(),
                    kind: d.kind,
                },
                label: d.name,
            })
            .collect())
    }

    async fn project_children(
        &self,
        root: PathBuf,
        project_kind: ProjectKind,
        token: &CancellationToken,
    ) -> Result<Vec<ChildSpec>, ModelError> {
        self.inner.gate.ready(self.inner.options.wait_policy).await?;

        let backend = Arc::clone(&self.inner.backend);
        let layout_root = root.clone();
        let layout = run_blocking(token, move || backend.project_layout(&layout_root)).await?;
        let layout = match layout {
            Ok(layout) => layout,
            Err(BackendError::MetadataUnavailable { path, message }) => {
                tracing::warn!(
                    target: "arbor.model",
                    project = %root.display(),
                    descriptor = %path.display(),
                    reason = %message,
                    "project metadata unavailable; showing empty containers"
                );
                ProjectLayout::default()
            }
            Err(err) => return Err(err.into()),
        };

        let mut specs = vec![container_spec(&root, ContainerKind::ReferencedLibraries)];
        if project_kind.is_managed() {
            specs.push(container_spec(&root, ContainerKind::Dependencies));
        }
        for source_root in layout.source_roots {
            let label = match source_root.path.strip_prefix(&root) {
                Ok(rel) if !rel.as_os_str().is_empty() => rel.display().to_string(),
                _ => source_root
                    .path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| source_root.path.display().to_string()),
            };
            specs.push(ChildSpec {
                key: NodeKey::package_root(&source_root.path, source_root.kind),
                kind: NodeKind::PackageRoot {
                    kind: source_root.kind,
                },
                label,
            });
        }
        Ok(specs)
    }

    async fn container_children(
        &self,
        project_root: PathBuf,
        container: ContainerKind,
        token: &CancellationToken,
    ) -> Result<Vec<ChildSpec>, ModelError> {
        match container {
            ContainerKind::ReferencedLibraries => {
                let index =
                    run_blocking(token, move || LibraryIndex::load(&project_root)).await??;
                Ok(index.libraries().map(jar_spec).collect())
            }
            ContainerKind::Dependencies => {
                self.inner.gate.ready(self.inner.options.wait_policy).await?;
                let backend = Arc::clone(&self.inner.backend);
                let root = project_root.clone();
                let layout = run_blocking(token, move || backend.project_layout(&root)).await?;
                let layout = match layout {
                    Ok(layout) => layout,
                    Err(BackendError::MetadataUnavailable { path, message }) => {
                        tracing::warn!(
                            target: "arbor.model",
                            project = %project_root.display(),
                            descriptor = %path.display(),
                            reason = %message,
                            "dependency resolution degraded to empty"
                        );
                        ProjectLayout::default()
                    }
                    Err(err) => return Err(err.into()),
                };
                Ok(layout
                    .dependencies
                    .iter()
                    .filter(|entry| entry.kind == ClasspathEntryKind::Jar)
                    .map(|entry| jar_spec(&entry.path))
                    .collect())
            }
        }
    }

    async fn directory_children(
        &self,
        dir: PathBuf,
        parent_dotted: String,
        excludes: Vec<PathBuf>,
        token: &CancellationToken,
    ) -> Result<Vec<ChildSpec>, ModelError> {
        let fs = Arc::clone(&self.inner.fs);
        let presentation = self.inner.options.presentation;
        let is_package = !parent_dotted.is_empty();

        run_blocking(token, move || -> Result<Vec<ChildSpec>, ModelError> {
            let mut specs = Vec::new();

            match (presentation, is_package) {
                (PackagePresentation::Flat, false) => {
                    // Every populated package directly under the root, by
                    // full dotted name.
                    let populated = scan_populated_packages(fs.as_ref(), &dir, &excludes)?;
                    for package_dir in &populated {
                        if let Some(name) = dotted_name(&dir, package_dir) {
                            specs.push(package_spec(package_dir, name.clone(), name));
                        }
                    }
                }
                (PackagePresentation::Flat, true) => {
                    // Sub-packages are siblings under the root in flat mode.
                }
                (PackagePresentation::Hierarchical, _) => {
                    let populated = scan_populated_packages(fs.as_ref(), &dir, &excludes)?;
                    for segment_dir in child_segments(&dir, &populated) {
                        let Some(segment) = segment_dir
                            .file_name()
                            .and_then(|n| n.to_str())
                            .map(str::to_string)
                        else {
                            continue;
                        };
                        let name = if parent_dotted.is_empty() {
                            segment.clone()
                        } else {
                            format!("{parent_dotted}.{segment}")
                        };
                        specs.push(package_spec(&segment_dir, name, segment));
                    }
                }
            }
            specs.sort_by(|a, b| a.label.cmp(&b.label));

            for file in immediate_files(fs.as_ref(), &dir)? {
                specs.push(file_spec(&file));
            }
            Ok(specs)
        })
        .await?
    }

    async fn file_children(
        &self,
        path: PathBuf,
        token: &CancellationToken,
    ) -> Result<Vec<ChildSpec>, ModelError> {
        let fs = Arc::clone(&self.inner.fs);
        run_blocking(token, move || -> Result<Vec<ChildSpec>, ModelError> {
            let source = match fs.read_to_string(&path) {
                Ok(source) => source,
                // The file can vanish between the parent scan and this read.
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
                Err(err) => return Err(ModelError::io(&path, &err)),
            };
            Ok(extract_types(&source)
                .into_iter()
                .map(|decl| ChildSpec {
                    key: NodeKey::type_in_file(&path, &decl.name),
                    kind: NodeKind::Type { kind: decl.kind },
                    label: decl.name,
                })
                .collect())
        })
        .await?
    }

    fn apply_children(&self, key: &NodeKey, specs: Vec<ChildSpec>) -> Result<(), ModelError> {
        let mut st = self.inner.state.lock();
        if !st.nodes.contains_key(key) {
            // The subtree was closed or refreshed away while we computed.
            return Err(ModelError::Cancelled);
        }

        let old = collect_subtree(&st, key);
        for k in old.iter().filter(|k| *k != key) {
            st.nodes.remove(k);
        }

        let mut child_keys = Vec::with_capacity(specs.len());
        let mut seen: HashSet<NodeKey> = HashSet::with_capacity(specs.len());
        for spec in specs {
            if !seen.insert(spec.key.clone()) {
                tracing::warn!(
                    target: "arbor.model",
                    path = %spec.key.path.display(),
                    node = ?spec.key.tag,
                    "dropping duplicate child identity"
                );
                continue;
            }
            child_keys.push(spec.key.clone());
            st.nodes.insert(
                spec.key.clone(),
                Node {
                    key: spec.key,
                    kind: spec.kind,
                    label: spec.label,
                    parent: Some(key.clone()),
                    children: None,
                },
            );
        }
        if let Some(node) = st.nodes.get_mut(key) {
            node.children = Some(child_keys);
        }
        if st
            .selection
            .as_ref()
            .is_some_and(|sel| !st.nodes.contains_key(sel))
        {
            st.selection = None;
        }
        Ok(())
    }
}

fn snapshot(st: &TreeState, key: &NodeKey) -> Option<NodeInfo> {
    st.nodes.get(key).map(|node| NodeInfo {
        key: node.key.clone(),
        kind: node.kind.clone(),
        label: node.label.clone(),
        expanded: st.expanded.contains(key),
    })
}

/// The node and everything below it, via cached child links.
fn collect_subtree(st: &TreeState, key: &NodeKey) -> Vec<NodeKey> {
    let mut out = vec![key.clone()];
    let mut i = 0;
    while i < out.len() {
        if let Some(node) = st.nodes.get(&out[i]) {
            if let Some(children) = &node.children {
                out.extend(children.iter().cloned());
            }
        }
        i += 1;
    }
    out
}

/// Paths of sibling package roots nested strictly below this node, looked up
/// through the owning project. Their subtrees belong to them, not to us.
fn nested_root_excludes(st: &TreeState, node: &Node) -> Vec<PathBuf> {
    let mut cur = node.parent.clone();
    let project = loop {
        let Some(key) = cur else {
            return Vec::new();
        };
        let Some(parent) = st.nodes.get(&key) else {
            return Vec::new();
        };
        if key.tag == NodeTag::Project {
            break parent;
        }
        cur = parent.parent.clone();
    };

    let Some(children) = &project.children else {
        return Vec::new();
    };
    children
        .iter()
        .filter(|k| k.tag == NodeTag::PackageRoot)
        .map(|k| k.path.clone())
        .filter(|p| p.starts_with(&node.key.path) && *p != node.key.path)
        .collect()
}

async fn run_blocking<T, F>(token: &CancellationToken, f: F) -> Result<T, ModelError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let handle = tokio::task::spawn_blocking(f);
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(ModelError::Cancelled),
        joined = handle => joined.map_err(|_| ModelError::Cancelled),
    }
}

fn container_spec(project_root: &Path, kind: ContainerKind) -> ChildSpec {
    ChildSpec {
        key: NodeKey::container(project_root, kind),
        kind: NodeKind::Container { kind },
        label: kind.label().to_string(),
    }
}

fn package_spec(dir: &Path, name: String, label: String) -> ChildSpec {
    ChildSpec {
        key: NodeKey::package(dir),
        kind: NodeKind::Package { name },
        label,
    }
}

fn file_spec(path: &Path) -> ChildSpec {
    let label = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let kind = if path.extension().is_some_and(|ext| ext == "java") {
        FileKind::Source
    } else {
        FileKind::Resource
    };
    ChildSpec {
        key: NodeKey::file(path),
        kind: NodeKind::File { kind },
        label,
    }
}

fn jar_spec(path: &Path) -> ChildSpec {
    let label = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    ChildSpec {
        key: NodeKey::jar(path),
        kind: NodeKind::Jar,
        label,
    }
}
