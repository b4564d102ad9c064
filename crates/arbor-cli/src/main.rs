use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

use anyhow::{Context, Result};
use arbor_backend::{AnalysisBackend, ReadinessGate, SourceRootKind};
use arbor_fs::{FileSystem, LocalFs};
use arbor_model::{ModelError, ModelOptions, NodeInfo, NodeKey, NodeKind, TreeModel};
use arbor_ops::{OpsEngine, ProjectTemplate};
use arbor_project::LocalBackend;
use arbor_sync::SyncController;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;

#[derive(Parser)]
#[command(
    name = "arbor",
    version,
    about = "Arbor CLI (project tree, explorer sync, file operations)"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the build-project tree of a workspace folder
    Tree(TreeArgs),
    /// List the projects discovered in a workspace folder
    Projects(ProjectsArgs),
    /// Resolve a file to its tree node, expand its ancestors, select it
    Reveal(RevealArgs),
    /// Create a Java class in a package or source root
    NewClass(NewClassArgs),
    /// Create a package directory chain under a source root
    NewPackage(NewPackageArgs),
    /// Rename a file, rewriting its primary type declaration
    Rename(RenameArgs),
    /// Move a file into the workspace trash
    Delete(DeleteArgs),
    /// Restore the newest trashed copy of a file
    Restore(RestoreArgs),
    /// Record a jar in a project's referenced libraries
    AddLibrary(AddLibraryArgs),
    /// Record every jar found under a folder
    AddLibraryFolder(AddLibraryFolderArgs),
    /// Scaffold a new project from a template
    NewProject(NewProjectArgs),
}

#[derive(Args)]
struct TreeArgs {
    /// Workspace folder to open (defaults to the current directory)
    #[arg(default_value = ".")]
    path: PathBuf,
    /// Limit the printed depth; the folder itself is depth 0
    #[arg(long)]
    depth: Option<usize>,
    /// Emit JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ProjectsArgs {
    /// Workspace folder to open (defaults to the current directory)
    #[arg(default_value = ".")]
    path: PathBuf,
    /// Emit JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct RevealArgs {
    /// File to reveal
    path: PathBuf,
    /// Workspace folder (defaults to the current directory)
    #[arg(long, default_value = ".")]
    workspace: PathBuf,
    /// Emit JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct NewClassArgs {
    /// Package or source root directory to create the class in
    dir: PathBuf,
    /// Type name, without the `.java` suffix
    name: String,
    /// Workspace folder (defaults to the current directory)
    #[arg(long, default_value = ".")]
    workspace: PathBuf,
    /// Emit JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct NewPackageArgs {
    /// Source root to create the package under
    root: PathBuf,
    /// Dotted package name, e.g. `com.example.app`
    name: String,
    /// Workspace folder (defaults to the current directory)
    #[arg(long, default_value = ".")]
    workspace: PathBuf,
    /// Emit JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct RenameArgs {
    /// File to rename
    path: PathBuf,
    /// New name; for `.java` files the type name, otherwise the file name
    name: String,
    /// Workspace folder (defaults to the current directory)
    #[arg(long, default_value = ".")]
    workspace: PathBuf,
    /// Emit JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct DeleteArgs {
    /// File to move into the trash
    path: PathBuf,
    /// Workspace folder (defaults to the current directory)
    #[arg(long, default_value = ".")]
    workspace: PathBuf,
    /// Emit JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct RestoreArgs {
    /// Original path of the trashed file
    path: PathBuf,
    /// Workspace folder (defaults to the current directory)
    #[arg(long, default_value = ".")]
    workspace: PathBuf,
    /// Emit JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct AddLibraryArgs {
    /// Project root the library belongs to
    project: PathBuf,
    /// Jar archive to record
    jar: PathBuf,
    /// Workspace folder (defaults to the current directory)
    #[arg(long, default_value = ".")]
    workspace: PathBuf,
    /// Emit JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct AddLibraryFolderArgs {
    /// Project root the libraries belong to
    project: PathBuf,
    /// Folder to scan recursively for `*.jar`
    dir: PathBuf,
    /// Workspace folder (defaults to the current directory)
    #[arg(long, default_value = ".")]
    workspace: PathBuf,
    /// Emit JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct NewProjectArgs {
    /// Template to scaffold
    #[arg(value_enum)]
    template: TemplateArg,
    /// Directory to create; must be missing or empty
    target: PathBuf,
    /// Project name (defaults to the target directory name)
    #[arg(long)]
    name: Option<String>,
    /// Workspace folder (defaults to the current directory)
    #[arg(long, default_value = ".")]
    workspace: PathBuf,
    /// Emit JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TemplateArg {
    /// README plus a runnable src/App.java
    NoBuildTools,
    /// Minimal pom.xml with the standard layout
    Maven,
    /// Minimal build.gradle with the standard layout
    Gradle,
}

impl From<TemplateArg> for ProjectTemplate {
    fn from(value: TemplateArg) -> Self {
        match value {
            TemplateArg::NoBuildTools => ProjectTemplate::NoBuildTools,
            TemplateArg::Maven => ProjectTemplate::Maven,
            TemplateArg::Gradle => ProjectTemplate::Gradle,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            2
        }
    };

    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<i32> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(dispatch(cli.command))
}

async fn dispatch(command: Command) -> Result<i32> {
    match command {
        Command::Tree(args) => {
            let app = App::open(&args.path)?;
            let folder = app.folder()?;
            let tree = subtree(&app.model, folder, 0, args.depth).await?;
            if args.json {
                print_json(&tree)?;
            } else {
                print_tree(&tree, 0);
            }
            Ok(0)
        }
        Command::Projects(args) => {
            let app = App::open(&args.path)?;
            let folder = app.folder()?;
            let projects = app.model.list_children(&folder.key).await?;
            if args.json {
                print_json(&projects)?;
            } else if projects.is_empty() {
                println!("no projects discovered in {}", folder.path().display());
            } else {
                for project in &projects {
                    if let NodeKind::Project { kind, .. } = &project.kind {
                        println!(
                            "{} [{}] {}",
                            project.label,
                            kind.label(),
                            project.path().display()
                        );
                    }
                }
            }
            Ok(0)
        }
        Command::Reveal(args) => {
            let app = App::open(&args.workspace)?;
            let file = resolve_path(&args.path);
            match app.sync.on_reveal_request(&file).await? {
                Some(action) => {
                    app.sync.apply(&action);
                    if args.json {
                        print_json(&action)?;
                    } else {
                        for key in &action.expand {
                            println!("expand {}", describe_key(&app.model, key));
                        }
                        println!("select {}", describe_key(&app.model, &action.select));
                    }
                    Ok(0)
                }
                None => {
                    eprintln!("no tree node for {}", file.display());
                    Ok(1)
                }
            }
        }
        Command::NewClass(args) => {
            let app = App::open(&args.workspace)?;
            let dir = resolve_existing(&args.dir)?;
            let created = app.ops.new_class(&dir, &args.name).await?;
            if args.json {
                print_json(&serde_json::json!({ "created": created }))?;
            } else {
                println!("created {}", created.display());
            }
            Ok(0)
        }
        Command::NewPackage(args) => {
            let app = App::open(&args.workspace)?;
            let root = resolve_existing(&args.root)?;
            let created = app.ops.new_package(&root, &args.name).await?;
            if args.json {
                print_json(&serde_json::json!({ "created": created }))?;
            } else {
                println!("created {}", created.display());
            }
            Ok(0)
        }
        Command::Rename(args) => {
            let app = App::open(&args.workspace)?;
            let file = resolve_existing(&args.path)?;
            let renamed = app.ops.rename(&file, &args.name).await?;
            if args.json {
                print_json(&serde_json::json!({ "renamed_to": renamed }))?;
            } else {
                println!("renamed to {}", renamed.display());
            }
            Ok(0)
        }
        Command::Delete(args) => {
            let app = App::open(&args.workspace)?;
            let file = resolve_existing(&args.path)?;
            let stored = app.ops.delete(&file).await?;
            if args.json {
                print_json(&serde_json::json!({ "trashed_to": stored }))?;
            } else {
                println!("trashed to {}", stored.display());
            }
            Ok(0)
        }
        Command::Restore(args) => {
            let app = App::open(&args.workspace)?;
            let original = resolve_path(&args.path);
            app.ops.restore(&original).await?;
            if args.json {
                print_json(&serde_json::json!({ "restored": original }))?;
            } else {
                println!("restored {}", original.display());
            }
            Ok(0)
        }
        Command::AddLibrary(args) => {
            let app = App::open(&args.workspace)?;
            let project = resolve_existing(&args.project)?;
            let jar = resolve_existing(&args.jar)?;
            app.ops.add_library(&project, &jar).await?;
            if args.json {
                print_json(&serde_json::json!({ "added": jar }))?;
            } else {
                println!("added {}", jar.display());
            }
            Ok(0)
        }
        Command::AddLibraryFolder(args) => {
            let app = App::open(&args.workspace)?;
            let project = resolve_existing(&args.project)?;
            let dir = resolve_existing(&args.dir)?;
            let report = app.ops.add_library_folder(&project, &dir).await?;
            if args.json {
                let skipped: Vec<_> = report
                    .skipped
                    .iter()
                    .map(|entry| {
                        serde_json::json!({
                            "path": entry.path,
                            "reason": entry.reason.to_string(),
                        })
                    })
                    .collect();
                print_json(&serde_json::json!({
                    "added": report.added,
                    "skipped": skipped,
                }))?;
            } else {
                println!(
                    "added {} of {} jars",
                    report.added.len(),
                    report.added.len() + report.skipped.len()
                );
                for path in &report.added {
                    println!("  + {}", path.display());
                }
                for entry in &report.skipped {
                    println!("  ! {}: {}", entry.path.display(), entry.reason);
                }
            }
            Ok(if report.skipped.is_empty() { 0 } else { 1 })
        }
        Command::NewProject(args) => {
            let app = App::open(&args.workspace)?;
            let target = absolute(&args.target);
            let name = match &args.name {
                Some(name) => name.clone(),
                None => target
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .context("cannot derive a project name from the target; pass --name")?,
            };
            let template = ProjectTemplate::from(args.template);
            app.ops.create_project(template, &target, &name).await?;
            if args.json {
                print_json(&serde_json::json!({
                    "created": target,
                    "template": template_name(template),
                }))?;
            } else {
                println!(
                    "created {} project at {}",
                    template_name(template),
                    target.display()
                );
            }
            Ok(0)
        }
    }
}

/// The full stack behind one workspace folder: config, model, sync, ops.
struct App {
    model: TreeModel,
    sync: SyncController,
    ops: OpsEngine,
}

impl App {
    fn open(workspace: &Path) -> Result<Self> {
        let root = workspace
            .canonicalize()
            .with_context(|| format!("cannot open workspace folder {}", workspace.display()))?;
        let (settings, config_path) = arbor_config::load_for_workspace(&root)?;
        arbor_config::init_tracing(&settings.logging);
        if let Some(path) = &config_path {
            tracing::debug!(
                target: "arbor.cli",
                config = %path.display(),
                "loaded workspace config"
            );
        }

        let fs: Arc<dyn FileSystem> = Arc::new(LocalFs::new());
        let backend: Arc<dyn AnalysisBackend> = Arc::new(LocalBackend::new());
        let gate = Arc::new(ReadinessGate::new());
        // The local backend answers from disk and needs no warm-up.
        gate.mark_ready();

        let options = ModelOptions {
            presentation: settings.package_presentation,
            auto_refresh: settings.auto_refresh,
            ..ModelOptions::default()
        };
        let model = TreeModel::new(
            Arc::clone(&fs),
            Arc::clone(&backend),
            Arc::clone(&gate),
            options,
        );
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| root.display().to_string());
        model.open_folder(&root, name);

        let sync = SyncController::new(model.clone());
        let ops = OpsEngine::new(fs, backend, gate, model.clone());
        Ok(Self { model, sync, ops })
    }

    fn folder(&self) -> Result<NodeInfo> {
        self.model
            .workspace_folders()
            .into_iter()
            .next()
            .context("workspace folder is not registered")
    }
}

#[derive(Serialize)]
struct TreeEntry {
    info: NodeInfo,
    children: Vec<TreeEntry>,
}

fn subtree<'a>(
    model: &'a TreeModel,
    info: NodeInfo,
    depth: usize,
    limit: Option<usize>,
) -> Pin<Box<dyn Future<Output = Result<TreeEntry, ModelError>> + 'a>> {
    Box::pin(async move {
        let mut children = Vec::new();
        if limit.is_none_or(|limit| depth < limit) {
            for child in model.list_children(&info.key).await? {
                children.push(subtree(model, child, depth + 1, limit).await?);
            }
        }
        Ok(TreeEntry { info, children })
    })
}

fn print_tree(entry: &TreeEntry, depth: usize) {
    let indent = "  ".repeat(depth);
    println!("{indent}{}", describe(&entry.info));
    for child in &entry.children {
        print_tree(child, depth + 1);
    }
}

fn describe(info: &NodeInfo) -> String {
    match &info.kind {
        NodeKind::WorkspaceFolder { .. } => format!("{}/", info.label),
        NodeKind::Project { kind, .. } => format!("{} [{}]", info.label, kind.label()),
        NodeKind::PackageRoot { kind } => {
            let suffix = match kind {
                SourceRootKind::Main => "main",
                SourceRootKind::Test => "test",
            };
            format!("{} [{suffix}]", info.label)
        }
        _ => info.label.clone(),
    }
}

fn describe_key(model: &TreeModel, key: &NodeKey) -> String {
    match model.node(key) {
        Some(info) => info.label,
        None => key.path.display().to_string(),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value)?;
    println!("{out}");
    Ok(())
}

fn template_name(template: ProjectTemplate) -> &'static str {
    match template {
        ProjectTemplate::NoBuildTools => "no-build-tools",
        ProjectTemplate::Maven => "maven",
        ProjectTemplate::Gradle => "gradle",
    }
}

/// Resolve a path that must already exist; symlinks collapse so prefix
/// checks against the canonicalized workspace root hold.
fn resolve_existing(path: &Path) -> Result<PathBuf> {
    path.canonicalize()
        .with_context(|| format!("cannot resolve {}", path.display()))
}

/// Resolve a path that may not exist yet (or any more).
fn resolve_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| absolute(path))
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    }
}
