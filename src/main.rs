//! foldermap - keep a folder hierarchy, its catalog and the disk in agreement.
//!
//! Usage:
//!   foldermap ROOT tree                   Show the reconciled hierarchy
//!   foldermap ROOT check                  List folders the catalog expects but the disk lacks
//!   foldermap ROOT rename PATH NAME       Rename a folder
//!   foldermap ROOT move PATH DESTINATION  Move a folder
//!   foldermap ROOT mkdir PARENT [NAME]    Create a folder
//!   foldermap ROOT rmdir PATH             Delete an empty folder
//!   foldermap ROOT extract PATH           Move a folder's media files into a new subfolder

mod settings;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{ArgAction, Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use foldermap_catalog::JsonCatalog;
use foldermap_core::{Node, PathRecordStore, relpath};
use foldermap_ops::{FolderOperation, LocalFolders, MutationEngine, OperationError};
use foldermap_scan::{ReconcileEvent, Reconciler, start_reconcile};

use settings::Settings;

/// Environment variable holding a tracing filter that overrides `-v`.
const LOG_ENV: &str = "FOLDERMAP_LOG";

#[derive(Parser)]
#[command(
    name = "foldermap",
    version,
    about = "Keep a folder hierarchy, its catalog and the disk in agreement",
    long_about = "foldermap merges the folders on disk with the folders a catalog files \
                  data under, and renames, moves, creates and deletes folders while \
                  keeping all three in step."
)]
struct Cli {
    /// Root folder every relative path is resolved against
    root: PathBuf,

    /// Catalog file (defaults to .foldermap.json in the root)
    #[arg(short, long, global = true)]
    catalog: Option<PathBuf>,

    /// Settings file (defaults to foldermap.toml in the root)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the reconciled folder hierarchy
    Tree {
        /// Maximum depth to display
        #[arg(short, long)]
        depth: Option<usize>,

        /// Print the records as JSON instead
        #[arg(long)]
        json: bool,
    },

    /// List folders that are known but missing on disk
    Check,

    /// Rename a folder, keeping its parent
    Rename {
        /// Folder to rename
        path: String,
        /// New folder name
        name: String,
    },

    /// Move a folder into another folder
    Move {
        /// Folder to move
        path: String,
        /// Folder to move it into (use "" for the root)
        destination: String,
        /// Name to give it in the destination
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Create a folder
    Mkdir {
        /// Folder to create it in (use "" for the root)
        parent: String,
        /// Folder name; a numbered variant is used if it is taken
        name: Option<String>,
    },

    /// Delete an empty folder with no data
    Rmdir {
        /// Folder to delete
        path: String,
    },

    /// Move a folder's image and video files into a new subfolder
    Extract {
        /// Folder whose files are moved
        path: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let root = cli
        .root
        .canonicalize()
        .wrap_err_with(|| format!("Invalid root folder {}", cli.root.display()))?;
    let settings = Settings::load(&root, cli.config.as_deref())?;
    let config = settings.engine_config(&root)?;
    let catalog_path = settings.catalog_path(&root, cli.catalog.as_deref());

    let folders = Arc::new(LocalFolders::new(config.clone()));
    let catalog = Arc::new(
        JsonCatalog::open(&catalog_path)
            .wrap_err_with(|| format!("Could not open catalog {}", catalog_path.display()))?,
    );

    let reconciler = Reconciler::new(Arc::clone(&folders), Arc::clone(&catalog))
        .excluding(config.excluded_folders.iter().cloned());
    let records = run_reconcile(reconciler).await?;

    let mut engine = MutationEngine::new(folders, catalog, records)
        .with_new_folder_name(config.new_folder_name.clone());

    let operation = match cli.command {
        Command::Tree { depth, json } => return show_tree(&engine, depth, json),
        Command::Check => return run_check(engine.hierarchy()),
        Command::Rename { path, name } => FolderOperation::rename(path, name),
        Command::Move {
            path,
            destination,
            name,
        } => match name {
            Some(name) => FolderOperation::Move {
                source: relpath::normalize(&path),
                name,
                destination,
            },
            None => FolderOperation::move_to(relpath::normalize(&path), destination),
        },
        Command::Mkdir { parent, name } => {
            let name = name.unwrap_or_else(|| config.new_folder_name.clone());
            FolderOperation::create_child(parent, name)
        }
        Command::Rmdir { path } => FolderOperation::delete(path),
        Command::Extract { path } => FolderOperation::extract_files(path),
    };

    run_operation(&mut engine, operation)
}

/// Install the stderr log subscriber.
fn init_logging(verbose: u8) -> Result<()> {
    let filter = match EnvFilter::try_from_env(LOG_ENV) {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new(match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| eyre!("Could not install logger: {e}"))
}

/// Reconcile in the background, cancelling on Ctrl-C.
async fn run_reconcile(
    reconciler: Reconciler<Arc<LocalFolders>, Arc<JsonCatalog>>,
) -> Result<PathRecordStore> {
    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let mut rx = start_reconcile(reconciler, cancel);
    while let Some(event) = rx.recv().await {
        match event {
            ReconcileEvent::Progress(progress) => {
                debug!(
                    phase = %progress.phase,
                    known = progress.known_paths,
                    folders = progress.folders_found,
                    "Reconciling"
                );
            }
            ReconcileEvent::Complete(result) => {
                return result.wrap_err("Could not build the folder hierarchy");
            }
        }
    }

    Err(eyre!("Reconciliation stopped without a result"))
}

/// Apply one operation and report what happened.
fn run_operation(
    engine: &mut MutationEngine<Arc<LocalFolders>, Arc<JsonCatalog>>,
    operation: FolderOperation,
) -> Result<()> {
    let kind = operation.kind();
    match engine.apply(operation) {
        Ok(outcome) => {
            info!(%kind, "Operation complete");
            println!("{outcome}");
            Ok(())
        }
        Err(err @ OperationError::Rejected(_)) => Err(err).wrap_err(format!("{kind} refused")),
        Err(err) => {
            if err.is_divergence() {
                warn!(%kind, "Folders and catalog no longer agree");
                eprintln!("Run `foldermap ROOT check` to see what needs repairing.");
            }
            Err(err).wrap_err(format!("{kind} failed"))
        }
    }
}

fn show_tree(
    engine: &MutationEngine<Arc<LocalFolders>, Arc<JsonCatalog>>,
    max_depth: Option<usize>,
    json: bool,
) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(engine.records().all())?);
        return Ok(());
    }

    let root = engine.hierarchy();
    println!();
    println!("{}", "─".repeat(60));
    println!(" {}", engine.folders().root().display());
    println!(
        " {} folders, {} with data",
        root.count().saturating_sub(1),
        root.walk().filter(|n| n.has_data).count()
    );
    println!("{}", "─".repeat(60));
    println!();

    print_node(root, 0, max_depth.unwrap_or(usize::MAX));
    Ok(())
}

/// Print a node and its children.
fn print_node(node: &Node, depth: usize, max_depth: usize) {
    let indent = "  ".repeat(depth);
    let name = if node.is_root() { "(root)" } else { node.name.as_str() };
    let marker = if node.children.is_empty() { "  " } else { "▼ " };
    let data = if node.has_data { " ●" } else { "" };
    let missing = if node.folder_exists { "" } else { "  (missing)" };

    println!("{indent}{marker}{name}{data}{missing}");

    if depth < max_depth {
        for child in node.children.values() {
            print_node(child, depth + 1, max_depth);
        }
    } else if !node.children.is_empty() {
        println!("{indent}    ... and {} more", node.count() - 1);
    }
}

/// List known folders that are missing on disk.
fn run_check(root: &Node) -> Result<()> {
    let missing: Vec<&Node> = root.walk().filter(|n| !n.folder_exists).collect();
    if missing.is_empty() {
        println!("All known folders exist on disk.");
        return Ok(());
    }

    for node in &missing {
        let path = if node.is_root() { "(root)" } else { node.path.as_str() };
        let data = if node.has_data { " (has data)" } else { "" };
        println!("missing: {path}{data}");
    }
    Err(eyre!("{} known folders are missing on disk", missing.len()))
}
