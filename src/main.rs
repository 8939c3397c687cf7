//! settingsync - Back up and restore editor settings by reconciling two directory trees.
//!
//! Usage:
//!   settingsync diff LEFT RIGHT               Show what differs and what would be done
//!   settingsync backup SETTINGS_DIR REPO_DIR  Make the repository match the live settings
//!   settingsync restore SETTINGS_DIR REPO_DIR Make the live settings match the repository
//!   settingsync --help                        Show help

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result, bail};
use tracing_subscriber::EnvFilter;

use settingsync_core::{CompareMethod, DiffConfig, OsFileSystem, Priority};
use settingsync_ops::{BatchProgress, BatchReport, execute_batch_with_progress, render};
use settingsync_scan::{DiffReport, diff};

/// Sub-trees of a VS Code `User` directory that hold machine-local state.
const DEFAULT_IGNORES: &[&str] = &["globalStorage", "workspaceStorage"];

#[derive(Parser)]
#[command(
    name = "settingsync",
    version,
    about = "Back up and restore editor settings",
    long_about = "settingsync compares two directory trees file by file and copies or \
                  deletes files so that one side matches the other.\n\n\
                  `backup` makes the repository directory match the live settings, \
                  `restore` does the reverse, and `diff` only shows the plan unless \
                  `--apply` is given."
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compare two trees and show the default action for each difference
    Diff {
        /// Left directory
        left: PathBuf,

        /// Right directory
        right: PathBuf,

        /// Which side wins when the trees disagree ("left" or "right")
        #[arg(short, long, default_value = "left")]
        priority: Priority,

        /// Perform the default actions after showing them
        #[arg(long)]
        apply: bool,

        #[command(flatten)]
        sync: SyncArgs,
    },

    /// Copy live settings into the repository, deleting stale files there
    Backup {
        /// Live settings directory
        settings_dir: PathBuf,

        /// Repository directory
        repo_dir: PathBuf,

        #[command(flatten)]
        sync: SyncArgs,
    },

    /// Copy repository settings over the live settings, deleting extra files
    Restore {
        /// Live settings directory
        settings_dir: PathBuf,

        /// Repository directory
        repo_dir: PathBuf,

        #[command(flatten)]
        sync: SyncArgs,
    },
}

#[derive(Args)]
struct SyncArgs {
    /// Also list files that are identical on both sides
    #[arg(long)]
    include_identical: bool,

    /// Glob pattern of relative paths to ignore (repeatable)
    #[arg(short, long = "ignore", value_name = "GLOB")]
    ignore: Vec<String>,

    /// Do not add the default ignore patterns (globalStorage, workspaceStorage)
    #[arg(long)]
    no_default_ignores: bool,

    /// How files present on both sides are compared
    #[arg(short, long, default_value = "content")]
    compare: CompareArg,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Do not ask for confirmation before performing actions
    #[arg(short, long)]
    yes: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum CompareArg {
    /// Size, then BLAKE3 content hash
    #[default]
    Content,
    /// Size and modification time
    Mtime,
}

impl From<CompareArg> for CompareMethod {
    fn from(arg: CompareArg) -> Self {
        match arg {
            CompareArg::Content => CompareMethod::Content,
            CompareArg::Mtime => CompareMethod::SizeAndModified,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Diff {
            left,
            right,
            priority,
            apply,
            sync,
        } => {
            run_sync(&left, &right, priority, &sync, apply).await?;
        }
        Command::Backup {
            settings_dir,
            repo_dir,
            sync,
        } => {
            run_sync(&settings_dir, &repo_dir, Priority::LeftWins, &sync, true).await?;
        }
        Command::Restore {
            settings_dir,
            repo_dir,
            sync,
        } => {
            run_sync(&settings_dir, &repo_dir, Priority::RightWins, &sync, true).await?;
        }
    }

    Ok(())
}

/// Install a stderr subscriber. `RUST_LOG` overrides the `-v` level.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Diff two trees, show the plan and optionally perform it.
async fn run_sync(
    left: &Path,
    right: &Path,
    priority: Priority,
    args: &SyncArgs,
    apply: bool,
) -> Result<()> {
    let config = build_config(left, right, priority, args)?;
    let fs = Arc::new(OsFileSystem::new());

    eprintln!("Comparing {} with {}...", left.display(), right.display());
    let report = diff(fs.as_ref(), &config).context("Diff failed")?;

    match args.format {
        OutputFormat::Text => print_report(&report)?,
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    let actions = report.default_actions();
    if !apply || actions.is_empty() {
        return Ok(());
    }

    if !args.yes && !confirm(&format!("Perform the {} actions?", actions.len()))? {
        eprintln!("Aborted.");
        return Ok(());
    }

    let show_progress = matches!(args.format, OutputFormat::Text);
    let batch = execute_batch_with_progress(fs, actions, |progress| {
        if show_progress {
            print_progress(progress);
        }
    })
    .await;
    match args.format {
        OutputFormat::Text => print_batch(&batch),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&batch)?),
    }

    if !batch.is_success() {
        bail!("{}", batch.summary());
    }

    Ok(())
}

fn build_config(
    left: &Path,
    right: &Path,
    priority: Priority,
    args: &SyncArgs,
) -> Result<DiffConfig> {
    let mut ignore_patterns: Vec<String> = if args.no_default_ignores {
        Vec::new()
    } else {
        DEFAULT_IGNORES.iter().map(|p| p.to_string()).collect()
    };
    ignore_patterns.extend(args.ignore.iter().cloned());

    DiffConfig::builder()
        .left(left)
        .right(right)
        .priority(priority)
        .include_identical(args.include_identical)
        .compare(CompareMethod::from(args.compare))
        .ignore_patterns(ignore_patterns)
        .build()
        .context("Invalid configuration")
}

/// Print one line per record followed by warnings and a summary.
fn print_report(report: &DiffReport) -> Result<()> {
    println!();
    println!("{}", "─".repeat(70));
    println!(" {}", report.roots.left.display());
    println!(" {}", report.roots.right.display());
    println!(" Priority: {}", report.priority);
    println!("{}", "─".repeat(70));
    println!();

    if report.records.is_empty() {
        println!(" Nothing to do, both sides are in sync.");
    }
    for record in &report.records {
        println!(" {}", render(record, 0)?);
    }

    if report.has_warnings() {
        println!();
        println!(" {} warning(s):", report.warnings.len());
        for warning in &report.warnings {
            println!("   [{}] {}", warning.kind, warning);
        }
    }

    let stats = &report.stats;
    println!();
    println!(
        " {} left only, {} right only, {} modified, {} identical ({:.2}s)",
        stats.left_only,
        stats.right_only,
        stats.modified,
        stats.identical,
        report.duration.as_secs_f64()
    );

    Ok(())
}

/// Print one progress line on stderr.
fn print_progress(progress: &BatchProgress) {
    let path = progress
        .last_path
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_default();
    eprintln!(
        " [{:>5.1}%] {}/{} {}",
        progress.percentage(),
        progress.completed,
        progress.total,
        path
    );
}

/// Print the outcome of every action and the batch summary.
fn print_batch(batch: &BatchReport) {
    println!();
    for outcome in &batch.outcomes {
        match &outcome.result {
            Ok(_) => println!(" ok      {}", outcome.action),
            Err(e) => println!(" FAILED  {}: {}", outcome.action, e.message),
        }
    }
    println!();
    println!(
        " {} ({} copied in {:.2}s)",
        batch.summary(),
        format_size(batch.bytes_copied),
        batch.duration.as_secs_f64()
    );
}

/// Ask a yes/no question on stderr; anything but "y" or "yes" is a no.
fn confirm(question: &str) -> Result<bool> {
    eprint!("{question} [y/N] ");
    io::stderr().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes"
    ))
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}
