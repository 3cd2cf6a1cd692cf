//! includelint CLI
//!
//! Reports include directories that build targets declare but never use.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use includelint_analysis::{check_target, AnalysisEngine, ExcludeFilter, Report};
use includelint_core::config::AnalysisConfig;
use includelint_core::Config;
use includelint_index::{CompilationDatabase, Description, TargetDescription, VirtualFilesystemResolver, Workspace};
use includelint_parser::{ArgumentFilter, ClangFrontend, IncludeDirectoryExtractor};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Exit status when some target has unused include directories
const UNUSED_FOUND: u8 = 1;
/// Exit status when the analysis could not run
const FATAL: u8 = 2;

#[derive(Parser)]
#[command(name = "includelint")]
#[command(author, version, about = "Unused include directory checker", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report unused include directories of build targets
    Check(CheckArgs),

    /// List targets that can be analyzed
    Targets {
        /// GN build description (`gn desc --format=json`)
        #[arg(long, value_name = "PATH")]
        description: PathBuf,

        /// Configuration file
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
    },
}

#[derive(Args)]
struct CheckArgs {
    /// `compile_commands.json` or the directory containing it
    #[arg(long, value_name = "PATH")]
    compilation_database: PathBuf,

    /// GN build description (`gn desc --format=json`)
    #[arg(long, value_name = "PATH")]
    description: PathBuf,

    /// Virtual filesystem mapping of overlay paths to source paths
    #[arg(long, value_name = "PATH")]
    vfs_config: Option<PathBuf>,

    /// Target label to check (repeatable)
    #[arg(long = "target", value_name = "LABEL", required_unless_present = "all_targets")]
    targets: Vec<String>,

    /// Check every analyzable target of the description
    #[arg(long, conflicts_with = "targets")]
    all_targets: bool,

    /// Glob of include directories never reported (repeatable)
    #[arg(long, value_name = "GLOB")]
    exclude: Vec<String>,

    /// Clang executable
    #[arg(long, value_name = "PATH")]
    clang: Option<PathBuf>,

    /// Configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Directory `//` source paths are relative to (default: nearest ancestor holding `.gn`)
    #[arg(long, value_name = "DIR")]
    source_root: Option<PathBuf>,

    /// Number of targets analyzed in parallel (default: number of CPUs)
    #[arg(short, long)]
    jobs: Option<usize>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Check(args) => cmd_check(args),
        Commands::Targets { description, config } => cmd_targets(&description, config.as_deref()),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("includelint: error: {:#}", e);
            ExitCode::from(FATAL)
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load configuration {}", path.display())),
        None => Ok(Config::default()),
    }
}

/// Targets of a configured type with at least one translation unit
fn analyzable(description: &Description, config: &AnalysisConfig) -> Description {
    description.get_if(|target| {
        config.target_types.contains(&target.kind)
            && target.sources.iter().any(|source| config.is_translation_unit(source))
    })
}

fn cmd_check(args: CheckArgs) -> Result<ExitCode> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(clang) = args.clang {
        config.frontend.clang_path = Some(clang);
    }
    config.analysis.exclude.extend(args.exclude);

    let exclude = ExcludeFilter::new(&config.analysis.exclude)?;

    let probe = ClangFrontend::from_config(&config.frontend)?;
    debug!(
        "Frontend: {}",
        probe.version().unwrap_or_else(|| "unknown clang version".to_string())
    );

    let database = CompilationDatabase::from_path(&args.compilation_database).with_context(|| {
        format!(
            "Failed to load compilation database {}",
            args.compilation_database.display()
        )
    })?;
    let description = Description::from_file(&args.description)
        .with_context(|| format!("Failed to load build description {}", args.description.display()))?;
    let vfs = match &args.vfs_config {
        Some(path) => VirtualFilesystemResolver::from_file(path)
            .with_context(|| format!("Failed to load VFS configuration {}", path.display()))?,
        None => VirtualFilesystemResolver::new(),
    };

    let build_dir = build_directory(&args.compilation_database)?;
    let mut workspace = Workspace::discover(build_dir);
    if let Some(root) = args.source_root {
        workspace = workspace.with_source_root(root);
    }
    debug!("Build directory {:?}, source root {:?}", workspace.build_dir(), workspace.source_root());

    let selected = if args.all_targets {
        analyzable(&description, &config.analysis)
    } else {
        let mut targets = Vec::with_capacity(args.targets.len());
        for label in &args.targets {
            targets.push((label.clone(), description.get(label)?.clone()));
        }
        Description::from_targets(targets)
    };

    if selected.is_empty() {
        bail!("No targets to check");
    }
    info!("Checking {} targets", selected.len());

    let targets: Vec<(&str, &TargetDescription)> = selected.items().collect();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(args.jobs.unwrap_or(0))
        .build()
        .context("Failed to create thread pool")?;

    let reports = pool.install(|| {
        targets
            .par_iter()
            .map(|(label, target)| {
                let frontend = ClangFrontend::from_config(&config.frontend)?;
                let extractor = IncludeDirectoryExtractor::new(ArgumentFilter::from_config(&config.frontend));
                let engine = AnalysisEngine::new(&database, &vfs, &frontend, &workspace)
                    .with_extractor(extractor)
                    .with_config(config.analysis.clone());

                check_target(&engine, label, target, &exclude)
            })
            .collect::<includelint_core::Result<Vec<Report>>>()
    })?;

    for report in &reports {
        for line in report.diagnostics() {
            eprintln!("{}", line);
        }
    }

    Ok(ExitCode::from(exit_status(&reports)))
}

fn exit_status(reports: &[Report]) -> u8 {
    if reports.iter().all(Report::is_clean) {
        0
    } else {
        UNUSED_FOUND
    }
}

/// Directory holding the compilation database; relative sources are relative to it
fn build_directory(compilation_database: &Path) -> Result<PathBuf> {
    let dir = if compilation_database.is_dir() {
        compilation_database
    } else {
        compilation_database.parent().unwrap_or_else(|| Path::new("."))
    };

    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    Ok(includelint_core::paths::absolutize(&cwd, dir))
}

fn cmd_targets(description: &Path, config: Option<&Path>) -> Result<ExitCode> {
    let config = load_config(config)?;
    let description = Description::from_file(description)
        .with_context(|| format!("Failed to load build description {}", description.display()))?;

    for (label, target) in analyzable(&description, &config.analysis).items() {
        println!("{}\t{}", label, target.entity());
    }

    Ok(ExitCode::SUCCESS)
}
