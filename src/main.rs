use anyhow::{Context, Result};
use clap::Parser;
use orphanmd::detect::{self, RunOptions};
use orphanmd::index::IndexLocation;
use orphanmd::output;
use orphanmd::utils::AppConfig;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "orphanmd")]
#[command(about = "Find and delete files which are not referenced by a markdown doc")]
struct Cli {
    /// What files to look for. Path to a directory
    #[arg(long, value_name = "DIR")]
    what: PathBuf,

    /// Where to look for references. Searched recursively; the --what directory inside it is ignored
    #[arg(long = "where", value_name = "DIR")]
    corpus: PathBuf,

    /// Index directory to reuse. Built and saved there when it holds no index yet
    #[arg(long, value_name = "DIR")]
    index: Option<PathBuf>,

    /// Rebuild the index even if --index already holds one
    #[arg(long, requires = "index")]
    rebuild: bool,

    /// Search orphans but don't delete them
    #[arg(long)]
    dry_run: bool,

    /// Only look at files directly inside --what
    #[arg(long)]
    shallow: bool,

    /// Document file name glob (repeatable, default from config: *.md)
    #[arg(long = "pattern", value_name = "GLOB")]
    patterns: Vec<String>,

    /// Leave unreadable documents out of the index instead of failing
    #[arg(long)]
    skip_unreadable: bool,

    /// Worker threads for classification (0 = CPU count)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Log diagnostics to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = AppConfig::load()?;
    if !cli.patterns.is_empty() {
        config.document_patterns = cli.patterns.clone();
    }
    if let Some(jobs) = cli.jobs {
        config.jobs = jobs;
    }
    config.validate()?;

    let stdout_color = std::io::stdout().is_terminal();
    let stderr_tty = std::io::stderr().is_terminal();

    let location = IndexLocation::from_option(cli.index.clone());
    if let Some(dir) = location.dir() {
        output::print_index_location(dir, stdout_color)?;
    }

    let options = RunOptions {
        candidate_root: cli.what.clone(),
        corpus_root: cli.corpus.clone(),
        index: location,
        rebuild: cli.rebuild,
        dry_run: cli.dry_run,
        recursive: !cli.shallow,
        document_patterns: config.document_patterns.clone(),
        max_file_size: config.max_file_size,
        skip_unreadable: cli.skip_unreadable,
        jobs: config.effective_jobs(),
        show_progress: stderr_tty && !cli.verbose,
    };

    let report = detect::run(&options).with_context(|| {
        format!(
            "Failed to find orphans of {} in {}",
            cli.what.display(),
            cli.corpus.display()
        )
    })?;

    output::print_run_report(&report, stdout_color, stderr_tty)?;

    if report.detection.succeeded() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "orphanmd=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
