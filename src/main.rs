use clap::Parser;
use colored::Colorize;
use miette::{IntoDiagnostic, Result, WrapErr};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use unused_exports::config::{Config, ProviderChoice};
use unused_exports::discovery::FileStats;
use unused_exports::model::AccessLevel;
use unused_exports::report::{ReportFormat, Reporter};
use unused_exports::watch::FileWatcher;
use unused_exports::{AnalysisSummary, Analyzer, CancellationToken, FileFinder};

/// unused-exports - Find unused exports and class members in TypeScript/JavaScript
#[derive(Parser, Debug)]
#[command(name = "unused-exports")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the project directory to analyze
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Analyze only these files (can be specified multiple times)
    #[arg(long = "file", value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Patterns to exclude (can be specified multiple times)
    #[arg(short, long)]
    exclude: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "terminal")]
    format: OutputFormat,

    /// Output file (for json format)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also report unused `export default` declarations
    #[arg(long)]
    include_default_exports: bool,

    /// Skip class member analysis
    #[arg(long)]
    no_members: bool,

    /// Which class members to analyze
    #[arg(long, value_enum)]
    members: Option<MemberScope>,

    /// Project search backend
    #[arg(long, value_enum)]
    search: Option<SearchBackend>,

    /// Watch mode - re-run analysis on file changes
    #[arg(short, long)]
    watch: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode - only output results
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Terminal,
    Json,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Terminal => ReportFormat::Terminal,
            OutputFormat::Json => ReportFormat::Json,
        }
    }
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum MemberScope {
    /// Private members only
    Private,
    /// Private and protected members
    NonPublic,
    /// Every member, public ones searched across the project
    All,
}

impl MemberScope {
    fn access_levels(self) -> Vec<AccessLevel> {
        match self {
            MemberScope::Private => vec![AccessLevel::Private],
            MemberScope::NonPublic => vec![AccessLevel::Private, AccessLevel::Protected],
            MemberScope::All => vec![
                AccessLevel::Private,
                AccessLevel::Protected,
                AccessLevel::Public,
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum SearchBackend {
    Auto,
    Ripgrep,
    Scan,
}

impl From<SearchBackend> for ProviderChoice {
    fn from(backend: SearchBackend) -> Self {
        match backend {
            SearchBackend::Auto => ProviderChoice::Auto,
            SearchBackend::Ripgrep => ProviderChoice::Ripgrep,
            SearchBackend::Scan => ProviderChoice::Scan,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose, cli.quiet);

    info!("unused-exports v{}", env!("CARGO_PKG_VERSION"));

    let root = cli
        .path
        .canonicalize()
        .into_diagnostic()
        .wrap_err_with(|| format!("Cannot access project directory: {}", cli.path.display()))?;

    let config_path = config_path(&cli, &root);
    let config = load_config(&cli, config_path.as_deref())?;

    let mut analyzer = Analyzer::with_default_provider(&root, config)
        .into_diagnostic()
        .wrap_err("Failed to initialise the TypeScript parser")?;
    info!("Project search: {}", analyzer.provider_name());

    if cli.watch {
        run_watch_mode(&mut analyzer, &cli, &root, config_path)?;
    } else {
        let token = CancellationToken::new();
        run_analysis(&mut analyzer, &cli, &root, &token)?;
    }

    Ok(())
}

fn init_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Explicit `--config`, otherwise the first default config file in the project
fn config_path(cli: &Cli, root: &Path) -> Option<PathBuf> {
    match &cli.config {
        Some(path) => Some(path.canonicalize().unwrap_or_else(|_| path.clone())),
        None => Config::find_default(root),
    }
}

fn load_config(cli: &Cli, config_path: Option<&Path>) -> Result<Config> {
    let mut config = match config_path {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    // Override with CLI arguments
    if !cli.exclude.is_empty() {
        config.exclude.extend(cli.exclude.clone());
    }
    if cli.include_default_exports {
        config.include_default_exports = true;
    }
    if cli.no_members {
        config.analyze_class_members = false;
    }
    if let Some(scope) = cli.members {
        config.member_access_levels = scope.access_levels();
    }
    if let Some(backend) = cli.search {
        config.search.provider = backend.into();
    }

    Ok(config)
}

/// Files named with `--file`, otherwise everything discovered under `root`
fn collect_files(cli: &Cli, root: &Path, config: &Config) -> Vec<PathBuf> {
    if cli.files.is_empty() {
        return FileFinder::new(root, config).find_files(root);
    }

    cli.files
        .iter()
        .filter_map(|file| match file.canonicalize() {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Skipping {}: {}", file.display(), e);
                None
            }
        })
        .collect()
}

fn run_analysis(
    analyzer: &mut Analyzer,
    cli: &Cli,
    root: &Path,
    token: &CancellationToken,
) -> Result<AnalysisSummary> {
    use indicatif::{ProgressBar, ProgressStyle};
    use std::time::Instant;

    let start_time = Instant::now();

    info!("Discovering files...");
    let files = collect_files(cli, root, analyzer.config());
    info!("Found {} files to analyze ({})", files.len(), FileStats::from_files(&files));

    if files.is_empty() {
        if !cli.quiet {
            eprintln!("{}", "No TypeScript or JavaScript files found.".yellow());
        }
        return Ok(AnalysisSummary::default());
    }

    let show_progress = !cli.quiet && matches!(cli.format, OutputFormat::Terminal);
    let pb = if show_progress {
        ProgressBar::new(files.len() as u64)
    } else {
        ProgressBar::hidden()
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .into_diagnostic()?
            .progress_chars("#>-"),
    );

    let summary = analyzer.analyze_workspace_with(&files, token, |_| pb.inc(1));
    pb.finish_and_clear();

    info!(
        "Analyzed {} files in {:.2}s ({} from cache)",
        summary.files_analyzed,
        start_time.elapsed().as_secs_f64(),
        summary.cache_hits
    );

    let reporter = Reporter::new(
        cli.format.into(),
        cli.output.clone(),
        analyzer.config().opacity,
    );
    reporter.report(&summary)?;

    Ok(summary)
}

fn run_watch_mode(
    analyzer: &mut Analyzer,
    cli: &Cli,
    root: &Path,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let token = CancellationToken::new();
    let watcher = FileWatcher::new(analyzer.config().debounce_ms)
        .with_config_path(config_path.clone());

    watcher
        .watch(root, &token, |changed| {
            for path in changed {
                if config_path.as_deref() == Some(path.as_path()) {
                    match load_config(cli, Some(path.as_path())) {
                        Ok(config) => analyzer.reload_config(config),
                        Err(e) => eprintln!("{}: {:?}", "Config error".red(), e),
                    }
                } else {
                    analyzer.notify_changed(path);
                }
            }

            token.reset();
            match run_analysis(analyzer, cli, root, &token) {
                Ok(summary) if summary.cancelled => {
                    println!("{}", "Analysis interrupted by new changes.".yellow());
                }
                Ok(_) => {
                    println!();
                    println!("{}", "✓ Analysis complete. Waiting for changes...".green());
                }
                Err(e) => {
                    eprintln!("{}: {:?}", "Analysis error".red(), e);
                }
            }
            true // Continue watching
        })
        .map_err(|e| miette::miette!("Watch error: {}", e))?;

    Ok(())
}
