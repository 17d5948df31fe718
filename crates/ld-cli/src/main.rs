//! CLI entry point for the locale detector.
//!
//! This binary discovers locale files in a project, prints what was indexed,
//! serves bundles as JSON, and can keep the index live while files change.
//!
//! # Usage
//!
//! ```bash
//! locale-detector [OPTIONS] <COMMAND>
//!
//! # Index once and show a summary
//! locale-detector scan --root ./my-app
//!
//! # Keep re-indexing as locale files change
//! locale-detector watch --root ./my-app -l "packages/*/locales"
//!
//! # Print one locale (or one namespace of it) as JSON
//! locale-detector bundle zh --namespace common
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

use std::io::Write;

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{WrapErr, eyre};
use ld_core::{Config, MergePolicy};
use ld_scanner::{LoadStats, LocaleDetector};
use ld_watcher::{FileWatcher, LocaleFileFilter};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// CLI ARGUMENT TYPES
// =============================================================================

/// Discovers locale files and folds them into per-locale resource trees.
#[derive(Parser)]
#[command(name = "locale-detector", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    command: Commands,

    /// Project root. Defaults to the configured root, then the current
    /// directory.
    #[arg(short, long, global = true, env = "LOCALE_DETECTOR_ROOT")]
    root: Option<Utf8PathBuf>,

    /// JSON configuration file.
    #[arg(short, long, global = true, env = "LOCALE_DETECTOR_CONFIG")]
    config: Option<Utf8PathBuf>,

    /// Locale-root glob, relative to the root. Repeat to add more; replaces
    /// the configured list.
    #[arg(short = 'l', long = "locales-path", global = true)]
    locales_paths: Vec<String>,

    /// Path pattern, e.g. `{locale}/{namespaces}.{ext}`.
    #[arg(short = 'm', long, global = true)]
    path_matcher: Option<String>,

    /// How files sharing a (locale, namespace) slot are merged.
    #[arg(long, global = true, value_enum)]
    merge: Option<MergeArg>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Index locale files once and display a summary.
    Scan {
        /// List every indexed file.
        #[arg(short, long)]
        detailed: bool,
    },

    /// Index locale files and keep the index in sync with the filesystem.
    Watch {
        /// Debounce window in milliseconds (overrides the config).
        #[arg(long)]
        debounce_ms: Option<u64>,
    },

    /// Print the bundle for one locale as JSON.
    Bundle {
        /// Locale to print.
        locale: String,

        /// Print only this namespace.
        #[arg(short, long)]
        namespace: Option<String>,

        /// Output file (defaults to stdout).
        #[arg(short, long)]
        output: Option<Utf8PathBuf>,
    },

    /// List the virtual modules and their lookup keys.
    Modules,
}

/// Merge policy argument.
#[derive(Clone, Copy, ValueEnum)]
enum MergeArg {
    /// Later files replace keys at the slot level.
    Shallow,
    /// Nested mappings are merged key by key.
    Deep,
}

impl From<MergeArg> for MergePolicy {
    fn from(arg: MergeArg) -> Self {
        match arg {
            MergeArg::Shallow => Self::Shallow,
            MergeArg::Deep => Self::Deep,
        }
    }
}

// =============================================================================
// INITIALIZATION FUNCTIONS
// =============================================================================

/// Initializes the tracing subscriber for logging.
///
/// Respects the `RUST_LOG` environment variable if set. Otherwise, uses
/// `debug` level if `--verbose` is set, or `info` level by default.
fn init_tracing(verbose: bool, no_color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "info" };
        EnvFilter::new(format!("{level},globset=warn,ignore=warn,notify=warn"))
    });

    let use_ansi = !no_color && std::env::var("NO_COLOR").is_err();

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_ansi(use_ansi).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Builds a resolved [`Config`] from the config file and CLI overrides.
///
/// # Errors
///
/// Returns an error if the config file is invalid, the working directory is
/// not UTF-8, or the root does not exist.
fn build_config(cli: &Cli) -> color_eyre::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    if let Some(root) = &cli.root {
        config.detector.root.clone_from(root);
    }
    if !cli.locales_paths.is_empty() {
        config.detector.locales_paths.clone_from(&cli.locales_paths);
    }
    if let Some(pattern) = &cli.path_matcher {
        config.detector.path_matcher.clone_from(pattern);
    }
    if let Some(merge) = cli.merge {
        config.detector.merge = merge.into();
    }

    let cwd = std::env::current_dir().wrap_err("Failed to read the working directory")?;
    let cwd = Utf8PathBuf::from_path_buf(cwd)
        .map_err(|path| eyre!("Working directory is not valid UTF-8: {}", path.display()))?;

    let config = config.resolve(&cwd)?;
    config.ensure_root_exists()?;
    Ok(config)
}

/// Creates a detector and runs the initial bulk load.
async fn init_detector(config: &Config) -> color_eyre::Result<(LocaleDetector, LoadStats)> {
    let mut detector = LocaleDetector::new(config)?;
    let stats = detector.init().await?;
    Ok((detector, stats))
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

/// Runs a one-shot index with summary output.
async fn run_scan(config: &Config, detailed: bool) -> color_eyre::Result<()> {
    info!(root = %config.detector.root, "Starting scan");

    let (detector, stats) = init_detector(config).await?;
    print_summary(&detector, &stats)?;

    if detailed {
        print_file_list(&detector)?;
    }

    Ok(())
}

/// Indexes once, then re-indexes on every change until interrupted.
async fn run_watch(mut config: Config, debounce_ms: Option<u64>) -> color_eyre::Result<()> {
    if let Some(ms) = debounce_ms {
        config.watch.debounce_ms = ms;
    }

    let (mut detector, stats) = init_detector(&config).await?;
    print_summary(&detector, &stats)?;

    if !config.watch.enabled || detector.locale_dirs().is_empty() {
        info!("Nothing to watch");
        return Ok(());
    }

    let filter = LocaleFileFilter::new(&detector.extensions())?.with_roots(detector.locale_dirs());
    let mut watcher = FileWatcher::new(detector.locale_dirs(), &config.watch, filter).await?;
    info!(
        dirs = watcher.watch_paths().len(),
        debounce_ms = config.watch.debounce_ms,
        "Watching locale directories"
    );

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigterm = signal(SignalKind::terminate())?;

        tokio::select! {
            () = detector.run(watcher.events()) => {}
            _ = tokio::signal::ctrl_c() => info!("Interrupted, shutting down"),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::select! {
            () = detector.run(watcher.events()) => {}
            _ = tokio::signal::ctrl_c() => info!("Interrupted, shutting down"),
        }
    }

    watcher.shutdown().await?;
    info!(generation = detector.generation(), "Watcher stopped");
    Ok(())
}

/// Prints one locale bundle as pretty JSON.
async fn run_bundle(
    config: &Config,
    locale: &str,
    namespace: Option<&str>,
    output: Option<&Utf8PathBuf>,
) -> color_eyre::Result<()> {
    let (detector, _) = init_detector(config).await?;

    let bundle = detector.bundle(locale, namespace).ok_or_else(|| {
        let available = detector.locale_modules().locales().collect::<Vec<_>>().join(", ");
        eyre!("No bundle for locale '{locale}' (available: {available})")
    })?;
    let content = serde_json::to_string_pretty(bundle).wrap_err("Failed to serialize bundle")?;

    if let Some(path) = output {
        std::fs::write(path.as_std_path(), &content)?;
        info!(path = %path, "Bundle written");
    } else {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        writeln!(handle, "{content}")?;
    }

    Ok(())
}

/// Lists every virtual module with its lookup key.
async fn run_modules(config: &Config) -> color_eyre::Result<()> {
    let (detector, _) = init_detector(config).await?;
    let modules = detector.locale_modules();

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    for (key, id) in &modules.resolved_ids {
        writeln!(handle, "{id}\t{key}")?;
    }
    Ok(())
}

// =============================================================================
// OUTPUT HELPERS
// =============================================================================

/// Prints a summary of the bulk load.
fn print_summary(detector: &LocaleDetector, stats: &LoadStats) -> color_eyre::Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    let modules = detector.locale_modules();

    writeln!(handle)?;
    writeln!(handle, "Locale Summary")?;
    writeln!(handle, "==============")?;
    writeln!(handle)?;
    writeln!(handle, "Locale directories: {}", detector.locale_dirs().len())?;
    for dir in detector.locale_dirs() {
        writeln!(handle, "  {dir}")?;
    }
    writeln!(handle, "Candidate files:    {}", stats.candidates)?;
    writeln!(handle, "  Indexed:          {}", stats.loaded)?;
    writeln!(handle, "  Skipped:          {} (no match or no parser)", stats.skipped)?;
    writeln!(handle, "  Failed:           {}", stats.failed)?;
    writeln!(handle)?;
    writeln!(
        handle,
        "Locales: {}",
        modules.locales().collect::<Vec<_>>().join(", ")
    )?;
    writeln!(handle, "Parse success: {:.1}%", stats.success_rate())?;
    Ok(())
}

/// Prints every indexed file with its locale and namespace.
fn print_file_list(detector: &LocaleDetector) -> color_eyre::Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();

    writeln!(handle)?;
    writeln!(handle, "Indexed files ({}):", detector.files().len())?;
    for record in detector.files().iter() {
        writeln!(
            handle,
            "  {} [{}{}]",
            record.path,
            record.locale,
            record
                .namespace
                .as_deref()
                .map(|ns| format!(" / {ns}"))
                .unwrap_or_default()
        )?;
    }
    Ok(())
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Application entry point.
#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.no_color);

    let config = build_config(&cli)?;

    match &cli.command {
        Commands::Scan { detailed } => run_scan(&config, *detailed).await,
        Commands::Watch { debounce_ms } => run_watch(config, *debounce_ms).await,
        Commands::Bundle {
            locale,
            namespace,
            output,
        } => run_bundle(&config, locale, namespace.as_deref(), output.as_ref()).await,
        Commands::Modules => run_modules(&config).await,
    }
}
