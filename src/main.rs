// Use jemalloc for better memory allocation performance on Unix-like systems
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

// Use mimalloc on Windows for better performance
#[cfg(target_env = "msvc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

mod cancellation;
mod discovery;
mod resolve_config;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use rumdl_lib::config::{self, Config};
use rumdl_lib::migrator;
use rumdl_lib::output;
use rumdl_lib::parser::CommonMarkParser;
use rumdl_lib::pipeline::{self, PipelineOptions, PipelineResult};
use rumdl_lib::{RumdlError, default_registry};

#[derive(Parser)]
#[command(name = "rumdl", author, version, about = "A fast Markdown linter and auto-fixer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lint (and optionally fix) Markdown files
    Check(CheckArgs),
    /// Migrate a foreign markdownlint config into native form
    Import(ImportArgs),
    /// List the rule catalog
    Rules(RulesArgs),
}

#[derive(Parser)]
struct CheckArgs {
    /// Files or directories to lint
    paths: Vec<PathBuf>,

    /// Apply fixes in place
    #[arg(long)]
    fix: bool,

    /// Show the unified diff instead of writing
    #[arg(long)]
    dry_run: bool,

    /// Explicit configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Skip all discovered configuration, use built-in defaults only
    #[arg(long)]
    no_config: bool,

    /// Worker count (0 = hardware concurrency)
    #[arg(long, default_value_t = 0)]
    jobs: usize,

    /// Comma-separated rule ids to force-enable
    #[arg(long)]
    enable: Option<String>,

    /// Comma-separated rule ids to force-disable
    #[arg(long)]
    disable: Option<String>,

    /// Comma-separated rule ids to restrict auto-fix to
    #[arg(long)]
    fix_rules: Option<String>,

    /// Never write `.bak` sidecar files
    #[arg(long)]
    no_backups: bool,

    /// Output format
    #[arg(long, value_parser = ["text", "json", "diff", "sarif"])]
    format: Option<String>,
}

#[derive(Parser)]
struct ImportArgs {
    /// Path to a markdownlint config file (JSON/JSONC/YAML)
    file: PathBuf,

    /// Output file path (default: .rumdl.yml)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the converted config instead of writing it
    #[arg(long)]
    dry_run: bool,
}

#[derive(Parser)]
struct RulesArgs {
    /// Only list rules that can auto-fix
    #[arg(long)]
    fixable: bool,

    /// Filter by category
    #[arg(long)]
    category: Option<String>,
}

fn main() -> ExitCode {
    // Reset SIGPIPE to default behavior on Unix so piping to `head` etc. works correctly.
    // Without this, Rust ignores SIGPIPE and `println!` panics on broken pipe.
    #[cfg(unix)]
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }

    env_logger::Builder::from_default_env()
        .format_timestamp(None)
        .format_target(false)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("rumdl: {err:#}");
            exit_codes::CONFIG_OR_IO_ERROR
        }
    }
}

mod exit_codes {
    use std::process::ExitCode;
    pub const CLEAN: ExitCode = ExitCode::SUCCESS;
    pub const ISSUES_FOUND: ExitCode = ExitCode::from(1);
    pub const CONFIG_OR_IO_ERROR: ExitCode = ExitCode::from(2);
    pub const CANCELLED: ExitCode = ExitCode::from(3);
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Check(args) => run_check(args),
        Commands::Import(args) => run_import(args),
        Commands::Rules(args) => run_rules(args),
    }
}

fn run_check(args: CheckArgs) -> Result<ExitCode> {
    let registry = default_registry();
    let cwd = std::env::current_dir().context("determine current directory")?;

    let mut warnings = Vec::new();
    let mut config = resolve_config::resolve(&args, &cwd, &mut warnings)?;
    config::normalize_rule_keys(&mut config, &registry)
        .into_iter()
        .for_each(|w| warnings.push(w));
    config::validate(&config, &registry, &mut warnings).map_err(RumdlError::from)?;
    for w in &warnings {
        log::warn!("{w}");
    }

    let paths = if args.paths.is_empty() {
        vec![cwd.clone()]
    } else {
        args.paths.clone()
    };
    let files = discovery::collect_markdown_files(&paths, &config.ignore)?;

    let cancellation = cancellation::install_sigint_handler();
    let pipeline_options = PipelineOptions::from_config(&config);
    let parser = CommonMarkParser;

    let mut results = run_files(&files, &registry, &config, &pipeline_options, &parser, &cancellation)?;
    results.sort_by(|a, b| a.path.cmp(&b.path));

    if cancellation.load(std::sync::atomic::Ordering::Relaxed) {
        return Ok(exit_codes::CANCELLED);
    }

    let sink = output::sink_for(&config.format.clone().unwrap_or_else(|| "text".to_string()))
        .context("unsupported output format")?;
    let rendered = sink.render(&results).context("render output")?;
    print!("{rendered}");

    let issues = results.iter().any(|r| r.file_result.has_issues());
    Ok(if issues {
        exit_codes::ISSUES_FOUND
    } else {
        exit_codes::CLEAN
    })
}

#[cfg(feature = "parallel")]
fn run_files(
    files: &[PathBuf],
    registry: &rumdl_lib::RuleRegistry,
    config: &Config,
    options: &PipelineOptions,
    parser: &CommonMarkParser,
    cancellation: &Arc<std::sync::atomic::AtomicBool>,
) -> Result<Vec<PipelineResult>> {
    use rayon::prelude::*;

    let run_one = |path: &PathBuf| -> Option<PipelineResult> {
        match pipeline::run(parser, registry, config, options, cancellation, path) {
            Ok(result) => Some(result),
            Err(RumdlError::Cancelled) => None,
            Err(err) => {
                log::error!("{}: {err}", path.display());
                None
            }
        }
    };

    let results = if config.jobs > 0 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.jobs)
            .build()
            .context("build worker pool")?;
        pool.install(|| files.par_iter().filter_map(run_one).collect())
    } else {
        files.par_iter().filter_map(run_one).collect()
    };
    Ok(results)
}

#[cfg(not(feature = "parallel"))]
fn run_files(
    files: &[PathBuf],
    registry: &rumdl_lib::RuleRegistry,
    config: &Config,
    options: &PipelineOptions,
    parser: &CommonMarkParser,
    cancellation: &Arc<std::sync::atomic::AtomicBool>,
) -> Result<Vec<PipelineResult>> {
    let mut results = Vec::with_capacity(files.len());
    for path in files {
        match pipeline::run(parser, registry, config, options, cancellation, path) {
            Ok(result) => results.push(result),
            Err(RumdlError::Cancelled) => break,
            Err(err) => log::error!("{}: {err}", path.display()),
        }
    }
    Ok(results)
}

fn run_import(args: ImportArgs) -> Result<ExitCode> {
    let result = migrator::migrate_file(&args.file).map_err(RumdlError::from)?;
    for w in &result.warnings {
        log::warn!("{w}");
    }

    let migrated = Config {
        rules: result.rules,
        ..Config::defaults()
    };
    let rendered = serde_yml::to_string(&migrated).context("serialize migrated config")?;

    if args.dry_run {
        print!("{rendered}");
        return Ok(exit_codes::CLEAN);
    }

    let output_path = args.output.unwrap_or_else(|| PathBuf::from(".rumdl.yml"));
    std::fs::write(&output_path, rendered).with_context(|| format!("write {}", output_path.display()))?;
    eprintln!("wrote {}", output_path.display());
    Ok(exit_codes::CLEAN)
}

fn run_rules(args: RulesArgs) -> Result<ExitCode> {
    let registry = default_registry();
    for rule in registry.rules() {
        if args.fixable && !rule.can_fix() {
            continue;
        }
        if let Some(category) = &args.category
            && rule.category().to_string() != *category
        {
            continue;
        }
        println!(
            "{:<8} {:<28} {:<12} fix={} {}",
            rule.id(),
            rule.name(),
            rule.category(),
            rule.can_fix(),
            rule.description()
        );
    }
    Ok(exit_codes::CLEAN)
}
