//! @ai:module:intent CLI entry point for the [CompilationError] tag checker
//! @ai:module:layer presentation
//! @ai:module:public_api main
//! @ai:module:depends_on config, discovery, toolchain, invocation, compiler, verifier, orchestrator, reporter, output

use anyhow::Context;
use checkce::discovery::{dir_of, validate_target};
use checkce::invocation::build_template;
use checkce::orchestrator::{collect_source_files, run_checks};
use checkce::output::{format_elapsed, format_summary};
use checkce::toolchain::{prepare_console, validate_toolchain};
use checkce::{
    CheckConfig, CompilationChecker, DeveloperEnvironment, MsBuild, OutputFormat, ProjectLayout,
    Reporter, RunOptions, RunOutcome, Verifier,
};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r"The .sln file is searched in path, path\.., path\..\.., etc. The search stops at the
first match. It is an error if that directory contains more than one .sln file.

A C++ project directory is a directory with a .vcxproj file. It is an error if it contains
more than one .vcxproj file. It must be the solution directory or a child of it.
'path' must be in a project directory (descendant-or-self).

Exit codes:
    0: The check passed for all (0 or more) .cpp files.
    1: The check failed at least once.
    2: Technical error (e.g. directory/file does not exist).";

#[derive(Parser)]
#[command(name = "checkce")]
#[command(author, version, about = "Checks '[CompilationError-*]' tags in .cpp files")]
#[command(after_long_help = AFTER_HELP)]
struct Cli {
    /// A directory or a single .cpp file to process
    #[arg(default_value = ".")]
    path: PathBuf,

    /// A solution configuration, must be present in the .sln file
    #[arg(default_value = "Debug")]
    configuration: String,

    /// Number of worker threads to use for the check, between 1-20
    #[arg(default_value = "10")]
    workers: String,

    /// TOML file with toolchain locations and check settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Summary format
    #[arg(long, short, value_enum, default_value = "text")]
    format: Format,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("checkce=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let start = Instant::now();

    let args: Vec<String> = std::env::args().collect();
    if args.len() == 2 && args[1] == "/?" {
        let _ = Cli::command().print_long_help();
        return ExitCode::SUCCESS;
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if !is_technical(e.kind()) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            let _ = e.print();
            print_elapsed(start);
            return ExitCode::from(RunOutcome::TechnicalError.exit_code());
        }
    };

    let outcome = match run(cli, start) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("ERROR: {:#}", e);
            RunOutcome::TechnicalError
        }
    };

    print_elapsed(start);

    ExitCode::from(outcome.exit_code())
}

/// Help and version requests end the run normally; every other parse error is technical.
fn is_technical(kind: ErrorKind) -> bool {
    !matches!(kind, ErrorKind::DisplayHelp | ErrorKind::DisplayVersion)
}

fn print_elapsed(start: Instant) {
    println!();
    println!("{}", format_elapsed(start.elapsed()));
}

fn run(cli: Cli, start: Instant) -> anyhow::Result<RunOutcome> {
    let config = match &cli.config {
        Some(path) => CheckConfig::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => CheckConfig::default(),
    };

    let options = RunOptions::new(cli.path, cli.configuration, &cli.workers)?;
    let path = std::path::absolute(&options.path)
        .with_context(|| format!("Failed to resolve '{}'", options.path.display()))?;
    validate_target(&path, &config.check)?;
    validate_toolchain(&config.toolchain)?;

    prepare_console();
    let environment = DeveloperEnvironment::capture(&config.toolchain.vcvars)?;

    let layout = ProjectLayout::discover(&dir_of(&path))?;
    tracing::info!(
        "Solution directory: {}, project directory: {}",
        layout.solution_dir.display(),
        layout.project_dir.display()
    );

    let build = MsBuild::new(&config.toolchain);
    let template = build_template(&build, &layout, &options.configuration, &config.check)?;
    let compiler = CompilationChecker::new(template, environment);

    let verifier = Verifier::new(&compiler, &options.configuration, &config.check.tool_name);
    let reporter = Reporter::stdio(&layout.target_dir);

    let files = collect_source_files(&path, &config.check)?;
    run_checks(&files, &verifier, &reporter, options.workers)?;

    let summary = reporter.summary(start.elapsed());
    reporter.print(&format_summary(&summary, cli.format.into()));

    Ok(summary.outcome)
}
