//! CLI layer: argument parsing, logging setup, and command dispatch.

pub mod args;
mod report;

pub use args::*;

use std::io::Write;

use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use jsoncheck::{check_paths, CancellationToken, CheckError, CATALOG, JSON_SYNTAX_RULE};

// ─── CLI ─────────────────────────────────────────────────────────────

/// Validates JSON string literals passed to Newtonsoft.Json parse APIs in C# code
#[derive(Parser, Debug)]
#[command(
    name = "jsoncheck",
    version = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("BUILD_DATETIME"), ")"),
    about,
    after_help = "Run 'jsoncheck <COMMAND> --help' for detailed options and examples."
)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub log: LogArgs,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Check C# files for invalid JSON literals
    Check(CheckArgs),

    /// Show the rule and the list of checked APIs
    Rules(RulesArgs),
}

/// Exit statuses.
pub(crate) const EXIT_CLEAN: i32 = 0;
pub(crate) const EXIT_DIAGNOSTICS: i32 = 1;
pub(crate) const EXIT_ERROR: i32 = 2;

// ─── Main entry point ───────────────────────────────────────────────

pub fn run() {
    let cli = Cli::parse();
    init_logging(&cli.log);

    let result = match cli.command {
        Commands::Check(args) => cmd_check(args),
        Commands::Rules(args) => cmd_rules(args),
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(EXIT_ERROR);
        }
    }
}

fn init_logging(log: &LogArgs) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level_directive(&log.log_level)));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    match log.log_format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

/// Map a `--log-level` value to a filter directive; unknown values fall back to `info`.
pub(crate) fn log_level_directive(level: &str) -> &'static str {
    match level.to_ascii_lowercase().as_str() {
        "error" => "error",
        "warn" => "warn",
        "debug" => "debug",
        "trace" => "trace",
        _ => "info",
    }
}

// ─── Commands ────────────────────────────────────────────────────────

fn cmd_check(args: CheckArgs) -> Result<i32, CheckError> {
    let options = args.to_options();
    if options.extensions.is_empty() {
        return Err(CheckError::InvalidArgs("--ext must name at least one extension".to_string()));
    }

    let cancel = CancellationToken::new();
    let handler_token = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || handler_token.cancel()) {
        warn!(error = %e, "could not install Ctrl-C handler");
    }

    info!(paths = ?options.paths, ext = ?options.extensions, "starting check");
    let report = check_paths(&options, &cancel)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    report::write_report(&mut out, &report, args.format)?;
    out.flush()?;
    if args.format == OutputFormat::Text {
        eprintln!("{}", report::summary_line(&report));
    }

    Ok(exit_code(report.diagnostics.len()))
}

pub(crate) fn exit_code(diagnostic_count: usize) -> i32 {
    if diagnostic_count == 0 { EXIT_CLEAN } else { EXIT_DIAGNOSTICS }
}

fn cmd_rules(args: RulesArgs) -> Result<i32, CheckError> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    report::write_rules(&mut out, &JSON_SYNTAX_RULE, CATALOG, args.json)?;
    Ok(EXIT_CLEAN)
}
