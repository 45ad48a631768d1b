//! CLI argument structs for all subcommands.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use jsoncheck::{parse_extensions, CheckOptions};

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// One `path:line:col: error[ID]: message` line per diagnostic
    Text,
    /// A single JSON report object
    Json,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Logging flags shared by every subcommand.
#[derive(Parser, Debug, Clone)]
pub struct LogArgs {
    /// Log level for stderr output (error, warn, info, debug, trace).
    /// RUST_LOG takes precedence when set.
    #[arg(long, default_value = "warn", global = true)]
    pub log_level: String,

    /// Log line format on stderr
    #[arg(long, value_enum, default_value = "text", global = true)]
    pub log_format: LogFormat,
}

#[derive(Parser, Debug)]
#[command(after_long_help = r#"EXAMPLES:
  Whole repository:   jsoncheck check
  Some directories:   jsoncheck check src tests
  Single file:        jsoncheck check src/Settings.cs
  JSON report:        jsoncheck check . --format json
  Include .csx:       jsoncheck check . --ext cs,csx

CHECKED CALLS:
  Newtonsoft.Json.JsonConvert.DeserializeObject<T>(string)
  Newtonsoft.Json.Linq.JObject.Parse(string)
  Newtonsoft.Json.Linq.JArray.Parse(string)

  Only calls whose single argument is a string literal are checked.
  Variables, concatenations and interpolated strings are skipped.

EXIT STATUS:
  0  no diagnostics
  1  at least one diagnostic
  2  error (missing path, interrupted run)
"#)]
pub struct CheckArgs {
    /// Files or directories to check
    #[arg(default_value = ".")]
    pub paths: Vec<PathBuf>,

    /// File extensions to check, comma-separated
    #[arg(short, long, default_value = "cs")]
    pub ext: String,

    /// Number of parallel threads (0 = auto)
    #[arg(short, long, default_value = "0")]
    pub threads: usize,

    /// Include hidden files
    #[arg(long)]
    pub hidden: bool,

    /// Include .gitignore'd files
    #[arg(long)]
    pub no_ignore: bool,

    /// Output format for diagnostics
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl CheckArgs {
    pub fn to_options(&self) -> CheckOptions {
        CheckOptions {
            paths: self.paths.clone(),
            extensions: parse_extensions(&self.ext),
            threads: self.threads,
            hidden: self.hidden,
            no_ignore: self.no_ignore,
        }
    }
}

#[derive(Parser, Debug)]
pub struct RulesArgs {
    /// Print the rule and catalog as JSON
    #[arg(long)]
    pub json: bool,
}
