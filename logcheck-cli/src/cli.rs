//! CLI argument parsing using clap derive API
//!
//! Purely declarative: no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// logcheck -- scan server log files for unexpected errors and warnings.
///
/// Use `logcheck <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "logcheck", version, about, long_about = None)]
pub struct Cli {
    /// Path to the logcheck.toml configuration file (defaults apply if absent).
    #[arg(short, long, default_value = "logcheck.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Wait for end markers and scan log files for errors.
    Scan(ScanArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- scan ----

/// One-shot log scan. Flags override the `[scan]` and `[wait]` sections.
#[derive(Args, Debug, Default)]
pub struct ScanArgs {
    /// Log file to scan (repeatable).
    #[arg(long = "file", value_name = "NAME")]
    pub files: Vec<String>,

    /// Error marker substring (repeatable, checked in order).
    #[arg(long = "marker", value_name = "M")]
    pub markers: Vec<String>,

    /// End marker entry in the form "file;marker" (repeatable).
    #[arg(long = "end-marker", value_name = "FILE;MARKER")]
    pub end_markers: Vec<String>,

    /// Known issue substring to suppress (repeatable).
    #[arg(long = "known-issue", value_name = "S")]
    pub known_issues: Vec<String>,

    /// Report every error instead of stopping at the first one.
    #[arg(long)]
    pub all: bool,

    /// Read logs from this test-resource directory.
    #[arg(long, value_name = "DIR", conflicts_with = "quickstart")]
    pub resources: Option<PathBuf>,

    /// Quickstart folder to read live logs from (instead of the environment property).
    #[arg(long, value_name = "DIR")]
    pub quickstart: Option<PathBuf>,

    /// Maximum time to wait for end markers, in milliseconds.
    #[arg(long, value_name = "N")]
    pub max_wait_ms: Option<u64>,
}

// ---- config ----

/// Manage logcheck configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, scan, wait).
        #[arg(long)]
        section: Option<String>,
    },
}
