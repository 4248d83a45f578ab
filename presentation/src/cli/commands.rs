//! CLI command definitions

use clap::{Parser, ValueEnum};
use livelog_domain::{FlushPolicy, LineSplit, LogFormat};
use std::path::PathBuf;

/// How the end-of-run summary is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SummaryFormat {
    /// Human-readable, colored
    Text,
    /// One JSON object
    Json,
}

/// CLI arguments for livelog
#[derive(Parser, Debug)]
#[command(name = "livelog")]
#[command(author, version, about = "Capture process output as structured log records")]
#[command(long_about = r#"
livelog runs a command, passes its stdout and stderr through unchanged, and
appends every line it prints to a structured log as one JSON or logfmt
record. Without a command it captures its own standard input.

Configuration is loaded from (in priority order):
1. Command-line flags
2. LIVELOG_<SECTION>__<KEY> and LIVE_LOGS_FILE_PATH environment variables
3. --config <path>            Explicit config file
4. ./livelog.toml             Project-level config
5. ~/.config/livelog/config.toml   Global config

Example:
  livelog -o build.jsonl -- cargo build
  livelog -f logfmt -o - -- ./server --port 8080
  tail -f app.out | livelog -o app.jsonl
"#)]
pub struct Cli {
    /// Command to run and capture (everything after `--`)
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "COMMAND")]
    pub command: Vec<String>,

    /// Record format: json or logfmt
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<LogFormat>,

    /// Destination: a file path, `-`/`stdout`, or `stderr`
    #[arg(short, long, value_name = "DEST")]
    pub output: Option<String>,

    /// Flush policy: per-event or buffered
    #[arg(long, value_name = "POLICY")]
    pub flush: Option<FlushPolicy>,

    /// How output is cut into records: per-line or whole-chunk
    #[arg(long, value_name = "MODE")]
    pub line_split: Option<LineSplit>,

    /// Capacity of the capture queue
    #[arg(long, value_name = "N")]
    pub queue_capacity: Option<usize>,

    /// Attach the producing thread's name to each record
    #[arg(long)]
    pub include_thread: bool,

    /// Write "capture started" / "capture stopped" records around the run
    #[arg(long)]
    pub lifecycle_markers: bool,

    /// Do not pass captured output through to this process's streams
    #[arg(long)]
    pub no_tee: bool,

    /// Summary format printed when capture ends
    #[arg(long, value_enum, default_value = "text")]
    pub summary: SummaryFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress the end-of-run summary
    #[arg(short, long)]
    pub quiet: bool,

    /// Also write diagnostics to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}
