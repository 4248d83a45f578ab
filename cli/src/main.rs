//! CLI entrypoint for livelog
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

mod child;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use livelog_application::CaptureAdapter;
use livelog_infrastructure::{ConfigLoader, FileConfig, StderrReporter, StructuredSink};
use livelog_presentation::{Cli, ConsoleFormatter, SummaryFormat};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Held for the whole run so buffered diagnostics reach the log file.
    let _log_guard = init_tracing(cli.verbose, cli.log_file.as_deref())?;

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(ExitCode::SUCCESS);
    }

    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())?
    };
    apply_overrides(&cli, &mut config);
    config.validate()?;
    debug!("Effective configuration: {:?}", config);

    // === Dependency Injection ===
    // Both take their own handle on the original streams up front.
    let sink = StructuredSink::configure(config.to_sink_options())
        .with_context(|| format!("failed to open sink '{}'", config.sink.destination))?;
    let reporter = Arc::new(StderrReporter::new().context("failed to open stderr")?);

    let mut session = CaptureAdapter::new(Box::new(sink))
        .with_config(config.to_capture_config())
        .with_reporter(reporter)
        .install()?;

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    let tee = config.capture.tee;
    let outcome = if cli.command.is_empty() {
        info!("Capturing standard input");
        child::capture_stdin(session.emitter(), tee, cancel)
            .await
            .map(|()| 0)
    } else {
        child::run_child(&cli.command, session.emitter(), tee, cancel).await
    };

    // Drain before reporting, also when the child could not be run.
    let report = session.uninstall();
    if !cli.quiet {
        let summary = match cli.summary {
            SummaryFormat::Text => ConsoleFormatter::format(&report),
            SummaryFormat::Json => ConsoleFormatter::format_json(&report),
        };
        eprint!("{}", summary);
        if cli.summary == SummaryFormat::Json {
            eprintln!();
        }
    }

    let code = outcome?;
    Ok(ExitCode::from(code.clamp(0, 255) as u8))
}

/// Initialize diagnostics based on verbosity level.
///
/// Diagnostics go to stderr; with `--log-file` they are also appended to
/// that file through a non-blocking writer.
fn init_tracing(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let (dir, name) = split_log_path(path)?;
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}

fn split_log_path(path: &Path) -> Result<(PathBuf, PathBuf)> {
    let name = path
        .file_name()
        .ok_or_else(|| anyhow!("--log-file must name a file: {}", path.display()))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((dir, PathBuf::from(name)))
}

/// Apply command-line flags on top of the loaded configuration.
fn apply_overrides(cli: &Cli, config: &mut FileConfig) {
    if let Some(format) = cli.format {
        config.sink.format = format;
    }
    if let Some(destination) = &cli.output {
        config.sink.destination = destination.clone();
    }
    if let Some(policy) = cli.flush {
        config.sink.flush_policy = policy;
    }
    if let Some(mode) = cli.line_split {
        config.capture.line_split = mode;
    }
    if let Some(capacity) = cli.queue_capacity {
        config.capture.queue_capacity = capacity;
    }
    if cli.include_thread {
        config.capture.include_thread = true;
    }
    if cli.lifecycle_markers {
        config.capture.lifecycle_markers = true;
    }
    if cli.no_tee {
        config.capture.tee = false;
    }
}
