//! Capture use case.
//!
//! Installs a set of [`CaptureHook`]s in front of one [`EventSink`] and moves
//! every intercepted unit of output from the producing thread to the sink:
//!
//! ```text
//! producer ──on_text──▶ TextEmitter ──bounded queue──▶ writer thread ──▶ EventSink
//! ```
//!
//! Producers only ever enqueue. A single writer thread owns the sink, so
//! each record reaches the destination as one unit without producer-side
//! locking. [`CaptureSession`] is the scoped lifecycle object: dropping it
//! uninstalls the hooks and drains the queue, so streams are restored on
//! every exit path including unwinding.

mod emitter;
mod line_splitter;
mod stats;
mod writer;

pub use emitter::TextEmitter;
pub use line_splitter::split_units;
pub use stats::{CaptureCounters, CaptureStats};

use crate::config::CaptureConfig;
use crate::ports::capture_hook::{CaptureError, CaptureHook};
use crate::ports::error_reporter::{ErrorReporter, NoErrorReporter};
use crate::ports::event_sink::EventSink;
use crossbeam::channel::{Receiver, RecvTimeoutError, bounded};
use emitter::Shared;
use livelog_domain::{Context, Level, LogEvent, Source};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

/// The writer did not drain the queue within the drain timeout.
///
/// Surfaced as a warning on the [`CaptureReport`], never as a failure of
/// `uninstall` itself.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Capture queue not drained within {timeout:?}; {dropped} events dropped")]
pub struct QueueTimeoutError {
    pub dropped: u64,
    pub timeout: Duration,
}

/// Final accounting of a capture session.
#[derive(Debug, Clone)]
pub struct CaptureReport {
    pub stats: CaptureStats,
    pub sink: String,
    pub elapsed: Duration,
    pub shutdown_timeout: Option<QueueTimeoutError>,
}

impl CaptureReport {
    pub fn is_clean(&self) -> bool {
        self.shutdown_timeout.is_none() && self.stats.dropped() == 0
    }
}

/// Builder for a capture session.
pub struct CaptureAdapter {
    sink: Box<dyn EventSink>,
    config: CaptureConfig,
    reporter: Arc<dyn ErrorReporter>,
    hooks: Vec<Box<dyn CaptureHook>>,
}

impl CaptureAdapter {
    pub fn new(sink: Box<dyn EventSink>) -> Self {
        Self {
            sink,
            config: CaptureConfig::default(),
            reporter: Arc::new(NoErrorReporter),
            hooks: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: CaptureConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the fallback channel for capture-side failures.
    pub fn with_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Register a hook; hooks attach in registration order.
    pub fn with_hook(mut self, hook: Box<dyn CaptureHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Start the writer and attach every hook.
    ///
    /// If any hook fails to attach, the ones already attached are detached
    /// and the writer is stopped before the error is returned.
    pub fn install(self) -> Result<CaptureSession, CaptureError> {
        let CaptureAdapter {
            sink,
            config,
            reporter,
            hooks,
        } = self;

        let sink_name = sink.describe();
        let (tx, rx) = bounded(config.effective_capacity());
        let (done_tx, done_rx) = bounded(1);
        let shared = Arc::new(Shared::new(tx, &config, reporter));

        let writer = writer::spawn_writer(sink, rx.clone(), Arc::clone(&shared), done_tx)
            .map_err(CaptureError::WriterSpawn)?;

        let mut session = CaptureSession {
            emitter: TextEmitter::new(Arc::clone(&shared)),
            shared,
            rx,
            done_rx,
            writer: Some(writer),
            hooks: Vec::with_capacity(hooks.len()),
            drain_timeout: config.drain_timeout,
            sink_name,
            started: Instant::now(),
            report: None,
            lifecycle_markers: false,
        };

        for mut hook in hooks {
            if let Err(e) = hook.attach(session.emitter.clone()) {
                warn!(hook = hook.name(), error = %e, "capture hook failed to attach, rolling back");
                session.uninstall();
                return Err(e);
            }
            debug!(hook = hook.name(), "capture hook attached");
            session.hooks.push(hook);
        }

        // Only a fully installed session gets markers; rollback stays silent.
        session.lifecycle_markers = config.lifecycle_markers;
        session.mark("capture started");

        info!(
            sink = %session.sink_name,
            hooks = session.hooks.len(),
            line_split = %config.line_split,
            "capture installed"
        );

        Ok(session)
    }
}

/// An installed capture: the scoped owner of hooks, queue and writer.
pub struct CaptureSession {
    emitter: TextEmitter,
    shared: Arc<Shared>,
    rx: Receiver<LogEvent>,
    done_rx: Receiver<()>,
    writer: Option<JoinHandle<()>>,
    hooks: Vec<Box<dyn CaptureHook>>,
    drain_timeout: Duration,
    sink_name: String,
    started: Instant,
    report: Option<CaptureReport>,
    lifecycle_markers: bool,
}

impl CaptureSession {
    /// A producer handle for this session.
    pub fn emitter(&self) -> TextEmitter {
        self.emitter.clone()
    }

    pub fn on_text(&self, source: Source, text: &str) {
        self.emitter.on_text(source, text);
    }

    pub fn on_log(&self, level: Level, message: &str, context: Context) {
        self.emitter.on_log(level, message, context);
    }

    pub fn stats(&self) -> CaptureStats {
        self.shared.counters.snapshot()
    }

    pub fn is_installed(&self) -> bool {
        self.report.is_none()
    }

    /// Restore the host and drain the queue.
    ///
    /// Hooks are detached in reverse order (each emits its pending text
    /// first), the queue is closed, and the writer gets up to the drain
    /// timeout to finish. Calling this again returns the same report.
    pub fn uninstall(&mut self) -> CaptureReport {
        if let Some(report) = &self.report {
            return report.clone();
        }

        while let Some(mut hook) = self.hooks.pop() {
            if let Err(e) = hook.detach() {
                self.shared
                    .reporter
                    .report(&format!("failed to detach {}: {}", hook.name(), e));
            }
        }

        self.mark("capture stopped");
        self.shared.close();

        let shutdown_timeout = match self.done_rx.recv_timeout(self.drain_timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                if let Some(writer) = self.writer.take()
                    && writer.join().is_err()
                {
                    self.shared.reporter.report("capture writer thread panicked");
                }
                let late = self.rx.try_iter().count() as u64;
                if late > 0 {
                    self.shared.counters.record_after_close(late);
                }
                None
            }
            Err(RecvTimeoutError::Timeout) => {
                self.shared.abort();
                // The writer is left to finish its current record on its own.
                self.writer.take();
                let dropped = self.rx.try_iter().count() as u64;
                self.shared.counters.record_shutdown_drops(dropped);
                let error = QueueTimeoutError {
                    dropped,
                    timeout: self.drain_timeout,
                };
                self.shared.reporter.report(&error.to_string());
                Some(error)
            }
        };

        let report = CaptureReport {
            stats: self.shared.counters.snapshot(),
            sink: self.sink_name.clone(),
            elapsed: self.started.elapsed(),
            shutdown_timeout,
        };

        info!(
            written = report.stats.written,
            dropped = report.stats.dropped(),
            sink_errors = report.stats.sink_errors,
            "capture uninstalled"
        );

        self.report = Some(report.clone());
        report
    }

    fn mark(&self, message: &str) {
        if self.lifecycle_markers {
            let context = Context::new().with("sink", self.sink_name.as_str());
            self.emitter.on_log(Level::Info, message, context);
        }
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.uninstall();
    }
}
