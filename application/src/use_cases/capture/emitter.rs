//! Producer-side handle of a capture session.

use super::line_splitter::split_units;
use super::stats::CaptureCounters;
use crate::config::CaptureConfig;
use crate::ports::error_reporter::ErrorReporter;
use crossbeam::channel::{SendTimeoutError, Sender};
use livelog_domain::{Context, Level, LineSplit, LogEvent, Source};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// State shared by every emitter, the writer thread and the session.
pub(crate) struct Shared {
    tx: Sender<LogEvent>,
    line_split: LineSplit,
    enqueue_timeout: Duration,
    include_thread: bool,
    pub(crate) counters: CaptureCounters,
    pub(crate) reporter: Arc<dyn ErrorReporter>,
    closed: AtomicBool,
    aborted: AtomicBool,
}

impl Shared {
    pub(crate) fn new(
        tx: Sender<LogEvent>,
        config: &CaptureConfig,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        Self {
            tx,
            line_split: config.line_split,
            enqueue_timeout: config.enqueue_timeout,
            include_thread: config.include_thread,
            counters: CaptureCounters::default(),
            reporter,
            closed: AtomicBool::new(false),
            aborted: AtomicBool::new(false),
        }
    }

    /// Stop accepting new events.
    pub(crate) fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Tell the writer to stop without draining.
    pub(crate) fn abort(&self) {
        self.aborted.store(true, Ordering::SeqCst);
    }

    pub(crate) fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }
}

/// Cloneable producer handle handed to capture hooks.
///
/// Every method returns without error: capture is best-effort and never
/// alters the behavior of the code producing output. Calls block at most for
/// the configured enqueue timeout when the queue is full.
#[derive(Clone)]
pub struct TextEmitter {
    shared: Arc<Shared>,
}

impl TextEmitter {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    /// Forward a chunk of stream text, one event per unit.
    ///
    /// Called on the thread that produced the text, so `include_thread`
    /// tags each event with it.
    pub fn on_text(&self, source: Source, text: &str) {
        self.emit_units(source, text, self.base_context());
    }

    /// Forward raw bytes relayed from a pipe, decoding UTF-8 lossily.
    ///
    /// The caller is a reader thread, not the writer of the bytes, so no
    /// `thread` tag is attached.
    pub fn on_bytes(&self, source: Source, bytes: &[u8]) {
        self.emit_units(source, &String::from_utf8_lossy(bytes), Context::new());
    }

    /// Forward a structured log call.
    pub fn on_log(&self, level: Level, message: &str, context: Context) {
        let mut context = context;
        if self.shared.include_thread && context.get("thread").is_none() {
            let _ = context.insert("thread", thread_label());
        }
        self.enqueue(LogEvent::new(Source::Logger, level, message).with_context(context));
    }

    /// Forward a fully built event unchanged.
    pub fn emit(&self, event: LogEvent) {
        self.enqueue(event);
    }

    /// How this session cuts stream text into events.
    ///
    /// Pipe readers use it to decide whether to read by line or by chunk.
    pub fn line_split(&self) -> LineSplit {
        self.shared.line_split
    }

    /// Whether the owning session has started shutting down.
    pub fn is_closed(&self) -> bool {
        self.shared.is_closed()
    }

    fn emit_units(&self, source: Source, text: &str, context: Context) {
        for unit in split_units(text, self.shared.line_split) {
            self.enqueue(LogEvent::from_stream(source, unit).with_context(context.clone()));
        }
    }

    fn base_context(&self) -> Context {
        let mut context = Context::new();
        if self.shared.include_thread {
            let _ = context.insert("thread", thread_label());
        }
        context
    }

    fn enqueue(&self, event: LogEvent) {
        let counters = &self.shared.counters;
        if self.shared.is_closed() {
            counters.record_after_close(1);
            return;
        }

        match self.shared.tx.send_timeout(event, self.shared.enqueue_timeout) {
            Ok(()) => counters.record_captured(),
            Err(SendTimeoutError::Timeout(_)) => {
                counters.record_queue_full();
                self.shared
                    .reporter
                    .report("capture queue full; event dropped");
            }
            Err(SendTimeoutError::Disconnected(_)) => counters.record_after_close(1),
        }
    }
}

fn thread_label() -> String {
    let current = std::thread::current();
    match current.name() {
        Some(name) => name.to_string(),
        None => format!("{:?}", current.id()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::error_reporter::NoErrorReporter;
    use crossbeam::channel::bounded;
    use livelog_domain::ContextValue;

    fn emitter_with(config: CaptureConfig) -> (TextEmitter, crossbeam::channel::Receiver<LogEvent>) {
        let (tx, rx) = bounded(config.effective_capacity());
        let shared = Arc::new(Shared::new(tx, &config, Arc::new(NoErrorReporter)));
        (TextEmitter::new(shared), rx)
    }

    #[test]
    fn test_on_text_emits_unset_stream_events() {
        let (emitter, rx) = emitter_with(CaptureConfig::default());
        emitter.on_text(Source::Stderr, "first\nsecond\n");

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].message(), "first");
        assert_eq!(events[1].message(), "second");
        assert!(events.iter().all(|e| e.level() == Level::Unset));
        assert!(events.iter().all(|e| e.source() == Source::Stderr));
    }

    #[test]
    fn test_full_queue_drops_after_timeout() {
        let config = CaptureConfig::default()
            .with_queue_capacity(1)
            .with_enqueue_timeout(Duration::from_millis(5));
        let (emitter, rx) = emitter_with(config);

        emitter.on_text(Source::Stdout, "kept");
        emitter.on_text(Source::Stdout, "dropped");

        let stats = emitter.shared.counters.snapshot();
        assert_eq!(stats.captured, 1);
        assert_eq!(stats.dropped_queue_full, 1);
        assert_eq!(rx.try_iter().count(), 1);
    }

    #[test]
    fn test_closed_emitter_counts_late_events() {
        let (emitter, rx) = emitter_with(CaptureConfig::default());
        emitter.shared.close();
        emitter.on_log(Level::Info, "late", Context::new());

        assert!(emitter.is_closed());
        assert_eq!(rx.try_iter().count(), 0);
        assert_eq!(emitter.shared.counters.snapshot().dropped_after_close, 1);
    }

    #[test]
    fn test_relayed_bytes_carry_no_thread_tag() {
        let config = CaptureConfig::default().with_include_thread(true);
        let (emitter, rx) = emitter_with(config);

        emitter.on_bytes(Source::Stdout, b"from a pipe\n");
        emitter.on_text(Source::Stdout, "direct");

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(events.len(), 2);
        assert!(events[0].context().get("thread").is_none());
        assert!(events[1].context().get("thread").is_some());
    }

    #[test]
    fn test_line_split_is_exposed_to_hooks() {
        let config = CaptureConfig::default().with_line_split(LineSplit::WholeChunk);
        let (emitter, _rx) = emitter_with(config);
        assert_eq!(emitter.line_split(), LineSplit::WholeChunk);
    }

    #[test]
    fn test_include_thread_adds_thread_context() {
        let config = CaptureConfig::default().with_include_thread(true);
        let (emitter, rx) = emitter_with(config);

        std::thread::Builder::new()
            .name("producer-7".to_string())
            .spawn(move || emitter.on_log(Level::Warning, "hi", Context::new()))
            .unwrap()
            .join()
            .unwrap();

        let event = rx.try_recv().unwrap();
        assert_eq!(event.source(), Source::Logger);
        assert_eq!(
            event.context().get("thread"),
            Some(&ContextValue::Str("producer-7".to_string()))
        );
    }
}
