//! File/stream sink writing JSON or logfmt records.

use super::{Destination, SinkOptions, json, logfmt};
use crate::platform;
use livelog_application::{EventSink, SinkWriteError};
use livelog_domain::{FlushPolicy, LogEvent, LogFormat};
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use tracing::debug;

/// Structured sink over one destination.
///
/// Each record is encoded into a scratch buffer first and handed to the
/// destination with a single `write_all`, so a record is never split by
/// another record. File destinations are opened in append mode.
pub struct StructuredSink {
    format: LogFormat,
    flush_policy: FlushPolicy,
    writer: Option<BufWriter<Box<dyn Write + Send>>>,
    description: String,
    line: Vec<u8>,
    text: String,
}

impl std::fmt::Debug for StructuredSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StructuredSink")
            .field("format", &self.format)
            .field("flush_policy", &self.flush_policy)
            .field("destination", &self.description)
            .field("open", &self.writer.is_some())
            .finish()
    }
}

impl StructuredSink {
    /// Open the destination described by `options`.
    pub fn configure(options: SinkOptions) -> Result<Self, SinkWriteError> {
        let SinkOptions {
            format,
            destination,
            flush_policy,
        } = options;

        let description = destination.describe();
        let raw: Box<dyn Write + Send> = match destination {
            Destination::File(path) => {
                if let Some(parent) = path.parent()
                    && !parent.as_os_str().is_empty()
                {
                    std::fs::create_dir_all(parent).map_err(|e| SinkWriteError::Open {
                        path: path.clone(),
                        source: e,
                    })?;
                }
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&path)
                    .map_err(|e| SinkWriteError::Open {
                        path: path.clone(),
                        source: e,
                    })?;
                Box::new(file)
            }
            Destination::Stdout => platform::original_stdout().map_err(|e| SinkWriteError::Open {
                path: "<stdout>".into(),
                source: e,
            })?,
            Destination::Stderr => platform::original_stderr().map_err(|e| SinkWriteError::Open {
                path: "<stderr>".into(),
                source: e,
            })?,
            Destination::Writer { writer, .. } => writer,
        };

        debug!(destination = %description, %format, %flush_policy, "sink configured");

        Ok(Self {
            format,
            flush_policy,
            writer: Some(BufWriter::new(raw)),
            description,
            line: Vec::with_capacity(256),
            text: String::with_capacity(256),
        })
    }

    pub fn format(&self) -> LogFormat {
        self.format
    }

    pub fn flush_policy(&self) -> FlushPolicy {
        self.flush_policy
    }

    fn encode(&mut self, event: &LogEvent) -> Result<(), SinkWriteError> {
        self.line.clear();
        match self.format {
            LogFormat::Json => json::encode(event, &mut self.line)?,
            LogFormat::Logfmt => {
                self.text.clear();
                logfmt::encode(event, &mut self.text);
                self.line.extend_from_slice(self.text.as_bytes());
            }
        }
        self.line.push(b'\n');
        Ok(())
    }
}

impl EventSink for StructuredSink {
    fn write(&mut self, event: &LogEvent) -> Result<(), SinkWriteError> {
        if self.writer.is_none() {
            return Err(SinkWriteError::Closed);
        }
        self.encode(event)?;

        let writer = self.writer.as_mut().ok_or(SinkWriteError::Closed)?;
        writer.write_all(&self.line).map_err(SinkWriteError::Write)?;
        if self.flush_policy == FlushPolicy::PerEvent {
            writer.flush().map_err(SinkWriteError::Flush)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkWriteError> {
        match self.writer.as_mut() {
            Some(writer) => writer.flush().map_err(SinkWriteError::Flush),
            None => Ok(()),
        }
    }

    fn close(&mut self) -> Result<(), SinkWriteError> {
        match self.writer.take() {
            Some(mut writer) => writer.flush().map_err(SinkWriteError::Flush),
            None => Ok(()),
        }
    }

    fn describe(&self) -> String {
        self.description.clone()
    }
}

impl Drop for StructuredSink {
    fn drop(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use livelog_application::{CaptureAdapter, CaptureConfig};
    use livelog_domain::{Context, Level, Source};
    use std::collections::HashSet;
    use std::io;
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    fn hello() -> LogEvent {
        let ts = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        LogEvent::at(ts, Source::Stdout, Level::Info, "hello")
    }

    /// In-memory stream that can start failing on demand.
    #[derive(Clone, Default)]
    struct SharedBuffer {
        bytes: Arc<Mutex<Vec<u8>>>,
        broken: Arc<Mutex<bool>>,
        writes: Arc<Mutex<usize>>,
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if *self.broken.lock().unwrap() {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "stream closed"));
            }
            *self.writes.lock().unwrap() += 1;
            self.bytes.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            if *self.broken.lock().unwrap() {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "stream closed"));
            }
            Ok(())
        }
    }

    fn stream_sink(buffer: &SharedBuffer, format: LogFormat, policy: FlushPolicy) -> StructuredSink {
        StructuredSink::configure(SinkOptions {
            format,
            destination: Destination::writer("memory", buffer.clone()),
            flush_policy: policy,
        })
        .unwrap()
    }

    #[test]
    fn test_json_file_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jsonl");
        let mut sink = StructuredSink::configure(SinkOptions::json_file(&path)).unwrap();

        sink.write(&hello()).unwrap();
        sink.close().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "{\"timestamp\":\"2025-01-02T03:04:05.000000Z\",\"level\":\"INFO\",\"source\":\"STDOUT\",\"message\":\"hello\"}\n"
        );
    }

    #[test]
    fn test_logfmt_stream_scenario() {
        let buffer = SharedBuffer::default();
        let mut sink = stream_sink(&buffer, LogFormat::Logfmt, FlushPolicy::PerEvent);

        sink.write(&hello()).unwrap();

        let content = String::from_utf8(buffer.bytes.lock().unwrap().clone()).unwrap();
        assert_eq!(
            content,
            "ts=2025-01-02T03:04:05.000000Z level=INFO source=STDOUT msg=hello\n"
        );
    }

    #[test]
    fn test_file_is_appended_not_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("app.log");

        for _ in 0..2 {
            let mut sink = StructuredSink::configure(SinkOptions::json_file(&path)).unwrap();
            sink.write(&hello()).unwrap();
        }

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn test_buffered_policy_defers_until_flush() {
        let buffer = SharedBuffer::default();
        let mut sink = stream_sink(&buffer, LogFormat::Json, FlushPolicy::Buffered);

        sink.write(&hello()).unwrap();
        assert!(buffer.bytes.lock().unwrap().is_empty());

        sink.flush().unwrap();
        assert_eq!(buffer.bytes.lock().unwrap().iter().filter(|b| **b == b'\n').count(), 1);
    }

    #[test]
    fn test_each_record_is_one_write_call() {
        let buffer = SharedBuffer::default();
        let mut sink = stream_sink(&buffer, LogFormat::Json, FlushPolicy::PerEvent);

        let context = Context::new().with("payload", "x".repeat(100));
        for _ in 0..10 {
            sink.write(&hello().with_context(context.clone())).unwrap();
        }

        assert_eq!(*buffer.writes.lock().unwrap(), 10);
    }

    #[test]
    fn test_broken_stream_returns_sink_write_error() {
        let buffer = SharedBuffer::default();
        let mut sink = stream_sink(&buffer, LogFormat::Json, FlushPolicy::PerEvent);

        sink.write(&hello()).unwrap();
        *buffer.broken.lock().unwrap() = true;

        let error = sink.write(&hello()).unwrap_err();
        assert!(matches!(
            error,
            SinkWriteError::Write(_) | SinkWriteError::Flush(_)
        ));
    }

    #[test]
    fn test_write_after_close_fails() {
        let buffer = SharedBuffer::default();
        let mut sink = stream_sink(&buffer, LogFormat::Json, FlushPolicy::PerEvent);
        sink.close().unwrap();

        assert!(matches!(
            sink.write(&hello()),
            Err(SinkWriteError::Closed)
        ));
    }

    #[test]
    fn test_unwritable_directory_fails_to_open() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();

        let result = StructuredSink::configure(SinkOptions::json_file(blocker.join("app.log")));
        assert!(matches!(result, Err(SinkWriteError::Open { .. })));
    }

    #[test]
    fn test_concurrent_capture_into_json_file_decodes_line_by_line() {
        const THREADS: usize = 8;
        const PER_THREAD: usize = 200;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("concurrent.jsonl");
        let sink = StructuredSink::configure(SinkOptions::json_file(&path)).unwrap();
        let mut session = CaptureAdapter::new(Box::new(sink))
            .with_config(
                CaptureConfig::default()
                    .with_queue_capacity(THREADS * PER_THREAD)
                    .with_enqueue_timeout(Duration::from_secs(5)),
            )
            .install()
            .unwrap();

        let handles: Vec<_> = (0..THREADS)
            .map(|t| {
                let emitter = session.emitter();
                std::thread::spawn(move || {
                    for i in 0..PER_THREAD {
                        let context = Context::new().with("payload", "x".repeat(64));
                        emitter.on_log(Level::Info, &format!("worker {t} event {i}"), context);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        let report = session.uninstall();
        assert!(report.is_clean());
        assert_eq!(report.stats.written, (THREADS * PER_THREAD) as u64);

        let content = std::fs::read_to_string(&path).unwrap();
        let mut seen = HashSet::new();
        for line in content.lines() {
            let event = json::decode(line).unwrap();
            assert_eq!(event.level(), Level::Info);
            assert_eq!(event.source(), Source::Logger);
            assert!(seen.insert(event.message().to_string()));
        }
        assert_eq!(seen.len(), THREADS * PER_THREAD);
    }

    #[test]
    fn test_stream_breaking_mid_run_is_counted() {
        let buffer = SharedBuffer::default();
        let sink = stream_sink(&buffer, LogFormat::Json, FlushPolicy::PerEvent);
        let mut session = CaptureAdapter::new(Box::new(sink)).install().unwrap();

        for i in 0..5 {
            session.on_log(Level::Info, &format!("before {i}"), Context::new());
        }
        let deadline = Instant::now() + Duration::from_secs(5);
        while session.stats().written < 5 && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(session.stats().written, 5);

        *buffer.broken.lock().unwrap() = true;
        for i in 0..5 {
            session.on_log(Level::Warning, &format!("after {i}"), Context::new());
        }
        let report = session.uninstall();

        assert!(report.stats.sink_errors > 0);
        assert_eq!(report.stats.written, 5);
        assert!(report.stats.dropped_sink_error > 0);

        let content = String::from_utf8(buffer.bytes.lock().unwrap().clone()).unwrap();
        let messages: Vec<_> = content
            .lines()
            .map(|line| json::decode(line).unwrap().message().to_string())
            .collect();
        assert_eq!(messages, (0..5).map(|i| format!("before {i}")).collect::<Vec<_>>());
    }
}
