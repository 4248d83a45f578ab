//! The single writer that drains the capture queue into the sink.

use super::emitter::Shared;
use crate::ports::event_sink::EventSink;
use crossbeam::channel::{Receiver, RecvTimeoutError, Sender};
use livelog_domain::LogEvent;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::debug;

/// How long the writer waits for an event before treating the queue as idle.
///
/// Idle is when buffered sinks get flushed and when a closed session is
/// noticed.
const IDLE_INTERVAL: Duration = Duration::from_millis(50);

pub(crate) fn spawn_writer(
    mut sink: Box<dyn EventSink>,
    rx: Receiver<LogEvent>,
    shared: Arc<Shared>,
    done_tx: Sender<()>,
) -> std::io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("livelog-writer".to_string())
        .spawn(move || {
            run(sink.as_mut(), &rx, &shared);

            if let Err(e) = sink.close() {
                shared.counters.record_flush_failure();
                shared
                    .reporter
                    .report(&format!("failed to close {}: {}", sink.describe(), e));
            }
            let _ = done_tx.send(());
        })
}

fn run(sink: &mut dyn EventSink, rx: &Receiver<LogEvent>, shared: &Shared) {
    let mut unflushed = false;

    loop {
        if shared.is_aborted() {
            debug!("writer aborted with {} events queued", rx.len());
            return;
        }

        match rx.recv_timeout(IDLE_INTERVAL) {
            Ok(event) => {
                write_one(sink, &event, shared);
                unflushed = true;
                if shared.is_closed() && rx.is_empty() {
                    return;
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                if unflushed {
                    flush(sink, shared);
                    unflushed = false;
                }
                if shared.is_closed() && rx.is_empty() {
                    return;
                }
            }
            Err(RecvTimeoutError::Disconnected) => return,
        }
    }
}

fn write_one(sink: &mut dyn EventSink, event: &LogEvent, shared: &Shared) {
    match sink.write(event) {
        Ok(()) => shared.counters.record_written(),
        Err(e) => {
            // Reporter only: tracing output may itself be captured.
            shared.counters.record_write_failure();
            shared
                .reporter
                .report(&format!("write to {} failed, event dropped: {}", sink.describe(), e));
        }
    }
}

fn flush(sink: &mut dyn EventSink, shared: &Shared) {
    if let Err(e) = sink.flush() {
        shared.counters.record_flush_failure();
        shared
            .reporter
            .report(&format!("flush of {} failed: {}", sink.describe(), e));
    }
}
