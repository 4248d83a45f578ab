//! Logging-framework capture via a `tracing` layer.
//!
//! [`capture_layer`] returns two halves sharing one slot: the
//! [`CaptureLayer`] is registered on the subscriber once, at startup; the
//! [`TracingHook`] is handed to a [`CaptureAdapter`](livelog_application::CaptureAdapter)
//! and fills the slot on attach. While the slot is empty the layer is a
//! no-op, so it can stay registered across sessions.

use livelog_application::{CaptureError, CaptureHook, TextEmitter};
use livelog_domain::{Context, ContextValue, Level as EventLevel};
use std::fmt;
use std::sync::{Arc, RwLock};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context as LayerContext, Layer};

const HOOK_NAME: &str = "tracing";

/// Events from these targets are never captured; they describe the capture
/// machinery itself and would feed back into the sink.
const IGNORED_TARGET_PREFIX: &str = "livelog";

type Slot = Arc<RwLock<Option<TextEmitter>>>;

/// Create a connected layer/hook pair.
pub fn capture_layer() -> (CaptureLayer, TracingHook) {
    let slot: Slot = Arc::new(RwLock::new(None));
    (
        CaptureLayer {
            slot: Arc::clone(&slot),
        },
        TracingHook { slot, attached: false },
    )
}

/// Map a `tracing` level onto the event level scale.
pub fn map_level(level: &Level) -> EventLevel {
    match *level {
        Level::ERROR => EventLevel::Error,
        Level::WARN => EventLevel::Warning,
        Level::INFO => EventLevel::Info,
        Level::DEBUG | Level::TRACE => EventLevel::Debug,
    }
}

/// Subscriber layer forwarding events to the attached session.
pub struct CaptureLayer {
    slot: Slot,
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: LayerContext<'_, S>) {
        let metadata = event.metadata();
        if metadata.target().starts_with(IGNORED_TARGET_PREFIX) {
            return;
        }

        // Clone out so the lock is not held across the enqueue.
        let emitter = match self.slot.read() {
            Ok(slot) => match slot.as_ref() {
                Some(emitter) => emitter.clone(),
                None => return,
            },
            Err(_) => return,
        };

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let mut context = visitor.context;
        let _ = context.insert("logger", metadata.target());
        if let Some(file) = metadata.file() {
            let _ = context.insert("file", file);
        }
        if let Some(line) = metadata.line() {
            let _ = context.insert("line", line);
        }

        emitter.on_log(map_level(metadata.level()), &visitor.message, context);
    }
}

/// Hook side of the pair.
pub struct TracingHook {
    slot: Slot,
    attached: bool,
}

impl CaptureHook for TracingHook {
    fn name(&self) -> &'static str {
        HOOK_NAME
    }

    fn attach(&mut self, emitter: TextEmitter) -> Result<(), CaptureError> {
        let mut slot = self
            .slot
            .write()
            .map_err(|_| CaptureError::AlreadyInstalled { hook: HOOK_NAME })?;
        if slot.is_some() {
            return Err(CaptureError::AlreadyInstalled { hook: HOOK_NAME });
        }
        *slot = Some(emitter);
        self.attached = true;
        Ok(())
    }

    fn detach(&mut self) -> Result<(), CaptureError> {
        if !self.attached {
            return Ok(());
        }
        if let Ok(mut slot) = self.slot.write() {
            *slot = None;
        }
        self.attached = false;
        Ok(())
    }
}

impl TracingHook {
    /// Another hook handle on the same layer, for a later session.
    pub fn handle(&self) -> TracingHook {
        TracingHook {
            slot: Arc::clone(&self.slot),
            attached: false,
        }
    }
}

/// Collects the `message` field and scalar fields of an event.
#[derive(Default)]
struct FieldVisitor {
    message: String,
    context: Context,
}

impl FieldVisitor {
    fn put(&mut self, field: &Field, value: impl Into<ContextValue>) {
        let name = field.name();
        if Context::is_reserved(name) {
            let _ = self.context.insert(format!("field_{}", name), value);
        } else {
            let _ = self.context.insert(name, value);
        }
    }
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.put(field, value);
        }
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, value);
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, value);
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, value);
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.put(field, value);
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.put(field, format!("{:?}", value));
        }
    }
}
