//! Fallback error channel.
//!
//! Provides [`StderrReporter`], the rate-limited implementation of the
//! [`ErrorReporter`](livelog_application::ErrorReporter) port.

mod stderr_reporter;

pub use stderr_reporter::{DEFAULT_REPORT_INTERVAL, StderrReporter};
