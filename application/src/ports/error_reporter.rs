//! Port for the fallback error channel.
//!
//! Capture failures (sink errors, queue overflow, shutdown timeouts) must not
//! surface at the producer's call site. They are handed to an
//! [`ErrorReporter`] instead, which writes somewhere the capture machinery is
//! not watching, typically the original unwrapped stderr.

/// Fallback channel for capture-side failures.
///
/// `report` is synchronous and non-fallible; implementations swallow their
/// own I/O errors.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, message: &str);
}

/// No-op implementation for tests and embedded use.
pub struct NoErrorReporter;

impl ErrorReporter for NoErrorReporter {
    fn report(&self, _message: &str) {}
}
