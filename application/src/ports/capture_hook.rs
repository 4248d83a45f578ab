//! Port for host-specific capture sources.
//!
//! A [`CaptureHook`] is the capability interface between a capture session
//! and whatever the host offers for interception: redirectable file
//! descriptors, a logging-framework registration point, a child process's
//! pipes. The session hands each hook a [`TextEmitter`] on attach; the hook
//! calls `on_text`/`on_log` on it and never sees the sink.
//!
//! # Lifecycle
//!
//! ```text
//! CaptureAdapter::install()
//!        ↓
//! hook.attach(emitter)   (in registration order)
//!        ↓
//!   ... host output flows through emitter ...
//!        ↓
//! CaptureSession::uninstall()
//!        ↓
//! hook.detach()          (reverse order; pending text flushed first)
//! ```

use crate::use_cases::capture::TextEmitter;
use thiserror::Error;

/// Errors raised while installing a capture session.
#[derive(Error, Debug)]
pub enum CaptureError {
    /// The hook's interception point is already owned by another session.
    #[error("Capture hook '{hook}' is already installed by another session")]
    AlreadyInstalled { hook: &'static str },

    #[error("Failed to redirect output streams: {0}")]
    Redirect(#[from] std::io::Error),

    #[error("Failed to start writer thread: {0}")]
    WriterSpawn(#[source] std::io::Error),
}

impl CaptureError {
    pub fn is_already_installed(&self) -> bool {
        matches!(self, CaptureError::AlreadyInstalled { .. })
    }
}

/// Host capability for intercepting output.
pub trait CaptureHook: Send {
    /// Stable name used in errors and diagnostics.
    fn name(&self) -> &'static str;

    /// Start forwarding host output to `emitter`.
    ///
    /// Must either fully attach or leave the host untouched.
    fn attach(&mut self, emitter: TextEmitter) -> Result<(), CaptureError>;

    /// Restore the host's original state. Called at most once per successful
    /// attach; text still in flight must be emitted before returning.
    fn detach(&mut self) -> Result<(), CaptureError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_installed_display() {
        let error = CaptureError::AlreadyInstalled { hook: "std-streams" };
        assert_eq!(
            error.to_string(),
            "Capture hook 'std-streams' is already installed by another session"
        );
        assert!(error.is_already_installed());
    }

    #[test]
    fn test_io_error_converts_to_redirect() {
        let error: CaptureError = std::io::Error::other("dup2 failed").into();
        assert!(matches!(error, CaptureError::Redirect(_)));
        assert!(!error.is_already_installed());
    }
}
