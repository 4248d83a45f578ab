//! Rate-limited fallback reporter on the original stderr.
//!
//! Under a persistent failure (disk full, closed pipe) the writer reports
//! once per event. This reporter prints at most one line per interval and
//! folds the rest into a suppressed count on the next printed line.

use crate::platform;
use livelog_application::ErrorReporter;
use std::io::Write;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Default minimum interval between printed reports.
pub const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_secs(1);

/// Prefix on every reported line.
const PREFIX: &str = "livelog";

/// [`ErrorReporter`] writing `livelog: <message>` lines.
pub struct StderrReporter {
    out: Mutex<Box<dyn Write + Send>>,
    min_interval: Duration,
    last_report: Mutex<Option<Instant>>,
    suppressed: AtomicU64,
    total: AtomicU64,
}

impl StderrReporter {
    /// Report to the process's original stderr.
    ///
    /// Build this before installing a stream hook so the handle is not
    /// redirected along with fd 2.
    pub fn new() -> std::io::Result<Self> {
        Ok(Self::with_writer(platform::original_stderr()?))
    }

    pub fn with_writer(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
            min_interval: DEFAULT_REPORT_INTERVAL,
            last_report: Mutex::new(None),
            suppressed: AtomicU64::new(0),
            total: AtomicU64::new(0),
        }
    }

    pub fn with_interval(mut self, min_interval: Duration) -> Self {
        self.min_interval = min_interval;
        self
    }

    /// Reports received, printed or not.
    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    fn should_print(&self) -> bool {
        let Ok(mut last) = self.last_report.lock() else {
            return false;
        };
        let now = Instant::now();
        match *last {
            Some(at) if now.duration_since(at) < self.min_interval => false,
            _ => {
                *last = Some(now);
                true
            }
        }
    }
}

impl ErrorReporter for StderrReporter {
    fn report(&self, message: &str) {
        self.total.fetch_add(1, Ordering::Relaxed);

        if !self.should_print() {
            self.suppressed.fetch_add(1, Ordering::Relaxed);
            return;
        }

        let suppressed = self.suppressed.swap(0, Ordering::Relaxed);
        let line = if suppressed > 0 {
            format!(
                "{}: {} ({} similar reports suppressed)\n",
                PREFIX, message, suppressed
            )
        } else {
            format!("{}: {}\n", PREFIX, message)
        };

        if let Ok(mut out) = self.out.lock() {
            let _ = out.write_all(line.as_bytes());
            let _ = out.flush();
        }
    }
}
