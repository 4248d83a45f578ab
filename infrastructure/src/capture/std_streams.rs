//! Process-level stdout/stderr capture.
//!
//! Redirects file descriptor 1 and/or 2 into a pipe and runs one reader
//! thread per stream. Every line (or every read, in `WholeChunk` mode) is
//! optionally written through to the original descriptor (tee) and
//! forwarded to the session as stream text.
//! Because the redirect happens at the descriptor level, output from
//! `println!`, `std::io::stdout()`, C libraries and inherited child
//! processes is all seen.

use crate::platform::duplicate_fd;
use crossbeam::channel::{Receiver, bounded};
use livelog_application::{CaptureError, CaptureHook, TextEmitter};
use livelog_domain::{LineSplit, Source};
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Write};
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, warn};

/// Only one session per process may own fd 1/2.
static STD_STREAMS_CLAIMED: AtomicBool = AtomicBool::new(false);

const HOOK_NAME: &str = "std-streams";

/// How long detach waits for a reader to reach end of pipe.
const DEFAULT_READER_TIMEOUT: Duration = Duration::from_secs(2);

/// One redirected descriptor.
struct Redirect {
    target: RawFd,
    original: OwnedFd,
    done_rx: Receiver<()>,
    reader: Option<JoinHandle<()>>,
}

/// Capture hook for the process's standard output streams.
pub struct StdStreamHook {
    capture_stdout: bool,
    capture_stderr: bool,
    tee: bool,
    reader_timeout: Duration,
    redirects: Vec<Redirect>,
    claimed: bool,
}

impl Default for StdStreamHook {
    fn default() -> Self {
        Self::new()
    }
}

impl StdStreamHook {
    /// Capture both streams, teeing to the originals.
    pub fn new() -> Self {
        Self {
            capture_stdout: true,
            capture_stderr: true,
            tee: true,
            reader_timeout: DEFAULT_READER_TIMEOUT,
            redirects: Vec::new(),
            claimed: false,
        }
    }

    pub fn stdout_only() -> Self {
        let mut hook = Self::new();
        hook.capture_stderr = false;
        hook
    }

    pub fn stderr_only() -> Self {
        let mut hook = Self::new();
        hook.capture_stdout = false;
        hook
    }

    /// Whether captured text is also written to the original stream.
    pub fn with_tee(mut self, tee: bool) -> Self {
        self.tee = tee;
        self
    }

    pub fn with_reader_timeout(mut self, timeout: Duration) -> Self {
        self.reader_timeout = timeout;
        self
    }

    fn redirect(&self, source: Source, emitter: TextEmitter) -> Result<Redirect, CaptureError> {
        let target = match source {
            Source::Stderr => libc::STDERR_FILENO,
            _ => libc::STDOUT_FILENO,
        };

        flush_std_streams();
        let original = duplicate_fd(target)?;
        let tee = if self.tee {
            Some(File::from(original.try_clone()?))
        } else {
            None
        };

        let (read_end, write_end) = pipe()?;
        dup2(write_end.as_raw_fd(), target)?;
        // fd `target` now holds the only write end.
        drop(write_end);

        let (done_tx, done_rx) = bounded(1);
        let spawned = std::thread::Builder::new()
            .name(format!("livelog-{}-reader", source.as_str().to_lowercase()))
            .spawn(move || {
                relay(File::from(read_end), source, tee, &emitter);
                let _ = done_tx.send(());
            });

        match spawned {
            Ok(reader) => Ok(Redirect {
                target,
                original,
                done_rx,
                reader: Some(reader),
            }),
            Err(e) => {
                let _ = dup2(original.as_raw_fd(), target);
                Err(CaptureError::Redirect(e))
            }
        }
    }

    fn restore(&self, redirect: &mut Redirect) -> std::io::Result<()> {
        flush_std_streams();
        // Replacing the pipe's write end closes it; the reader sees EOF
        // once it has consumed everything already written.
        let restored = dup2(redirect.original.as_raw_fd(), redirect.target);

        match redirect.done_rx.recv_timeout(self.reader_timeout) {
            Ok(()) => {
                if let Some(reader) = redirect.reader.take() {
                    let _ = reader.join();
                }
            }
            Err(_) => {
                // A child process still holding the write end keeps the
                // reader alive; leave it detached.
                warn!(
                    target: "livelog::capture",
                    fd = redirect.target,
                    "stream reader did not finish before timeout"
                );
            }
        }
        restored
    }

    fn release(&mut self) {
        if self.claimed {
            STD_STREAMS_CLAIMED.store(false, Ordering::SeqCst);
            self.claimed = false;
        }
    }
}

impl CaptureHook for StdStreamHook {
    fn name(&self) -> &'static str {
        HOOK_NAME
    }

    fn attach(&mut self, emitter: TextEmitter) -> Result<(), CaptureError> {
        if STD_STREAMS_CLAIMED
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(CaptureError::AlreadyInstalled { hook: HOOK_NAME });
        }
        self.claimed = true;

        let mut sources = Vec::with_capacity(2);
        if self.capture_stdout {
            sources.push(Source::Stdout);
        }
        if self.capture_stderr {
            sources.push(Source::Stderr);
        }

        for source in sources {
            match self.redirect(source, emitter.clone()) {
                Ok(redirect) => self.redirects.push(redirect),
                Err(e) => {
                    let _ = self.detach();
                    return Err(e);
                }
            }
        }

        debug!(
            target: "livelog::capture",
            streams = self.redirects.len(),
            tee = self.tee,
            "standard streams redirected"
        );
        Ok(())
    }

    fn detach(&mut self) -> Result<(), CaptureError> {
        let mut first_error = None;
        while let Some(mut redirect) = self.redirects.pop() {
            if let Err(e) = self.restore(&mut redirect)
                && first_error.is_none()
            {
                first_error = Some(e);
            }
        }
        self.release();

        match first_error {
            Some(e) => Err(CaptureError::Redirect(e)),
            None => Ok(()),
        }
    }
}

impl Drop for StdStreamHook {
    fn drop(&mut self) {
        if !self.redirects.is_empty() {
            let _ = self.detach();
        }
    }
}

/// Relay a pipe until EOF: by line, or in `WholeChunk` mode one event per
/// read so a multi-line write stays together.
fn relay<R: Read, W: Write>(pipe: R, source: Source, mut tee: Option<W>, emitter: &TextEmitter) {
    let mut reader = BufReader::new(pipe);
    let mut line = Vec::with_capacity(256);
    loop {
        line.clear();
        let read = match emitter.line_split() {
            LineSplit::PerLine => reader.read_until(b'\n', &mut line),
            LineSplit::WholeChunk => reader.fill_buf().map(|chunk| {
                line.extend_from_slice(chunk);
                chunk.len()
            }),
        };
        match read {
            Ok(0) => break,
            Ok(n) => {
                if emitter.line_split() == LineSplit::WholeChunk {
                    reader.consume(n);
                }
                if let Some(out) = tee.as_mut() {
                    let _ = out.write_all(&line);
                }
                emitter.on_bytes(source, &line);
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(_) => break,
        }
    }
}

fn flush_std_streams() {
    let _ = std::io::stdout().flush();
    let _ = std::io::stderr().flush();
}

fn pipe() -> std::io::Result<(OwnedFd, OwnedFd)> {
    let mut fds: [libc::c_int; 2] = [-1, -1];
    // SAFETY: `fds` has room for the two descriptors pipe writes.
    if unsafe { libc::pipe(fds.as_mut_ptr()) } != 0 {
        return Err(std::io::Error::last_os_error());
    }
    // SAFETY: pipe succeeded, both descriptors are open and owned by us.
    let (read_end, write_end) =
        unsafe { (OwnedFd::from_raw_fd(fds[0]), OwnedFd::from_raw_fd(fds[1])) };
    set_cloexec(read_end.as_raw_fd())?;
    set_cloexec(write_end.as_raw_fd())?;
    Ok((read_end, write_end))
}

fn set_cloexec(fd: RawFd) -> std::io::Result<()> {
    // SAFETY: fcntl on a descriptor we own.
    let flags = unsafe { libc::fcntl(fd, libc::F_GETFD) };
    if flags < 0 || unsafe { libc::fcntl(fd, libc::F_SETFD, flags | libc::FD_CLOEXEC) } < 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(())
}

fn dup2(src: RawFd, dst: RawFd) -> std::io::Result<()> {
    loop {
        // SAFETY: both descriptors are valid for the duration of the call.
        if unsafe { libc::dup2(src, dst) } >= 0 {
            return Ok(());
        }
        let error = std::io::Error::last_os_error();
        if error.kind() != std::io::ErrorKind::Interrupted {
            return Err(error);
        }
    }
}
