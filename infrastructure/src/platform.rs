//! Handles on the process's original output streams.
//!
//! On unix these are `dup`s of fd 1/2 taken at call time, so they keep
//! pointing at the real terminal or file even after a capture hook has
//! redirected the descriptors. Sinks and reporters grab theirs before
//! capture is installed.

use std::io::Write;

#[cfg(unix)]
pub(crate) fn duplicate_fd(fd: std::os::fd::RawFd) -> std::io::Result<std::os::fd::OwnedFd> {
    use std::os::fd::FromRawFd;

    // SAFETY: dup has no memory-safety preconditions; the result is checked
    // before ownership is taken.
    let duplicated = unsafe { libc::dup(fd) };
    if duplicated < 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(unsafe { std::os::fd::OwnedFd::from_raw_fd(duplicated) })
}

/// Writer on the original stdout.
pub fn original_stdout() -> std::io::Result<Box<dyn Write + Send>> {
    #[cfg(unix)]
    {
        let fd = duplicate_fd(libc::STDOUT_FILENO)?;
        Ok(Box::new(std::fs::File::from(fd)))
    }
    #[cfg(not(unix))]
    {
        Ok(Box::new(std::io::stdout()))
    }
}

/// Writer on the original stderr.
pub fn original_stderr() -> std::io::Result<Box<dyn Write + Send>> {
    #[cfg(unix)]
    {
        let fd = duplicate_fd(libc::STDERR_FILENO)?;
        Ok(Box::new(std::fs::File::from(fd)))
    }
    #[cfg(not(unix))]
    {
        Ok(Box::new(std::io::stderr()))
    }
}
