//! Capturing a child process or standard input.
//!
//! Each output pipe is pumped line by line (or read by read in `WholeChunk`
//! mode): the raw bytes are optionally
//! written through to this process's matching stream, then handed to the
//! capture session as stream text.

use anyhow::{Context, Result, anyhow};
use livelog_application::TextEmitter;
use livelog_domain::{LineSplit, Source};
use std::process::{ExitStatus, Stdio};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Run `command` to completion, capturing both output streams.
///
/// Returns the exit code to mirror. On cancellation the child is killed.
pub async fn run_child(
    command: &[String],
    emitter: TextEmitter,
    tee: bool,
    cancel: CancellationToken,
) -> Result<i32> {
    let (program, args) = command
        .split_first()
        .ok_or_else(|| anyhow!("no command given"))?;

    debug!("Spawning child: {} {:?}", program, args);

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("failed to start `{}`", program))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow!("failed to capture child stdout"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| anyhow!("failed to capture child stderr"))?;

    let out_task = tokio::spawn(pump(
        stdout,
        Source::Stdout,
        emitter.clone(),
        tee.then(tokio::io::stdout),
    ));
    let err_task = tokio::spawn(pump(
        stderr,
        Source::Stderr,
        emitter,
        tee.then(tokio::io::stderr),
    ));

    let status = tokio::select! {
        status = child.wait() => status?,
        _ = cancel.cancelled() => {
            warn!("Interrupted, stopping child process");
            child.start_kill()?;
            child.wait().await?
        }
    };

    // Pipes reach EOF once the child (and anything it spawned) is gone.
    for task in [out_task, err_task] {
        match task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Reading child output failed: {}", e),
            Err(e) => warn!("Output reader task failed: {}", e),
        }
    }

    let code = exit_code(status);
    info!("Child exited with code {}", code);
    Ok(code)
}

/// Capture standard input as STDOUT text until EOF or cancellation.
pub async fn capture_stdin(emitter: TextEmitter, tee: bool, cancel: CancellationToken) -> Result<()> {
    let stdin = tokio::io::stdin();
    tokio::select! {
        result = pump(stdin, Source::Stdout, emitter, tee.then(tokio::io::stdout)) => {
            result.context("failed to read standard input")
        }
        _ = cancel.cancelled() => {
            warn!("Interrupted, stopping stdin capture");
            Ok(())
        }
    }
}

/// Forward `reader` until EOF, by line or in `WholeChunk` mode one event
/// per read.
pub async fn pump<R, W>(
    reader: R,
    source: Source,
    emitter: TextEmitter,
    mut tee: Option<W>,
) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let whole_chunk = emitter.line_split() == LineSplit::WholeChunk;
    let mut reader = BufReader::new(reader);
    let mut line = Vec::with_capacity(256);
    loop {
        line.clear();
        let n = if whole_chunk {
            let chunk = reader.fill_buf().await?;
            line.extend_from_slice(chunk);
            let n = chunk.len();
            reader.consume(n);
            n
        } else {
            reader.read_until(b'\n', &mut line).await?
        };
        if n == 0 {
            break;
        }
        // A closed terminal must not stop capture.
        if let Some(out) = tee.as_mut()
            && out.write_all(&line).await.is_ok()
        {
            let _ = out.flush().await;
        }
        emitter.on_bytes(source, &line);
    }
    Ok(())
}

fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}
