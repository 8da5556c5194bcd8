//! Process execution with captured output.

use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{debug, warn};

use binwrap_core::{BinWrapError, BinWrapResult, RunOutput};

/// Persistent arguments first, then the ones given for this call.
pub fn compose_args<S: AsRef<str>>(persistent: &[String], extra: &[S]) -> Vec<String> {
    persistent
        .iter()
        .cloned()
        .chain(extra.iter().map(|a| a.as_ref().to_owned()))
        .collect()
}

/// Run `path` with `args`, capturing stdout and stderr in full.
///
/// Fails with `ProcessStart` when the process cannot be spawned and with
/// `ProcessExit` (carrying the captured output) when it exits unsuccessfully.
/// Read errors on the output pipes are logged and leave that buffer partial.
pub async fn execute(path: &Path, args: &[String]) -> BinWrapResult<RunOutput> {
    debug!(path = %path.display(), ?args, "Spawning wrapped binary");

    let mut child = Command::new(path)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| BinWrapError::ProcessStart {
            path: path.to_path_buf(),
            source,
        })?;

    // Drain both pipes together so a full stderr buffer cannot stall stdout.
    let (stdout, stderr) = tokio::join!(
        capture(child.stdout.take(), "stdout"),
        capture(child.stderr.take(), "stderr"),
    );

    let status = child
        .wait()
        .await
        .map_err(|source| BinWrapError::ProcessStart {
            path: path.to_path_buf(),
            source,
        })?;

    let output = RunOutput {
        status,
        stdout,
        stderr,
    };

    debug!(path = %path.display(), %status, "Wrapped binary exited");

    if output.success() {
        Ok(output)
    } else {
        Err(BinWrapError::ProcessExit {
            path: path.to_path_buf(),
            output,
        })
    }
}

async fn capture<R: AsyncRead + Unpin>(stream: Option<R>, name: &str) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut stream) = stream {
        if let Err(e) = stream.read_to_end(&mut buf).await {
            warn!(stream = name, error = %e, "Failed to capture output");
        }
    }
    buf
}
