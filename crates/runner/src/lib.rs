#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Supervised subprocess execution for the launchpad build pipeline
//!
//! Spawns exactly one OS subprocess per invocation with a sanitized
//! environment, captures combined output up to a byte cap, and enforces a
//! self-imposed timeout by force-terminating the child. Failures of any kind
//! (spawn errors, non-zero exits, timeouts) normalize into a
//! [`ProcessOutcome`] with `success = false`; nothing escapes this boundary
//! as an error, so callers treat the returned outcome as the only failure
//! signal.

mod env;
mod invocation;
mod outcome;

pub use env::sanitized_env;
pub use invocation::ProcessInvocation;
pub use outcome::ProcessOutcome;

use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

/// Execute one supervised subprocess to completion.
///
/// The child inherits nothing from the caller's environment beyond the
/// sanitized allowlist plus the invocation's overrides. Output beyond the
/// invocation's byte cap is drained and discarded rather than failing the
/// run. On timeout the child is killed and the outcome carries the
/// forced-termination marker.
pub async fn run(invocation: &ProcessInvocation) -> ProcessOutcome {
    let cmd_display = invocation.display_command();

    let mut command = Command::new(invocation.program());
    command
        .args(invocation.args())
        .current_dir(invocation.cwd())
        .env_clear()
        .envs(sanitized_env(invocation.env_overrides()))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(err) => {
            tracing::debug!(command = %cmd_display, error = %err, "spawn failed");
            return ProcessOutcome::spawn_failure(&cmd_display, &err);
        }
    };

    // Readers run concurrently with the wait so a chatty child never blocks
    // on a full pipe.
    let cap = invocation.max_output_bytes();
    let stdout_task = child.stdout.take().map(|r| tokio::spawn(read_capped(r, cap)));
    let stderr_task = child.stderr.take().map(|r| tokio::spawn(read_capped(r, cap)));

    let waited = tokio::time::timeout(invocation.timeout(), child.wait()).await;

    let (status, timed_out) = match waited {
        Ok(Ok(status)) => (Some(status), false),
        Ok(Err(err)) => {
            tracing::debug!(command = %cmd_display, error = %err, "wait failed");
            (None, false)
        }
        Err(_) => {
            // Self-enforced timeout: kill and reap so the readers see EOF.
            let _ = child.start_kill();
            let _ = child.wait().await;
            (None, true)
        }
    };

    // A killed child can leave grandchildren holding the pipes open, so the
    // post-kill drain is bounded instead of waiting for EOF forever.
    let grace = timed_out.then(|| Duration::from_secs(5));
    let stdout = collect_stream(stdout_task, grace).await;
    let stderr = collect_stream(stderr_task, grace).await;

    let exit_code = status.and_then(|s| s.code());
    let success = !timed_out && status.is_some_and(|s| s.success());

    let error = if timed_out {
        Some(format!(
            "{cmd_display} timeout after {}s: process killed",
            invocation.timeout().as_secs()
        ))
    } else if success {
        None
    } else {
        Some(format!("{cmd_display} exited with code {exit_code:?}"))
    };

    ProcessOutcome {
        success,
        exit_code,
        stdout,
        stderr,
        timed_out,
        error,
    }
}

/// Read a stream to EOF, retaining at most `cap` bytes.
///
/// The stream is always drained fully so the child can make progress even
/// after the cap is reached.
async fn read_capped<R: AsyncRead + Unpin>(mut reader: R, cap: usize) -> String {
    let mut retained = Vec::new();
    let mut chunk = [0u8; 8192];
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                if retained.len() < cap {
                    let take = n.min(cap - retained.len());
                    retained.extend_from_slice(&chunk[..take]);
                }
            }
        }
    }
    String::from_utf8_lossy(&retained).into_owned()
}

async fn collect_stream(
    task: Option<tokio::task::JoinHandle<String>>,
    grace: Option<Duration>,
) -> String {
    let Some(mut handle) = task else {
        return String::new();
    };
    match grace {
        None => handle.await.unwrap_or_default(),
        Some(grace) => match tokio::time::timeout(grace, &mut handle).await {
            Ok(result) => result.unwrap_or_default(),
            Err(_) => {
                handle.abort();
                String::new()
            }
        },
    }
}
