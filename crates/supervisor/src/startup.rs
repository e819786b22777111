//! Start-up supervision: the grace-window race.
//!
//! A freshly spawned worker is in a `Starting` state. It becomes
//! `Healthy` by surviving a fixed grace window with no exit and no
//! output I/O error, and `Failed` the moment either is observed first.
//! Training frameworks tend to fail fast (bad arguments, missing
//! dependency) but do so after the spawn itself succeeds, and the worker
//! offers no readiness handshake, so a bounded observation window is the
//! only way to tell "slow but alive" from "already dead".
//!
//! `Failed` is terminal and carries the exit code plus the full captured
//! log. `Healthy` is terminal too: ongoing liveness is the registry's
//! concern, not this module's.

use std::time::Duration;

use flhub_core::types::ProjectId;
use tokio::process::Child;

use crate::capture::{spawn_line_drain, OutputCapture};
use crate::error::SupervisorError;

/// How long to let the drain tasks settle after an observed exit, so the
/// failure log is complete before it is reported.
const DRAIN_SETTLE: Duration = Duration::from_secs(1);

/// Watch a freshly spawned worker through its grace window.
///
/// Returns the still-running child and its output capture on success.
/// The drain tasks keep running for the life of the process afterwards,
/// so worker output can never fill the pipe and stall the worker.
pub async fn await_startup(
    mut child: Child,
    project_id: ProjectId,
    grace: Duration,
) -> Result<(Child, OutputCapture), SupervisorError> {
    let capture = OutputCapture::new();

    let mut drains = Vec::with_capacity(2);
    if let Some(stdout) = child.stdout.take() {
        drains.push(spawn_line_drain(stdout, capture.clone(), project_id.to_string()));
    }
    if let Some(stderr) = child.stderr.take() {
        drains.push(spawn_line_drain(stderr, capture.clone(), project_id.to_string()));
    }

    // Drain tasks and the wait below run concurrently; a worker flooding
    // its output cannot delay the verdict.
    match tokio::time::timeout(grace, child.wait()).await {
        Ok(Ok(status)) => {
            // Exited inside the window. Let the drains reach EOF so the
            // log snapshot is complete.
            for drain in drains {
                let _ = tokio::time::timeout(DRAIN_SETTLE, drain).await;
            }
            let exit_code = status.code().unwrap_or(-1);
            tracing::error!(
                project_id = %project_id,
                exit_code,
                "Worker exited during start-up grace window",
            );
            Err(SupervisorError::StartupFailed {
                exit_code,
                log: capture.snapshot(),
            })
        }
        Ok(Err(e)) => {
            tracing::error!(project_id = %project_id, error = %e, "Failed to wait on worker");
            let _ = child.start_kill();
            Err(SupervisorError::StartupFailed {
                exit_code: -1,
                log: format!("{}wait error: {e}\n", capture.snapshot()),
            })
        }
        Err(_elapsed) => {
            if capture.io_error_seen() {
                // Alive but its output stream broke. Nothing will be
                // registered for it, so it must not be left running.
                tracing::error!(
                    project_id = %project_id,
                    "Worker output stream failed during start-up; killing process",
                );
                let _ = child.start_kill();
                return Err(SupervisorError::StartupFailed {
                    exit_code: -1,
                    log: capture.snapshot(),
                });
            }

            tracing::info!(project_id = %project_id, "Worker survived start-up grace window");
            Ok((child, capture))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
#[cfg(unix)]
mod tests {
    use super::*;
    use std::process::Stdio;
    use tokio::process::Command;

    /// Spawn `sh -c <script>` the way the launcher spawns workers.
    fn spawn_sh(script: &str) -> Child {
        Command::new("sh")
            .arg("-c")
            .arg(script)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .expect("spawn sh")
    }

    #[tokio::test]
    async fn exit_within_window_is_startup_failed() {
        let child = spawn_sh("echo 'missing dependency'; exit 1");

        let err = await_startup(child, ProjectId::new_v4(), Duration::from_millis(500))
            .await
            .unwrap_err();

        match err {
            SupervisorError::StartupFailed { exit_code, log } => {
                assert_eq!(exit_code, 1);
                assert!(log.contains("missing dependency"), "log was: {log:?}");
            }
            other => panic!("expected StartupFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn stderr_lands_in_the_combined_log() {
        let child = spawn_sh("echo out; echo err >&2; exit 2");

        let err = await_startup(child, ProjectId::new_v4(), Duration::from_millis(500))
            .await
            .unwrap_err();

        match err {
            SupervisorError::StartupFailed { exit_code, log } => {
                assert_eq!(exit_code, 2);
                assert!(log.contains("out"));
                assert!(log.contains("err"));
            }
            other => panic!("expected StartupFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn surviving_the_window_is_healthy() {
        let child = spawn_sh("echo listening; exec sleep 30");

        let (mut child, capture) =
            await_startup(child, ProjectId::new_v4(), Duration::from_millis(200))
                .await
                .unwrap();

        assert!(matches!(child.try_wait(), Ok(None)), "worker should be alive");
        assert!(capture.snapshot().contains("listening"));

        let _ = child.start_kill();
    }
}
