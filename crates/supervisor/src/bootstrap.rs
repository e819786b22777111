//! One-shot model bootstrap.
//!
//! Produces the model artifact a training worker is later launched with.
//! Unlike a worker start there is no grace-window ambiguity: the process
//! is expected to terminate on its own, and success is exit code zero.
//! The bootstrap for a project must complete before the first worker
//! launch for that project; the service layer enforces that ordering.

use std::process::Stdio;

use tokio::process::Command;

use crate::capture::{spawn_line_drain, OutputCapture};
use crate::config::SupervisorConfig;
use crate::error::SupervisorError;

/// Arguments for one bootstrap run.
#[derive(Debug, Clone)]
pub struct BootstrapRequest {
    pub model_type: String,
    /// Where the artifact is written; the worker is later launched with
    /// this same path.
    pub output_path: String,
    /// Epochs of server-side pretraining baked into the artifact. Zero
    /// means an untrained initial model.
    pub pretrain_epochs: u32,
}

/// Build the bootstrap argument vector.
///
/// Contract (ordered): `--model <type> --out <path> --pretrain-epochs <n>`.
pub fn bootstrap_args(request: &BootstrapRequest) -> Vec<String> {
    vec![
        "--model".to_string(),
        request.model_type.clone(),
        "--out".to_string(),
        request.output_path.clone(),
        "--pretrain-epochs".to_string(),
        request.pretrain_epochs.to_string(),
    ]
}

/// Run the bootstrap process to completion.
///
/// Long-running: awaits the child's exit with no timeout. Callers must
/// not hold registry locks across this call. Output is drained into one
/// combined log; a non-zero exit surfaces as
/// [`SupervisorError::BootstrapFailed`] carrying that exit code and the
/// full log.
pub async fn bootstrap_model(
    config: &SupervisorConfig,
    request: &BootstrapRequest,
) -> Result<(), SupervisorError> {
    tracing::info!(
        command = %config.bootstrap_command.display(),
        model_type = %request.model_type,
        output_path = %request.output_path,
        pretrain_epochs = request.pretrain_epochs,
        "Starting model bootstrap",
    );

    let mut child = Command::new(&config.bootstrap_command)
        .args(bootstrap_args(request))
        .current_dir(&config.working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(SupervisorError::SpawnFailed)?;

    let capture = OutputCapture::new();
    let mut drains = Vec::with_capacity(2);
    if let Some(stdout) = child.stdout.take() {
        drains.push(spawn_line_drain(stdout, capture.clone(), "bootstrap".to_string()));
    }
    if let Some(stderr) = child.stderr.take() {
        drains.push(spawn_line_drain(stderr, capture.clone(), "bootstrap".to_string()));
    }

    let status = child.wait().await.map_err(|e| SupervisorError::BootstrapFailed {
        exit_code: -1,
        log: format!("{}wait error: {e}\n", capture.snapshot()),
    })?;

    // The pipes are closed now; let the drains flush the tail of the log.
    for drain in drains {
        let _ = drain.await;
    }

    if status.success() {
        tracing::info!(output_path = %request.output_path, "Model bootstrap complete");
        Ok(())
    } else {
        let exit_code = status.code().unwrap_or(-1);
        tracing::error!(exit_code, "Model bootstrap failed");
        Err(SupervisorError::BootstrapFailed {
            exit_code,
            log: capture.snapshot(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
