//! Worker process launching.
//!
//! Builds the external worker invocation with its fixed, ordered argument
//! contract and spawns it with both output streams piped for capture. The
//! working directory is pinned to the configured service root so relative
//! paths inside the external script resolve consistently.

use std::process::Stdio;

use flhub_core::types::ProjectId;
use tokio::process::{Child, Command};

use crate::config::SupervisorConfig;
use crate::error::SupervisorError;

/// Everything a worker launch needs besides the port, which is allocated
/// at launch time by the registry.
#[derive(Debug, Clone)]
pub struct WorkerLaunchSpec {
    pub project_id: ProjectId,
    /// Filesystem path of the bootstrapped model artifact the worker
    /// loads its initial weights from.
    pub model_path: String,
    /// Present when the artifact was already produced by a bootstrap run,
    /// telling the worker not to pretrain again.
    pub skip_pretrain: bool,
}

/// Build the worker's argument vector.
///
/// Contract (ordered): `--project-id <uuid> --model-path <path>
/// --port <port>`, plus a trailing `--skip-pretrain` flag when
/// [`WorkerLaunchSpec::skip_pretrain`] is set.
pub fn worker_args(spec: &WorkerLaunchSpec, port: u16) -> Vec<String> {
    let mut args = vec![
        "--project-id".to_string(),
        spec.project_id.to_string(),
        "--model-path".to_string(),
        spec.model_path.clone(),
        "--port".to_string(),
        port.to_string(),
    ];
    if spec.skip_pretrain {
        args.push("--skip-pretrain".to_string());
    }
    args
}

/// Spawn the worker process.
///
/// Fails immediately with [`SupervisorError::SpawnFailed`] when the
/// executable is missing or not runnable; there is no retry. The returned
/// child has stdout and stderr piped and is killed if its handle is
/// dropped before being waited on.
pub fn launch_worker(
    config: &SupervisorConfig,
    spec: &WorkerLaunchSpec,
    port: u16,
) -> Result<Child, SupervisorError> {
    let args = worker_args(spec, port);

    tracing::info!(
        project_id = %spec.project_id,
        command = %config.worker_command.display(),
        port,
        "Launching training worker",
    );

    Command::new(&config.worker_command)
        .args(&args)
        .current_dir(&config.working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(SupervisorError::SpawnFailed)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn spec(skip_pretrain: bool) -> WorkerLaunchSpec {
        WorkerLaunchSpec {
            project_id: ProjectId::new_v4(),
            model_path: "/data/models/abc.npz".to_string(),
            skip_pretrain,
        }
    }

    #[test]
    fn args_follow_the_ordered_contract() {
        let spec = spec(false);
        let args = worker_args(&spec, 8081);

        assert_eq!(args[0], "--project-id");
        assert_eq!(args[1], spec.project_id.to_string());
        assert_eq!(args[2], "--model-path");
        assert_eq!(args[3], "/data/models/abc.npz");
        assert_eq!(args[4], "--port");
        assert_eq!(args[5], "8081");
        assert_eq!(args.len(), 6);
    }

    #[test]
    fn skip_pretrain_appends_trailing_flag() {
        let args = worker_args(&spec(true), 8081);
        assert_eq!(args.last().map(String::as_str), Some("--skip-pretrain"));
        assert_eq!(args.len(), 7);
    }

    #[tokio::test]
    async fn missing_executable_is_spawn_failed() {
        let config = SupervisorConfig::new(
            "/nonexistent/fl_server",
            "/nonexistent/init_model",
            ".",
            Duration::from_secs(3),
        );

        let err = launch_worker(&config, &spec(true), 8081).unwrap_err();
        assert!(matches!(err, SupervisorError::SpawnFailed(_)));
    }
}
