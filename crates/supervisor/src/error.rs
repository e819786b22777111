//! Supervisor error types.
//!
//! None of these are retried internally; retry policy belongs to the
//! caller. Variants that describe a process failure carry the full
//! captured output so an operator can act on the error message alone.

/// Errors produced while provisioning or supervising worker processes.
#[derive(Debug, thiserror::Error)]
pub enum SupervisorError {
    /// The operating system refused to hand out an ephemeral port.
    #[error("No free port available: {0}")]
    NoPortAvailable(#[source] std::io::Error),

    /// The worker executable could not be started at all.
    #[error("Failed to spawn worker process: {0}")]
    SpawnFailed(#[source] std::io::Error),

    /// The worker exited (or its output stream failed) within the
    /// start-up grace window. Exit code is `-1` when the process was
    /// killed by a signal.
    #[error("Worker process failed to start (exit code {exit_code})\nFull output:\n{log}")]
    StartupFailed { exit_code: i32, log: String },

    /// The one-shot bootstrap process exited non-zero.
    #[error("Model bootstrap failed (exit code {exit_code})\nFull output:\n{log}")]
    BootstrapFailed { exit_code: i32, log: String },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_startup_failed_includes_code_and_log() {
        let err = SupervisorError::StartupFailed {
            exit_code: 1,
            log: "missing dependency: flwr".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("exit code 1"));
        assert!(msg.contains("missing dependency: flwr"));
    }

    #[test]
    fn display_bootstrap_failed_includes_code_and_log() {
        let err = SupervisorError::BootstrapFailed {
            exit_code: 7,
            log: "CUDA not found".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("exit code 7"));
        assert!(msg.contains("CUDA not found"));
    }

    #[test]
    fn spawn_failed_has_source() {
        let inner = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = SupervisorError::SpawnFailed(inner);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn startup_failed_has_no_source() {
        let err = SupervisorError::StartupFailed {
            exit_code: 1,
            log: String::new(),
        };
        assert!(std::error::Error::source(&err).is_none());
    }
}
