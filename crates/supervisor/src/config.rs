use std::path::PathBuf;
use std::time::Duration;

/// Supervisor configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development. In
/// production, override via environment variables.
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// Executable launched once per project as the long-running training
    /// worker (default: `scripts/fl_server`).
    pub worker_command: PathBuf,
    /// Executable run once per project to produce the model artifact
    /// (default: `scripts/init_model`).
    pub bootstrap_command: PathBuf,
    /// Working directory for both child processes, so relative paths
    /// inside the scripts resolve consistently (default: `.`).
    pub working_dir: PathBuf,
    /// How long a freshly spawned worker must survive before it is
    /// considered started (default: 3 seconds).
    pub startup_grace: Duration,
}

impl SupervisorConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default              |
    /// |--------------------------|----------------------|
    /// | `WORKER_COMMAND`         | `scripts/fl_server`  |
    /// | `BOOTSTRAP_COMMAND`      | `scripts/init_model` |
    /// | `SUPERVISOR_WORKING_DIR` | `.`                  |
    /// | `STARTUP_GRACE_MS`       | `3000`               |
    pub fn from_env() -> Self {
        let worker_command =
            std::env::var("WORKER_COMMAND").unwrap_or_else(|_| "scripts/fl_server".into());

        let bootstrap_command =
            std::env::var("BOOTSTRAP_COMMAND").unwrap_or_else(|_| "scripts/init_model".into());

        let working_dir = std::env::var("SUPERVISOR_WORKING_DIR").unwrap_or_else(|_| ".".into());

        let grace_ms: u64 = std::env::var("STARTUP_GRACE_MS")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("STARTUP_GRACE_MS must be a valid u64");

        Self {
            worker_command: worker_command.into(),
            bootstrap_command: bootstrap_command.into(),
            working_dir: working_dir.into(),
            startup_grace: Duration::from_millis(grace_ms),
        }
    }

    /// Build a configuration directly, bypassing the environment.
    pub fn new(
        worker_command: impl Into<PathBuf>,
        bootstrap_command: impl Into<PathBuf>,
        working_dir: impl Into<PathBuf>,
        startup_grace: Duration,
    ) -> Self {
        Self {
            worker_command: worker_command.into(),
            bootstrap_command: bootstrap_command.into(),
            working_dir: working_dir.into(),
            startup_grace,
        }
    }
}
