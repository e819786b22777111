//! Shared helpers for service integration tests.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use flhub_supervisor::SupervisorConfig;

/// Write an executable shell script into `dir` and return its path.
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write stub script");

    let mut perms = fs::metadata(&path).expect("stat stub script").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).expect("chmod stub script");

    path
}

/// Config pointing at the given stub executables with a short grace
/// window.
pub fn test_config(worker: &Path, bootstrap: &Path, dir: &Path) -> SupervisorConfig {
    SupervisorConfig::new(worker, bootstrap, dir, Duration::from_millis(300))
}

/// Initialise a test tracing subscriber (once per process).
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
