//! Shared helpers for supervisor integration tests.
//!
//! Stub workers are small `sh` scripts written into a temp directory so
//! the tests exercise real process spawning, output capture, and signal
//! delivery.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use flhub_supervisor::SupervisorConfig;

/// Grace window for tests: long enough for `sh` to start, short enough
/// to keep the suite fast.
pub const TEST_GRACE: Duration = Duration::from_millis(300);

/// Write an executable shell script into `dir` and return its path.
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write stub script");

    let mut perms = fs::metadata(&path).expect("stat stub script").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).expect("chmod stub script");

    path
}

/// Config pointing at the given stub executables, with the test grace
/// window and the temp dir as working directory.
pub fn test_config(worker: &Path, bootstrap: &Path, dir: &Path) -> SupervisorConfig {
    SupervisorConfig::new(worker, bootstrap, dir, TEST_GRACE)
}

/// Number of lines in the launch-marker file a stub worker appends to.
/// Zero when the file does not exist yet.
pub fn marker_lines(marker: &Path) -> usize {
    fs::read_to_string(marker)
        .map(|s| s.lines().count())
        .unwrap_or(0)
}

/// Initialise a test tracing subscriber (once per process).
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
