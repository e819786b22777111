//! Combined output capture for supervised child processes.
//!
//! Both stdout and stderr of a child are piped and drained line-by-line
//! into one shared buffer, giving the single combined stream the external
//! scripts are written against. Each line is also re-emitted through
//! `tracing` tagged with its source, so worker output lands in the
//! service's own logs as it arrives.
//!
//! Draining runs in spawned tasks and never blocks whoever is watching
//! the process itself.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::task::JoinHandle;

/// Append-only capture of a child's combined output, shared between the
/// drain tasks and whoever holds the process handle.
#[derive(Debug, Clone, Default)]
pub struct OutputCapture {
    buffer: Arc<Mutex<String>>,
    io_error: Arc<AtomicBool>,
}

impl OutputCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// A point-in-time copy of everything captured so far.
    pub fn snapshot(&self) -> String {
        self.buffer.lock().expect("output capture lock poisoned").clone()
    }

    /// True if any drain task failed to read its stream.
    pub fn io_error_seen(&self) -> bool {
        self.io_error.load(Ordering::SeqCst)
    }

    fn append_line(&self, line: &str) {
        let mut buffer = self.buffer.lock().expect("output capture lock poisoned");
        buffer.push_str(line);
        buffer.push('\n');
    }

    fn mark_io_error(&self) {
        self.io_error.store(true, Ordering::SeqCst);
    }
}

/// Drain one output stream line-by-line into `capture`.
///
/// The task runs until the stream reaches EOF (the process exited and the
/// pipe closed) or a read fails, in which case the capture's I/O-error
/// flag is set. `source` tags the re-emitted log lines.
pub fn spawn_line_drain<R>(
    stream: R,
    capture: OutputCapture,
    source: String,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(stream).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    tracing::info!(source = %source, "{line}");
                    capture.append_line(&line);
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(source = %source, error = %e, "Error reading process output");
                    capture.mark_io_error();
                    break;
                }
            }
        }
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
