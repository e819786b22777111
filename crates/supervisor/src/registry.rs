//! Concurrency-safe registry of running training workers.
//!
//! At most one worker exists per project at any time. The registry is the
//! sole owner of [`WorkerHandle`]s: once a launch is confirmed healthy the
//! handle lives here and nowhere else.
//!
//! Locking discipline: the project-id -> slot table sits behind a plain
//! mutex that is held only long enough to look up or insert a slot. Each
//! slot carries its own async mutex serialising the check-then-launch
//! sequence for that one project. Concurrent starts of the same project
//! therefore share a single launch, while the slow path (allocate port,
//! spawn, grace window) never blocks starts of other projects.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use flhub_core::types::ProjectId;
use tokio::process::Child;

use crate::capture::OutputCapture;
use crate::config::SupervisorConfig;
use crate::error::SupervisorError;
use crate::launcher::{launch_worker, WorkerLaunchSpec};
use crate::port::allocate_port;
use crate::startup::await_startup;

/// One live training worker: its process, port, and captured output.
///
/// Created only after the worker survived its start-up grace window.
#[derive(Debug)]
pub struct WorkerHandle {
    pub project_id: ProjectId,
    pub port: u16,
    child: Child,
    capture: OutputCapture,
}

impl WorkerHandle {
    /// Point-in-time liveness check via a non-blocking reap attempt.
    fn is_alive(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }
}

/// A project's worker state plus the lock that serialises launches for it.
type Slot = Arc<tokio::sync::Mutex<Option<WorkerHandle>>>;

/// The table of running workers, keyed by project id.
#[derive(Debug)]
pub struct WorkerRegistry {
    config: SupervisorConfig,
    slots: Mutex<HashMap<ProjectId, Slot>>,
}

impl WorkerRegistry {
    pub fn new(config: SupervisorConfig) -> Self {
        Self {
            config,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Ensure a worker is running for the spec's project and return its
    /// port.
    ///
    /// Idempotent: a live worker short-circuits to its recorded port. A
    /// worker observed to have exited is reaped and relaunched. Two
    /// concurrent calls for the same project serialise on the project's
    /// slot, so at most one worker is ever started; calls for different
    /// projects proceed independently.
    ///
    /// On a failed start-up nothing is registered and the error carries
    /// the worker's exit code and full captured output.
    pub async fn ensure_started(
        &self,
        spec: &WorkerLaunchSpec,
    ) -> Result<u16, SupervisorError> {
        let slot = self.slot(spec.project_id);
        let mut guard = slot.lock().await;

        if let Some(handle) = guard.as_mut() {
            if handle.is_alive() {
                tracing::debug!(
                    project_id = %spec.project_id,
                    port = handle.port,
                    "Worker already running",
                );
                return Ok(handle.port);
            }
            tracing::warn!(
                project_id = %spec.project_id,
                "Previously registered worker has exited; relaunching",
            );
            *guard = None;
        }

        // Slow path: runs under only this project's slot lock.
        let port = allocate_port().await?;
        let child = launch_worker(&self.config, spec, port)?;
        let (child, capture) =
            await_startup(child, spec.project_id, self.config.startup_grace).await?;

        tracing::info!(project_id = %spec.project_id, port, "Training worker started");
        *guard = Some(WorkerHandle {
            project_id: spec.project_id,
            port,
            child,
            capture,
        });
        Ok(port)
    }

    /// True iff a worker is registered for the project and its process is
    /// alive right now. A point-in-time check, not a guarantee about the
    /// next instant; a launch still inside its grace window reports
    /// `false` because nothing is confirmed yet.
    pub async fn is_running(&self, project_id: ProjectId) -> bool {
        let Some(slot) = self.existing_slot(project_id) else {
            return false;
        };
        // try_lock: a busy slot means a launch is in flight, and an
        // in-flight launch has no confirmed worker.
        let Ok(mut guard) = slot.try_lock() else {
            return false;
        };
        match guard.as_mut() {
            Some(handle) => {
                if handle.is_alive() {
                    true
                } else {
                    // Observed dead: reap so the next ensure_started relaunches.
                    *guard = None;
                    false
                }
            }
            None => false,
        }
    }

    /// Stop the project's worker, if one is registered.
    ///
    /// Best-effort: the termination signal is sent and the handle removed
    /// without waiting for the process to exit. No-op when no handle
    /// exists, including while a launch for the project is in flight.
    pub async fn stop(&self, project_id: ProjectId) {
        let Some(slot) = self.existing_slot(project_id) else {
            tracing::debug!(project_id = %project_id, "No worker to stop");
            return;
        };
        let Ok(mut guard) = slot.try_lock() else {
            tracing::debug!(project_id = %project_id, "Launch in flight; nothing to stop");
            return;
        };
        if let Some(mut handle) = guard.take() {
            tracing::info!(project_id = %project_id, port = handle.port, "Stopping training worker");
            if let Err(e) = handle.child.start_kill() {
                tracing::warn!(
                    project_id = %project_id,
                    error = %e,
                    "Failed to signal worker process",
                );
            }
        }
    }

    /// The captured output of the project's registered worker, if any.
    pub async fn startup_log(&self, project_id: ProjectId) -> Option<String> {
        let slot = self.existing_slot(project_id)?;
        let guard = slot.try_lock().ok()?;
        guard.as_ref().map(|handle| handle.capture.snapshot())
    }

    /// Ids of all projects whose worker is alive right now.
    pub async fn running_project_ids(&self) -> Vec<ProjectId> {
        let slots: Vec<(ProjectId, Slot)> = {
            let table = self.slots.lock().expect("registry slot table poisoned");
            table.iter().map(|(id, slot)| (*id, slot.clone())).collect()
        };

        let mut ids = Vec::new();
        for (project_id, slot) in slots {
            if let Ok(mut guard) = slot.try_lock() {
                if let Some(handle) = guard.as_mut() {
                    if handle.is_alive() {
                        ids.push(project_id);
                    }
                }
            }
        }
        ids
    }

    /// Stop every registered worker. Waits for in-flight launches to
    /// settle so nothing is left running behind the shutdown.
    pub async fn shutdown(&self) {
        tracing::info!("Shutting down worker registry");

        let slots: Vec<(ProjectId, Slot)> = {
            let mut table = self.slots.lock().expect("registry slot table poisoned");
            table.drain().collect()
        };

        for (project_id, slot) in slots {
            let mut guard = slot.lock().await;
            if let Some(mut handle) = guard.take() {
                tracing::info!(project_id = %project_id, port = handle.port, "Stopping training worker");
                let _ = handle.child.start_kill();
            }
        }

        tracing::info!("Worker registry shut down complete");
    }

    // ---- private helpers ----

    /// Fetch or create the slot for a project. The table lock is held
    /// only for this lookup.
    fn slot(&self, project_id: ProjectId) -> Slot {
        let mut table = self.slots.lock().expect("registry slot table poisoned");
        table.entry(project_id).or_default().clone()
    }

    /// Fetch the slot for a project without creating one.
    fn existing_slot(&self, project_id: ProjectId) -> Option<Slot> {
        let table = self.slots.lock().expect("registry slot table poisoned");
        table.get(&project_id).cloned()
    }
}
