use flhub_core::types::ProjectId;
use flhub_core::CoreError;
use flhub_supervisor::SupervisorError;

use crate::store::StoreError;

/// Errors surfaced by the project service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Project not found: {0}")]
    ProjectNotFound(ProjectId),

    /// Training was requested before the project's model artifact was
    /// bootstrapped.
    #[error("Project {0} has no bootstrapped model artifact")]
    NotBootstrapped(ProjectId),

    #[error("Invalid request: {0}")]
    Core(#[from] CoreError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Supervisor error: {0}")]
    Supervisor(#[from] SupervisorError),
}
