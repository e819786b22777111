//! The project lifecycle, end to end.
//!
//! Ordering invariant: a project's model artifact is bootstrapped before
//! its first worker launch, because the worker loads its initial weights
//! from that artifact. `create_project` runs the bootstrap;
//! `start_training` refuses projects without an artifact.

use std::path::PathBuf;

use flhub_core::project::validate_project_name;
use flhub_core::types::ProjectId;
use flhub_core::Project;
use flhub_supervisor::bootstrap::{bootstrap_model, BootstrapRequest};
use flhub_supervisor::{SupervisorConfig, WorkerLaunchSpec, WorkerRegistry};

use crate::error::ServiceError;
use crate::store::ProjectStore;

/// Orchestrates projects over the persistence store and the worker
/// registry.
pub struct ProjectService<S> {
    store: S,
    registry: WorkerRegistry,
    config: SupervisorConfig,
    /// Directory model artifacts are written into, one `<project-id>.npz`
    /// per project.
    models_dir: PathBuf,
}

impl<S: ProjectStore> ProjectService<S> {
    pub fn new(store: S, config: SupervisorConfig, models_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            registry: WorkerRegistry::new(config.clone()),
            config,
            models_dir: models_dir.into(),
        }
    }

    /// The underlying store, for callers that need direct record access.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The worker registry, for liveness-adjacent queries.
    pub fn registry(&self) -> &WorkerRegistry {
        &self.registry
    }

    /// Create a project and bootstrap its model artifact.
    ///
    /// Long-running: awaits the bootstrap process. On bootstrap failure
    /// the project record survives without an artifact path; whether to
    /// retry is the caller's decision.
    pub async fn create_project(
        &self,
        name: &str,
        model_type: &str,
        pretrain_epochs: u32,
    ) -> Result<Project, ServiceError> {
        validate_project_name(name)?;

        let mut project = self.store.create(Project::new(name, model_type)).await?;
        tracing::info!(
            project_id = %project.id,
            name = %project.name,
            model_type = %project.model_type,
            "Project created",
        );

        let model_path = self
            .models_dir
            .join(format!("{}.npz", project.id))
            .display()
            .to_string();

        bootstrap_model(
            &self.config,
            &BootstrapRequest {
                model_type: project.model_type.clone(),
                output_path: model_path.clone(),
                pretrain_epochs,
            },
        )
        .await?;

        self.store
            .update_model_path(project.id, Some(model_path.clone()))
            .await?;
        project.model_path = Some(model_path);

        tracing::info!(project_id = %project.id, "Project fully configured");
        Ok(project)
    }

    /// Ensure the project's training worker is running and persist its
    /// port. Idempotent: a live worker just reports its existing port.
    pub async fn start_training(&self, project_id: ProjectId) -> Result<Project, ServiceError> {
        let mut project = self
            .store
            .find_by_id(project_id)
            .await?
            .ok_or(ServiceError::ProjectNotFound(project_id))?;

        let Some(model_path) = project.model_path.clone() else {
            return Err(ServiceError::NotBootstrapped(project_id));
        };

        let port = self
            .registry
            .ensure_started(&WorkerLaunchSpec {
                project_id,
                model_path,
                // The artifact exists, so the worker must not pretrain.
                skip_pretrain: true,
            })
            .await?;

        self.store.update_port(project_id, Some(port)).await?;
        project.port = Some(port);

        tracing::info!(project_id = %project_id, port, "Training running");
        Ok(project)
    }

    /// Stop the project's worker and clear its persisted port, so stored
    /// state never claims a port nothing is listening on.
    pub async fn stop_training(&self, project_id: ProjectId) -> Result<(), ServiceError> {
        self.store
            .find_by_id(project_id)
            .await?
            .ok_or(ServiceError::ProjectNotFound(project_id))?;

        self.registry.stop(project_id).await;
        self.store.update_port(project_id, None).await?;

        tracing::info!(project_id = %project_id, "Training stopped");
        Ok(())
    }

    /// Point-in-time liveness of the project's worker.
    pub async fn is_training(&self, project_id: ProjectId) -> bool {
        self.registry.is_running(project_id).await
    }
}
