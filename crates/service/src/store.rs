//! Persistence collaborator for project records.
//!
//! The service talks to whatever store the caller wires in through
//! [`ProjectStore`]; callers are already authorised by the time anything
//! reaches this layer, so implementations perform no authorisation of
//! their own. [`InMemoryProjectStore`] backs tests and local development.

use std::collections::HashMap;

use async_trait::async_trait;
use flhub_core::types::ProjectId;
use flhub_core::Project;
use tokio::sync::RwLock;

/// Errors from a project store backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Project not found: {0}")]
    NotFound(ProjectId),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Create/find/update access to project records.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Persist a new project. Fails with [`StoreError::Conflict`] when
    /// the name is already taken.
    async fn create(&self, project: Project) -> Result<Project, StoreError>;

    async fn find_by_id(&self, id: ProjectId) -> Result<Option<Project>, StoreError>;

    async fn find_by_name(&self, name: &str) -> Result<Option<Project>, StoreError>;

    /// Record (or clear) the project's model artifact path.
    async fn update_model_path(
        &self,
        id: ProjectId,
        model_path: Option<String>,
    ) -> Result<(), StoreError>;

    /// Record (or clear) the project's assigned worker port.
    async fn update_port(&self, id: ProjectId, port: Option<u16>) -> Result<(), StoreError>;
}

/// In-memory project table for tests and local development.
#[derive(Debug, Default)]
pub struct InMemoryProjectStore {
    projects: RwLock<HashMap<ProjectId, Project>>,
}

impl InMemoryProjectStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProjectStore for InMemoryProjectStore {
    async fn create(&self, project: Project) -> Result<Project, StoreError> {
        let mut projects = self.projects.write().await;
        if projects.values().any(|p| p.name == project.name) {
            return Err(StoreError::Conflict(format!(
                "Project name already in use: \"{}\"",
                project.name
            )));
        }
        projects.insert(project.id, project.clone());
        Ok(project)
    }

    async fn find_by_id(&self, id: ProjectId) -> Result<Option<Project>, StoreError> {
        Ok(self.projects.read().await.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Project>, StoreError> {
        Ok(self
            .projects
            .read()
            .await
            .values()
            .find(|p| p.name == name)
            .cloned())
    }

    async fn update_model_path(
        &self,
        id: ProjectId,
        model_path: Option<String>,
    ) -> Result<(), StoreError> {
        let mut projects = self.projects.write().await;
        let project = projects.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        project.model_path = model_path;
        Ok(())
    }

    async fn update_port(&self, id: ProjectId, port: Option<u16>) -> Result<(), StoreError> {
        let mut projects = self.projects.write().await;
        let project = projects.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        project.port = port;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
