//! The project record and its validation rules.
//!
//! A project is the unit of training: one project owns one model artifact
//! and at most one running training worker. The record itself is persisted
//! by whatever store the caller wires in; this crate only defines its shape.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{ProjectId, Timestamp};

/// Maximum length of a project name.
const MAX_NAME_LEN: usize = 128;

/// A training project as seen by the persistence collaborator.
///
/// `model_path` is `None` until the model artifact has been bootstrapped;
/// `port` is `None` until a worker has successfully started (and is
/// cleared again when the worker is stopped).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub model_type: String,
    pub model_path: Option<String>,
    pub port: Option<u16>,
    pub created_at: Timestamp,
}

impl Project {
    /// Create a new project record with a fresh id and no artifact or port.
    pub fn new(name: impl Into<String>, model_type: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            name: name.into(),
            model_type: model_type.into(),
            model_path: None,
            port: None,
            created_at: chrono::Utc::now(),
        }
    }
}

/// Validate a project name.
///
/// Rules:
/// - Must not be empty.
/// - Must not exceed `MAX_NAME_LEN` characters.
/// - Must contain only alphanumeric, hyphen, underscore, dot, or space
///   characters.
pub fn validate_project_name(name: &str) -> Result<(), CoreError> {
    if name.is_empty() {
        return Err(CoreError::Validation(
            "Project name must not be empty".to_string(),
        ));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Project name must not exceed {MAX_NAME_LEN} characters"
        )));
    }
    if !name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '.' || c == ' ')
    {
        return Err(CoreError::Validation(
            "Project name may only contain alphanumeric, hyphen, underscore, dot, or space characters"
                .to_string(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- validate_project_name ------------------------------------------------

    #[test]
    fn valid_project_name() {
        assert!(validate_project_name("cifar10 baseline-v2.1").is_ok());
    }

    #[test]
    fn empty_name_rejected() {
        assert!(validate_project_name("").is_err());
    }

    #[test]
    fn name_with_shell_metacharacters_rejected() {
        assert!(validate_project_name("proj; rm -rf /").is_err());
        assert!(validate_project_name("$(evil)").is_err());
    }

    #[test]
    fn name_too_long_rejected() {
        let name = "a".repeat(MAX_NAME_LEN + 1);
        assert!(validate_project_name(&name).is_err());
    }

    // -- Project --------------------------------------------------------------

    #[test]
    fn new_project_has_no_artifact_or_port() {
        let project = Project::new("mnist", "cnn");
        assert!(project.model_path.is_none());
        assert!(project.port.is_none());
    }

    #[test]
    fn distinct_projects_get_distinct_ids() {
        let a = Project::new("a", "cnn");
        let b = Project::new("b", "cnn");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn serializes_port_as_nullable_number() {
        let mut project = Project::new("mnist", "cnn");
        let json = serde_json::to_value(&project).unwrap();
        assert!(json["port"].is_null());

        project.port = Some(8081);
        let json = serde_json::to_value(&project).unwrap();
        assert_eq!(json["port"], 8081);
    }
}
