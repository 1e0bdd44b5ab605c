use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use inventra_core::{DomainResult, Entity, ProjectId};

use crate::require_non_blank;

/// A project groups hosts by owning team or workload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Entity for Project {
    type Id = ProjectId;

    fn id(&self) -> ProjectId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl CreateProjectRequest {
    pub fn validate(&self) -> DomainResult<()> {
        require_non_blank("name", &self.name)
    }

    pub fn into_project(self, id: ProjectId, created_at: DateTime<Utc>) -> Project {
        Project {
            id,
            name: self.name.trim().to_string(),
            description: self.description,
            created_at,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateProjectRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl UpdateProjectRequest {
    pub fn validate(&self) -> DomainResult<()> {
        match &self.name {
            Some(name) => require_non_blank("name", name),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use inventra_core::DomainError;

    use super::*;

    #[test]
    fn blank_name_is_rejected() {
        let req = CreateProjectRequest {
            name: "   ".to_string(),
            description: None,
        };
        assert!(matches!(req.validate(), Err(DomainError::Validation(_))));
        assert!(UpdateProjectRequest { name: Some(String::new()), description: None }
            .validate()
            .is_err());
        assert!(UpdateProjectRequest::default().validate().is_ok());
    }

    #[test]
    fn create_request_builds_trimmed_project() {
        let req: CreateProjectRequest = serde_json::from_value(serde_json::json!({ "name": " infra " })).unwrap();
        req.validate().unwrap();
        let project = req.into_project(ProjectId::new(3).unwrap(), Utc::now());
        assert_eq!(project.name, "infra");
        assert_eq!(project.id().get(), 3);
    }
}
