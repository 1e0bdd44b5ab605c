use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use inventra_auth::{
    PermissionEvaluator, PrincipalStore, RegistryError, ResourceClassifier, TokenService,
};
use inventra_core::{DomainError, DomainResult, ProjectId};
use inventra_inventory::{CreateProjectRequest, Project, resource_registry};

use crate::config::ApiConfig;

/// Shared, immutable-after-startup service graph handed to every handler.
pub struct AppServices {
    pub tokens: Arc<TokenService>,
    pub principals: Arc<dyn PrincipalStore>,
    pub evaluator: PermissionEvaluator,
    pub projects: ProjectDirectory,
}

pub fn build_services(
    config: &ApiConfig,
    principals: Arc<dyn PrincipalStore>,
) -> Result<AppServices, RegistryError> {
    let registry = resource_registry()?;
    tracing::info!(shapes = registry.len(), "resource registry built");

    Ok(AppServices {
        tokens: Arc::new(TokenService::new(Arc::new(config.token.clone()))),
        principals,
        evaluator: PermissionEvaluator::new(ResourceClassifier::new(registry)),
        projects: ProjectDirectory::new(),
    })
}

/// In-memory project storage.
#[derive(Debug)]
pub struct ProjectDirectory {
    projects: RwLock<BTreeMap<ProjectId, Project>>,
    next_id: AtomicI64,
}

impl Default for ProjectDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectDirectory {
    pub fn new() -> Self {
        Self {
            projects: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    pub fn get(&self, id: ProjectId) -> DomainResult<Project> {
        self.projects
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&id)
            .cloned()
            .ok_or_else(DomainError::not_found)
    }

    pub fn create(&self, req: CreateProjectRequest, now: DateTime<Utc>) -> DomainResult<Project> {
        req.validate()?;

        let mut projects = self.projects.write().unwrap_or_else(|e| e.into_inner());
        if projects.values().any(|p| p.name == req.name.trim()) {
            return Err(DomainError::validation(format!(
                "project '{}' already exists",
                req.name.trim()
            )));
        }

        let id = ProjectId::new(self.next_id.fetch_add(1, Ordering::Relaxed))?;
        let project = req.into_project(id, now);
        projects.insert(id, project.clone());
        Ok(project)
    }

    pub fn remove(&self, id: ProjectId) -> DomainResult<Project> {
        self.projects
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&id)
            .ok_or_else(DomainError::not_found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str) -> CreateProjectRequest {
        CreateProjectRequest {
            name: name.to_string(),
            description: None,
        }
    }

    #[test]
    fn create_assigns_increasing_ids() {
        let dir = ProjectDirectory::new();
        let a = dir.create(request("alpha"), Utc::now()).unwrap();
        let b = dir.create(request("beta"), Utc::now()).unwrap();
        assert!(b.id > a.id);
        assert_eq!(dir.get(a.id).unwrap().name, "alpha");
    }

    #[test]
    fn duplicate_and_blank_names_are_rejected() {
        let dir = ProjectDirectory::new();
        dir.create(request("alpha"), Utc::now()).unwrap();
        assert!(matches!(
            dir.create(request(" alpha "), Utc::now()),
            Err(DomainError::Validation(_))
        ));
        assert!(dir.create(request("  "), Utc::now()).is_err());
    }

    #[test]
    fn remove_returns_the_project_once() {
        let dir = ProjectDirectory::new();
        let p = dir.create(request("alpha"), Utc::now()).unwrap();
        assert!(dir.remove(p.id).is_ok());
        assert_eq!(dir.remove(p.id), Err(DomainError::NotFound));
        assert_eq!(dir.get(p.id), Err(DomainError::NotFound));
    }
}
