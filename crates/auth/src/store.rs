use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use thiserror::Error;

use crate::Principal;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PrincipalStoreError {
    #[error("no principal named '{0}'")]
    NotFound(String),

    #[error("principal store unavailable: {0}")]
    Unavailable(String),
}

/// Resolves a username to its principal record.
///
/// Implementations own the user/role/permission data; callers only read.
#[async_trait]
pub trait PrincipalStore: Send + Sync {
    async fn load_by_username(&self, username: &str) -> Result<Principal, PrincipalStoreError>;
}

#[async_trait]
impl<S> PrincipalStore for Arc<S>
where
    S: PrincipalStore + ?Sized,
{
    async fn load_by_username(&self, username: &str) -> Result<Principal, PrincipalStoreError> {
        (**self).load_by_username(username).await
    }
}

/// In-memory principal store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryPrincipalStore {
    inner: RwLock<HashMap<String, Principal>>,
}

impl InMemoryPrincipalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a principal, returning the previous record.
    pub fn insert(&self, principal: Principal) -> Option<Principal> {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        guard.insert(principal.username.clone(), principal)
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<Principal> for InMemoryPrincipalStore {
    fn from_iter<I: IntoIterator<Item = Principal>>(iter: I) -> Self {
        let store = Self::new();
        for principal in iter {
            store.insert(principal);
        }
        store
    }
}

#[async_trait]
impl PrincipalStore for InMemoryPrincipalStore {
    async fn load_by_username(&self, username: &str) -> Result<Principal, PrincipalStoreError> {
        let guard = self
            .inner
            .read()
            .map_err(|_| PrincipalStoreError::Unavailable("lock poisoned".to_string()))?;
        guard
            .get(username)
            .cloned()
            .ok_or_else(|| PrincipalStoreError::NotFound(username.to_string()))
    }
}
