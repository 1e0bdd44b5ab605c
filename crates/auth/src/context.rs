//! Request-scoped security context.
//!
//! A context is produced once per request by the authentication gate and handed
//! explicitly to everything that needs it. There is no ambient/thread-bound
//! state.

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::{AuthoritySet, Principal};

/// Why a presented credential did not authenticate.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthenticationError {
    #[error("malformed bearer token")]
    MalformedToken,

    #[error("bearer token signature is invalid")]
    InvalidSignature,

    #[error("token subject does not resolve to a known user")]
    UnknownSubject,

    #[error("bearer token has expired")]
    Expired,

    #[error("bearer token does not belong to the resolved user")]
    SubjectMismatch,

    #[error("account is disabled")]
    AccountDisabled,

    #[error("account is locked")]
    AccountLocked,

    #[error("principal store unavailable")]
    StoreUnavailable,
}

/// Request details captured when a context is established.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestMetadata {
    pub request_id: Uuid,
    pub remote_addr: Option<String>,
    pub user_agent: Option<String>,
}

impl RequestMetadata {
    pub fn new(remote_addr: Option<String>, user_agent: Option<String>) -> Self {
        Self {
            request_id: Uuid::now_v7(),
            remote_addr,
            user_agent,
        }
    }
}

impl Default for RequestMetadata {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// An authenticated principal together with its derived authorities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedContext {
    principal: Principal,
    authorities: AuthoritySet,
    metadata: RequestMetadata,
}

impl AuthenticatedContext {
    /// Authorities are derived here, from the principal's current role.
    pub fn new(principal: Principal, metadata: RequestMetadata) -> Self {
        let authorities = crate::authority::derive(&principal.role);
        Self {
            principal,
            authorities,
            metadata,
        }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn username(&self) -> &str {
        &self.principal.username
    }

    pub fn authorities(&self) -> &AuthoritySet {
        &self.authorities
    }

    pub fn metadata(&self) -> &RequestMetadata {
        &self.metadata
    }
}

/// Terminal state of authentication for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecurityContext {
    Authenticated(AuthenticatedContext),
    /// `None`: no credentials were presented. `Some`: they were rejected.
    Anonymous(Option<AuthenticationError>),
}

impl SecurityContext {
    pub fn anonymous() -> Self {
        SecurityContext::Anonymous(None)
    }

    pub fn rejected(reason: AuthenticationError) -> Self {
        SecurityContext::Anonymous(Some(reason))
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SecurityContext::Authenticated(_))
    }

    pub fn authenticated(&self) -> Option<&AuthenticatedContext> {
        match self {
            SecurityContext::Authenticated(ctx) => Some(ctx),
            SecurityContext::Anonymous(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<AuthenticationError> {
        match self {
            SecurityContext::Anonymous(reason) => *reason,
            SecurityContext::Authenticated(_) => None,
        }
    }
}
