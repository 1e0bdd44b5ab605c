//! `inventra-auth`: authentication and authorization core.
//!
//! Decoupled from HTTP and storage: tokens come in as strings, principals come
//! from a [`PrincipalStore`], and every decision is a plain value.

pub mod authority;
pub mod context;
pub mod evaluate;
pub mod gate;
pub mod password;
pub mod principal;
pub mod resource;
pub mod store;
pub mod token;

pub use authority::{Authority, AuthoritySet};
pub use context::{AuthenticatedContext, AuthenticationError, RequestMetadata, SecurityContext};
pub use evaluate::{AuthorizationDecision, DecisionReason, PermissionEvaluator};
pub use gate::{AuthenticationGate, bearer_token};
pub use password::{PasswordError, hash_password, verify_dummy, verify_password};
pub use principal::{AccountState, Action, Permission, Principal, Role, RoleName};
pub use resource::{
    RegistryError, ResourceClassifier, ResourceKind, ResourceRegistry, ResourceRegistryBuilder,
    UnknownResourceType,
};
pub use store::{InMemoryPrincipalStore, PrincipalStore, PrincipalStoreError};
pub use token::{
    ConfigError, IssuedToken, TokenClaims, TokenConfig, TokenError, TokenService, TokenValidity,
};

pub use jsonwebtoken::Algorithm;
