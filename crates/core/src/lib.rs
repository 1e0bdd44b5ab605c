//! `inventra-core`: shared domain primitives.
//!
//! Identifiers and the domain error model used by the inventory shapes and the
//! HTTP boundary. No infrastructure concerns live here.

pub mod entity;
pub mod error;
pub mod id;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{HostId, LocationId, PermissionId, ProjectId, RackId, RoleId, UserId};
