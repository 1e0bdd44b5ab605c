//! Inventory domain shapes.
//!
//! Records and their create/update request payloads for every resource family
//! the access-control layer knows about, plus the registry that maps each shape
//! to its [`ResourceKind`](inventra_auth::ResourceKind). Persistence and
//! mapping live elsewhere.

pub mod account;
pub mod host;
pub mod project;
pub mod registry;
pub mod site;

pub use account::{
    CreatePermissionRequest, CreateRoleRequest, CreateUserRequest, PermissionRecord, RoleRecord,
    UpdatePermissionRequest, UpdateRoleRequest, UpdateUserRequest, UserAccount,
};
pub use host::{
    AccessPoint, Baremetal, CreateAccessPointRequest, CreateBaremetalRequest,
    CreateFirewallRequest, CreateRouterRequest, CreateSwitchRequest,
    CreateVirtualMachineRequest, CreateVirtualPlatformRequest, Firewall, HostDetails,
    HostDetailsPatch, Router, Switch, UpdateAccessPointRequest, UpdateBaremetalRequest,
    UpdateFirewallRequest, UpdateRouterRequest, UpdateSwitchRequest,
    UpdateVirtualMachineRequest, UpdateVirtualPlatformRequest, VirtualMachine, VirtualPlatform,
};
pub use project::{CreateProjectRequest, Project, UpdateProjectRequest};
pub use registry::resource_registry;
pub use site::{CreateLocationRequest, CreateRackRequest, Location, Rack, UpdateLocationRequest, UpdateRackRequest};

use inventra_core::{DomainError, DomainResult};

pub(crate) fn require_non_blank(field: &str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{field} must not be blank")));
    }
    Ok(())
}
