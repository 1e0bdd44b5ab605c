//! The shape → resource-kind table for every inventory shape.

use inventra_auth::{RegistryError, ResourceKind, ResourceRegistry};

use crate::*;

/// Register the record, create payload and update payload of one family.
macro_rules! family {
    ($builder:expr, $kind:expr, $($shape:ty),+ $(,)?) => {
        $builder$(.register::<$shape>($kind))+
    };
}

/// Build the registry covering every domain shape.
///
/// Called once at startup; the result is immutable.
pub fn resource_registry() -> Result<ResourceRegistry, RegistryError> {
    let builder = ResourceRegistry::builder();
    let builder = family!(builder, ResourceKind::User, UserAccount, CreateUserRequest, UpdateUserRequest);
    let builder = family!(builder, ResourceKind::Role, RoleRecord, CreateRoleRequest, UpdateRoleRequest);
    let builder = family!(
        builder,
        ResourceKind::Permission,
        PermissionRecord,
        CreatePermissionRequest,
        UpdatePermissionRequest,
    );
    let builder = family!(builder, ResourceKind::Project, Project, CreateProjectRequest, UpdateProjectRequest);
    let builder = family!(builder, ResourceKind::Location, Location, CreateLocationRequest, UpdateLocationRequest);
    let builder = family!(builder, ResourceKind::Rack, Rack, CreateRackRequest, UpdateRackRequest);
    let builder = family!(builder, ResourceKind::Baremetal, Baremetal, CreateBaremetalRequest, UpdateBaremetalRequest);
    let builder = family!(
        builder,
        ResourceKind::VirtualPlatform,
        VirtualPlatform,
        CreateVirtualPlatformRequest,
        UpdateVirtualPlatformRequest,
    );
    let builder = family!(
        builder,
        ResourceKind::VirtualMachine,
        VirtualMachine,
        CreateVirtualMachineRequest,
        UpdateVirtualMachineRequest,
    );
    let builder = family!(builder, ResourceKind::Firewall, Firewall, CreateFirewallRequest, UpdateFirewallRequest);
    let builder = family!(builder, ResourceKind::Router, Router, CreateRouterRequest, UpdateRouterRequest);
    let builder = family!(builder, ResourceKind::Switch, Switch, CreateSwitchRequest, UpdateSwitchRequest);
    let builder = family!(
        builder,
        ResourceKind::AccessPoint,
        AccessPoint,
        CreateAccessPointRequest,
        UpdateAccessPointRequest,
    );
    builder.build()
}
