//! Host families.
//!
//! Every family shares [`HostDetails`] and adds its own fields. Families are
//! flat, independent shapes: the access-control layer maps each one to its own
//! resource kind rather than through a common base type.

use serde::{Deserialize, Serialize};

use inventra_core::{DomainResult, Entity, HostId, ProjectId, RackId};

use crate::require_non_blank;

/// Fields common to every host family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostDetails {
    pub hostname: String,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub project_id: Option<ProjectId>,
    #[serde(default)]
    pub rack_id: Option<RackId>,
    #[serde(default)]
    pub description: Option<String>,
}

impl HostDetails {
    pub fn validate(&self) -> DomainResult<()> {
        require_non_blank("hostname", &self.hostname)
    }
}

/// Partial update of [`HostDetails`]; absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostDetailsPatch {
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub project_id: Option<ProjectId>,
    #[serde(default)]
    pub rack_id: Option<RackId>,
    #[serde(default)]
    pub description: Option<String>,
}

impl HostDetailsPatch {
    pub fn apply(self, details: &mut HostDetails) {
        if let Some(hostname) = self.hostname {
            details.hostname = hostname;
        }
        if self.ip_address.is_some() {
            details.ip_address = self.ip_address;
        }
        if self.project_id.is_some() {
            details.project_id = self.project_id;
        }
        if self.rack_id.is_some() {
            details.rack_id = self.rack_id;
        }
        if self.description.is_some() {
            details.description = self.description;
        }
    }
}

/// Defines a host family: the record, its create payload and its update payload.
macro_rules! host_family {
    (
        $(#[$meta:meta])*
        $entity:ident, $create:ident, $update:ident {
            $( $(#[$fmeta:meta])* $field:ident : $ty:ty ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        pub struct $entity {
            pub id: HostId,
            #[serde(flatten)]
            pub details: HostDetails,
            $( $(#[$fmeta])* pub $field: $ty, )*
        }

        impl Entity for $entity {
            type Id = HostId;

            fn id(&self) -> HostId {
                self.id
            }
        }

        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        pub struct $create {
            #[serde(flatten)]
            pub details: HostDetails,
            $( $(#[$fmeta])* pub $field: $ty, )*
        }

        impl $create {
            pub fn validate(&self) -> DomainResult<()> {
                self.details.validate()
            }
        }

        #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
        pub struct $update {
            #[serde(flatten)]
            pub details: HostDetailsPatch,
            $( #[serde(default)] pub $field: Option<$ty>, )*
        }
    };
}

host_family!(
    /// Physical server.
    Baremetal, CreateBaremetalRequest, UpdateBaremetalRequest {
        serial_number: String,
        cpu_cores: u32,
        memory_gb: u32,
    }
);

host_family!(
    /// Hypervisor cluster or cloud account hosting virtual machines.
    VirtualPlatform, CreateVirtualPlatformRequest, UpdateVirtualPlatformRequest {
        /// e.g. `vmware`, `proxmox`, `openstack`
        platform_type: String,
    }
);

host_family!(
    VirtualMachine, CreateVirtualMachineRequest, UpdateVirtualMachineRequest {
        virtual_platform_id: HostId,
        vcpus: u32,
        memory_gb: u32,
    }
);

host_family!(
    Firewall, CreateFirewallRequest, UpdateFirewallRequest {
        vendor: String,
        port_count: u16,
    }
);

host_family!(
    Router, CreateRouterRequest, UpdateRouterRequest {
        vendor: String,
        port_count: u16,
    }
);

host_family!(
    Switch, CreateSwitchRequest, UpdateSwitchRequest {
        vendor: String,
        port_count: u16,
        #[serde(default)]
        managed: bool,
    }
);

host_family!(
    /// Wireless access point.
    AccessPoint, CreateAccessPointRequest, UpdateAccessPointRequest {
        ssid: String,
    }
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_flattens_common_details() {
        let req: CreateVirtualMachineRequest = serde_json::from_value(serde_json::json!({
            "hostname": "vm-01",
            "ip_address": "10.0.0.5",
            "virtual_platform_id": 4,
            "vcpus": 2,
            "memory_gb": 8,
        }))
        .unwrap();
        assert_eq!(req.details.hostname, "vm-01");
        assert_eq!(req.vcpus, 2);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn blank_hostname_is_rejected() {
        let req = CreateAccessPointRequest {
            details: HostDetails {
                hostname: " ".to_string(),
                ip_address: None,
                project_id: None,
                rack_id: None,
                description: None,
            },
            ssid: "office".to_string(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn patch_only_touches_present_fields() {
        let mut details = HostDetails {
            hostname: "fw-1".to_string(),
            ip_address: Some("10.0.0.1".to_string()),
            project_id: None,
            rack_id: None,
            description: Some("edge".to_string()),
        };
        let patch: UpdateFirewallRequest =
            serde_json::from_value(serde_json::json!({ "hostname": "fw-2", "port_count": 48 })).unwrap();
        assert_eq!(patch.port_count, Some(48));
        patch.details.apply(&mut details);

        assert_eq!(details.hostname, "fw-2");
        assert_eq!(details.ip_address.as_deref(), Some("10.0.0.1"));
        assert_eq!(details.description.as_deref(), Some("edge"));
    }
}
