//! Resource kinds and the shape → kind classifier.
//!
//! Every domain shape that can be the target of an authorization check is
//! registered once, at startup, against exactly one [`ResourceKind`]. The
//! resulting [`ResourceRegistry`] is immutable; lookups of unregistered shapes
//! fail with [`UnknownResourceType`] instead of falling back to a default kind.

use core::str::FromStr;
use std::any::{Any, TypeId};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Closed set of domain-object categories subject to access control.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceKind {
    User,
    Role,
    Permission,
    Project,
    Location,
    Rack,
    Baremetal,
    VirtualPlatform,
    VirtualMachine,
    Firewall,
    Router,
    Switch,
    AccessPoint,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 13] = [
        ResourceKind::User,
        ResourceKind::Role,
        ResourceKind::Permission,
        ResourceKind::Project,
        ResourceKind::Location,
        ResourceKind::Rack,
        ResourceKind::Baremetal,
        ResourceKind::VirtualPlatform,
        ResourceKind::VirtualMachine,
        ResourceKind::Firewall,
        ResourceKind::Router,
        ResourceKind::Switch,
        ResourceKind::AccessPoint,
    ];

    /// Canonical name, as it appears inside authority strings.
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::User => "USER",
            ResourceKind::Role => "ROLE",
            ResourceKind::Permission => "PERMISSION",
            ResourceKind::Project => "PROJECT",
            ResourceKind::Location => "LOCATION",
            ResourceKind::Rack => "RACK",
            ResourceKind::Baremetal => "BAREMETAL",
            ResourceKind::VirtualPlatform => "VIRTUAL_PLATFORM",
            ResourceKind::VirtualMachine => "VIRTUAL_MACHINE",
            ResourceKind::Firewall => "FIREWALL",
            ResourceKind::Router => "ROUTER",
            ResourceKind::Switch => "SWITCH",
            ResourceKind::AccessPoint => "ACCESS_POINT",
        }
    }
}

impl core::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = UnknownResourceType;

    /// Case-insensitive parse of the canonical name (`"project"`, `"VIRTUAL_MACHINE"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownResourceType::new(s))
    }
}

/// A shape or type tag with no registered [`ResourceKind`].
///
/// This is a configuration defect (the registry is out of sync with the domain
/// model), never a user-input problem.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown resource type '{type_name}'")]
pub struct UnknownResourceType {
    pub type_name: String,
}

impl UnknownResourceType {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("shape '{type_name}' registered as both {existing} and {requested}")]
    ConflictingRegistration {
        type_name: &'static str,
        existing: ResourceKind,
        requested: ResourceKind,
    },
}

#[derive(Debug, Clone, Copy)]
struct Registration {
    kind: ResourceKind,
    type_name: &'static str,
}

/// Immutable shape → kind table.
#[derive(Debug)]
pub struct ResourceRegistry {
    entries: HashMap<TypeId, Registration>,
}

impl ResourceRegistry {
    pub fn builder() -> ResourceRegistryBuilder {
        ResourceRegistryBuilder::default()
    }

    pub fn kind_of<T: Any>(&self) -> Option<ResourceKind> {
        self.entries.get(&TypeId::of::<T>()).map(|r| r.kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Kinds reachable from at least one registered shape.
    pub fn covered_kinds(&self) -> BTreeSet<ResourceKind> {
        self.entries.values().map(|r| r.kind).collect()
    }
}

/// Collects registrations; conflicts are reported by [`ResourceRegistryBuilder::build`].
#[derive(Debug, Default)]
pub struct ResourceRegistryBuilder {
    entries: HashMap<TypeId, Registration>,
    conflicts: Vec<RegistryError>,
}

impl ResourceRegistryBuilder {
    pub fn register<T: Any>(mut self, kind: ResourceKind) -> Self {
        let type_name = std::any::type_name::<T>();
        match self.entries.get(&TypeId::of::<T>()).copied() {
            Some(existing) if existing.kind != kind => {
                self.conflicts.push(RegistryError::ConflictingRegistration {
                    type_name,
                    existing: existing.kind,
                    requested: kind,
                });
            }
            Some(_) => {}
            None => {
                self.entries
                    .insert(TypeId::of::<T>(), Registration { kind, type_name });
            }
        }
        self
    }

    pub fn build(mut self) -> Result<ResourceRegistry, RegistryError> {
        if !self.conflicts.is_empty() {
            return Err(self.conflicts.swap_remove(0));
        }
        Ok(ResourceRegistry {
            entries: self.entries,
        })
    }
}

/// Maps live objects and type tags to their [`ResourceKind`].
#[derive(Debug, Clone)]
pub struct ResourceClassifier {
    registry: Arc<ResourceRegistry>,
}

impl ResourceClassifier {
    pub fn new(registry: impl Into<Arc<ResourceRegistry>>) -> Self {
        Self {
            registry: registry.into(),
        }
    }

    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    /// Classify a live object by its concrete type.
    ///
    /// `T` must be the concrete shape; passing a `&dyn Any` classifies the trait
    /// object type itself and will always fail.
    pub fn classify<T: Any>(&self, _target: &T) -> Result<ResourceKind, UnknownResourceType> {
        self.registry
            .kind_of::<T>()
            .ok_or_else(|| UnknownResourceType::new(std::any::type_name::<T>()))
    }

    /// Classify a caller-supplied type tag (id-based checks).
    pub fn classify_name(&self, name: &str) -> Result<ResourceKind, UnknownResourceType> {
        name.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Widget;
    struct WidgetDraft;
    struct Stranger;

    fn classifier() -> ResourceClassifier {
        let registry = ResourceRegistry::builder()
            .register::<Widget>(ResourceKind::Rack)
            .register::<WidgetDraft>(ResourceKind::Rack)
            .build()
            .unwrap();
        ResourceClassifier::new(registry)
    }

    #[test]
    fn canonical_names_round_trip_case_insensitively() {
        for kind in ResourceKind::ALL {
            assert_eq!(kind.as_str().parse::<ResourceKind>().unwrap(), kind);
            assert_eq!(kind.as_str().to_lowercase().parse::<ResourceKind>().unwrap(), kind);
        }
        assert_eq!("Virtual_Machine".parse::<ResourceKind>().unwrap(), ResourceKind::VirtualMachine);
    }

    #[test]
    fn unknown_type_tag_is_rejected() {
        let err = classifier().classify_name("mainframe").unwrap_err();
        assert_eq!(err.type_name, "mainframe");
        assert!(classifier().classify_name("PROJECTS").is_err());
        assert!(classifier().classify_name("").is_err());
    }

    #[test]
    fn registered_shapes_classify() {
        let c = classifier();
        assert_eq!(c.classify(&Widget).unwrap(), ResourceKind::Rack);
        assert_eq!(c.classify(&WidgetDraft).unwrap(), ResourceKind::Rack);
    }

    #[test]
    fn unregistered_shape_fails_loudly() {
        let err = classifier().classify(&Stranger).unwrap_err();
        assert!(err.type_name.ends_with("Stranger"), "got {}", err.type_name);
    }

    #[test]
    fn conflicting_registration_is_rejected_at_build() {
        let err = ResourceRegistry::builder()
            .register::<Widget>(ResourceKind::Rack)
            .register::<Widget>(ResourceKind::Router)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::ConflictingRegistration {
                existing: ResourceKind::Rack,
                requested: ResourceKind::Router,
                ..
            }
        ));
    }

    #[test]
    fn duplicate_identical_registration_is_idempotent() {
        let registry = ResourceRegistry::builder()
            .register::<Widget>(ResourceKind::Rack)
            .register::<Widget>(ResourceKind::Rack)
            .build()
            .unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.covered_kinds().into_iter().collect::<Vec<_>>(), vec![ResourceKind::Rack]);
    }
}
