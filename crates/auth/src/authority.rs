//! Authority strings derived from a principal's role.
//!
//! Authorities are computed, never persisted:
//! - `ROLE_<ROLE>` for the role itself
//! - `<KIND>_<ACTION>_<KIND>` for every permission the role carries

use std::collections::BTreeSet;

use serde::Serialize;

use crate::{Action, ResourceKind, Role, RoleName};

/// One granted capability, compared by exact string equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Authority(String);

impl Authority {
    pub fn role(name: RoleName) -> Self {
        Self(format!("ROLE_{name}"))
    }

    pub fn permission(action: &Action, kind: ResourceKind) -> Self {
        Self(format!("{kind}_{action}_{kind}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Authority {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Flat set of authorities granted to one authenticated principal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AuthoritySet(BTreeSet<Authority>);

impl AuthoritySet {
    pub fn contains(&self, authority: &Authority) -> bool {
        self.0.contains(authority)
    }

    pub fn is_root(&self) -> bool {
        self.contains(&Authority::role(RoleName::Root))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Authority> {
        self.0.iter()
    }
}

impl FromIterator<Authority> for AuthoritySet {
    fn from_iter<I: IntoIterator<Item = Authority>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Expand a role into its authority set.
pub fn derive(role: &Role) -> AuthoritySet {
    std::iter::once(Authority::role(role.name))
        .chain(
            role.permissions
                .iter()
                .map(|p| Authority::permission(&p.action, p.kind)),
        )
        .collect()
}
