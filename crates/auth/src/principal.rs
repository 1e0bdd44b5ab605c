use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::ResourceKind;

/// Action name carried by a permission (e.g. `"READ"`).
///
/// Actions are opaque at this layer and compared byte-for-byte; no case folding
/// and no wildcard expansion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Action(Cow<'static, str>);

impl Action {
    pub const READ: Action = Action(Cow::Borrowed("READ"));
    pub const WRITE: Action = Action(Cow::Borrowed("WRITE"));
    pub const DELETE: Action = Action(Cow::Borrowed("DELETE"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Closed set of role names.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoleName {
    /// Bypasses every permission check.
    Root,
    Admin,
    Viewer,
}

impl RoleName {
    pub fn as_str(self) -> &'static str {
        match self {
            RoleName::Root => "ROOT",
            RoleName::Admin => "ADMIN",
            RoleName::Viewer => "VIEWER",
        }
    }
}

impl core::fmt::Display for RoleName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An (action, resource kind) capability.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permission {
    pub action: Action,
    pub kind: ResourceKind,
}

impl Permission {
    pub fn new(action: Action, kind: ResourceKind) -> Self {
        Self { action, kind }
    }
}

/// A named bundle of permissions. Each principal holds exactly one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub name: RoleName,
    pub permissions: Vec<Permission>,
}

impl Role {
    pub fn new(name: RoleName, permissions: Vec<Permission>) -> Self {
        Self { name, permissions }
    }

    pub fn is_root(&self) -> bool {
        self.name == RoleName::Root
    }
}

/// Whether an account may authenticate at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountState {
    Active,
    /// `active` flag is off.
    Disabled,
    /// `blocked` flag is on. Takes precedence over `Disabled`.
    Locked,
}

/// Identity record resolved from a token subject.
///
/// Owned by the principal store; the auth core only reads it.
#[derive(Clone, PartialEq, Eq)]
pub struct Principal {
    pub username: String,
    password_hash: String,
    pub active: bool,
    pub blocked: bool,
    pub role: Role,
}

impl Principal {
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
            active: true,
            blocked: false,
            role,
        }
    }

    pub fn with_flags(mut self, active: bool, blocked: bool) -> Self {
        self.active = active;
        self.blocked = blocked;
        self
    }

    /// Stored credential hash, for login verification only.
    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn account_state(&self) -> AccountState {
        if self.blocked {
            AccountState::Locked
        } else if !self.active {
            AccountState::Disabled
        } else {
            AccountState::Active
        }
    }
}

impl core::fmt::Debug for Principal {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Principal")
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .field("active", &self.active)
            .field("blocked", &self.blocked)
            .field("role", &self.role)
            .finish()
    }
}
