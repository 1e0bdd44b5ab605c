//! User, role and permission records as managed through the API.
//!
//! These are the administrable shapes; the auth core works on the resolved
//! [`Principal`](inventra_auth::Principal) instead.

use serde::{Deserialize, Serialize};

use inventra_auth::{Action, ResourceKind, RoleName};
use inventra_core::{Entity, PermissionId, RoleId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub role_id: RoleId,
    pub active: bool,
    pub blocked: bool,
}

impl Entity for UserAccount {
    type Id = UserId;

    fn id(&self) -> UserId {
        self.id
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role_id: RoleId,
}

impl core::fmt::Debug for CreateUserRequest {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CreateUserRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("role_id", &self.role_id)
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role_id: Option<RoleId>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub blocked: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRecord {
    pub id: RoleId,
    pub name: RoleName,
    pub permission_ids: Vec<PermissionId>,
}

impl Entity for RoleRecord {
    type Id = RoleId;

    fn id(&self) -> RoleId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRoleRequest {
    pub name: RoleName,
    #[serde(default)]
    pub permission_ids: Vec<PermissionId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRoleRequest {
    #[serde(default)]
    pub permission_ids: Option<Vec<PermissionId>>,
}

/// Stored under a unique `name`; conceptually unique by `(action, kind)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRecord {
    pub id: PermissionId,
    pub name: String,
    pub action: Action,
    pub kind: ResourceKind,
}

impl Entity for PermissionRecord {
    type Id = PermissionId;

    fn id(&self) -> PermissionId {
        self.id
    }
}

impl PermissionRecord {
    pub fn to_permission(&self) -> inventra_auth::Permission {
        inventra_auth::Permission::new(self.action.clone(), self.kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePermissionRequest {
    pub name: String,
    pub action: Action,
    pub kind: ResourceKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatePermissionRequest {
    #[serde(default)]
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_user_request_debug_hides_password() {
        let req = CreateUserRequest {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "s3cret".to_string(),
            role_id: RoleId::new(1).unwrap(),
        };
        assert!(!format!("{req:?}").contains("s3cret"));
    }

    #[test]
    fn permission_record_deserializes_canonical_names() {
        let record: PermissionRecord = serde_json::from_value(serde_json::json!({
            "id": 9,
            "name": "rack-read",
            "action": "READ",
            "kind": "RACK",
        }))
        .unwrap();
        assert_eq!(
            record.to_permission(),
            inventra_auth::Permission::new(Action::READ, ResourceKind::Rack)
        );
    }
}
