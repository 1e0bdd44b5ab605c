//! Strongly-typed identifiers for inventory records.
//!
//! Records are keyed by positive 64-bit database sequence numbers.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $t:ident, $name:literal) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $t(i64);

        impl $t {
            pub fn new(raw: i64) -> Result<Self, DomainError> {
                if raw <= 0 {
                    return Err(DomainError::invalid_id(format!(
                        "{}: must be positive, got {}",
                        $name, raw
                    )));
                }
                Ok(Self(raw))
            }

            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<$t> for i64 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let raw = s
                    .trim()
                    .parse::<i64>()
                    .map_err(|e| DomainError::invalid_id(format!("{}: {}", $name, e)))?;
                Self::new(raw)
            }
        }
    };
}

numeric_id!(
    /// Identifier of a project.
    ProjectId, "ProjectId"
);
numeric_id!(
    /// Identifier of a physical location (data center, room).
    LocationId, "LocationId"
);
numeric_id!(RackId, "RackId");
numeric_id!(
    /// Identifier shared by every host family (baremetal, VMs, network gear).
    HostId, "HostId"
);
numeric_id!(UserId, "UserId");
numeric_id!(RoleId, "RoleId");
numeric_id!(PermissionId, "PermissionId");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_positive_ids() {
        let id: ProjectId = "42".parse().unwrap();
        assert_eq!(id.get(), 42);
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn rejects_zero_negative_and_garbage() {
        assert!(matches!("0".parse::<RackId>(), Err(DomainError::InvalidId(_))));
        assert!(matches!("-3".parse::<HostId>(), Err(DomainError::InvalidId(_))));
        assert!(matches!("abc".parse::<UserId>(), Err(DomainError::InvalidId(_))));
    }
}
