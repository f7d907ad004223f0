//! Closed role set.
//!
//! Roles are a closed enumeration rather than free-form strings so role-gate
//! call sites get exhaustiveness checking and unknown role names fail at
//! decode time instead of silently passing through.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// All roles the platform knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Engineer,
    Manager,
    Admin,
    Supervisor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Engineer => "engineer",
            Role::Manager => "manager",
            Role::Admin => "admin",
            Role::Supervisor => "supervisor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A set of roles, serialized as a JSON array of role names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleSet(BTreeSet<Role>);

impl RoleSet {
    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    /// True when the set shares at least one role with `required`.
    ///
    /// This is the role-gate rule: any overlap allows, empty intersection
    /// rejects.
    pub fn intersects(&self, required: &[Role]) -> bool {
        required.iter().any(|role| self.0.contains(role))
    }

}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersection_rule() {
        let roles = RoleSet::from_iter([Role::Engineer, Role::Manager]);
        assert!(roles.intersects(&[Role::Manager]));
        assert!(roles.intersects(&[Role::Admin, Role::Engineer]));
        assert!(!roles.intersects(&[Role::Admin]));
        assert!(!roles.intersects(&[]));
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let roles = RoleSet::from_iter([Role::Admin, Role::Engineer]);
        let json = serde_json::to_string(&roles).expect("serialize");
        assert_eq!(json, r#"["engineer","admin"]"#);

        let parsed: RoleSet = serde_json::from_str(r#"["supervisor"]"#).expect("deserialize");
        assert!(parsed.contains(Role::Supervisor));
    }

    #[test]
    fn unknown_role_name_is_rejected() {
        assert!(serde_json::from_str::<RoleSet>(r#"["root"]"#).is_err());
    }
}
