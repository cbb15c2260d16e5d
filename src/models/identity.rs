use serde::{Deserialize, Serialize};

use super::permission::PermissionSet;

/// The numeric user id assigned by the backend.
pub type UserId = i64;

/// A backend role, e.g. `admin`, `dean`, `teacher`, `student`.
///
/// Compared exactly, case-preserving. Role checks are a UX convenience —
/// they run entirely client-side and are trivially bypassable; the backend
/// re-validates everything that matters when data calls execute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(pub String);

impl Role {
    /// Creates a role from its wire name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the wire name of this role.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this role is one of `accepted`.
    pub fn is_one_of(&self, accepted: &[&str]) -> bool {
        accepted.iter().any(|r| *r == self.0)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether an account is staff-like or student-like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Teachers, deans, administrative staff.
    Employee,
    /// Students.
    Student,
}

/// The identity of the currently signed-in user.
///
/// Present if and only if a session token is present; absence of either
/// means "unauthenticated". Replaced wholesale, never patched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionIdentity {
    /// The numeric user id.
    pub id: UserId,
    /// The display name, localized by the backend for the active locale.
    pub name: String,
    /// The backend role.
    pub role: Role,
    /// Staff-like or student-like account.
    pub account_type: AccountType,
    /// Granted permission strings embedded in the session, when the
    /// backend includes them.
    #[serde(default)]
    pub permissions: Option<Vec<String>>,
    /// Whether the account is active.
    pub active: bool,
}

impl SessionIdentity {
    /// Returns the identity's permission claims as a `PermissionSet`.
    ///
    /// An identity without embedded claims yields an empty set, which
    /// denies everything — the fetched menu tree is the second, independent
    /// source for resource-path checks.
    pub fn permission_set(&self) -> PermissionSet {
        PermissionSet::new(self.permissions.clone().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_membership_is_exact() {
        let role = Role::new("teacher");
        assert!(role.is_one_of(&["teacher", "dean"]));
        assert!(!role.is_one_of(&["Teacher"]));
        assert!(!role.is_one_of(&["student"]));
    }

    #[test]
    fn missing_claims_deny() {
        let identity = SessionIdentity {
            id: 7,
            name: "Aziz Karimov".to_string(),
            role: Role::new("student"),
            account_type: AccountType::Student,
            permissions: None,
            active: true,
        };
        assert!(!identity.permission_set().allows("student.view"));
    }

    #[test]
    fn identity_deserializes_with_defaults() {
        let json = r#"{
            "id": 42,
            "name": "Dilnoza Rahimova",
            "role": "dean",
            "account_type": "employee",
            "active": true
        }"#;
        let identity: SessionIdentity = sonic_rs::from_str(json).unwrap();
        assert_eq!(identity.id, 42);
        assert_eq!(identity.role.as_str(), "dean");
        assert_eq!(identity.account_type, AccountType::Employee);
        assert!(identity.permissions.is_none());
    }
}
