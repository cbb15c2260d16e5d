use crate::models::identity::SessionIdentity;
use crate::models::menu::MenuTree;
use crate::models::permission::Combinator;

/// What a guarded region requires.
#[derive(Debug, Clone)]
pub enum Requirement {
    /// One or more permission strings, combined with ANY or ALL.
    Permissions {
        /// The required permission strings.
        required: Vec<String>,
        /// How the list combines. ANY by default.
        combinator: Combinator,
    },
    /// A resource path that must be reachable for the caller.
    ResourcePath(String),
    /// Acceptable roles. Advisory only — evaluated entirely client-side
    /// and trivially bypassable; exists to avoid flashing disallowed UI,
    /// never to stop a determined user. True enforcement happens on the
    /// backend when the underlying data calls execute.
    Roles(Vec<String>),
}

impl Requirement {
    /// A single-permission requirement.
    pub fn permission(required: impl Into<String>) -> Self {
        Requirement::Permissions {
            required: vec![required.into()],
            combinator: Combinator::Any,
        }
    }

    /// A permission-list requirement with ANY semantics.
    pub fn any_of(required: Vec<String>) -> Self {
        Requirement::Permissions {
            required,
            combinator: Combinator::Any,
        }
    }

    /// A permission-list requirement with ALL semantics.
    pub fn all_of(required: Vec<String>) -> Self {
        Requirement::Permissions {
            required,
            combinator: Combinator::All,
        }
    }

    /// A resource-path requirement.
    pub fn path(path: impl Into<String>) -> Self {
        Requirement::ResourcePath(path.into())
    }

    /// A role-list requirement.
    pub fn roles(roles: Vec<String>) -> Self {
        Requirement::Roles(roles)
    }
}

/// Decides allow/deny for one requirement against the current session.
///
/// Pure: no side effects, no caching beyond what the inputs carry. The
/// menu tree is the second, independent source for resource-path checks;
/// either source granting is enough.
pub fn evaluate(
    identity: &SessionIdentity,
    menu: Option<&MenuTree>,
    requirement: &Requirement,
) -> bool {
    match requirement {
        Requirement::Permissions { required, combinator } => identity
            .permission_set()
            .allows_with(required, *combinator),

        Requirement::ResourcePath(path) => {
            let via_claims = identity.permission_set().allows(&path_permission_key(path));
            let via_menu = menu.map(|tree| tree.contains_path(path)).unwrap_or(false);
            if via_claims != via_menu {
                // The two sources rarely disagree; when they do it usually
                // means a stale menu cache. Keep the OR contract.
                tracing::debug!(
                    "🔎 Path {} resolved by {} only",
                    path,
                    if via_claims { "claims" } else { "menu" }
                );
            }
            via_claims || via_menu
        }

        Requirement::Roles(accepted) => {
            let accepted: Vec<&str> = accepted.iter().map(String::as_str).collect();
            identity.role.is_one_of(&accepted)
        }
    }
}

/// Maps a resource path onto the permission key checked against the
/// identity's claims: `/student/create` checks `student.create`.
fn path_permission_key(path: &str) -> String {
    path.trim_matches('/').replace('/', ".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::identity::{AccountType, Role};

    fn identity(role: &str, permissions: &[&str]) -> SessionIdentity {
        SessionIdentity {
            id: 1,
            name: "Test User".to_string(),
            role: Role::new(role),
            account_type: AccountType::Employee,
            permissions: Some(permissions.iter().map(|s| s.to_string()).collect()),
            active: true,
        }
    }

    fn menu_with(paths: &[&str]) -> MenuTree {
        use crate::models::menu::MenuNode;
        MenuTree::new(
            paths
                .iter()
                .map(|p| MenuNode {
                    path: p.to_string(),
                    label: String::new(),
                    permissions: Vec::new(),
                    children: Vec::new(),
                })
                .collect(),
        )
    }

    #[test]
    fn permission_requirement_follows_wildcard_rules() {
        let id = identity("teacher", &["student.*"]);
        assert!(evaluate(&id, None, &Requirement::permission("student.create")));
        assert!(!evaluate(&id, None, &Requirement::permission("teacher.create")));
    }

    #[test]
    fn any_vs_all_combinators() {
        let id = identity("teacher", &["a.view"]);
        let list = vec!["a.view".to_string(), "b.view".to_string()];
        assert!(evaluate(&id, None, &Requirement::any_of(list.clone())));
        assert!(!evaluate(&id, None, &Requirement::all_of(list)));
    }

    #[test]
    fn path_granted_by_claims_alone() {
        let id = identity("teacher", &["student.*"]);
        assert!(evaluate(&id, None, &Requirement::path("/student/create")));
    }

    #[test]
    fn path_granted_by_menu_alone() {
        let id = identity("teacher", &[]);
        let menu = menu_with(&["/reports"]);
        assert!(evaluate(&id, Some(&menu), &Requirement::path("/reports")));
    }

    #[test]
    fn path_denied_by_both_sources() {
        let id = identity("teacher", &[]);
        let menu = menu_with(&["/reports"]);
        assert!(!evaluate(&id, Some(&menu), &Requirement::path("/finance")));
    }

    #[test]
    fn role_requirement_is_exact_membership() {
        let id = identity("dean", &[]);
        let req = Requirement::roles(vec!["dean".to_string(), "admin".to_string()]);
        assert!(evaluate(&id, None, &req));
        let req = Requirement::roles(vec!["student".to_string()]);
        assert!(!evaluate(&id, None, &req));
    }

    #[test]
    fn role_check_is_advisory_and_bypassable_in_process() {
        // The role gate is plain client-side data: editing the in-memory
        // identity flips the outcome. Permission checks stay the
        // authoritative client mirror of the backend's enforcement.
        let mut id = identity("student", &[]);
        let req = Requirement::roles(vec!["admin".to_string()]);
        assert!(!evaluate(&id, None, &req));

        id.role = Role::new("admin");
        assert!(evaluate(&id, None, &req));

        // Tampering with the role does not widen permission grants.
        assert!(!evaluate(&id, None, &Requirement::permission("finance.view")));
    }

    #[test]
    fn path_key_mapping_trims_and_joins() {
        assert_eq!(path_permission_key("/student/create"), "student.create");
        assert_eq!(path_permission_key("student/create/"), "student.create");
        assert_eq!(path_permission_key("/dashboard"), "dashboard");
    }
}
