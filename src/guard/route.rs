use std::sync::Arc;

use crate::access::evaluator::{Requirement, evaluate};
use crate::models::identity::SessionIdentity;
use crate::models::menu::MenuTree;
use crate::models::permission::Combinator;
use crate::services::menu::MenuService;
use crate::services::session::{AuthStatus, CredentialStore};

/// What a protected UI region should render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// The session is still being restored; render a loading state.
    Loading,
    /// No valid session; redirect to sign-in and come back afterwards.
    RedirectToSignIn {
        /// The originally requested location, for the post-login return.
        return_to: String,
    },
    /// Authenticated but not authorized. Rendered as a generic "not
    /// found" so probing users cannot map which resources exist.
    NotFound,
    /// Render the children.
    Allowed,
}

/// The requirements configured for one guarded region.
///
/// Evaluation order is fixed: permissions, then resource path, then
/// roles; the first configured rule that denies wins. A rule with nothing
/// configured allows any authenticated session.
#[derive(Debug, Clone, Default)]
pub struct GuardRule {
    permissions: Option<(Vec<String>, Combinator)>,
    resource_path: Option<String>,
    roles: Option<Vec<String>>,
}

impl GuardRule {
    /// A rule with no requirements.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires one permission.
    pub fn permission(self, required: impl Into<String>) -> Self {
        self.permissions(vec![required.into()], Combinator::Any)
    }

    /// Requires a permission list with the given combinator.
    pub fn permissions(mut self, required: Vec<String>, combinator: Combinator) -> Self {
        self.permissions = Some((required, combinator));
        self
    }

    /// Requires a resource path to be reachable.
    pub fn resource_path(mut self, path: impl Into<String>) -> Self {
        self.resource_path = Some(path.into());
        self
    }

    /// Requires one of the given roles. Advisory only; see
    /// [`Requirement::Roles`].
    pub fn roles(mut self, roles: Vec<String>) -> Self {
        self.roles = Some(roles);
        self
    }
}

/// Wraps protected UI regions and decides what renders.
pub struct RouteGuard {
    session: Arc<CredentialStore>,
    menu: Arc<MenuService>,
}

impl RouteGuard {
    /// Creates a guard over the given stores.
    pub fn new(session: Arc<CredentialStore>, menu: Arc<MenuService>) -> Self {
        Self { session, menu }
    }

    /// Evaluates `rule` for the region at `requested_location`.
    ///
    /// Deterministic for fixed session/menu state: repeated evaluation
    /// yields the same outcome, with no intermediate "forbidden" state.
    pub fn evaluate(&self, requested_location: &str, rule: &GuardRule) -> GuardOutcome {
        let identity = self.session.identity();
        let menu = self.menu.current();
        decide(
            self.session.status(),
            self.session.has_token(),
            identity.as_ref(),
            menu.as_deref(),
            rule,
            requested_location,
        )
    }
}

/// The guard's decision core, pure over its inputs.
fn decide(
    status: AuthStatus,
    has_token: bool,
    identity: Option<&SessionIdentity>,
    menu: Option<&MenuTree>,
    rule: &GuardRule,
    requested_location: &str,
) -> GuardOutcome {
    match status {
        AuthStatus::Unknown | AuthStatus::Restoring => return GuardOutcome::Loading,
        AuthStatus::Unauthenticated => {
            return GuardOutcome::RedirectToSignIn {
                return_to: requested_location.to_string(),
            };
        }
        AuthStatus::Authenticated => {}
    }

    let Some(identity) = identity else {
        return GuardOutcome::RedirectToSignIn {
            return_to: requested_location.to_string(),
        };
    };
    if !has_token {
        return GuardOutcome::RedirectToSignIn {
            return_to: requested_location.to_string(),
        };
    }

    if let Some((required, combinator)) = &rule.permissions {
        let requirement = Requirement::Permissions {
            required: required.clone(),
            combinator: *combinator,
        };
        if !evaluate(identity, menu, &requirement) {
            return GuardOutcome::NotFound;
        }
    }

    if let Some(path) = &rule.resource_path {
        if !evaluate(identity, menu, &Requirement::ResourcePath(path.clone())) {
            return GuardOutcome::NotFound;
        }
    }

    if let Some(roles) = &rule.roles {
        if !evaluate(identity, menu, &Requirement::Roles(roles.clone())) {
            return GuardOutcome::NotFound;
        }
    }

    GuardOutcome::Allowed
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

    #[test]
    fn restoring_session_renders_loading() {
        let outcome = decide(
            AuthStatus::Restoring,
            true,
            None,
            None,
            &GuardRule::new(),
            "/grades",
        );
        assert_eq!(outcome, GuardOutcome::Loading);
    }

    #[test]
    fn missing_token_redirects_and_remembers_location() {
        let id = identity("admin", &["*"]);
        for (status, has_token) in [
            (AuthStatus::Unauthenticated, false),
            (AuthStatus::Authenticated, false),
        ] {
            let outcome = decide(
                status,
                has_token,
                Some(&id),
                None,
                &GuardRule::new().permission("student.view"),
                "/student/grades",
            );
            assert_eq!(
                outcome,
                GuardOutcome::RedirectToSignIn {
                    return_to: "/student/grades".to_string()
                }
            );
        }
    }

    #[test]
    fn no_configured_rules_allows_authenticated() {
        let id = identity("student", &[]);
        let outcome = decide(
            AuthStatus::Authenticated,
            true,
            Some(&id),
            None,
            &GuardRule::new(),
            "/",
        );
        assert_eq!(outcome, GuardOutcome::Allowed);
    }

    #[test]
    fn denied_permission_renders_not_found() {
        let id = identity("student", &["student.view"]);
        let outcome = decide(
            AuthStatus::Authenticated,
            true,
            Some(&id),
            None,
            &GuardRule::new().permission("finance.view"),
            "/finance",
        );
        assert_eq!(outcome, GuardOutcome::NotFound);
    }

    #[test]
    fn denial_is_idempotent_under_repeated_evaluation() {
        let id = identity("student", &[]);
        let rule = GuardRule::new().permission("finance.view");
        let first = decide(AuthStatus::Authenticated, true, Some(&id), None, &rule, "/finance");
        for _ in 0..3 {
            let again =
                decide(AuthStatus::Authenticated, true, Some(&id), None, &rule, "/finance");
            assert_eq!(again, first);
        }
        assert_eq!(first, GuardOutcome::NotFound);
    }

    #[test]
    fn first_configured_denial_short_circuits() {
        // Permission rule denies; the role rule would have allowed.
        let id = identity("dean", &[]);
        let rule = GuardRule::new()
            .permission("finance.view")
            .roles(vec!["dean".to_string()]);
        let outcome = decide(AuthStatus::Authenticated, true, Some(&id), None, &rule, "/x");
        assert_eq!(outcome, GuardOutcome::NotFound);
    }

    #[test]
    fn all_configured_rules_must_pass() {
        let id = identity("dean", &["finance.*"]);
        let menu = crate::models::menu::MenuTree::new(vec![crate::models::menu::MenuNode {
            path: "/finance".to_string(),
            label: String::new(),
            permissions: Vec::new(),
            children: Vec::new(),
        }]);
        let rule = GuardRule::new()
            .permission("finance.view")
            .resource_path("/finance")
            .roles(vec!["dean".to_string()]);
        let outcome =
            decide(AuthStatus::Authenticated, true, Some(&id), Some(&menu), &rule, "/finance");
        assert_eq!(outcome, GuardOutcome::Allowed);
    }
}
