use serde::{Deserialize, Serialize};

/// The super-wildcard permission that grants everything.
pub const SUPER_WILDCARD: &str = "*";

/// How a list of required permissions combines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Combinator {
    /// At least one member must be granted.
    #[default]
    Any,
    /// Every member must be granted.
    All,
}

/// The set of permission strings granted to a caller.
///
/// Permissions are opaque `<resource>.<action>` strings. The wildcard
/// forms `<resource>.*` and `*` grant a whole resource or everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet {
    grants: Vec<String>,
}

impl PermissionSet {
    /// Creates a set from granted permission strings.
    pub fn new(grants: Vec<String>) -> Self {
        Self { grants }
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }

    /// Checks a single required permission against this set.
    ///
    /// Grant order: super-wildcard, exact match, then `<resource>.*` where
    /// the resource is everything before the FIRST `.` of the requirement.
    /// No case normalization.
    pub fn allows(&self, required: &str) -> bool {
        if self.grants.iter().any(|g| g == SUPER_WILDCARD) {
            return true;
        }
        if self.grants.iter().any(|g| g == required) {
            return true;
        }
        if let Some((resource, _)) = required.split_once('.') {
            let resource_wildcard = format!("{}.*", resource);
            if self.grants.iter().any(|g| *g == resource_wildcard) {
                return true;
            }
        }
        false
    }

    /// Checks a list of required permissions with the given combinator.
    pub fn allows_with(&self, required: &[String], combinator: Combinator) -> bool {
        match combinator {
            Combinator::Any => required.iter().any(|p| self.allows(p)),
            Combinator::All => required.iter().all(|p| self.allows(p)),
        }
    }
}

impl From<Vec<String>> for PermissionSet {
    fn from(grants: Vec<String>) -> Self {
        Self::new(grants)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(grants: &[&str]) -> PermissionSet {
        PermissionSet::new(grants.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn super_wildcard_grants_everything() {
        let s = set(&["*"]);
        assert!(s.allows("student.create"));
        assert!(s.allows("anything.at.all"));
        assert!(s.allows("no-dot-at-all"));
    }

    #[test]
    fn exact_match_grants() {
        let s = set(&["student.create"]);
        assert!(s.allows("student.create"));
        assert!(!s.allows("student.delete"));
    }

    #[test]
    fn resource_wildcard_grants_resource_actions_only() {
        let s = set(&["student.*"]);
        assert!(s.allows("student.create"));
        assert!(s.allows("student.view"));
        assert!(!s.allows("teacher.create"));
    }

    #[test]
    fn resource_split_uses_first_dot() {
        // "teacher.subject.view" belongs to resource "teacher".
        let s = set(&["teacher.*"]);
        assert!(s.allows("teacher.subject.view"));
    }

    #[test]
    fn dotless_requirement_needs_exact_or_super() {
        let s = set(&["dashboard.*"]);
        assert!(!s.allows("dashboard"));
        assert!(set(&["dashboard"]).allows("dashboard"));
    }

    #[test]
    fn empty_set_denies() {
        assert!(!set(&[]).allows("student.view"));
    }

    #[test]
    fn any_combinator_needs_one_grant() {
        let s = set(&["a.view"]);
        let required = vec!["a.view".to_string(), "b.view".to_string()];
        assert!(s.allows_with(&required, Combinator::Any));
        assert!(!s.allows_with(&required, Combinator::All));
    }

    #[test]
    fn all_combinator_needs_every_grant() {
        let s = set(&["a.view", "b.*"]);
        let required = vec!["a.view".to_string(), "b.view".to_string()];
        assert!(s.allows_with(&required, Combinator::All));
    }

    #[test]
    fn no_case_normalization() {
        let s = set(&["Student.*"]);
        assert!(!s.allows("student.create"));
    }
}
