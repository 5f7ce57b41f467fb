//! Permission evaluation
//!
//! Deny-overrides evaluation of an already resolved ACL against a caller's
//! role set. An ACL with no matching entry denies.

use crate::access_control::types::{AccessControlList, AclEffect};
use crate::error::AccessDeniedError;
use tracing::trace;

/// Result of a permission check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// Access is allowed
    Allowed,
    /// Access is denied with a reason
    Denied(String),
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allowed)
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, AccessDecision::Denied(_))
    }
}

/// Check whether `action` is permitted for a caller holding `roles`
///
/// A matching deny entry short-circuits; a matching allow only records a
/// pending grant that a later deny can still revoke.
pub fn check_permission<R: AsRef<str>>(
    acl: &AccessControlList,
    action: &str,
    roles: &[R],
) -> AccessDecision {
    match require_permission(acl, action, roles) {
        Ok(()) => AccessDecision::Allowed,
        Err(denied) => AccessDecision::Denied(denied.reason),
    }
}

/// Boolean form of [`check_permission`]
pub fn is_permitted<R: AsRef<str>>(acl: &AccessControlList, action: &str, roles: &[R]) -> bool {
    require_permission(acl, action, roles).is_ok()
}

/// Check a permission, returning an error if denied
pub fn require_permission<R: AsRef<str>>(
    acl: &AccessControlList,
    action: &str,
    roles: &[R],
) -> Result<(), AccessDeniedError> {
    let mut granted = false;

    for entry in acl.iter().filter(|entry| entry.action == action) {
        if !roles.iter().any(|role| role.as_ref() == entry.role) {
            continue;
        }
        match entry.effect {
            AclEffect::Deny => {
                trace!(action, role = %entry.role, "Matched deny entry");
                return Err(AccessDeniedError::denied_by_rule(action, entry.role.as_str()));
            }
            AclEffect::Allow => {
                trace!(action, role = %entry.role, "Matched allow entry");
                granted = true;
            }
        }
    }

    if granted {
        Ok(())
    } else {
        Err(AccessDeniedError::no_matching_rule(action))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access_control::types::AccessControlEntry;

    fn acl(entries: &[AccessControlEntry]) -> AccessControlList {
        AccessControlList::from_entries(entries.to_vec())
    }

    #[test]
    fn test_empty_acl_denies() {
        let decision = check_permission(&AccessControlList::new(), "read", &["admin"]);
        assert!(decision.is_denied());
    }

    #[test]
    fn test_allow_matching_role() {
        let acl = acl(&[AccessControlEntry::allow("student", "read")]);
        assert!(is_permitted(&acl, "read", &["student"]));
        assert!(!is_permitted(&acl, "write", &["student"]));
        assert!(!is_permitted(&acl, "read", &["guest"]));
    }

    #[test]
    fn test_later_deny_overrides_earlier_allow() {
        let acl = acl(&[
            AccessControlEntry::allow("student", "read"),
            AccessControlEntry::deny("student", "read"),
        ]);
        assert!(!is_permitted(&acl, "read", &["student"]));
    }

    #[test]
    fn test_deny_on_any_held_role_wins() {
        let acl = acl(&[
            AccessControlEntry::allow("student", "read"),
            AccessControlEntry::deny("suspended", "read"),
        ]);
        assert!(is_permitted(&acl, "read", &["student"]));
        assert!(!is_permitted(&acl, "read", &["student", "suspended"]));
    }

    #[test]
    fn test_require_permission_reason() {
        let acl = acl(&[AccessControlEntry::deny("student", "write")]);
        let err = require_permission(&acl, "write", &["student".to_string()]).unwrap_err();
        assert_eq!(err.action, "write");
        assert!(err.reason.contains("student"));

        assert!(require_permission(&acl, "write", &["teacher"]).is_err());
    }

    #[test]
    fn test_decision_reasons_match_error_reasons() {
        let acl = acl(&[AccessControlEntry::deny("student", "write")]);

        assert_eq!(
            check_permission(&acl, "write", &["student"]),
            AccessDecision::Denied(AccessDeniedError::denied_by_rule("write", "student").reason)
        );
        assert_eq!(
            check_permission(&acl, "read", &["student"]),
            AccessDecision::Denied(AccessDeniedError::no_matching_rule("read").reason)
        );
    }
}
