use serde::Serialize;

use super::{Role, Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessReason {
    Unauthenticated,
    Forbidden,
    Ok,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AccessDecision {
    pub allowed: bool,
    pub reason: AccessReason,
}

impl AccessDecision {
    const fn deny(reason: AccessReason) -> Self {
        Self { allowed: false, reason }
    }

    const fn ok() -> Self {
        Self { allowed: true, reason: AccessReason::Ok }
    }
}

/// Decide whether a session may use an endpoint that allows `allowed`.
pub fn authorize(session: Option<&Session>, allowed: &[Role]) -> AccessDecision {
    let Some(session) = session.filter(|s| !s.id.trim().is_empty()) else {
        return AccessDecision::deny(AccessReason::Unauthenticated);
    };

    match session.role {
        Some(role) if allowed.contains(&role) => AccessDecision::ok(),
        _ => AccessDecision::deny(AccessReason::Forbidden),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EDITORIAL: &[Role] = &[Role::Admin, Role::Editor];

    #[test]
    fn no_session_is_unauthenticated() {
        let d = authorize(None, EDITORIAL);
        assert_eq!(d, AccessDecision { allowed: false, reason: AccessReason::Unauthenticated });
    }

    #[test]
    fn blank_identity_is_unauthenticated() {
        let s = Session::new("  ", Some(Role::Admin));
        assert_eq!(authorize(Some(&s), EDITORIAL).reason, AccessReason::Unauthenticated);
    }

    #[test]
    fn roles_outside_the_allow_list_are_forbidden() {
        for role in [Role::Reviewer, Role::Finance] {
            let s = Session::new("u1", Some(role));
            let d = authorize(Some(&s), EDITORIAL);
            assert!(!d.allowed);
            assert_eq!(d.reason, AccessReason::Forbidden);
        }
    }

    #[test]
    fn unrecognized_role_is_forbidden() {
        let s = Session::new("u1", None);
        assert_eq!(authorize(Some(&s), &Role::ALL).reason, AccessReason::Forbidden);
    }

    #[test]
    fn allow_listed_roles_pass() {
        for role in EDITORIAL {
            let s = Session::new("u1", Some(*role));
            assert_eq!(authorize(Some(&s), EDITORIAL), AccessDecision { allowed: true, reason: AccessReason::Ok });
        }
    }

    #[test]
    fn empty_allow_list_denies_everyone() {
        let s = Session::new("u1", Some(Role::Admin));
        assert_eq!(authorize(Some(&s), &[]).reason, AccessReason::Forbidden);
    }
}
