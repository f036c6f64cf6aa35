//! Authorization rule table
//!
//! Static ordered list of (HTTP method, path pattern, access requirement)
//! tuples evaluated first-match-wins; anything not covered by a rule is
//! allowed unauthenticated. Patterns support `{param}` for a single
//! segment and a trailing `**` for any remainder.

use axum::http::Method;

use crate::domain::{ROLE_ADMIN, ROLE_USER};

/// Access requirement attached to a matched rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// Caller must hold at least one of these authorities.
    AnyAuthority(&'static [&'static str]),
    /// No authentication required.
    PermitAll,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(&'static str),
    Param,
    Rest,
}

/// A parsed path pattern such as `/v1/user/{id}` or `/v1/user/toggle-user/**`.
#[derive(Debug, Clone)]
pub struct PathPattern {
    segments: Vec<Segment>,
}

impl PathPattern {
    fn parse(pattern: &'static str) -> Self {
        let segments = pattern
            .trim_start_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| match s {
                "**" => Segment::Rest,
                s if s.starts_with('{') && s.ends_with('}') => Segment::Param,
                s => Segment::Literal(s),
            })
            .collect();
        Self { segments }
    }

    fn matches(&self, path: &str) -> bool {
        let mut actual = path
            .trim_start_matches('/')
            .split('/')
            .filter(|s| !s.is_empty());

        for segment in &self.segments {
            match segment {
                // `**` swallows whatever remains, including nothing.
                Segment::Rest => return true,
                Segment::Param => {
                    if actual.next().is_none() {
                        return false;
                    }
                }
                Segment::Literal(expected) => {
                    if actual.next() != Some(expected) {
                        return false;
                    }
                }
            }
        }

        actual.next().is_none()
    }
}

pub struct AccessRule {
    method: Method,
    pattern: PathPattern,
    access: Access,
}

impl AccessRule {
    fn new(method: Method, pattern: &'static str, access: Access) -> Self {
        Self {
            method,
            pattern: PathPattern::parse(pattern),
            access,
        }
    }
}

/// The ordered rule table. Order matters: `/v1/user/all-users` must be
/// decided before the `/v1/user/{id}` wildcard would swallow it.
pub struct AccessRules {
    rules: Vec<AccessRule>,
}

const ADMIN_ONLY: &[&str] = &[ROLE_ADMIN];
const USER_OR_ADMIN: &[&str] = &[ROLE_USER, ROLE_ADMIN];

impl AccessRules {
    pub fn standard() -> Self {
        Self {
            rules: vec![
                AccessRule::new(
                    Method::GET,
                    "/v1/user/all-users",
                    Access::AnyAuthority(ADMIN_ONLY),
                ),
                AccessRule::new(
                    Method::GET,
                    "/v1/user/{id}",
                    Access::AnyAuthority(USER_OR_ADMIN),
                ),
                AccessRule::new(
                    Method::POST,
                    "/v1/user/toggle-user/**",
                    Access::AnyAuthority(ADMIN_ONLY),
                ),
            ],
        }
    }

    /// First matching rule governs; no match means permit.
    pub fn decide(&self, method: &Method, path: &str) -> &Access {
        self.rules
            .iter()
            .find(|rule| rule.method == *method && rule.pattern.matches(path))
            .map(|rule| &rule.access)
            .unwrap_or(&Access::PermitAll)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_users_requires_admin() {
        let rules = AccessRules::standard();
        assert_eq!(
            rules.decide(&Method::GET, "/v1/user/all-users"),
            &Access::AnyAuthority(ADMIN_ONLY)
        );
    }

    #[test]
    fn user_by_id_allows_user_or_admin() {
        let rules = AccessRules::standard();
        assert_eq!(
            rules.decide(&Method::GET, "/v1/user/42"),
            &Access::AnyAuthority(USER_OR_ADMIN)
        );
    }

    #[test]
    fn all_users_is_not_swallowed_by_id_wildcard() {
        // Both patterns match the path; the earlier, stricter rule wins.
        let rules = AccessRules::standard();
        assert_ne!(
            rules.decide(&Method::GET, "/v1/user/all-users"),
            &Access::AnyAuthority(USER_OR_ADMIN)
        );
    }

    #[test]
    fn toggle_user_and_subpaths_require_admin() {
        let rules = AccessRules::standard();
        assert_eq!(
            rules.decide(&Method::POST, "/v1/user/toggle-user/42"),
            &Access::AnyAuthority(ADMIN_ONLY)
        );
        assert_eq!(
            rules.decide(&Method::POST, "/v1/user/toggle-user/42/extra"),
            &Access::AnyAuthority(ADMIN_ONLY)
        );
        assert_eq!(
            rules.decide(&Method::POST, "/v1/user/toggle-user"),
            &Access::AnyAuthority(ADMIN_ONLY)
        );
    }

    #[test]
    fn everything_else_is_permitted() {
        let rules = AccessRules::standard();
        assert_eq!(rules.decide(&Method::POST, "/v1/user"), &Access::PermitAll);
        assert_eq!(
            rules.decide(&Method::POST, "/v1/auth/login"),
            &Access::PermitAll
        );
        assert_eq!(rules.decide(&Method::GET, "/health"), &Access::PermitAll);
        // Method must match, not just the path.
        assert_eq!(
            rules.decide(&Method::POST, "/v1/user/all-users"),
            &Access::PermitAll
        );
    }

    #[test]
    fn trailing_slash_is_tolerated() {
        let rules = AccessRules::standard();
        assert_eq!(
            rules.decide(&Method::GET, "/v1/user/all-users/"),
            &Access::AnyAuthority(ADMIN_ONLY)
        );
    }
}
