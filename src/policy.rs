//! Route-level role gate.
//!
//! A static table of `(method, pattern) -> Access`, built once at startup and
//! shared read-only. Rules are sorted by specificity when the table is built,
//! so a narrow public sub-path is always checked before a broad protected
//! prefix no matter in which order the rules were written.
//!
//! Pattern syntax:
//! - `/api/v1/lands` literal segments, exact match
//! - `/api/v1/lands/{id}` `{name}` (or `*`) matches exactly one segment
//! - `/api/v1/lands/**` trailing `**` matches the prefix itself and anything below

use std::cmp::Reverse;
use std::collections::BTreeSet;

use axum::http::Method;

use crate::error::AccessError;
use crate::identity::{AuthCtx, Role};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// Allowed regardless of identity, including anonymous callers.
    Public,
    /// Any valid identity.
    Authenticated,
    /// Identity must hold at least one of these roles.
    AnyRole(BTreeSet<Role>),
}

impl Access {
    pub fn roles(roles: impl IntoIterator<Item = Role>) -> Self {
        Access::AnyRole(roles.into_iter().collect())
    }

    /// Decide for a (possibly anonymous) caller.
    pub fn check(&self, identity: Option<&AuthCtx>) -> Result<(), AccessError> {
        match (self, identity) {
            (Access::Public, _) => Ok(()),
            (_, None) => Err(AccessError::Unauthorized),
            (Access::Authenticated, Some(_)) => Ok(()),
            (Access::AnyRole(required), Some(ctx)) => {
                if ctx.has_any_role(required) {
                    Ok(())
                } else {
                    Err(AccessError::MissingRole)
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param,
}

#[derive(Debug, Clone)]
struct Pattern {
    raw: String,
    segments: Vec<Segment>,
    // trailing `/**`
    prefix: bool,
}

impl Pattern {
    fn parse(raw: &str) -> Self {
        let mut parts: Vec<&str> = split_path(raw).collect();
        let prefix = parts.last() == Some(&"**");
        if prefix {
            parts.pop();
        }

        let segments = parts
            .into_iter()
            .map(|p| {
                if p == "*" || p == "**" || (p.starts_with('{') && p.ends_with('}')) {
                    Segment::Param
                } else {
                    Segment::Literal(p.to_string())
                }
            })
            .collect();

        Self {
            raw: raw.to_string(),
            segments,
            prefix,
        }
    }

    fn matches(&self, path: &str) -> bool {
        let path: Vec<&str> = split_path(path).collect();

        let len_ok = if self.prefix {
            path.len() >= self.segments.len()
        } else {
            path.len() == self.segments.len()
        };

        len_ok
            && self.segments.iter().zip(&path).all(|(seg, part)| match seg {
                Segment::Literal(lit) => lit == part,
                Segment::Param => true,
            })
    }

    fn literal_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Literal(_)))
            .count()
    }

    fn param_count(&self) -> usize {
        self.segments.len() - self.literal_count()
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

#[derive(Debug, Clone)]
pub struct Rule {
    method: Option<Method>,
    pattern: Pattern,
    access: Access,
}

impl Rule {
    /// `method = None` matches every method.
    pub fn new(method: Option<Method>, pattern: &str, access: Access) -> Self {
        Self {
            method,
            pattern: Pattern::parse(pattern),
            access,
        }
    }

    pub fn get(pattern: &str, access: Access) -> Self {
        Self::new(Some(Method::GET), pattern, access)
    }

    pub fn post(pattern: &str, access: Access) -> Self {
        Self::new(Some(Method::POST), pattern, access)
    }

    pub fn any(pattern: &str, access: Access) -> Self {
        Self::new(None, pattern, access)
    }

    pub fn pattern(&self) -> &str {
        &self.pattern.raw
    }

    fn matches(&self, method: &Method, path: &str) -> bool {
        let method_ok = match &self.method {
            None => true,
            // HEAD is served by GET handlers, so it follows GET rules.
            Some(m) => m == method || (*m == Method::GET && *method == Method::HEAD),
        };
        method_ok && self.pattern.matches(path)
    }

    // Smaller sorts first: exact before `/**`, fewer params, more literals,
    // method-specific before any-method.
    fn specificity(&self) -> (bool, usize, Reverse<usize>, bool) {
        (
            self.pattern.prefix,
            self.pattern.param_count(),
            Reverse(self.pattern.literal_count()),
            self.method.is_none(),
        )
    }
}

#[derive(Debug, Clone)]
pub struct AuthorizationPolicy {
    rules: Vec<Rule>,
    fallback: Access,
}

impl AuthorizationPolicy {
    pub fn new(rules: impl IntoIterator<Item = Rule>, fallback: Access) -> Self {
        let mut rules: Vec<Rule> = rules.into_iter().collect();
        // Stable: rules of equal specificity keep declaration order.
        rules.sort_by_key(Rule::specificity);
        Self { rules, fallback }
    }

    /// The rule that governs `method path`, or `None` when the fallback applies.
    pub fn matching_rule(&self, method: &Method, path: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.matches(method, path))
    }

    pub fn access_for(&self, method: &Method, path: &str) -> &Access {
        self.matching_rule(method, path)
            .map(|r| &r.access)
            .unwrap_or(&self.fallback)
    }

    pub fn check(
        &self,
        method: &Method,
        path: &str,
        identity: Option<&AuthCtx>,
    ) -> Result<(), AccessError> {
        self.access_for(method, path).check(identity)
    }

    /// Patterns in evaluation order (most specific first).
    pub fn evaluation_order(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(Rule::pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> AuthCtx {
        AuthCtx::new("owner@example.com", 7, [Role::LandOwner])
    }

    fn buyer() -> AuthCtx {
        AuthCtx::new("buyer@example.com", 9, [Role::Buyer])
    }

    // Written broad-to-narrow on purpose.
    fn lands_rules() -> Vec<Rule> {
        vec![
            Rule::any("/api/v1/lands/**", Access::roles([Role::LandOwner])),
            Rule::get("/api/v1/lands", Access::Public),
            Rule::get("/api/v1/lands/{id}", Access::Public),
            Rule::get("/api/v1/lands/search/**", Access::Public),
            Rule::get("/api/v1/lands/status/{status}", Access::Public),
            Rule::any("/health", Access::Public),
        ]
    }

    fn lands_policy() -> AuthorizationPolicy {
        AuthorizationPolicy::new(lands_rules(), Access::Authenticated)
    }

    #[test]
    fn pattern_matching() {
        let p = Pattern::parse("/api/v1/lands/{id}");
        assert!(p.matches("/api/v1/lands/12"));
        assert!(p.matches("/api/v1/lands/12/"));
        assert!(!p.matches("/api/v1/lands"));
        assert!(!p.matches("/api/v1/lands/12/images"));

        let prefix = Pattern::parse("/api/v1/lands/**");
        assert!(prefix.matches("/api/v1/lands"));
        assert!(prefix.matches("/api/v1/lands/1/images"));
        assert!(!prefix.matches("/api/v1/landscape"));
        assert!(!prefix.matches("/api/v1"));
    }

    #[test]
    fn narrow_rules_are_evaluated_first() {
        let policy = lands_policy();
        let order: Vec<&str> = policy.evaluation_order().collect();
        assert_eq!(order.last(), Some(&"/api/v1/lands/**"));

        let search = order.iter().position(|p| *p == "/api/v1/lands/search/**");
        let broad = order.iter().position(|p| *p == "/api/v1/lands/**");
        assert!(search < broad);
    }

    #[test]
    fn public_routes_allow_everyone() {
        let policy = lands_policy();
        let public = [
            (Method::GET, "/api/v1/lands"),
            (Method::GET, "/api/v1/lands/3"),
            (Method::HEAD, "/api/v1/lands/3"),
            (Method::GET, "/api/v1/lands/search/location"),
            (Method::GET, "/api/v1/lands/search/area"),
            (Method::GET, "/api/v1/lands/status/AVAILABLE"),
            (Method::POST, "/health"),
        ];

        for (method, path) in public {
            for identity in [None, Some(owner()), Some(buyer())] {
                assert_eq!(
                    policy.check(&method, path, identity.as_ref()),
                    Ok(()),
                    "{method} {path}"
                );
            }
        }
    }

    #[test]
    fn role_gated_routes_need_the_role() {
        let policy = lands_policy();
        let gated = [
            (Method::POST, "/api/v1/lands"),
            (Method::PUT, "/api/v1/lands/3"),
            (Method::PATCH, "/api/v1/lands/3/status"),
            (Method::DELETE, "/api/v1/lands/3"),
            (Method::POST, "/api/v1/lands/3/images"),
            (Method::DELETE, "/api/v1/lands/3/documents"),
            (Method::GET, "/api/v1/lands/3/images"),
        ];

        for (method, path) in gated {
            assert_eq!(
                policy.check(&method, path, None),
                Err(AccessError::Unauthorized),
                "{method} {path}"
            );
            assert_eq!(
                policy.check(&method, path, Some(&buyer())),
                Err(AccessError::MissingRole),
                "{method} {path}"
            );
            assert_eq!(policy.check(&method, path, Some(&owner())), Ok(()));
        }
    }

    #[test]
    fn unmatched_routes_use_fallback() {
        let policy = lands_policy();
        assert_eq!(
            policy.check(&Method::GET, "/api/v1/users/me", None),
            Err(AccessError::Unauthorized)
        );
        assert_eq!(
            policy.check(&Method::GET, "/api/v1/users/me", Some(&buyer())),
            Ok(())
        );
    }

    #[test]
    fn declaration_order_does_not_matter() {
        let mut reversed = lands_rules();
        reversed.reverse();
        let a = lands_policy();
        let b = AuthorizationPolicy::new(reversed, Access::Authenticated);

        let probes = [
            (Method::GET, "/api/v1/lands/search/location"),
            (Method::GET, "/api/v1/lands/7"),
            (Method::PUT, "/api/v1/lands/7"),
            (Method::POST, "/api/v1/lands"),
            (Method::GET, "/elsewhere"),
        ];
        for (method, path) in probes {
            assert_eq!(a.access_for(&method, path), b.access_for(&method, path));
        }
    }

    #[test]
    fn any_of_several_roles_is_enough() {
        let access = Access::roles([Role::LandOwner, Role::Farmer]);
        let farmer = AuthCtx::new("f@example.com", 3, [Role::Farmer]);
        assert_eq!(access.check(Some(&farmer)), Ok(()));
        assert_eq!(access.check(Some(&buyer())), Err(AccessError::MissingRole));
    }
}
