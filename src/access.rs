//! Route-level access control.
//!
//! Every request is matched against [`RULES`]; the first rule whose prefix
//! matches the path on a segment boundary (and whose method scope covers the
//! request method) decides. Paths no rule names only need a valid credential.

use axum::http::{Method, StatusCode};

use crate::models::Role;

pub const LOGIN_PATH: &str = "/login";
pub const CUSTOMER_HOME: &str = "/store/products";
pub const SELLER_HOME: &str = "/vendor/products";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Redirect(&'static str),
    Deny(StatusCode),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
    Role(Role),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Methods {
    Any,
    Mutating,
}

impl Methods {
    fn covers(self, method: &Method) -> bool {
        match self {
            Methods::Any => true,
            Methods::Mutating => {
                [Method::POST, Method::PUT, Method::PATCH, Method::DELETE].contains(method)
            }
        }
    }
}

/// What a holder of the wrong role gets back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnMismatch {
    Redirect(&'static str),
    Deny(StatusCode),
}

#[derive(Debug, Clone, Copy)]
pub struct RouteRule {
    pub prefix: &'static str,
    pub methods: Methods,
    pub access: Access,
    pub on_mismatch: OnMismatch,
}

const fn public(prefix: &'static str) -> RouteRule {
    RouteRule {
        prefix,
        methods: Methods::Any,
        access: Access::Public,
        on_mismatch: OnMismatch::Redirect(LOGIN_PATH),
    }
}

const fn seller_area(prefix: &'static str) -> RouteRule {
    RouteRule {
        prefix,
        methods: Methods::Any,
        access: Access::Role(Role::Seller),
        on_mismatch: OnMismatch::Redirect(CUSTOMER_HOME),
    }
}

const fn customer_area(prefix: &'static str) -> RouteRule {
    RouteRule {
        prefix,
        methods: Methods::Any,
        access: Access::Role(Role::Customer),
        on_mismatch: OnMismatch::Redirect(SELLER_HOME),
    }
}

pub const RULES: &[RouteRule] = &[
    public(LOGIN_PATH),
    public("/register"),
    public("/api/auth"),
    public("/health"),
    public("/docs"),
    public("/static"),
    public("/favicon.ico"),
    RouteRule {
        prefix: "/api/products",
        methods: Methods::Mutating,
        access: Access::Role(Role::Seller),
        on_mismatch: OnMismatch::Deny(StatusCode::FORBIDDEN),
    },
    seller_area("/vendor"),
    seller_area("/api/vendor"),
    customer_area("/store"),
    customer_area("/api/cart"),
    customer_area("/api/orders"),
    customer_area("/api/favorites"),
];

fn prefix_matches(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

pub fn find_rule(path: &str, method: &Method) -> Option<&'static RouteRule> {
    RULES
        .iter()
        .find(|rule| prefix_matches(path, rule.prefix) && rule.methods.covers(method))
}

/// Decide what to do with a request. `role` is `None` when the credential
/// is missing, malformed or expired.
pub fn evaluate(path: &str, method: &Method, role: Option<Role>) -> Decision {
    let rule = find_rule(path, method);
    let access = rule.map_or(Access::Authenticated, |r| r.access);

    match (access, role) {
        (Access::Public, _) => Decision::Allow,
        (_, None) => Decision::Redirect(LOGIN_PATH),
        (Access::Authenticated, Some(_)) => Decision::Allow,
        (Access::Role(required), Some(actual)) if required == actual => Decision::Allow,
        (Access::Role(_), Some(_)) => match rule.map(|r| r.on_mismatch) {
            Some(OnMismatch::Deny(status)) => Decision::Deny(status),
            Some(OnMismatch::Redirect(to)) => Decision::Redirect(to),
            None => Decision::Deny(StatusCode::FORBIDDEN),
        },
    }
}
