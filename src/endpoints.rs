//! Public/protected classification of backend endpoints. Consulted before
//! any token attachment or refresh decision: public endpoints never carry an
//! Authorization header and a 401 from one never escalates to a refresh.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EndpointClass {
    Public,
    Protected,
}

/// Prefixes the backend serves without authentication: the auth surface
/// itself, the public catalog, visit tracking, and storefront reads by slug.
const PUBLIC_PREFIXES: &[&str] = &[
    "auth/login/",
    "auth/register/",
    "auth/refresh/",
    "public/",
    "stats/visit/",
    "shops/",
];

/// Carve-outs checked ahead of the prefix match. The backend routes
/// `shops/me/` before `shops/<slug>/` and guards it with authentication, so
/// the merchant's own shop must not fall into the storefront-read prefix.
const PROTECTED_EXCEPTIONS: &[&str] = &["shops/me/"];

#[derive(Clone, Copy, Debug, Default)]
pub struct EndpointPolicy;

impl EndpointPolicy {
    pub fn classify(&self, path: &str) -> EndpointClass {
        let path = path.trim_start_matches('/');
        if PROTECTED_EXCEPTIONS.iter().any(|p| path.starts_with(p)) {
            return EndpointClass::Protected;
        }
        if PUBLIC_PREFIXES.iter().any(|p| path.starts_with(p)) {
            return EndpointClass::Public;
        }
        EndpointClass::Protected
    }
}
