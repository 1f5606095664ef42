use std::future::Future;

/// The authenticated principal attached to a request.
pub trait Identity: Send + Sync {
    /// Unique subject identifier.
    fn sub(&self) -> &str;

    /// Whether this identity may enter the admin area.
    fn is_admin(&self) -> bool;

    /// The view of this identity handed to templates as `__user__`.
    fn to_json(&self) -> serde_json::Value;
}

/// Turns a session cookie into the user it belongs to.
///
/// Implemented by the application; the auth middleware calls it once per
/// request that carries the cookie.
pub trait SessionResolver: Send + Sync + 'static {
    type User: Identity + Clone + 'static;

    /// Name of the session cookie.
    fn cookie_name(&self) -> &str;

    /// Resolve a raw cookie value. Invalid, expired or tampered cookies
    /// resolve to `None`.
    fn resolve(&self, cookie: &str) -> impl Future<Output = Option<Self::User>> + Send;
}

/// Request extension holding the user resolved from the session cookie.
#[derive(Debug, Clone)]
pub struct CurrentUser<U>(pub U);

/// Type-erased form of the current user, read by template rendering.
#[derive(Debug, Clone)]
pub(crate) struct UserView(pub serde_json::Value);

/// Sentinel identity for applications without sessions.
#[derive(Debug, Clone)]
pub struct NoIdentity;

impl Identity for NoIdentity {
    fn sub(&self) -> &str {
        ""
    }

    fn is_admin(&self) -> bool {
        false
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Null
    }
}

/// Resolver that never finds a user.
#[derive(Debug, Clone, Default)]
pub struct NoSessions;

impl SessionResolver for NoSessions {
    type User = NoIdentity;

    fn cookie_name(&self) -> &str {
        ""
    }

    async fn resolve(&self, _cookie: &str) -> Option<NoIdentity> {
        None
    }
}

/// Find a cookie by name in a `Cookie` header value (`a=1; b=2`).
pub fn find_cookie<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key.trim() == name).then(|| value.trim())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_lookup() {
        let header = "theme=dark; awesession=abc-123-ff ;other=1";
        assert_eq!(find_cookie(header, "awesession"), Some("abc-123-ff"));
        assert_eq!(find_cookie(header, "missing"), None);
        assert_eq!(find_cookie("", "awesession"), None);
    }
}
