//! Authentication and per-endpoint authorization.
//!
//! The gateway delegates credential verification to an abstract
//! [`CredentialStore`]. When no store is configured, authentication is
//! disabled and every request is implicitly authorized. Checks are stateless
//! and re-evaluated on every request.

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use base64::{prelude::BASE64_STANDARD, Engine};

/// The Basic-Auth challenge sent with every 401.
pub const WWW_AUTHENTICATE_CHALLENGE: &str = "Basic realm=\"quorum-gateway\"";

/// Abstract source of usernames, passwords, and permissions.
pub trait CredentialStore: Send + Sync {
    /// Verify a username/password pair.
    fn check(&self, username: &str, password: &str) -> bool;

    /// Whether the user holds the named permission.
    fn has_perm(&self, username: &str, perm: &str) -> bool;

    /// Whether the user holds any of the named permissions.
    fn has_any_perm(&self, username: &str, perms: &[&str]) -> bool {
        perms.iter().any(|p| self.has_perm(username, p))
    }
}

/// Named permissions, one per protected operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Execute,
    Query,
    Backup,
    Load,
    Join,
    Remove,
    Status,
    /// Read-only access, accepted as an alternative to `Status` on
    /// introspection endpoints.
    Ready,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Execute => "execute",
            Permission::Query => "query",
            Permission::Backup => "backup",
            Permission::Load => "load",
            Permission::Join => "join",
            Permission::Remove => "remove",
            Permission::Status => "status",
            Permission::Ready => "ready",
        }
    }
}

/// The permission (or any-of set) an endpoint requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionCheck {
    Single(Permission),
    AnyOf(&'static [Permission]),
}

/// The any-of set accepted by `/nodes` and the debug routes.
pub const STATUS_OR_READY: PermissionCheck =
    PermissionCheck::AnyOf(&[Permission::Status, Permission::Ready]);

/// Extract HTTP Basic credentials from the request headers.
///
/// Returns `None` for a missing, non-Basic, or garbled header. The caller
/// treats all of those identically to a failed credential check. The scheme
/// token is matched case-insensitively per RFC 7235.
pub fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, payload) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("Basic") {
        return None;
    }
    let decoded = BASE64_STANDARD.decode(payload).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

/// Authorize a request against the required permission.
///
/// The outcome is a plain boolean: a missing header, a bad password, and a
/// missing permission are all indistinguishable to the client.
pub fn authorize(
    credentials: Option<&dyn CredentialStore>,
    headers: &HeaderMap,
    check: &PermissionCheck,
) -> bool {
    let store = match credentials {
        // No credential store configured: auth is disabled.
        None => return true,
        Some(s) => s,
    };

    let (username, password) = match basic_credentials(headers) {
        Some(creds) => creds,
        None => return false,
    };

    if !store.check(&username, &password) {
        return false;
    }

    match check {
        PermissionCheck::Single(perm) => store.has_perm(&username, perm.as_str()),
        PermissionCheck::AnyOf(perms) => {
            let names: Vec<&str> = perms.iter().map(|p| p.as_str()).collect();
            store.has_any_perm(&username, &names)
        }
    }
}
