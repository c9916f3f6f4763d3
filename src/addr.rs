//! Address canonicalization.
//!
//! Every address that crosses the API boundary (redirect targets, peer API
//! addresses) goes through these functions so the rest of the gateway can
//! assume a fully schemed URL.

/// Ensure that the given address has a scheme, adding `http://` if not.
///
/// Addresses that already carry `http://` or `https://` are returned
/// unchanged. Never fails and performs no network access.
pub fn normalize_addr(addr: &str) -> String {
    if addr.starts_with("http://") || addr.starts_with("https://") {
        return addr.to_string();
    }
    format!("http://{addr}")
}

/// Ensure that the given address is routed over secure transport.
///
/// The address is normalized first, then a plain `http://` scheme is
/// rewritten to `https://`. Host, path, and query are untouched. Idempotent.
pub fn ensure_https(addr: &str) -> String {
    let norm = normalize_addr(addr);
    match norm.strip_prefix("http://") {
        Some(rest) => format!("https://{rest}"),
        None => norm,
    }
}
