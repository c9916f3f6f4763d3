//! Leader redirect engine.
//!
//! When a node cannot serve a leader-only request it answers with a redirect
//! to the current leader's API address. The redirect must carry the original
//! path and query string verbatim so the client can simply retry against the
//! new host.

use axum::http::Uri;

/// Outcome of the leader-affinity policy for a leader-sensitive request.
///
/// Every leader-sensitive handler (execute, query, backup, load, join,
/// remove) funnels its not-leader branch through [`decide`] so the policy
/// cannot drift between endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaderDecision {
    /// The local node can serve the request.
    ServeLocally,
    /// Redirect the client to the leader at this scheme+host.
    Redirect(String),
    /// The node is not the leader and no leader address is resolvable.
    Unavailable,
}

/// The single leader-affinity decision function.
///
/// `not_leader` is the store's verdict on the operation; `leader_api_addr`
/// is the leader's API address as resolved through the cluster directory,
/// if resolution succeeded. Whether leader-local data was required at all is
/// encoded in the store call that produced `not_leader`.
pub fn decide(not_leader: bool, leader_api_addr: Option<String>) -> LeaderDecision {
    if !not_leader {
        return LeaderDecision::ServeLocally;
    }
    match leader_api_addr {
        Some(addr) => LeaderDecision::Redirect(addr),
        None => LeaderDecision::Unavailable,
    }
}

/// Form a redirect URL against `host` (scheme + authority), preserving the
/// original request's path and raw query string byte-for-byte.
pub fn form_redirect(uri: &Uri, host: &str) -> String {
    // A request for the bare authority has path "/" in `http::Uri`; keep the
    // redirect target equally bare in that case.
    let path = match uri.path() {
        "/" => "",
        p => p,
    };
    match uri.query() {
        Some(q) => format!("{host}{path}?{q}"),
        None => format!("{host}{path}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri(s: &str) -> Uri {
        s.parse().unwrap()
    }

    #[test]
    fn test_form_redirect() {
        assert_eq!(
            form_redirect(&uri("http://qux:4001"), "http://foo:4001"),
            "http://foo:4001"
        );
    }

    #[test]
    fn test_form_redirect_param() {
        assert_eq!(
            form_redirect(&uri("http://qux:4001/db/query?x=y"), "http://foo:4001"),
            "http://foo:4001/db/query?x=y"
        );
    }

    #[test]
    fn test_form_redirect_https_target() {
        assert_eq!(
            form_redirect(&uri("http://qux:4001"), "https://foo:4001"),
            "https://foo:4001"
        );
    }

    #[test]
    fn test_form_redirect_no_scheme_on_original() {
        // Origin-form URI, as handlers actually see it.
        assert_eq!(
            form_redirect(&uri("/db/backup?fmt=sql&noleader"), "http://1.2.3.4:999"),
            "http://1.2.3.4:999/db/backup?fmt=sql&noleader"
        );
    }

    #[test]
    fn test_decide() {
        assert_eq!(decide(false, None), LeaderDecision::ServeLocally);
        assert_eq!(
            decide(false, Some("http://foo".into())),
            LeaderDecision::ServeLocally
        );
        assert_eq!(
            decide(true, Some("http://foo".into())),
            LeaderDecision::Redirect("http://foo".into())
        );
        assert_eq!(decide(true, None), LeaderDecision::Unavailable);
    }
}
