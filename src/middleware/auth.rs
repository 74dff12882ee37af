use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, request::Parts};
use subtle::ConstantTimeEq;

use crate::error::QuoterError;
use crate::router::QuoterState;

fn key_matches(candidate: &str, expected: &str) -> bool {
    bool::from(candidate.as_bytes().ct_eq(expected.as_bytes()))
}

/// Ensure the inbound request carries the admin key.
/// Accepts either:
/// - Header: `x-admin-key: ...`
/// - Header: `Authorization: Bearer ...`
/// - Query string: `?key=...`
///
/// An empty `expected` key rejects everything.
pub fn ensure_authorized(
    headers: &HeaderMap,
    query: Option<&str>,
    expected: &str,
) -> Result<(), QuoterError> {
    if expected.is_empty() {
        return Err(QuoterError::Unauthorized);
    }

    // 1) header: x-admin-key
    if let Some(hv) = headers.get("x-admin-key").and_then(|v| v.to_str().ok())
        && key_matches(hv, expected)
    {
        return Ok(());
    }

    // 2) header: Authorization: Bearer <key>
    if let Some(auth) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
        let auth = auth.trim();
        if let Some(token) = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            && key_matches(token, expected)
        {
            return Ok(());
        }
    }

    // 3) query: key=...
    if let Some(qs) = query {
        for (k, v) in url::form_urlencoded::parse(qs.as_bytes()) {
            if k == "key" && key_matches(&v, expected) {
                return Ok(());
            }
        }
    }

    Err(QuoterError::Unauthorized)
}

#[derive(Debug, Clone, Copy)]
pub struct RequireAdminKey;

impl FromRequestParts<QuoterState> for RequireAdminKey {
    type Rejection = QuoterError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &QuoterState,
    ) -> Result<Self, Self::Rejection> {
        ensure_authorized(&parts.headers, parts.uri.query(), &state.admin_key)?;
        Ok(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn accepts_each_key_location() {
        let mut headers = HeaderMap::new();
        headers.insert("x-admin-key", HeaderValue::from_static("pwd"));
        assert!(ensure_authorized(&headers, None, "pwd").is_ok());

        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer pwd"));
        assert!(ensure_authorized(&headers, None, "pwd").is_ok());

        assert!(ensure_authorized(&HeaderMap::new(), Some("a=1&key=pwd"), "pwd").is_ok());
    }

    #[test]
    fn rejects_wrong_or_missing_key() {
        assert!(ensure_authorized(&HeaderMap::new(), None, "pwd").is_err());
        assert!(ensure_authorized(&HeaderMap::new(), Some("key=nope"), "pwd").is_err());
    }

    #[test]
    fn empty_configured_key_disables_admin() {
        assert!(ensure_authorized(&HeaderMap::new(), Some("key="), "").is_err());
    }
}
