//! Bearer credential extraction from the `Authorization` header.
//!
//! Absence is not an error: anonymous requests are valid for public routes and
//! the policy layer decides later whether identity was required.

use axum::http::{HeaderMap, header};

pub const BEARER_PREFIX: &str = "Bearer ";

/// Token part of a raw `Authorization` value, if it uses the bearer scheme.
///
/// The prefix match is case-sensitive and an empty remainder counts as absent.
pub fn bearer_token(raw: &str) -> Option<&str> {
    let token = raw.strip_prefix(BEARER_PREFIX)?.trim();
    (!token.is_empty()).then_some(token)
}

/// Same as [`bearer_token`], reading the header map directly.
/// Non-ASCII header bytes are treated as no credential at all.
pub fn from_headers(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn extracts_token_after_prefix() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("Bearer   padded  "), Some("padded"));
    }

    #[test]
    fn other_schemes_and_casing_are_absent() {
        assert_eq!(bearer_token("bearer abc"), None);
        assert_eq!(bearer_token("BEARER abc"), None);
        assert_eq!(bearer_token("Basic dXNlcjpwYXNz"), None);
        assert_eq!(bearer_token("Bearerabc"), None);
        assert_eq!(bearer_token("abc"), None);
    }

    #[test]
    fn empty_remainder_is_absent() {
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Bearer    "), None);
        assert_eq!(bearer_token(""), None);
    }

    #[test]
    fn reads_from_header_map() {
        let mut headers = HeaderMap::new();
        assert_eq!(from_headers(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer t0k"));
        assert_eq!(from_headers(&headers), Some("t0k"));

        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_bytes(b"Bearer \xfftok").unwrap(),
        );
        assert_eq!(from_headers(&headers), None);
    }
}
