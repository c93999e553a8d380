//! Session token extraction from request headers.

use crate::constants::{BEARER_PREFIX, cookies};
use http::HeaderMap;
use http::header::{AUTHORIZATION, COOKIE};

/// Find the value of cookie `name` across every `Cookie` header.
fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookie_str| cookie_str.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Extract the session token carried by `headers`.
///
/// Checks the session cookies in [`cookies::LOOKUP_ORDER`], then an
/// `Authorization: Bearer` header. Returns `None` if none is present.
#[must_use]
pub fn extract_session_token(headers: &HeaderMap) -> Option<&str> {
    cookies::LOOKUP_ORDER
        .iter()
        .find_map(|name| cookie_value(headers, name))
        .or_else(|| bearer_token(headers))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn headers(pairs: &[(http::header::HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(name.clone(), HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn no_credentials_yields_none() {
        assert!(extract_session_token(&HeaderMap::new()).is_none());
        let h = headers(&[(COOKIE, "theme=dark; lang=en")]);
        assert!(extract_session_token(&h).is_none());
    }

    #[test]
    fn secure_cookie_wins_over_plain_cookie() {
        let h = headers(&[(
            COOKIE,
            "boothmap.session-token=plain; __Secure-boothmap.session-token=secure",
        )]);
        assert_eq!(extract_session_token(&h), Some("secure"));
    }

    #[test]
    fn plain_cookie_is_found_among_others() {
        let h = headers(&[(COOKIE, "theme=dark;  boothmap.session-token=abc123 ")]);
        assert_eq!(extract_session_token(&h), Some("abc123"));
    }

    #[test]
    fn cookies_split_across_headers_are_searched() {
        let h = headers(&[(COOKIE, "theme=dark"), (COOKIE, "boothmap.session-token=abc")]);
        assert_eq!(extract_session_token(&h), Some("abc"));
    }

    #[test]
    fn bearer_header_is_the_fallback() {
        let h = headers(&[(AUTHORIZATION, "Bearer tok-1")]);
        assert_eq!(extract_session_token(&h), Some("tok-1"));

        let h = headers(&[
            (AUTHORIZATION, "Bearer tok-1"),
            (COOKIE, "boothmap.session-token=from-cookie"),
        ]);
        assert_eq!(extract_session_token(&h), Some("from-cookie"));
    }

    #[test]
    fn other_schemes_and_empty_values_are_ignored() {
        let h = headers(&[(AUTHORIZATION, "Basic dXNlcjpwYXNz")]);
        assert!(extract_session_token(&h).is_none());

        let h = headers(&[(COOKIE, "boothmap.session-token="), (AUTHORIZATION, "Bearer ")]);
        assert!(extract_session_token(&h).is_none());
    }
}
