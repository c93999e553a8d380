//! Authentication constants.
//!
//! Cookie names follow the identity provider's conventions: the `__Secure-`
//! prefixed name is set over HTTPS, the plain name over HTTP.

/// Session cookie names, checked in order.
pub mod cookies {
    /// Session cookie set over HTTPS.
    pub const SECURE_SESSION_TOKEN: &str = "__Secure-boothmap.session-token";

    /// Session cookie set over plain HTTP (development).
    pub const SESSION_TOKEN: &str = "boothmap.session-token";

    /// Lookup order.
    pub const LOOKUP_ORDER: [&str; 2] = [SECURE_SESSION_TOKEN, SESSION_TOKEN];
}

/// Scheme prefix of the `Authorization` header.
pub const BEARER_PREFIX: &str = "Bearer ";
