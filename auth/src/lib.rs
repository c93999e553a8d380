//! # Booth Map Authentication
//!
//! Session resolution for the Booth Map procedure API.
//!
//! Sessions are issued by an external identity provider; this crate only
//! reads them. [`TokenSessionResolver`] implements
//! [`SessionResolver`](boothmap_core::session::SessionResolver) by
//! extracting the session token from the request and looking it up in a
//! [`SessionStore`](providers::SessionStore).
//!
//! ## Token Lookup
//!
//! ```text
//! Cookie __Secure-boothmap.session-token
//!   → Cookie boothmap.session-token
//!   → Authorization: Bearer <token>
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use boothmap_auth::TokenSessionResolver;
//! use boothmap_core::SessionResolver;
//!
//! let resolver = TokenSessionResolver::new(session_store);
//! let session = resolver.resolve(&headers).await?;
//! ```

pub mod constants;
pub mod providers;
pub mod resolver;
pub mod token;

#[cfg(feature = "test-utils")]
pub mod mocks;

pub use providers::{SessionStore, StoredSession};
pub use resolver::TokenSessionResolver;
pub use token::extract_session_token;
