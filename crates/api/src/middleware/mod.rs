//! Request extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated editor from a JWT Bearer token.

pub mod auth;
