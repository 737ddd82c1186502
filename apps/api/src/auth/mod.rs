//! Authentication primitives and endpoints.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- HS256 access-token generation and validation.
//! - [`extractor`] -- the [`extractor::AuthUser`] and [`extractor::ActiveUser`] request guards.

pub mod extractor;
pub mod handlers;
pub mod jwt;
pub mod password;
