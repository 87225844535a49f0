//! Credential primitives shared by the Ripple services
//!
//! # Modules
//!
//! - `password`: PBKDF2-HMAC-SHA512 password hashing and verification
//! - `token`: JWT access-token issuance/validation and opaque refresh tokens

pub mod password;
pub mod token;

pub use token::{Claims, TokenConfig, TokenError, TokenIssuer};
