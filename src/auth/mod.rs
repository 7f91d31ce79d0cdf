//! Credential and claim types shared by the session, gate and interceptor.

pub mod claims;

pub use claims::{Claims, Credential, Role, UserId, decode_claims};
