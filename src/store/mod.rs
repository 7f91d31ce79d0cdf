//! Persistence backends for the session credential.

pub mod token_store;

#[cfg(feature = "hydrate")]
pub use token_store::BrowserTokenStore;
pub use token_store::{MemoryTokenStore, ROLE_KEY, TOKEN_KEY, TokenStore};
