//! # bracket-client
//!
//! Session and authorization core of the tournament-management web client.
//! Owns the access token, decides whether the user is authenticated and
//! whether a navigation is allowed, attaches credentials to API requests, and
//! logs the client out when the server rejects one.
//!
//! Browser glue (`localStorage`, `gloo-net`, the Leptos router) is gated
//! behind the `hydrate` feature; the rest builds and tests natively.

#[cfg(feature = "hydrate")]
pub mod app;
pub mod auth;
pub mod config;
pub mod net;
pub mod platform;
pub mod routing;
pub mod state;
pub mod store;
pub mod util;

#[cfg(test)]
mod testing;

pub use config::ClientConfig;
pub use state::session::{Session, SessionState};
