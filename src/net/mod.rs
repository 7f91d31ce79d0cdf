//! Networking: request model, interceptor chain and the REST client.

pub mod api;
#[cfg(feature = "hydrate")]
pub mod gloo_transport;
pub mod http;
pub mod interceptor;
pub mod types;
