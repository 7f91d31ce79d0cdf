//! Route table and the pre-navigation authorization gate.

pub mod gate;
pub mod routes;

pub use gate::{Decision, Outcome, RedirectTarget, authorize, check, decide};
pub use routes::{Destination, RouteRequirement};
