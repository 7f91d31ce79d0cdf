//! Client-side session state.
//!
//! DESIGN
//! ======
//! `session` owns the credential and its transitions; `notifications` is the
//! digest the session refreshes as a side effect of becoming authenticated.

pub mod notifications;
pub mod session;
