//! Leptos glue for the route gate.
//!
//! SYSTEM CONTEXT
//! ==============
//! Page components install one guard under the `<Router>`. It re-runs the
//! gate whenever the location or the session changes, so a forced logout
//! from the interceptor also moves the user off a protected page.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;

use crate::routing::gate::{self, Outcome};
use crate::state::session::Session;

/// Redirect away from any location the gate rejects.
///
/// `current_path` must return the path plus query of the active location.
pub fn install_route_guard<P, F>(session: Session, current_path: P, navigate: F)
where
    P: Fn() -> String + 'static,
    F: Fn(&str, NavigateOptions) + 'static,
{
    let state = session.state();
    Effect::new(move || {
        state.track();
        if let Some(href) = redirect_for(&session, &current_path()) {
            navigate(&href, NavigateOptions { replace: true, ..NavigateOptions::default() });
        }
    });
}

/// One guard pass: where to send the user from `full_path`, if anywhere.
pub fn redirect_for(session: &Session, full_path: &str) -> Option<String> {
    match gate::check(session, full_path) {
        Outcome::Proceed => None,
        Outcome::RedirectTo(target) => Some(target.href()),
    }
}
