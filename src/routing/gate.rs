//! Pre-navigation authorization.
//!
//! DESIGN
//! ======
//! [`decide`] is pure: it reads the destination, a session snapshot and the
//! clock, and reports an outcome plus whether an expired credential must be
//! dropped. [`authorize`] applies that side effect to a live [`Session`].
//!
//! Rules are evaluated in a fixed order and the first match wins:
//! 1. credential present but expired: clear it, send to login (unless
//!    already there)
//! 2. destination needs auth and there is no valid credential: login
//! 3. login/register while authenticated: landing page
//! 4. destination restricts roles and ours is missing or not listed: landing
//! 5. proceed
//!
//! Expiry is checked before plain auth so an expired token is never treated
//! as merely missing.

#[cfg(test)]
#[path = "gate_test.rs"]
mod gate_test;

use super::routes::{Destination, REDIRECT_PARAM, normalize_path};
use crate::config::ClientConfig;
use crate::state::session::{Session, SessionState};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RedirectTarget {
    pub path: String,
    /// Full path to return to after login, sent as `?redirect=`.
    pub redirect: Option<String>,
}

impl RedirectTarget {
    pub fn to(path: impl Into<String>) -> Self {
        Self { path: path.into(), redirect: None }
    }

    pub fn login(login_path: &str, return_to: &str) -> Self {
        Self { path: login_path.to_owned(), redirect: Some(return_to.to_owned()) }
    }

    /// Path with the encoded `redirect` query, ready for the router.
    pub fn href(&self) -> String {
        match &self.redirect {
            Some(redirect) => format!("{}?{REDIRECT_PARAM}={}", self.path, urlencoding::encode(redirect)),
            None => self.path.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Proceed,
    RedirectTo(RedirectTarget),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decision {
    pub outcome: Outcome,
    /// The credential is expired and must be cleared before navigating.
    pub clear_session: bool,
}

impl Decision {
    fn proceed() -> Self {
        Self { outcome: Outcome::Proceed, clear_session: false }
    }

    fn redirect(target: RedirectTarget) -> Self {
        Self { outcome: Outcome::RedirectTo(target), clear_session: false }
    }
}

pub fn decide(destination: &Destination, state: &SessionState, now_secs: i64, config: &ClientConfig) -> Decision {
    let login = normalize_path(&config.login_path);
    let register = normalize_path(&config.register_path);
    let to_login = || RedirectTarget::login(&config.login_path, &destination.full_path);

    if state.is_expired_at(now_secs) {
        let outcome = if destination.path == login { Outcome::Proceed } else { Outcome::RedirectTo(to_login()) };
        return Decision { outcome, clear_session: true };
    }

    let authenticated = state.is_authenticated_at(now_secs);
    let requirement = &destination.requirement;

    if requirement.requires_auth && !authenticated {
        return Decision::redirect(to_login());
    }

    if authenticated && (destination.path == login || destination.path == register) {
        return Decision::redirect(RedirectTarget::to(config.landing_path.as_str()));
    }

    if !requirement.allows(state.role().as_ref()) {
        return Decision::redirect(RedirectTarget::to(config.landing_path.as_str()));
    }

    Decision::proceed()
}

/// Decide for `destination` and clear an expired credential if needed.
///
/// The return path travels only in the login redirect's query; see
/// [`Session::post_login_target`].
pub fn authorize(session: &Session, destination: &Destination) -> Outcome {
    let now = session.now_secs();
    let decision = session.with_state(|state| decide(destination, state, now, session.config()));

    if decision.clear_session {
        leptos::logging::warn!("credential expired; clearing session before {}", destination.full_path);
        session.clear_local();
    }
    decision.outcome
}

/// Resolve `full_path` against the route table and authorize it.
pub fn check(session: &Session, full_path: &str) -> Outcome {
    authorize(session, &Destination::resolve(full_path))
}
