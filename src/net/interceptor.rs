//! Hooks run around every API request.
//!
//! DESIGN
//! ======
//! Before send: attach the bearer credential and, for multipart payloads,
//! drop any explicit `Content-Type` so the transport writes the boundary.
//!
//! On error: a 401/403 means the server no longer trusts our credential.
//! Many requests can be in flight when that happens and they tend to fail in
//! the same tick, so a guard collapses the burst into one logout. The guard
//! stays closed while that logout runs and for a cooldown window after it.
//! The failing request still gets its error back; the logout is spawned, so
//! callers must not assume the session is already cleared.

#[cfg(test)]
#[path = "interceptor_test.rs"]
mod interceptor_test;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use futures::task::{LocalSpawn, LocalSpawnExt};

use super::http::{AUTHORIZATION, ApiError, Body, CONTENT_TYPE, HeaderSink};
use crate::platform::Clock;
use crate::state::session::WeakSession;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum GuardState {
    Open,
    Handling,
    CoolingDown { until_ms: u64 },
}

/// Debounce guard for forced logouts.
#[derive(Debug)]
pub struct AuthErrorGuard {
    state: Cell<GuardState>,
    cooldown_ms: u64,
}

impl AuthErrorGuard {
    pub fn new(cooldown_ms: u64) -> Self {
        Self { state: Cell::new(GuardState::Open), cooldown_ms }
    }

    /// Claim the guard. Only one caller wins until it is released and the
    /// cooldown has passed.
    pub fn try_acquire(&self, now_ms: u64) -> bool {
        match self.state.get() {
            GuardState::Handling => false,
            GuardState::CoolingDown { until_ms } if now_ms < until_ms => false,
            GuardState::Open | GuardState::CoolingDown { .. } => {
                self.state.set(GuardState::Handling);
                true
            }
        }
    }

    /// Start the cooldown once the logout has finished.
    pub fn release(&self, now_ms: u64) {
        self.state.set(GuardState::CoolingDown { until_ms: now_ms.saturating_add(self.cooldown_ms) });
    }

    pub fn is_open(&self, now_ms: u64) -> bool {
        match self.state.get() {
            GuardState::Open => true,
            GuardState::Handling => false,
            GuardState::CoolingDown { until_ms } => now_ms >= until_ms,
        }
    }
}

pub struct RequestInterceptor {
    session: RefCell<Option<WeakSession>>,
    guard: Rc<AuthErrorGuard>,
    clock: Rc<dyn Clock>,
    spawner: Rc<dyn LocalSpawn>,
}

impl RequestInterceptor {
    pub fn new(cooldown_ms: u64, clock: Rc<dyn Clock>, spawner: Rc<dyn LocalSpawn>) -> Self {
        Self { session: RefCell::new(None), guard: Rc::new(AuthErrorGuard::new(cooldown_ms)), clock, spawner }
    }

    /// Link the session whose credential is attached and which is logged out
    /// on rejection. Held weakly; the session owns the API client.
    pub fn attach(&self, session: WeakSession) {
        *self.session.borrow_mut() = Some(session);
    }

    pub fn guard(&self) -> &AuthErrorGuard {
        &self.guard
    }

    pub fn before_send<H: HeaderSink + ?Sized>(&self, headers: &mut H, body: &Body) {
        let credential = self
            .session
            .borrow()
            .as_ref()
            .and_then(WeakSession::upgrade)
            .and_then(|session| session.credential());
        if let Some(credential) = credential {
            headers.set_header(AUTHORIZATION, &format!("Bearer {}", credential.as_str()));
        }
        if body.is_multipart() {
            headers.delete_header(CONTENT_TYPE);
        }
    }

    /// Inspect a failed request. Schedules at most one logout per burst of
    /// 401/403 responses; the caller still returns `error` unchanged.
    pub fn on_error(&self, error: &ApiError) {
        if !error.is_auth_rejection() {
            return;
        }
        if !self.guard.try_acquire(self.clock.now_millis()) {
            return;
        }

        let session = self.session.borrow().as_ref().and_then(WeakSession::upgrade);
        let Some(session) = session else {
            self.guard.release(self.clock.now_millis());
            return;
        };

        leptos::logging::warn!("server rejected credential ({error}); logging out");
        let guard = Rc::clone(&self.guard);
        let clock = Rc::clone(&self.clock);
        let task = async move {
            session.logout().await;
            guard.release(clock.now_millis());
        };
        if let Err(e) = self.spawner.spawn_local(task) {
            leptos::logging::error!("failed to schedule forced logout: {e}");
            self.guard.release(self.clock.now_millis());
        }
    }
}
