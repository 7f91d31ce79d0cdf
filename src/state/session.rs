//! Authenticated-session state for the current browser user.
//!
//! SYSTEM CONTEXT
//! ==============
//! One `Session` is built at startup and handed to the route gate and the API
//! interceptor. Views read the reactive [`SessionState`] signal; every
//! mutation goes through `set_auth_data` (establish) or `clear_local` /
//! `logout` (tear down), and each one is mirrored into the token store.
//!
//! CONCURRENCY
//! ===========
//! Single-threaded and cooperative. The only background work is the
//! notification refresh, which is spawned after the store write and never
//! awaited by login or hydrate. Every mutation bumps an epoch; a refresh
//! applies its result only if the epoch it started under is still current,
//! so a fetch that straddles a logout is dropped instead of repopulating the
//! cleared digest.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::cell::Cell;
use std::rc::{Rc, Weak};

use futures::task::LocalSpawnExt;
use leptos::prelude::{GetUntracked, RwSignal, Set, Update, WithUntracked};

use super::notifications::NotificationDigest;
use crate::auth::{Claims, Credential, Role, UserId};
use crate::config::ClientConfig;
use crate::net::api::ApiClient;
use crate::net::http::ApiError;
use crate::platform::Platform;
use crate::routing::routes::{REDIRECT_PARAM, is_internal_path, query_param};
use crate::store::{ROLE_KEY, TOKEN_KEY};

/// Snapshot of who the user is, as far as the client knows.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionState {
    pub credential: Option<Credential>,
    /// Role persisted alongside the credential. Wins over the decoded role.
    pub cached_role: Option<Role>,
    pub notifications: NotificationDigest,
}

impl SessionState {
    pub fn claims(&self) -> Option<Claims> {
        self.credential.as_ref().and_then(Credential::claims)
    }

    pub fn role(&self) -> Option<Role> {
        self.cached_role.clone().or_else(|| self.claims().and_then(|c| c.role))
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.claims().and_then(|c| c.id)
    }

    pub fn expires_at(&self) -> Option<i64> {
        self.claims().and_then(|c| c.exp)
    }

    pub fn is_expired_at(&self, now_secs: i64) -> bool {
        self.credential.as_ref().is_some_and(|c| c.is_expired_at(now_secs))
    }

    pub fn is_authenticated_at(&self, now_secs: i64) -> bool {
        self.credential.is_some() && !self.is_expired_at(now_secs)
    }

    pub fn is_organizer(&self) -> bool {
        self.role() == Some(Role::Organizer)
    }

    pub fn is_player(&self) -> bool {
        self.role() == Some(Role::Player)
    }
}

#[derive(Clone)]
pub struct Session {
    inner: Rc<SessionInner>,
}

/// Non-owning handle held by the API interceptor.
#[derive(Clone)]
pub struct WeakSession(Weak<SessionInner>);

impl WeakSession {
    pub fn upgrade(&self) -> Option<Session> {
        self.0.upgrade().map(|inner| Session { inner })
    }
}

struct SessionInner {
    state: RwSignal<SessionState>,
    api: ApiClient,
    platform: Platform,
    config: ClientConfig,
    epoch: Cell<u64>,
}

impl Session {
    /// Build an anonymous session and link it to `api`'s interceptor.
    /// Call [`Session::hydrate`] once afterwards to restore a stored login.
    pub fn new(config: ClientConfig, platform: Platform, api: ApiClient) -> Self {
        let session = Self {
            inner: Rc::new(SessionInner {
                state: RwSignal::new(SessionState::default()),
                api,
                platform,
                config,
                epoch: Cell::new(0),
            }),
        };
        session.inner.api.attach_session(&session);
        session
    }

    pub fn downgrade(&self) -> WeakSession {
        WeakSession(Rc::downgrade(&self.inner))
    }

    /// Reactive state for views.
    pub fn state(&self) -> RwSignal<SessionState> {
        self.inner.state
    }

    pub fn snapshot(&self) -> SessionState {
        self.inner.state.get_untracked()
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&SessionState) -> R) -> R {
        self.inner.state.with_untracked(f)
    }

    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn now_secs(&self) -> i64 {
        self.inner.platform.clock.now_secs()
    }

    pub fn credential(&self) -> Option<Credential> {
        self.with_state(|s| s.credential.clone())
    }

    pub fn role(&self) -> Option<Role> {
        self.with_state(SessionState::role)
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.with_state(SessionState::user_id)
    }

    pub fn is_authenticated(&self) -> bool {
        let now = self.now_secs();
        self.with_state(|s| s.is_authenticated_at(now))
    }

    pub fn notifications(&self) -> NotificationDigest {
        self.with_state(|s| s.notifications.clone())
    }

    // =========================================================================
    // TRANSITIONS
    // =========================================================================

    /// Restore the session left in the token store by a previous page load.
    ///
    /// An expired credential is cleared locally without contacting the
    /// server. A live one schedules a notification refresh.
    pub fn hydrate(&self) {
        let store = &self.inner.platform.store;
        let Some(credential) = store.get(TOKEN_KEY).and_then(Credential::new) else {
            leptos::logging::log!("no stored credential; starting anonymous");
            return;
        };

        if credential.is_expired_at(self.now_secs()) {
            leptos::logging::warn!("stored credential expired; clearing session");
            self.clear_local();
            return;
        }

        let cached_role = store.get(ROLE_KEY).as_deref().and_then(Role::parse);
        self.bump_epoch();
        self.inner.state.set(SessionState { credential: Some(credential), cached_role, ..SessionState::default() });
        self.schedule_notification_refresh();
    }

    /// Establish an authenticated session from a freshly issued token.
    ///
    /// The role is `role` when non-empty, else the token's decoded role.
    /// Both are persisted before the notification refresh is spawned.
    pub fn set_auth_data(&self, token: &str, role: Option<&str>) {
        let Some(credential) = Credential::new(token) else {
            leptos::logging::warn!("ignoring blank credential; clearing session");
            self.clear_local();
            return;
        };

        let role = role.and_then(Role::parse).or_else(|| credential.claims().and_then(|c| c.role));

        let store = &self.inner.platform.store;
        store.set(TOKEN_KEY, credential.as_str());
        match &role {
            Some(role) => store.set(ROLE_KEY, role.as_str()),
            None => store.remove(ROLE_KEY),
        }

        self.bump_epoch();
        self.inner.state.set(SessionState { credential: Some(credential), cached_role: role, ..SessionState::default() });
        self.schedule_notification_refresh();
    }

    /// Log in and navigate to [`Session::post_login_target`].
    ///
    /// # Errors
    ///
    /// Returns the transport's error unchanged; the session is not touched.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), ApiError> {
        let response = self.inner.api.login(username, password).await?;
        self.set_auth_data(&response.jwt_token, response.role.as_deref());

        let target = self.post_login_target();
        leptos::logging::log!("login succeeded; navigating to {target}");
        if let Err(e) = self.inner.platform.navigator.push(&target).await {
            leptos::logging::warn!("post-login navigation to {target} failed: {e}");
        }
        Ok(())
    }

    /// Create an account. Never changes the session.
    ///
    /// # Errors
    ///
    /// Whatever the transport reports.
    pub async fn register(&self, payload: &serde_json::Value) -> Result<serde_json::Value, ApiError> {
        self.inner.api.register(payload).await
    }

    /// Drop credential, role and notifications from memory and the store.
    /// Does not navigate.
    pub fn clear_local(&self) {
        self.bump_epoch();
        self.inner.state.set(SessionState::default());
        let store = &self.inner.platform.store;
        store.remove(TOKEN_KEY);
        store.remove(ROLE_KEY);
    }

    /// Clear the session and go to the login page, falling back to a full
    /// page load if the router refuses.
    pub async fn logout(&self) {
        self.clear_local();
        let login = self.inner.config.login_path.clone();
        leptos::logging::log!("logged out; navigating to {login}");
        if let Err(e) = self.inner.platform.navigator.push(&login).await {
            leptos::logging::error!("router error on logout: {e}");
            self.inner.platform.navigator.hard_redirect(&login);
        }
    }

    /// Refresh the notification digest. No-op when not authenticated.
    /// Failures are logged and leave the previous digest in place.
    pub async fn fetch_notifications(&self) {
        if !self.is_authenticated() {
            return;
        }
        let epoch = self.inner.epoch.get();

        match self.inner.api.notifications().await {
            Ok(items) => {
                if self.inner.epoch.get() != epoch || !self.is_authenticated() {
                    leptos::logging::log!("session changed during notification fetch; discarding result");
                    return;
                }
                let digest = NotificationDigest::from_items(items);
                self.inner.state.update(|s| s.notifications = digest);
            }
            Err(e) => leptos::logging::error!("failed to fetch notifications: {e}"),
        }
    }

    // =========================================================================
    // POST-LOGIN REDIRECT
    // =========================================================================

    /// The current location's `redirect` query when it names a same-origin
    /// path, else the landing page.
    pub fn post_login_target(&self) -> String {
        let current = self.inner.platform.navigator.current_href();
        match query_param(&current, REDIRECT_PARAM) {
            Some(target) if is_internal_path(&target) => target,
            _ => self.inner.config.landing_path.clone(),
        }
    }

    fn bump_epoch(&self) {
        self.inner.epoch.set(self.inner.epoch.get().wrapping_add(1));
    }

    fn schedule_notification_refresh(&self) {
        let session = self.clone();
        let task = async move { session.fetch_notifications().await };
        if let Err(e) = self.inner.platform.spawner.spawn_local(task) {
            leptos::logging::error!("failed to schedule notification refresh: {e}");
        }
    }
}
