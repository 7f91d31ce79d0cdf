//! Seams between the session core and the host environment.
//!
//! SYSTEM CONTEXT
//! ==============
//! The session, gate and interceptor never touch `window`, the router or the
//! executor directly. They go through the handles bundled in [`Platform`],
//! which the browser build fills with web implementations and tests fill
//! with scripted fakes.

use std::rc::Rc;

use futures::task::LocalSpawn;

use crate::store::TokenStore;

/// Wall-clock source.
pub trait Clock {
    fn now_millis(&self) -> u64;

    fn now_secs(&self) -> i64 {
        i64::try_from(self.now_millis() / 1000).unwrap_or(i64::MAX)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn now_millis(&self) -> u64 {
        #[cfg(feature = "hydrate")]
        {
            js_sys::Date::now() as u64
        }
        #[cfg(not(feature = "hydrate"))]
        {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    #[error("router not available")]
    RouterUnavailable,
    #[error("navigation rejected: {0}")]
    Rejected(String),
}

/// Client-side navigation.
#[async_trait::async_trait(?Send)]
pub trait Navigator {
    /// Route to `href` (path plus optional query) without a page load.
    async fn push(&self, href: &str) -> Result<(), NavigationError>;

    /// Full page load of `path`. Last resort when the router fails.
    fn hard_redirect(&self, path: &str);

    /// Path plus query of the current location.
    fn current_href(&self) -> String;
}

/// Spawns background work on the Leptos executor.
#[derive(Debug, Default, Clone, Copy)]
pub struct LeptosSpawner;

impl LocalSpawn for LeptosSpawner {
    fn spawn_local_obj(
        &self,
        future: futures::task::LocalFutureObj<'static, ()>,
    ) -> Result<(), futures::task::SpawnError> {
        leptos::task::spawn_local(future);
        Ok(())
    }
}

/// Navigator backed by `leptos_router`, with `window.location` as fallback.
///
/// The router's navigate function only exists inside the component tree, so
/// it is attached after the `<Router>` mounts. Until then every `push` fails
/// and callers fall back to a hard redirect.
#[cfg(feature = "hydrate")]
#[derive(Default)]
pub struct BrowserNavigator {
    navigate: std::cell::RefCell<Option<Rc<dyn Fn(&str, leptos_router::NavigateOptions)>>>,
}

#[cfg(feature = "hydrate")]
impl BrowserNavigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach<F>(&self, navigate: F)
    where
        F: Fn(&str, leptos_router::NavigateOptions) + 'static,
    {
        *self.navigate.borrow_mut() = Some(Rc::new(navigate));
    }
}

#[cfg(feature = "hydrate")]
#[async_trait::async_trait(?Send)]
impl Navigator for BrowserNavigator {
    async fn push(&self, href: &str) -> Result<(), NavigationError> {
        let navigate = self.navigate.borrow().clone();
        let Some(navigate) = navigate else {
            return Err(NavigationError::RouterUnavailable);
        };
        navigate(href, leptos_router::NavigateOptions::default());
        Ok(())
    }

    fn hard_redirect(&self, path: &str) {
        let Some(window) = web_sys::window() else {
            leptos::logging::error!("no window; cannot redirect to {path}");
            return;
        };
        if window.location().set_pathname(path).is_err() {
            leptos::logging::error!("hard redirect to {path} failed");
        }
    }

    fn current_href(&self) -> String {
        let Some(window) = web_sys::window() else {
            return String::new();
        };
        let location = window.location();
        let path = location.pathname().unwrap_or_default();
        let search = location.search().unwrap_or_default();
        format!("{path}{search}")
    }
}

/// Host handles shared by the session and the API client.
#[derive(Clone)]
pub struct Platform {
    pub store: Rc<dyn TokenStore>,
    pub navigator: Rc<dyn Navigator>,
    pub spawner: Rc<dyn LocalSpawn>,
    pub clock: Rc<dyn Clock>,
}

#[cfg(feature = "hydrate")]
impl Platform {
    /// localStorage, the Leptos executor and the system clock.
    #[must_use]
    pub fn browser(navigator: Rc<BrowserNavigator>) -> Self {
        Self {
            store: Rc::new(crate::store::BrowserTokenStore),
            navigator,
            spawner: Rc::new(LeptosSpawner),
            clock: Rc::new(SystemClock),
        }
    }
}
