//! Browser startup: logging, platform handles and the hydrated session.

use std::rc::Rc;

use crate::config::ClientConfig;
use crate::net::{api::ApiClient, gloo_transport::GlooTransport};
use crate::platform::{BrowserNavigator, Platform};
use crate::state::session::Session;

/// Route panics and `log` records to the browser console.
pub fn init_logging() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Debug).is_err() {
        leptos::logging::warn!("console logger already installed");
    }
}

/// Everything a page tree needs to talk to the service as the current user.
pub struct ClientRuntime {
    pub session: Session,
    /// Attach `use_navigate()` here once the router is mounted.
    pub navigator: Rc<BrowserNavigator>,
}

/// Build the browser session from build-time config and restore any stored
/// login.
pub fn start() -> ClientRuntime {
    let mut config = ClientConfig::from_build_env();
    if let Err(e) = config.validate() {
        leptos::logging::error!("invalid client config: {e}; using defaults");
        config = ClientConfig::default();
    }

    let navigator = Rc::new(BrowserNavigator::new());
    let platform = Platform::browser(Rc::clone(&navigator));
    let transport = Rc::new(GlooTransport::new(config.request_timeout_ms));
    let api = ApiClient::new(&config, transport, &platform);
    let session = Session::new(config, platform, api);
    session.hydrate();

    ClientRuntime { session, navigator }
}
