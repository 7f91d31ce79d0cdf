//! Scripted collaborators shared by the unit tests.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::rc::Rc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use futures::channel::oneshot;
use futures::executor::LocalPool;
use futures::task::LocalSpawn;
use serde_json::{Value, json};

use crate::config::ClientConfig;
use crate::net::api::ApiClient;
use crate::net::http::{ApiRequest, ApiResponse, Method, Transport, TransportError};
use crate::platform::{Clock, NavigationError, Navigator, Platform};
use crate::state::session::Session;
use crate::store::{MemoryTokenStore, TokenStore};

pub const BASE_URL: &str = "http://api.test";
pub const NOW_SECS: i64 = 1_700_000_000;

/// Unsigned JWT-shaped token carrying `payload`.
pub fn jwt(payload: &Value) -> String {
    let body = URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("eyJhbGciOiJIUzI1NiJ9.{body}.signature")
}

pub fn token(id: &str, role: &str, exp: i64) -> String {
    jwt(&json!({ "id": id, "role": role, "exp": exp }))
}

// =============================================================================
// CLOCK
// =============================================================================

pub struct ManualClock {
    millis: Cell<u64>,
}

impl ManualClock {
    pub fn at_secs(secs: i64) -> Self {
        Self { millis: Cell::new(u64::try_from(secs).unwrap_or_default() * 1000) }
    }

    pub fn advance_ms(&self, ms: u64) {
        self.millis.set(self.millis.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> u64 {
        self.millis.get()
    }
}

// =============================================================================
// NAVIGATOR
// =============================================================================

#[derive(Default)]
pub struct FakeNavigator {
    pushes: RefCell<Vec<String>>,
    hard_redirects: RefCell<Vec<String>>,
    location: RefCell<String>,
    pub fail: Cell<bool>,
}

impl FakeNavigator {
    pub fn pushes(&self) -> Vec<String> {
        self.pushes.borrow().clone()
    }

    pub fn hard_redirects(&self) -> Vec<String> {
        self.hard_redirects.borrow().clone()
    }

    /// Pretend the user typed `href` into the address bar.
    pub fn visit(&self, href: &str) {
        *self.location.borrow_mut() = href.to_owned();
    }
}

#[async_trait::async_trait(?Send)]
impl Navigator for FakeNavigator {
    async fn push(&self, href: &str) -> Result<(), NavigationError> {
        if self.fail.get() {
            return Err(NavigationError::RouterUnavailable);
        }
        self.pushes.borrow_mut().push(href.to_owned());
        self.visit(href);
        Ok(())
    }

    fn hard_redirect(&self, path: &str) {
        self.hard_redirects.borrow_mut().push(path.to_owned());
        self.visit(path);
    }

    fn current_href(&self) -> String {
        self.location.borrow().clone()
    }
}

// =============================================================================
// STORE
// =============================================================================

/// Storage that is never available, like a browser with storage disabled.
pub struct UnavailableStore;

impl TokenStore for UnavailableStore {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&self, _key: &str, _value: &str) {}

    fn remove(&self, _key: &str) {}
}

// =============================================================================
// TRANSPORT
// =============================================================================

type Scripted = Result<ApiResponse, TransportError>;

/// Replies keyed by method and path. Unscripted paths return 404.
#[derive(Default)]
pub struct FakeTransport {
    replies: RefCell<HashMap<String, Scripted>>,
    held: RefCell<HashMap<String, VecDeque<oneshot::Receiver<Scripted>>>>,
    requests: RefCell<Vec<ApiRequest>>,
}

fn route_key(method: Method, path: &str) -> String {
    format!("{} {path}", method.as_str())
}

impl FakeTransport {
    pub fn respond(&self, method: Method, path: &str, status: u16, body: &Value) {
        self.respond_with(method, path, Ok(ApiResponse::new(status, body.to_string())));
    }

    pub fn respond_with(&self, method: Method, path: &str, reply: Scripted) {
        self.replies.borrow_mut().insert(route_key(method, path), reply);
    }

    /// Park the next request to `path` until the returned sender fires.
    pub fn hold(&self, method: Method, path: &str) -> oneshot::Sender<Scripted> {
        let (tx, rx) = oneshot::channel();
        self.held.borrow_mut().entry(route_key(method, path)).or_default().push_back(rx);
        tx
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.borrow().clone()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        let url = format!("{BASE_URL}{path}");
        self.requests.borrow().iter().filter(|r| r.method == method && r.url == url).count()
    }
}

#[async_trait::async_trait(?Send)]
impl Transport for FakeTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let path = request.url.strip_prefix(BASE_URL).unwrap_or(&request.url).to_owned();
        let key = route_key(request.method, &path);
        self.requests.borrow_mut().push(request);

        let held = self.held.borrow_mut().get_mut(&key).and_then(VecDeque::pop_front);
        if let Some(rx) = held {
            return match rx.await {
                Ok(reply) => reply,
                Err(_) => Err(TransportError::Network("held reply dropped".to_owned())),
            };
        }
        self.replies.borrow().get(&key).cloned().unwrap_or_else(|| Ok(ApiResponse::new(404, "")))
    }
}

// =============================================================================
// HARNESS
// =============================================================================

/// A session wired to fakes and driven by a single-threaded executor.
pub struct Harness {
    pub pool: LocalPool,
    pub store: Rc<dyn TokenStore>,
    pub navigator: Rc<FakeNavigator>,
    pub clock: Rc<ManualClock>,
    pub transport: Rc<FakeTransport>,
    pub session: Session,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_store(Rc::new(MemoryTokenStore::new()))
    }

    pub fn with_entries(entries: &[(&str, &str)]) -> Self {
        Self::with_store(Rc::new(MemoryTokenStore::with_entries(entries.iter().copied())))
    }

    pub fn with_store(store: Rc<dyn TokenStore>) -> Self {
        let pool = LocalPool::new();
        let navigator = Rc::new(FakeNavigator::default());
        let clock = Rc::new(ManualClock::at_secs(NOW_SECS));
        let transport = Rc::new(FakeTransport::default());
        let spawner: Rc<dyn LocalSpawn> = Rc::new(pool.spawner());

        let platform = Platform {
            store: store.clone(),
            navigator: navigator.clone(),
            spawner,
            clock: clock.clone(),
        };
        let config = ClientConfig { api_base_url: BASE_URL.to_owned(), ..ClientConfig::default() };
        let api = ApiClient::new(&config, transport.clone(), &platform);
        let session = Session::new(config, platform, api);

        Self { pool, store, navigator, clock, transport, session }
    }

    /// Run spawned background tasks until none can make progress.
    pub fn run(&mut self) {
        self.pool.run_until_stalled();
    }

    pub fn block_on<F: Future>(&mut self, future: F) -> F::Output {
        self.pool.run_until(future)
    }
}
