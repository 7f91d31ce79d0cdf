//! Durable key/value mirror of the session credential.
//!
//! SYSTEM CONTEXT
//! ==============
//! Written on every session mutation, read once at hydration. The store knows
//! nothing about tokens or expiry; it is a dumb string map that survives page
//! reloads.
//!
//! ERROR HANDLING
//! ==============
//! An unavailable backend behaves like an empty store. Reads return `None`
//! and writes are dropped with a warning, which degrades the client to an
//! anonymous session instead of failing.

#[cfg(test)]
#[path = "token_store_test.rs"]
mod token_store_test;

use std::cell::RefCell;
use std::collections::HashMap;

/// Key holding the raw credential string.
pub const TOKEN_KEY: &str = "token";
/// Key holding the cached role string.
pub const ROLE_KEY: &str = "userRole";

pub trait TokenStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// In-process store used for SSR and tests.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate keys, as if left behind by a previous page load.
    #[must_use]
    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let store = Self::new();
        for (key, value) in entries {
            store.set(key, value);
        }
        store
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries.borrow_mut().insert(key.to_owned(), value.to_owned());
    }

    fn remove(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }
}

/// `window.localStorage` backed store.
#[cfg(feature = "hydrate")]
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserTokenStore;

#[cfg(feature = "hydrate")]
impl BrowserTokenStore {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window().and_then(|w| w.local_storage().unwrap_or_default())
    }
}

#[cfg(feature = "hydrate")]
impl TokenStore for BrowserTokenStore {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).unwrap_or_default()
    }

    fn set(&self, key: &str, value: &str) {
        let Some(storage) = Self::storage() else {
            leptos::logging::warn!("localStorage unavailable; dropping write to {key}");
            return;
        };
        if storage.set_item(key, value).is_err() {
            leptos::logging::warn!("localStorage rejected write to {key}");
        }
    }

    fn remove(&self, key: &str) {
        let Some(storage) = Self::storage() else {
            return;
        };
        if storage.remove_item(key).is_err() {
            leptos::logging::warn!("localStorage rejected removal of {key}");
        }
    }
}
