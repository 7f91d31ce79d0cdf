//! Client configuration baked in at build time.
//!
//! DESIGN
//! ======
//! The WASM bundle has no process environment at runtime, so values are read
//! with `option_env!` when the crate is compiled and parsed with defaults.
//! Malformed numbers fall back to the default instead of failing the build.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3001";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_AUTH_ERROR_COOLDOWN_MS: u64 = 300;
pub const DEFAULT_LOGIN_PATH: &str = "/login";
pub const DEFAULT_REGISTER_PATH: &str = "/register";
pub const DEFAULT_LANDING_PATH: &str = "/";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("api base url must not be empty")]
    EmptyBaseUrl,
    #[error("route path '{0}' must start with '/'")]
    RelativeRoute(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Origin (and optional prefix) every API path is resolved against.
    pub api_base_url: String,
    pub request_timeout_ms: u64,
    /// How long the 401/403 guard stays closed after a forced logout finishes.
    pub auth_error_cooldown_ms: u64,
    pub login_path: String,
    pub register_path: String,
    /// Where users land after login or when a page is off limits.
    pub landing_path: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            auth_error_cooldown_ms: DEFAULT_AUTH_ERROR_COOLDOWN_MS,
            login_path: DEFAULT_LOGIN_PATH.to_owned(),
            register_path: DEFAULT_REGISTER_PATH.to_owned(),
            landing_path: DEFAULT_LANDING_PATH.to_owned(),
        }
    }
}

impl ClientConfig {
    /// Build config from variables captured at compile time.
    ///
    /// Optional:
    /// - `API_BASE_URL`: default `http://localhost:3001`
    /// - `API_TIMEOUT_MS`: default 10000
    /// - `AUTH_ERROR_COOLDOWN_MS`: default 300
    #[must_use]
    pub fn from_build_env() -> Self {
        Self::from_values(
            option_env!("API_BASE_URL"),
            option_env!("API_TIMEOUT_MS"),
            option_env!("AUTH_ERROR_COOLDOWN_MS"),
        )
    }

    fn from_values(base_url: Option<&str>, timeout_ms: Option<&str>, cooldown_ms: Option<&str>) -> Self {
        let api_base_url = base_url
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .unwrap_or(DEFAULT_API_BASE_URL)
            .trim_end_matches('/')
            .to_owned();

        Self {
            api_base_url,
            request_timeout_ms: parse_or(timeout_ms, DEFAULT_REQUEST_TIMEOUT_MS),
            auth_error_cooldown_ms: parse_or(cooldown_ms, DEFAULT_AUTH_ERROR_COOLDOWN_MS),
            ..Self::default()
        }
    }

    /// Check invariants the router and API client rely on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for an empty base URL or a route path that is
    /// not absolute.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_base_url.trim().is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }
        for path in [&self.login_path, &self.register_path, &self.landing_path] {
            if !path.starts_with('/') {
                return Err(ConfigError::RelativeRoute(path.clone()));
            }
        }
        Ok(())
    }
}

fn parse_or<T>(raw: Option<&str>, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    match raw.map(|v| v.trim().parse::<T>()) {
        Some(Ok(value)) => value,
        _ => default,
    }
}
