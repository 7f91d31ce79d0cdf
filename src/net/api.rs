//! REST client for the tournament service.
//!
//! Every call goes through [`ApiClient::send`], which applies the default
//! headers, runs the interceptor chain, and maps non-2xx responses to
//! [`ApiError::Status`].
//!
//! ERROR HANDLING
//! ==============
//! Errors are returned verbatim so views can render them. A 401/403 also
//! schedules a forced logout through the interceptor before the error is
//! handed back.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::http::{
    ACCEPT, APPLICATION_JSON, ApiError, ApiRequest, ApiResponse, CONTENT_TYPE, HeaderSink, MultipartForm, Transport,
    TransportError,
};
use super::interceptor::RequestInterceptor;
use super::types::{LoginRequest, LoginResponse, Notification, Paging, ReviewInput};
use crate::config::ClientConfig;
use crate::platform::Platform;
use crate::state::session::Session;

pub const LOGIN_ENDPOINT: &str = "/auth/login";
pub const REGISTER_ENDPOINT: &str = "/auth/register";
pub const NOTIFICATIONS_ENDPOINT: &str = "/api/notifications";

#[derive(Clone)]
pub struct ApiClient {
    inner: Rc<ApiClientInner>,
}

struct ApiClientInner {
    base_url: String,
    transport: Rc<dyn Transport>,
    interceptor: RequestInterceptor,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, transport: Rc<dyn Transport>, platform: &Platform) -> Self {
        let interceptor = RequestInterceptor::new(
            config.auth_error_cooldown_ms,
            Rc::clone(&platform.clock),
            Rc::clone(&platform.spawner),
        );
        Self {
            inner: Rc::new(ApiClientInner {
                base_url: config.api_base_url.trim_end_matches('/').to_owned(),
                transport,
                interceptor,
            }),
        }
    }

    pub(crate) fn attach_session(&self, session: &Session) {
        self.inner.interceptor.attach(session.downgrade());
    }

    pub fn interceptor(&self) -> &RequestInterceptor {
        &self.inner.interceptor
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Absolute URL for an API path.
    pub fn url(&self, path: &str) -> String {
        if is_absolute_url(path) {
            return path.to_owned();
        }
        let path = path.trim_start_matches('/');
        format!("{}/{path}", self.inner.base_url)
    }

    /// Resolve a media path returned by the API into something an `<img>`
    /// can load. Absolute, `data:` and `blob:` URLs pass through.
    pub fn asset_url(&self, path: &str) -> Option<String> {
        let path = path.trim();
        if path.is_empty() {
            return None;
        }
        if is_absolute_url(path) || path.starts_with("data:") || path.starts_with("blob:") {
            return Some(path.to_owned());
        }
        Some(self.url(path))
    }

    /// Send a request through the interceptor chain.
    ///
    /// # Errors
    ///
    /// Transport failures and non-2xx statuses, unchanged.
    pub async fn send(&self, mut request: ApiRequest) -> Result<ApiResponse, ApiError> {
        if !request.headers.contains(CONTENT_TYPE) {
            request.headers.set_header(CONTENT_TYPE, APPLICATION_JSON);
        }
        if !request.headers.contains(ACCEPT) {
            request.headers.set_header(ACCEPT, APPLICATION_JSON);
        }
        self.inner.interceptor.before_send(&mut request.headers, &request.body);
        request.url = self.url(&request.url);

        let result = match self.inner.transport.execute(request).await {
            Ok(response) if response.is_success() => Ok(response),
            Ok(response) => Err(ApiError::Status { status: response.status, body: response.body }),
            Err(e) => Err(ApiError::Transport(e)),
        };
        if let Err(error) = &result {
            self.inner.interceptor.on_error(error);
        }
        result
    }

    /// `GET` a JSON resource.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`]; also [`ApiError::Decode`] on a body mismatch.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(ApiRequest::get(path)).await?.json()
    }

    /// `POST` a JSON body and decode the JSON reply.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::get_json`].
    pub async fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        let body = serde_json::to_value(body).map_err(|e| ApiError::Decode(e.to_string()))?;
        self.send(ApiRequest::post_json(path, body)).await?.json()
    }

    /// `POST` a multipart form. The interceptor drops the JSON `Content-Type`
    /// so the browser can write the boundary.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::get_json`].
    pub async fn post_form<T: DeserializeOwned>(&self, path: &str, form: MultipartForm) -> Result<T, ApiError> {
        self.send(ApiRequest::post_multipart(path, form)).await?.json()
    }

    /// # Errors
    ///
    /// See [`ApiClient::get_json`].
    pub async fn delete_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(ApiRequest::delete(path)).await?.json()
    }

    /// Exchange username and password for a token and role.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::post_json`].
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        self.post_json(LOGIN_ENDPOINT, &LoginRequest { username, password }).await
    }

    /// Create an account. The reply is opaque to the client.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::post_json`].
    pub async fn register(&self, payload: &serde_json::Value) -> Result<serde_json::Value, ApiError> {
        self.post_json(REGISTER_ENDPOINT, payload).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::get_json`].
    pub async fn notifications(&self) -> Result<Vec<Notification>, ApiError> {
        self.get_json(NOTIFICATIONS_ENDPOINT).await
    }
}

// =============================================================================
// REVIEWS AND PLAYER STATS
// =============================================================================

/// Reply bodies here are rendered by the views as-is.
impl ApiClient {
    /// # Errors
    ///
    /// See [`ApiClient::get_json`].
    pub async fn tournament_reviews(&self, tournament_id: &str, paging: Paging) -> Result<Value, ApiError> {
        let id = required("tournament id", tournament_id)?;
        let mut params = Vec::new();
        if paging.page > 0 {
            params.push(("page", paging.page.to_string()));
        }
        if paging.limit > 0 {
            params.push(("limit", paging.limit.to_string()));
        }
        self.get_json(&with_query(&format!("/api/tournaments/{id}/reviews"), &params)).await
    }

    /// Create or replace the current user's review of a tournament.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::post_json`].
    pub async fn upsert_tournament_review(&self, tournament_id: &str, review: &ReviewInput) -> Result<Value, ApiError> {
        let id = required("tournament id", tournament_id)?;
        self.post_json(&format!("/api/tournaments/{id}/reviews"), review).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::delete_json`].
    pub async fn delete_review(&self, review_id: &str) -> Result<Value, ApiError> {
        let id = required("review id", review_id)?;
        self.delete_json(&format!("/api/reviews/{id}")).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::get_json`].
    pub async fn search_players(&self, query: &str, paging: Paging) -> Result<Value, ApiError> {
        let mut params = Vec::new();
        if !query.trim().is_empty() {
            params.push(("q", query.to_owned()));
        }
        params.push(("page", paging.page.to_string()));
        params.push(("limit", paging.limit.to_string()));
        self.get_json(&with_query("/api/players/search", &params)).await
    }

    /// # Errors
    ///
    /// [`TransportError::InvalidRequest`] for a blank id, otherwise see
    /// [`ApiClient::get_json`].
    pub async fn player_stats(&self, player_id: &str) -> Result<Value, ApiError> {
        let id = required("player id", player_id)?;
        self.get_json(&format!("/api/players/{id}/stats")).await
    }

    /// Most recent `limit` matches of a player.
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::player_stats`].
    pub async fn player_match_log(&self, player_id: &str, limit: u32) -> Result<Value, ApiError> {
        let id = required("player id", player_id)?;
        self.get_json(&with_query(&format!("/api/players/{id}/matches"), &[("limit", limit.to_string())])).await
    }
}

/// Percent-encoded path segment, or an error when `raw` is blank.
fn required(what: &str, raw: &str) -> Result<String, ApiError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(TransportError::InvalidRequest(format!("{what} is required")).into());
    }
    Ok(urlencoding::encode(raw).into_owned())
}

fn with_query(path: &str, params: &[(&str, String)]) -> String {
    if params.is_empty() {
        return path.to_owned();
    }
    let query = params
        .iter()
        .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");
    format!("{path}?{query}")
}

fn is_absolute_url(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("//")
}
