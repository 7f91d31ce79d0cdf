//! Browser transport built on `gloo-net`.
//!
//! `fetch` has no timeout of its own, so each request races a
//! `gloo-timers` timeout future and the loser is dropped.

use futures::future::{Either, select};
use gloo_net::http::{Method as GlooMethod, RequestBuilder};

use super::http::{ApiRequest, ApiResponse, Body, HeaderSink, Method, MultipartForm, Transport, TransportError};

#[derive(Debug, Clone, Copy)]
pub struct GlooTransport {
    timeout_ms: u64,
}

impl GlooTransport {
    pub fn new(timeout_ms: u64) -> Self {
        Self { timeout_ms }
    }
}

#[async_trait::async_trait(?Send)]
impl Transport for GlooTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let millis = u32::try_from(self.timeout_ms).unwrap_or(u32::MAX);
        let send = Box::pin(send(request));
        let timeout = Box::pin(gloo_timers::future::TimeoutFuture::new(millis));
        match select(send, timeout).await {
            Either::Left((result, _)) => result,
            Either::Right(((), _)) => Err(TransportError::Timeout { ms: self.timeout_ms }),
        }
    }
}

impl HeaderSink for gloo_net::http::Headers {
    fn set_header(&mut self, name: &str, value: &str) {
        self.set(name, value);
    }

    fn delete_header(&mut self, name: &str) {
        self.delete(name);
    }
}

async fn send(request: ApiRequest) -> Result<ApiResponse, TransportError> {
    let method = match request.method {
        Method::Get => GlooMethod::GET,
        Method::Post => GlooMethod::POST,
        Method::Delete => GlooMethod::DELETE,
    };

    let mut headers = gloo_net::http::Headers::new();
    for (name, value) in request.headers.iter() {
        headers.set_header(name, value);
    }
    let builder = RequestBuilder::new(&request.url).method(method).headers(headers);

    let built = match request.body {
        Body::Empty => builder.build(),
        Body::Json(value) => builder.body(value.to_string()),
        Body::Multipart(form) => builder.body(form_data(&form)?),
    }
    .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

    let response = built.send().await.map_err(|e| TransportError::Network(e.to_string()))?;
    let status = response.status();
    let body = response.text().await.map_err(|e| TransportError::Network(e.to_string()))?;
    Ok(ApiResponse { status, body })
}

fn form_data(form: &MultipartForm) -> Result<web_sys::FormData, TransportError> {
    let invalid = |e: wasm_bindgen::JsValue| TransportError::InvalidRequest(format!("{e:?}"));

    let data = web_sys::FormData::new().map_err(invalid)?;
    for (name, value) in &form.fields {
        data.append_with_str(name, value).map_err(invalid)?;
    }
    for file in &form.files {
        let bytes = js_sys::Uint8Array::from(file.bytes.as_slice());
        let parts = js_sys::Array::of1(&wasm_bindgen::JsValue::from(bytes));
        let blob = web_sys::Blob::new_with_u8_array_sequence(&parts).map_err(invalid)?;
        data.append_with_blob_and_filename(&file.field, &blob, &file.filename)
            .map_err(invalid)?;
    }
    Ok(data)
}
