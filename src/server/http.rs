//! HTTP request handling for the mock server.

use crate::error::Error;
use crate::interceptor::Adapter;
use crate::request::{Headers, InterceptedRequest};
use crate::response::MockResponse;
use crate::verify::UnexpectedRequestMessage;
use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::Response,
    Router,
};
use hyper::ext::ReasonPhrase;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Shared state for the HTTP server.
pub(super) struct AppState {
    pub adapter: Adapter,
    pub base_url: String,
    pub unexpected: Mutex<Vec<UnexpectedRequestMessage>>,
}

/// Run the HTTP server.
pub(super) async fn run_http_server(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown_rx: oneshot::Receiver<()>,
) {
    let app = Router::new().fallback(handle_request).with_state(state);

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.await;
        })
        .await;
    if let Err(e) = result {
        tracing::warn!("Mock server stopped: {}", e);
    }
}

/// Dispatch every request through the adapter.
async fn handle_request(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response<Body> {
    let request = to_intercepted_request(&state.base_url, &method, &uri, &headers, body);

    match state.adapter.send(&request) {
        Ok(response) => to_http_response(response),
        Err(Error::UnexpectedRequest(message)) => {
            let text = message.to_string();
            state.unexpected.lock().push(message);
            plain_response(StatusCode::NOT_FOUND, text)
        }
        Err(e) => plain_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

fn to_intercepted_request(
    base_url: &str,
    method: &Method,
    uri: &Uri,
    headers: &HeaderMap,
    body: Bytes,
) -> InterceptedRequest {
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());

    let mut received = Headers::new();
    for (name, value) in headers.iter() {
        match value.to_str() {
            Ok(value) => received.append(name.as_str(), value),
            Err(_) => tracing::debug!("Dropping non UTF-8 value of header {}", name),
        }
    }

    InterceptedRequest {
        method: method.as_str().to_string(),
        url: format!("{}{}", base_url, path),
        headers: received,
        body: body.to_vec(),
    }
}

fn to_http_response(response: MockResponse) -> Response<Body> {
    let MockResponse {
        status,
        reason,
        headers,
        cookies,
        body,
    } = response;

    let mut builder = Response::builder().status(status);
    for (name, value) in headers.iter() {
        builder = builder.header(name, value);
    }
    for cookie in &cookies {
        builder = builder.header(header::SET_COOKIE, cookie.to_string());
    }

    let mut http_response = match builder.body(Body::from(body)) {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!("Failed to build mock response: {}", e);
            return plain_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }
    };

    if http_response.status().canonical_reason() != Some(reason.as_str()) {
        match ReasonPhrase::try_from(reason.into_bytes()) {
            Ok(phrase) => {
                http_response.extensions_mut().insert(phrase);
            }
            Err(e) => tracing::warn!("Invalid reason phrase: {:?}", e),
        }
    }
    http_response
}

fn plain_response(status: StatusCode, text: String) -> Response<Body> {
    let mut response = Response::new(Body::from(text));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}
