//! Mock HTTP server acting as an interception layer for real HTTP clients.

mod http;

use crate::interceptor::{Adapter, Interceptor, Mocker, Route};
use crate::mock::ServiceMock;
use crate::verify::UnexpectedRequestMessage;
use crate::Result;
use parking_lot::Mutex;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;

/// A local HTTP server answering with the routes expectations register.
///
/// Use [`url`](Self::url) as the base URL passed to [`ServiceMock::expect`].
pub struct MockServer {
    /// HTTP server address.
    addr: SocketAddr,
    /// State shared with the request handler.
    state: Arc<http::AppState>,
    /// Shutdown signal sender.
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockServer {
    /// Start a new mock server on a random available port.
    pub async fn start(context: &ServiceMock) -> Result<Self> {
        Self::builder().start(context).await
    }

    /// Create a builder for configuring the server.
    pub fn builder() -> MockServerBuilder {
        MockServerBuilder::default()
    }

    /// Base URL of the server, without a trailing slash.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get the HTTP server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Requests that matched no route, oldest first.
    pub fn unexpected_requests(&self) -> Vec<UnexpectedRequestMessage> {
        self.state.unexpected.lock().clone()
    }

    /// Forget recorded unexpected requests.
    pub fn clear_unexpected_requests(&self) {
        self.state.unexpected.lock().clear();
    }

    /// Remove all registered routes.
    pub fn clear_routes(&self) {
        self.state.adapter.mocker().reset();
    }

    /// Shutdown the server.
    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Interceptor for MockServer {
    fn register(&self, route: Route) {
        self.state.adapter.register(route);
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Builder for configuring a mock server.
#[derive(Debug, Default)]
pub struct MockServerBuilder {
    port: Option<u16>,
}

impl MockServerBuilder {
    /// Set a specific port for the HTTP server.
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Start the server, reporting unmatched requests against `context`.
    pub async fn start(self, context: &ServiceMock) -> Result<MockServer> {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let addr = format!("127.0.0.1:{}", self.port.unwrap_or(0));
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        let addr = listener.local_addr()?;

        let state = Arc::new(http::AppState {
            adapter: Adapter::new(Mocker::new(), context),
            base_url: format!("http://{}", addr),
            unexpected: Mutex::new(Vec::new()),
        });

        let http_state = state.clone();
        tokio::spawn(async move {
            http::run_http_server(listener, http_state, shutdown_rx).await;
        });
        tracing::debug!("Mock server listening on {}", addr);

        Ok(MockServer {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        })
    }
}
