//! # servicemock
//!
//! Expectation-based HTTP mocking for testing service clients.
//!
//! Declare the requests a test expects, stub their responses, then check
//! afterwards that every expected request was actually made.
//!
//! ## Example
//!
//! ```no_run
//! use servicemock::{MockServer, Request, Response, ResponseBody, ServiceMock};
//! use serde_json::json;
//!
//! #[tokio::test]
//! async fn test_status_check() {
//!     let sm = ServiceMock::new();
//!     let server = MockServer::start(&sm).await.unwrap();
//!
//!     sm.expect(server.url(), &server)
//!         .to_receive(Request::get("/v1/status-check"))
//!         .and_responds(Response::ok(ResponseBody::json(json!({"status": "ok"}))));
//!
//!     // Point your client at server.url() and exercise it
//!
//!     sm.verify().unwrap();
//! }
//! ```

pub mod error;
pub mod expectation;
pub mod interceptor;
pub mod matcher;
pub mod mock;
pub mod request;
pub mod response;
pub mod server;
pub mod verify;

// Re-exports for convenience
pub use error::{Error, Result};
pub use expectation::{Expectation, ExpectationId, MatchState};
pub use interceptor::{Adapter, Interceptor, Mocker, NoMatch, Route};
pub use matcher::Matcher;
pub use mock::{RequestBuilder, ResponseBuilder, ServiceMock};
pub use request::{Headers, InterceptedRequest, Request, RequestBody};
pub use response::{Cookie, JsonBody, MockResponse, Response, ResponseBody};
pub use server::{MockServer, MockServerBuilder};
pub use verify::{UnexpectedRequestMessage, VerifyErrorMessage};
