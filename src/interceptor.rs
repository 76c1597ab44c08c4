//! Request interception: route registration and dispatch.

use crate::error::{Error, Result};
use crate::matcher::Matcher;
use crate::mock::ServiceMock;
use crate::request::InterceptedRequest;
use crate::response::{MockResponse, Response};
use crate::verify::UnexpectedRequestMessage;
use parking_lot::Mutex;
use std::sync::Arc;
use thiserror::Error;

/// A stubbed endpoint: method and URL, an extra matcher, and the response to return.
#[derive(Clone)]
pub struct Route {
    method: String,
    url: String,
    matcher: Arc<dyn Matcher>,
    response: Response,
}

impl Route {
    pub fn new(
        method: impl Into<String>,
        url: impl Into<String>,
        matcher: impl Matcher + 'static,
        response: Response,
    ) -> Self {
        Route {
            method: method.into(),
            url: url.into(),
            matcher: Arc::new(matcher),
            response,
        }
    }

    /// Same route with a different response.
    pub fn with_response(&self, response: Response) -> Self {
        Route {
            response,
            ..self.clone()
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn response(&self) -> &Response {
        &self.response
    }

    /// The matcher runs only once method and URL agree.
    fn matches(&self, request: &InterceptedRequest) -> bool {
        request.method == self.method && request.url == self.url && self.matcher.matches(request)
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("response", &self.response)
            .finish()
    }
}

/// Something expectations can register stubbed routes with.
pub trait Interceptor {
    /// Register a route. Routes registered later take precedence.
    fn register(&self, route: Route);
}

impl<T: Interceptor + ?Sized> Interceptor for &T {
    fn register(&self, route: Route) {
        (**self).register(route)
    }
}

impl<T: Interceptor + ?Sized> Interceptor for Arc<T> {
    fn register(&self, route: Route) {
        (**self).register(route)
    }
}

/// Raised by [`Mocker`] when no registered route matches.
#[derive(Debug, Clone, Error)]
#[error("no mock address: {request}")]
pub struct NoMatch {
    pub request: InterceptedRequest,
}

/// In-process interceptor holding a table of routes.
///
/// Clones share the same route table.
#[derive(Clone, Default)]
pub struct Mocker {
    routes: Arc<Mutex<Vec<Route>>>,
}

impl Mocker {
    pub fn new() -> Self {
        Mocker::default()
    }

    /// Dispatch a request to the most recently registered matching route.
    ///
    /// Routes whose matcher is still pending are tried first, so repeated
    /// expectations for one endpoint are each satisfied in turn.
    pub fn send(&self, request: &InterceptedRequest) -> std::result::Result<MockResponse, NoMatch> {
        // Matchers may lock the expectation registry; don't hold the route table meanwhile.
        let routes = self.routes.lock().clone();
        let matched = routes
            .iter()
            .rev()
            .find(|route| route.matcher.pending() && route.matches(request))
            .or_else(|| routes.iter().rev().find(|route| route.matches(request)));

        if let Some(route) = matched {
            tracing::debug!("Matched route: {} {}", route.method, route.url);
            return Ok(route.response.materialize());
        }
        Err(NoMatch {
            request: request.clone(),
        })
    }

    /// Number of registered routes.
    pub fn route_count(&self) -> usize {
        self.routes.lock().len()
    }

    /// Remove all routes.
    pub fn reset(&self) {
        self.routes.lock().clear();
    }
}

impl Interceptor for Mocker {
    fn register(&self, route: Route) {
        tracing::debug!("Registered route: {} {}", route.method, route.url);
        self.routes.lock().push(route);
    }
}

impl std::fmt::Debug for Mocker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mocker")
            .field("routes", &*self.routes.lock())
            .finish()
    }
}

/// Wraps a [`Mocker`] so unmatched requests report every known expectation.
#[derive(Debug, Clone)]
pub struct Adapter {
    mocker: Mocker,
    context: ServiceMock,
}

impl Adapter {
    pub fn new(mocker: Mocker, context: &ServiceMock) -> Self {
        Adapter {
            mocker,
            context: context.clone(),
        }
    }

    /// Dispatch a request, failing with [`Error::UnexpectedRequest`] on no match.
    pub fn send(&self, request: &InterceptedRequest) -> Result<MockResponse> {
        self.mocker.send(request).map_err(|no_match| {
            let message = UnexpectedRequestMessage::new(no_match.request, self.context.expectations());
            tracing::warn!("{}", message);
            Error::UnexpectedRequest(message)
        })
    }

    pub fn mocker(&self) -> &Mocker {
        &self.mocker
    }
}

impl Interceptor for Adapter {
    fn register(&self, route: Route) {
        self.mocker.register(route);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn any(_: &InterceptedRequest) -> bool {
        true
    }

    #[test]
    fn later_routes_take_precedence() {
        let mocker = Mocker::new();
        let route = Route::new("GET", "http://svc/a", any, Response::new(200));
        mocker.register(route.clone());
        mocker.register(route.with_response(Response::new(204)));

        let response = mocker.send(&InterceptedRequest::get("http://svc/a")).unwrap();
        assert_eq!(response.status, 204);
        assert_eq!(mocker.route_count(), 2);
    }

    #[test]
    fn matcher_can_reject_request() {
        let mocker = Mocker::new();
        mocker.register(Route::new(
            "POST",
            "http://svc/a",
            |r: &InterceptedRequest| !r.body.is_empty(),
            Response::new(201),
        ));

        let err = mocker
            .send(&InterceptedRequest::post("http://svc/a"))
            .unwrap_err();
        assert_eq!(err.request.url, "http://svc/a");
        assert!(mocker
            .send(&InterceptedRequest::post("http://svc/a").with_body("x"))
            .is_ok());
    }

    struct Once(Mutex<bool>);

    impl Matcher for Once {
        fn matches(&self, _: &InterceptedRequest) -> bool {
            *self.0.lock() = false;
            true
        }

        fn pending(&self) -> bool {
            *self.0.lock()
        }
    }

    #[test]
    fn pending_routes_are_tried_before_newer_ones() {
        let mocker = Mocker::new();
        mocker.register(Route::new(
            "GET",
            "http://svc/a",
            Once(Mutex::new(true)),
            Response::new(201),
        ));
        mocker.register(Route::new("GET", "http://svc/a", any, Response::new(202)));

        let request = InterceptedRequest::get("http://svc/a");
        assert_eq!(mocker.send(&request).unwrap().status, 201);
        assert_eq!(mocker.send(&request).unwrap().status, 202);
        assert_eq!(mocker.send(&request).unwrap().status, 202);
    }

    #[test]
    fn reset_removes_routes() {
        let mocker = Mocker::new();
        mocker.register(Route::new("GET", "http://svc/a", any, Response::new(200)));
        mocker.reset();
        assert!(mocker.send(&InterceptedRequest::get("http://svc/a")).is_err());
    }
}
