//! The expectation DSL: declare, respond, verify.

use crate::error::{Error, Result};
use crate::expectation::{Expectation, ExpectationRegistry};
use crate::interceptor::{Interceptor, Route};
use crate::matcher::ExpectationMatcher;
use crate::request::Request;
use crate::response::Response;
use crate::verify::VerifyErrorMessage;
use parking_lot::Mutex;
use std::sync::Arc;

/// A set of expectations for one test case.
///
/// Create one per test. Clones share the same registry, so a clone can be
/// handed to an interceptor while the test keeps its own handle.
#[derive(Debug, Clone, Default)]
pub struct ServiceMock {
    registry: Arc<Mutex<ExpectationRegistry>>,
}

impl ServiceMock {
    /// Create an empty set of expectations.
    pub fn new() -> Self {
        ServiceMock::default()
    }

    /// Begin declaring a request expected at `base_url`.
    pub fn expect<'a, I: Interceptor>(
        &self,
        base_url: impl Into<String>,
        interceptor: &'a I,
    ) -> RequestBuilder<'a, I> {
        RequestBuilder {
            context: self.clone(),
            base_url: base_url.into(),
            interceptor,
        }
    }

    /// Check that every expected request was made.
    pub fn verify(&self) -> Result<()> {
        let missing = self.registry.lock().unsatisfied();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::Verification(VerifyErrorMessage::new(missing)))
        }
    }

    /// Like [`verify`](Self::verify), but panics with the failure message.
    #[track_caller]
    pub fn assert_verified(&self) {
        if let Err(e) = self.verify() {
            panic!("{}", e);
        }
    }

    /// Clear all expectations.
    pub fn clean(&self) {
        self.registry.lock().reset();
    }

    /// Every registered expectation, in registration order.
    pub fn expectations(&self) -> Vec<Expectation> {
        self.registry.lock().all()
    }

    /// Expectations not yet matched, in registration order.
    pub fn unsatisfied(&self) -> Vec<Expectation> {
        self.registry.lock().unsatisfied()
    }
}

/// First step of an expectation: where requests are sent.
pub struct RequestBuilder<'a, I: Interceptor> {
    context: ServiceMock,
    base_url: String,
    interceptor: &'a I,
}

impl<'a, I: Interceptor> RequestBuilder<'a, I> {
    /// Register the expectation and stub it with `200 OK` and no body.
    pub fn to_receive(self, request: Request) -> ResponseBuilder<'a, I> {
        let resolved = request.resolve(&self.base_url);
        let expectation = self.context.registry.lock().add(resolved);

        let route = Route::new(
            expectation.method(),
            expectation.url(),
            ExpectationMatcher::new(expectation.clone(), self.context.registry.clone()),
            Response::default(),
        );
        self.interceptor.register(route.clone());

        ResponseBuilder {
            expectation,
            route,
            interceptor: self.interceptor,
        }
    }
}

/// Second step of an expectation: what to answer with.
pub struct ResponseBuilder<'a, I: Interceptor> {
    expectation: Expectation,
    route: Route,
    interceptor: &'a I,
}

impl<I: Interceptor> ResponseBuilder<'_, I> {
    /// Replace the default response.
    pub fn and_responds(self, response: Response) -> Expectation {
        self.interceptor.register(self.route.with_response(response));
        self.expectation
    }

    pub fn expectation(&self) -> &Expectation {
        &self.expectation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interceptor::Mocker;
    use crate::request::InterceptedRequest;

    #[test]
    fn contexts_do_not_share_expectations() {
        let mocker = Mocker::new();
        let first = ServiceMock::new();
        let second = ServiceMock::new();

        first
            .expect("http://svc", &mocker)
            .to_receive(Request::get("/a"));

        assert!(first.verify().is_err());
        assert!(second.verify().is_ok());
    }

    #[test]
    fn clean_drops_expectations() {
        let mocker = Mocker::new();
        let sm = ServiceMock::new();
        sm.expect("http://svc", &mocker).to_receive(Request::get("/a"));

        sm.clean();

        assert!(sm.verify().is_ok());
        assert!(sm.expectations().is_empty());
    }

    #[test]
    fn route_from_before_clean_cannot_satisfy_new_expectation() {
        let mocker = Mocker::new();
        let sm = ServiceMock::new();
        sm.expect("http://svc", &mocker).to_receive(Request::get("/a"));
        sm.clean();
        sm.expect("http://svc", &Mocker::new())
            .to_receive(Request::get("/a"));

        mocker.send(&InterceptedRequest::get("http://svc/a")).unwrap();

        assert_eq!(sm.unsatisfied().len(), 1);
    }

    #[test]
    #[should_panic(expected = "Expected request 'GET http://svc/a' was not made.")]
    fn assert_verified_panics_with_message() {
        let mocker = Mocker::new();
        let sm = ServiceMock::new();
        sm.expect("http://svc", &mocker).to_receive(Request::get("/a"));
        sm.assert_verified();
    }
}
