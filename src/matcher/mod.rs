//! Request matching logic.

use crate::expectation::{Expectation, ExpectationRegistry, MatchState};
use crate::request::{InterceptedRequest, Request};
use parking_lot::Mutex;
use std::sync::Arc;

/// Trait for matching requests.
pub trait Matcher: Send + Sync {
    /// Check if this matcher matches the given request.
    fn matches(&self, request: &InterceptedRequest) -> bool;

    /// Whether this matcher still waits for its first match.
    ///
    /// Interceptors try pending matchers before falling back to the rest.
    fn pending(&self) -> bool {
        false
    }
}

impl<F> Matcher for F
where
    F: Fn(&InterceptedRequest) -> bool + Send + Sync,
{
    fn matches(&self, request: &InterceptedRequest) -> bool {
        self(request)
    }
}

/// Structural match of a resolved request spec. Has no side effects.
impl Matcher for Request {
    fn matches(&self, request: &InterceptedRequest) -> bool {
        if request.method != self.method {
            return false;
        }
        if request.url != self.path {
            return false;
        }
        if let Some(headers) = &self.headers {
            if !headers.is_subset_of(&request.headers) {
                return false;
            }
        }
        self.body.matches(&request.body)
    }
}

/// Matches requests against one expectation and records the match.
///
/// Returning true marks the expectation satisfied in the shared registry.
/// The boolean result is stable across calls; only the first match changes
/// state.
pub struct ExpectationMatcher {
    expectation: Expectation,
    registry: Arc<Mutex<ExpectationRegistry>>,
}

impl ExpectationMatcher {
    pub(crate) fn new(expectation: Expectation, registry: Arc<Mutex<ExpectationRegistry>>) -> Self {
        ExpectationMatcher {
            expectation,
            registry,
        }
    }

    pub fn expectation(&self) -> &Expectation {
        &self.expectation
    }
}

impl Matcher for ExpectationMatcher {
    fn matches(&self, request: &InterceptedRequest) -> bool {
        if !self.expectation.request().matches(request) {
            return false;
        }
        if self.registry.lock().mark_satisfied(self.expectation.id()) {
            tracing::debug!("Expectation satisfied: {}", self.expectation);
        }
        true
    }

    fn pending(&self) -> bool {
        self.registry.lock().state(self.expectation.id()) == Some(MatchState::Pending)
    }
}

impl std::fmt::Debug for ExpectationMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpectationMatcher")
            .field("expectation", &self.expectation)
            .finish()
    }
}
