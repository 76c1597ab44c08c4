//! Expectation registration and match state.

use crate::request::Request;
use std::collections::HashMap;
use std::fmt;

/// Identity of a registered expectation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExpectationId(u64);

/// Whether an expectation has been exercised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchState {
    #[default]
    Pending,
    Satisfied,
}

/// A request the test expects to receive, with its URL fully resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Expectation {
    id: ExpectationId,
    request: Request,
}

impl Expectation {
    pub fn id(&self) -> ExpectationId {
        self.id
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn method(&self) -> &str {
        self.request.method()
    }

    /// The full URL (base URL followed by the declared path).
    pub fn url(&self) -> &str {
        self.request.path()
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.request, f)
    }
}

/// Ordered collection of expectations and their match state.
///
/// Identities are never reused, even across [`reset`](Self::reset), so a
/// route left behind by an earlier test cannot satisfy a newer expectation.
#[derive(Debug, Default)]
pub struct ExpectationRegistry {
    expectations: Vec<Expectation>,
    states: HashMap<ExpectationId, MatchState>,
    next_id: u64,
}

impl ExpectationRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        ExpectationRegistry::default()
    }

    /// Register an expectation for an already-resolved request.
    pub fn add(&mut self, request: Request) -> Expectation {
        let id = ExpectationId(self.next_id);
        self.next_id += 1;

        let expectation = Expectation { id, request };
        self.states.insert(id, MatchState::Pending);
        self.expectations.push(expectation.clone());
        tracing::debug!("Registered expectation: {}", expectation);
        expectation
    }

    /// Expectations never matched, in registration order.
    pub fn unsatisfied(&self) -> Vec<Expectation> {
        self.expectations
            .iter()
            .filter(|e| self.state(e.id) == Some(MatchState::Pending))
            .cloned()
            .collect()
    }

    /// All registered expectations, in registration order.
    pub fn all(&self) -> Vec<Expectation> {
        self.expectations.clone()
    }

    /// Get the match state of an expectation, if it is still registered.
    pub fn state(&self, id: ExpectationId) -> Option<MatchState> {
        self.states.get(&id).copied()
    }

    /// Move an expectation from pending to satisfied.
    ///
    /// Returns true only on the transition itself; satisfied is terminal.
    pub fn mark_satisfied(&mut self, id: ExpectationId) -> bool {
        match self.states.get_mut(&id) {
            Some(state) if *state == MatchState::Pending => {
                *state = MatchState::Satisfied;
                true
            }
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.expectations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expectations.is_empty()
    }

    /// Clear all registered expectations.
    pub fn reset(&mut self) {
        self.expectations.clear();
        self.states.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsatisfied_keeps_registration_order() {
        let mut registry = ExpectationRegistry::new();
        let first = registry.add(Request::get("http://svc/a"));
        let second = registry.add(Request::get("http://svc/b"));
        let third = registry.add(Request::get("http://svc/c"));

        registry.mark_satisfied(second.id());

        let ids: Vec<_> = registry.unsatisfied().iter().map(|e| e.id()).collect();
        assert_eq!(ids, vec![first.id(), third.id()]);
        assert_eq!(registry.all().len(), 3);
    }

    #[test]
    fn satisfied_is_terminal() {
        let mut registry = ExpectationRegistry::new();
        let expectation = registry.add(Request::get("http://svc/a"));

        assert!(registry.mark_satisfied(expectation.id()));
        assert!(!registry.mark_satisfied(expectation.id()));
        assert_eq!(registry.state(expectation.id()), Some(MatchState::Satisfied));
    }

    #[test]
    fn reset_forgets_expectations_but_not_identities() {
        let mut registry = ExpectationRegistry::new();
        let old = registry.add(Request::get("http://svc/a"));
        registry.reset();

        assert!(registry.is_empty());
        assert!(!registry.mark_satisfied(old.id()));

        let new = registry.add(Request::get("http://svc/a"));
        assert_ne!(old.id(), new.id());
    }
}
