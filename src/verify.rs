//! Failure messages for verification and unexpected requests.

use crate::expectation::Expectation;
use crate::request::InterceptedRequest;
use std::fmt;

/// Lists expected requests that were never made.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifyErrorMessage {
    missing: Vec<Expectation>,
}

impl VerifyErrorMessage {
    pub fn new(missing: Vec<Expectation>) -> Self {
        VerifyErrorMessage { missing }
    }

    pub fn missing(&self) -> &[Expectation] {
        &self.missing
    }
}

impl fmt::Display for VerifyErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.missing.as_slice() {
            [] => write!(f, "All expected requests were made."),
            [single] => write!(f, "Expected request '{}' was not made.", single),
            many => {
                write!(f, "Following expected requests were not made:")?;
                write_roster(f, many)
            }
        }
    }
}

/// Describes a request no expectation matched, with every expectation known
/// at the time.
#[derive(Debug, Clone, PartialEq)]
pub struct UnexpectedRequestMessage {
    request: InterceptedRequest,
    expected: Vec<Expectation>,
}

impl UnexpectedRequestMessage {
    pub fn new(request: InterceptedRequest, expected: Vec<Expectation>) -> Self {
        UnexpectedRequestMessage { request, expected }
    }

    pub fn request(&self) -> &InterceptedRequest {
        &self.request
    }

    pub fn expected(&self) -> &[Expectation] {
        &self.expected
    }
}

impl fmt::Display for UnexpectedRequestMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Received unexpected request '{}'.", self.request)?;
        if self.expected.is_empty() {
            return write!(f, "\nNo requests are expected.");
        }
        write!(f, "\nExpected requests are:")?;
        write_roster(f, &self.expected)
    }
}

fn write_roster(f: &mut fmt::Formatter<'_>, expectations: &[Expectation]) -> fmt::Result {
    for expectation in expectations {
        write!(f, "\n  - {}", expectation)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expectation::ExpectationRegistry;
    use crate::request::Request;

    fn expectations(n: usize) -> Vec<Expectation> {
        let mut registry = ExpectationRegistry::new();
        for _ in 0..n {
            registry.add(Request::new("method", "someurl"));
        }
        registry.all()
    }

    #[test]
    fn message_when_one_request() {
        assert_eq!(
            VerifyErrorMessage::new(expectations(1)).to_string(),
            "Expected request 'method someurl' was not made."
        );
    }

    #[test]
    fn message_when_multiple_requests() {
        assert_eq!(
            VerifyErrorMessage::new(expectations(2)).to_string(),
            "Following expected requests were not made:\n  - method someurl\n  - method someurl"
        );
    }

    #[test]
    fn unexpected_request_includes_headers_when_present() {
        let request = InterceptedRequest::get("http://other/x").with_header("accept", "*/*");
        assert_eq!(
            UnexpectedRequestMessage::new(request, expectations(1)).to_string(),
            "Received unexpected request 'GET http://other/x, headers: {\"accept\": \"*/*\"}'.\n\
             Expected requests are:\n  - method someurl"
        );
    }

    #[test]
    fn unexpected_request_with_nothing_expected() {
        let request = InterceptedRequest::get("http://other/x");
        assert_eq!(
            UnexpectedRequestMessage::new(request, Vec::new()).to_string(),
            "Received unexpected request 'GET http://other/x'.\nNo requests are expected."
        );
    }
}
