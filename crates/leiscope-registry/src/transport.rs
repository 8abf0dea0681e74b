//! Registry transport abstraction.
//!
//! A transport performs exactly one GET against the registry and classifies
//! what happened. It never returns an error: every failure mode is a
//! [`TransportOutcome`] variant, which callers turn into a
//! [`LookupFailure`] at their own boundary.

use async_trait::async_trait;
use leiscope_core::LookupFailure;
use serde_json::Value;

/// Query parameters as `(name, value)` pairs, encoded by the transport.
pub type Query = [(String, String)];

/// Classified result of one registry request.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportOutcome {
    /// 2xx with a JSON body
    Success(Value),
    /// 404
    NotFound,
    /// Any other non-2xx status
    HttpError(u16),
    /// The request exceeded its deadline
    Timeout {
        /// Deadline that was exceeded, in milliseconds
        millis: u64,
    },
    /// Connection-level failure
    NetworkError(String),
    /// 2xx whose body is not JSON
    Malformed(String),
}

impl TransportOutcome {
    /// Convert into the response body, treating 404 as "nothing there".
    ///
    /// Used by list endpoints, where a 404 means zero matches.
    pub fn into_optional_body(self) -> Result<Option<Value>, LookupFailure> {
        match self {
            Self::Success(body) => Ok(Some(body)),
            Self::NotFound => Ok(None),
            Self::HttpError(status) => Err(LookupFailure::Http { status }),
            Self::Timeout { millis } => Err(LookupFailure::Timeout { millis }),
            Self::NetworkError(message) => Err(LookupFailure::Network { message }),
            Self::Malformed(message) => Err(LookupFailure::MalformedResponse { message }),
        }
    }

    /// Convert into the response body; a 404 becomes `NotFound` for `subject`.
    pub fn into_body(self, subject: &str) -> Result<Value, LookupFailure> {
        self.into_optional_body()?
            .ok_or_else(|| LookupFailure::NotFound {
                lei: subject.to_string(),
            })
    }
}

/// Performs single authenticated requests against the registry.
///
/// Implementations must be thread-safe (Send + Sync) so one transport can be
/// shared by every component of a client.
#[async_trait]
pub trait RegistryTransport: Send + Sync {
    /// Issue one GET to `path` (relative to the registry base URL) with `query`.
    async fn fetch(&self, path: &str, query: &Query) -> TransportOutcome;
}

/// Build an owned query from string pairs.
#[must_use]
pub fn query<const N: usize>(pairs: [(&str, &str); N]) -> Vec<(String, String)> {
    pairs
        .into_iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_into_body() {
        let body = TransportOutcome::Success(json!({"data": []}))
            .into_body("X")
            .expect("success body");
        assert_eq!(body, json!({"data": []}));
    }

    #[test]
    fn test_not_found_into_body() {
        let err = TransportOutcome::NotFound
            .into_body("INVALID1234567890XX")
            .expect_err("not found");
        assert_eq!(
            err,
            LookupFailure::NotFound {
                lei: "INVALID1234567890XX".to_string()
            }
        );
    }

    #[test]
    fn test_not_found_is_empty_for_lists() {
        let body = TransportOutcome::NotFound
            .into_optional_body()
            .expect("404 is not a failure for lists");
        assert!(body.is_none());
    }

    #[test]
    fn test_failures_map_to_lookup_failures() {
        assert_eq!(
            TransportOutcome::HttpError(503).into_body("X"),
            Err(LookupFailure::Http { status: 503 })
        );
        assert_eq!(
            TransportOutcome::Timeout { millis: 100 }.into_body("X"),
            Err(LookupFailure::Timeout { millis: 100 })
        );
        assert!(matches!(
            TransportOutcome::NetworkError("refused".to_string()).into_body("X"),
            Err(LookupFailure::Network { .. })
        ));
        assert!(matches!(
            TransportOutcome::Malformed("not json".to_string()).into_body("X"),
            Err(LookupFailure::MalformedResponse { .. })
        ));
    }

    #[test]
    fn test_query_builder() {
        let q = query([("filter[bic]", "DEUTDEFF"), ("page[size]", "1")]);
        assert_eq!(q[0], ("filter[bic]".to_string(), "DEUTDEFF".to_string()));
        assert_eq!(q.len(), 2);
    }
}
