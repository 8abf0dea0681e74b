//! Single-identifier validation.

use crate::rate_limit::RateLimiter;
use crate::scorer;
use crate::transport::{Query, RegistryTransport, TransportOutcome};
use crate::wire;
use leiscope_core::{LookupFailure, RegistryRecord, ValidationResult};
use std::sync::Arc;

/// Looks up one identifier and assembles a [`ValidationResult`].
///
/// Cheap to clone; clones share the transport and the rate limiter. Every
/// request made by the components built on top of it goes through
/// [`RecordValidator::request`], so they all draw from the same quota.
#[derive(Clone)]
pub struct RecordValidator {
    transport: Arc<dyn RegistryTransport>,
    limiter: Arc<RateLimiter>,
}

impl RecordValidator {
    /// Create a validator over a shared transport and rate limiter.
    #[must_use]
    pub fn new(transport: Arc<dyn RegistryTransport>, limiter: Arc<RateLimiter>) -> Self {
        Self { transport, limiter }
    }

    /// Validate `lei` against the registry.
    ///
    /// Never fails: not-found and every transport or parse failure come back
    /// as a result with `valid == false`.
    pub async fn validate(&self, lei: &str) -> ValidationResult {
        match self.lookup(lei).await {
            Ok(record) => Self::shape(record),
            Err(failure) => {
                match &failure {
                    LookupFailure::NotFound { .. } => {
                        tracing::debug!(lei, "LEI not found in registry");
                    }
                    other => tracing::warn!(lei, error = %other, "LEI validation failed"),
                }
                ValidationResult::failed(lei, failure)
            }
        }
    }

    /// Fetch and parse the record for `lei`.
    pub async fn lookup(&self, lei: &str) -> Result<RegistryRecord, LookupFailure> {
        let path = format!("/lei-records/{}", urlencoding::encode(lei.trim()));
        let body = self.request(&path, &[]).await.into_body(lei)?;
        wire::parse_record(body)
    }

    /// Score an already-fetched record into a positive result.
    #[must_use]
    pub fn shape(record: RegistryRecord) -> ValidationResult {
        let assessment = scorer::score(&record);
        ValidationResult::from_record(record, assessment.confidence, assessment.warnings)
    }

    /// Issue one rate-limited request.
    pub async fn request(&self, path: &str, query: &Query) -> TransportOutcome {
        self.limiter.acquire().await;
        self.transport.fetch(path, query).await
    }
}
