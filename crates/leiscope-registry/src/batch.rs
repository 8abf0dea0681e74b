//! Chunked batch validation.
//!
//! Identifiers are validated `chunk_size` at a time, concurrently within a
//! chunk. The next chunk starts only after the previous one has completed and
//! the inter-chunk delay has elapsed.

use crate::validator::RecordValidator;
use futures::future::join_all;
use leiscope_core::{LookupFailure, RegistryConfig, ValidationResult};
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Validates many identifiers while keeping registry load bounded.
#[derive(Clone)]
pub struct BatchCoordinator {
    validator: RecordValidator,
    chunk_size: usize,
    delay: Duration,
}

impl BatchCoordinator {
    /// Create a coordinator sharing `validator`'s transport and quota.
    #[must_use]
    pub fn new(validator: RecordValidator, config: &RegistryConfig) -> Self {
        Self {
            validator,
            chunk_size: config.batch_chunk_size.max(1),
            delay: Duration::from_millis(config.batch_delay_ms),
        }
    }

    /// Validate every identifier in `leis`.
    ///
    /// The map has exactly one entry per distinct input identifier.
    pub async fn validate_batch<S: AsRef<str>>(
        &self,
        leis: &[S],
    ) -> HashMap<String, ValidationResult> {
        self.validate_batch_with_cancellation(leis, &CancellationToken::new())
            .await
    }

    /// Validate every identifier in `leis` until `cancel` fires.
    ///
    /// Cancellation drops the in-flight chunk and skips the remaining ones.
    /// Identifiers that were not validated still get an entry, failed with
    /// [`LookupFailure::Cancelled`].
    pub async fn validate_batch_with_cancellation<S: AsRef<str>>(
        &self,
        leis: &[S],
        cancel: &CancellationToken,
    ) -> HashMap<String, ValidationResult> {
        let unique = dedupe(leis);
        let chunks: Vec<&[String]> = unique.chunks(self.chunk_size).collect();
        let mut results = HashMap::with_capacity(unique.len());

        tracing::info!(
            identifiers = unique.len(),
            chunks = chunks.len(),
            chunk_size = self.chunk_size,
            "Starting batch validation"
        );

        for (index, chunk) in chunks.iter().enumerate() {
            if cancel.is_cancelled() {
                break;
            }

            let validations = join_all(chunk.iter().map(|lei| async move {
                (lei.clone(), self.validator.validate(lei).await)
            }));

            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    tracing::warn!(chunk = index + 1, "Batch cancelled during chunk");
                    break;
                }
                chunk_results = validations => results.extend(chunk_results),
            }

            tracing::debug!(
                chunk = index + 1,
                of = chunks.len(),
                done = results.len(),
                "Batch chunk complete"
            );

            if index + 1 < chunks.len() {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => {
                        tracing::warn!(chunk = index + 1, "Batch cancelled between chunks");
                        break;
                    }
                    () = tokio::time::sleep(self.delay) => {}
                }
            }
        }

        for lei in &unique {
            results.entry(lei.clone()).or_insert_with(|| {
                ValidationResult::failed(lei.as_str(), LookupFailure::Cancelled)
            });
        }

        results
    }
}

/// Distinct identifiers in first-occurrence order.
fn dedupe<S: AsRef<str>>(leis: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    leis.iter()
        .map(|lei| lei.as_ref().trim().to_string())
        .filter(|lei| seen.insert(lei.clone()))
        .collect()
}
