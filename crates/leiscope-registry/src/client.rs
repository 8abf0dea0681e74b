//! The registry client facade.

use crate::batch::BatchCoordinator;
use crate::bic::BicResolver;
use crate::error::Result;
use crate::http::HttpTransport;
use crate::rate_limit::RateLimiter;
use crate::relationships::RelationshipResolver;
use crate::search::SearchEngine;
use crate::transport::RegistryTransport;
use crate::validator::RecordValidator;
use leiscope_core::{RegistryConfig, RelationshipSet, ValidationResult};
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Entry point for every registry operation.
///
/// All components share one transport and one [`RateLimiter`], so the
/// configured quota bounds the client as a whole. Cheap to clone.
#[derive(Clone)]
pub struct RegistryClient {
    config: RegistryConfig,
    limiter: Arc<RateLimiter>,
    validator: RecordValidator,
    search: SearchEngine,
    bic: BicResolver,
    relationships: RelationshipResolver,
    batch: BatchCoordinator,
}

impl RegistryClient {
    /// Create a client talking to the registry over HTTPS.
    pub fn new(config: RegistryConfig) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::new(&config)?;
        Ok(Self::assemble(config, Arc::new(transport)))
    }

    /// Create a client over a caller-supplied transport.
    pub fn with_transport(
        config: RegistryConfig,
        transport: Arc<dyn RegistryTransport>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self::assemble(config, transport))
    }

    fn assemble(config: RegistryConfig, transport: Arc<dyn RegistryTransport>) -> Self {
        let limiter = Arc::new(RateLimiter::from_config(&config));
        let validator = RecordValidator::new(transport, Arc::clone(&limiter));

        tracing::debug!(
            base_url = %config.base_url,
            quota = config.rate_limit_quota,
            window_ms = config.rate_limit_window_ms,
            "Registry client ready"
        );

        Self {
            search: SearchEngine::new(validator.clone(), &config),
            bic: BicResolver::new(validator.clone()),
            relationships: RelationshipResolver::new(validator.clone(), &config),
            batch: BatchCoordinator::new(validator.clone(), &config),
            validator,
            limiter,
            config,
        }
    }

    /// Configuration the client was built with.
    #[must_use]
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// The shared rate limiter.
    #[must_use]
    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// Validate one identifier.
    pub async fn validate(&self, lei: &str) -> ValidationResult {
        self.validator.validate(lei).await
    }

    /// Exact legal-name search.
    pub async fn search_by_exact_name(&self, name: &str, limit: usize) -> Vec<ValidationResult> {
        self.search.search_by_exact_name(name, limit).await
    }

    /// Fuzzy name search; `None` uses the configured limit.
    pub async fn search_by_name(&self, text: &str, limit: Option<usize>) -> Vec<ValidationResult> {
        self.search.search_by_name(text, limit).await
    }

    /// Search by ISO 3166 country code of the legal address.
    pub async fn search_by_country(
        &self,
        country_code: &str,
        limit: usize,
    ) -> Vec<ValidationResult> {
        self.search.search_by_country(country_code, limit).await
    }

    /// Record mapped to a BIC code.
    pub async fn find_by_bic(&self, code: &str) -> Option<ValidationResult> {
        self.bic.find_by_bic(code).await
    }

    /// Parents and direct children of `lei`.
    pub async fn get_relationships(&self, lei: &str) -> RelationshipSet {
        self.relationships.resolve(lei).await
    }

    /// Validate many identifiers in rate-friendly chunks.
    pub async fn validate_batch<S: AsRef<str>>(
        &self,
        leis: &[S],
    ) -> HashMap<String, ValidationResult> {
        self.batch.validate_batch(leis).await
    }

    /// Like [`RegistryClient::validate_batch`], stopping early when `cancel` fires.
    pub async fn validate_batch_with_cancellation<S: AsRef<str>>(
        &self,
        leis: &[S],
        cancel: &CancellationToken,
    ) -> HashMap<String, ValidationResult> {
        self.batch
            .validate_batch_with_cancellation(leis, cancel)
            .await
    }
}
