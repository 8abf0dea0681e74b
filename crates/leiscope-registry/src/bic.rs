//! BIC to LEI resolution.

use crate::transport::query;
use crate::validator::RecordValidator;
use crate::wire;
use leiscope_core::{LookupFailure, ValidationResult};

/// Maps a bank identifier code to the registry record carrying it.
#[derive(Clone)]
pub struct BicResolver {
    validator: RecordValidator,
}

impl BicResolver {
    /// Create a resolver sharing `validator`'s transport and quota.
    #[must_use]
    pub fn new(validator: RecordValidator) -> Self {
        Self { validator }
    }

    /// Record mapped to `code`, or `None` when there is none.
    ///
    /// Request failures also yield `None` and are logged.
    pub async fn find_by_bic(&self, code: &str) -> Option<ValidationResult> {
        self.try_find_by_bic(code).await.unwrap_or_else(|failure| {
            tracing::warn!(bic = code, error = %failure, "BIC lookup failed");
            None
        })
    }

    /// Like [`BicResolver::find_by_bic`], reporting request failures.
    ///
    /// When several records carry the code the first one wins.
    pub async fn try_find_by_bic(
        &self,
        code: &str,
    ) -> Result<Option<ValidationResult>, LookupFailure> {
        let code = code.trim().to_ascii_uppercase();
        let params = query([("filter[bic]", code.as_str())]);

        let Some(body) = self
            .validator
            .request("/lei-records", &params)
            .await
            .into_optional_body()?
        else {
            return Ok(None);
        };

        let page = wire::parse_record_page(body)?;
        if page.records.len() > 1 {
            tracing::debug!(
                bic = %code,
                matches = page.records.len(),
                "BIC maps to several records, using the first"
            );
        }

        Ok(page.records.into_iter().next().map(RecordValidator::shape))
    }
}
