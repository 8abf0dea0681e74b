//! Exact-name, fuzzy-name and country search.
//!
//! The plain operations return an empty list both for "no match" and for a
//! failed request (logged at `warn`). The `try_` forms keep the distinction.

use crate::transport::query;
use crate::validator::RecordValidator;
use crate::wire;
use leiscope_core::{LookupFailure, RegistryConfig, ValidationResult};
use std::collections::HashSet;

const LEGAL_NAME_FILTER: &str = "filter[entity.legalName]";
const COUNTRY_FILTER: &str = "filter[entity.legalAddress.country]";

/// Registry search over names and countries.
#[derive(Clone)]
pub struct SearchEngine {
    validator: RecordValidator,
    fuzzy_field: String,
    default_fuzzy_limit: usize,
}

impl SearchEngine {
    /// Create a search engine sharing `validator`'s transport and quota.
    #[must_use]
    pub fn new(validator: RecordValidator, config: &RegistryConfig) -> Self {
        Self {
            validator,
            fuzzy_field: config.fuzzy_field.clone(),
            default_fuzzy_limit: config.fuzzy_result_limit,
        }
    }

    /// Records whose legal name matches `name` exactly, at most `limit`.
    pub async fn search_by_exact_name(&self, name: &str, limit: usize) -> Vec<ValidationResult> {
        degrade(
            "exact-name",
            name,
            self.try_search_by_exact_name(name, limit).await,
        )
    }

    /// Like [`SearchEngine::search_by_exact_name`], reporting request failures.
    pub async fn try_search_by_exact_name(
        &self,
        name: &str,
        limit: usize,
    ) -> Result<Vec<ValidationResult>, LookupFailure> {
        self.filtered_search(LEGAL_NAME_FILTER, name.trim(), limit)
            .await
    }

    /// Records registered in country `country_code`, at most `limit`.
    pub async fn search_by_country(
        &self,
        country_code: &str,
        limit: usize,
    ) -> Vec<ValidationResult> {
        degrade(
            "country",
            country_code,
            self.try_search_by_country(country_code, limit).await,
        )
    }

    /// Like [`SearchEngine::search_by_country`], reporting request failures.
    pub async fn try_search_by_country(
        &self,
        country_code: &str,
        limit: usize,
    ) -> Result<Vec<ValidationResult>, LookupFailure> {
        let code = country_code.trim().to_ascii_uppercase();
        self.filtered_search(COUNTRY_FILTER, &code, limit).await
    }

    /// Fuzzy name search.
    ///
    /// Each of the top `limit` candidates (default from configuration) is
    /// validated in turn, and its confidence is capped at the match score.
    pub async fn search_by_name(&self, text: &str, limit: Option<usize>) -> Vec<ValidationResult> {
        degrade("fuzzy", text, self.try_search_by_name(text, limit).await)
    }

    /// Like [`SearchEngine::search_by_name`], reporting request failures.
    pub async fn try_search_by_name(
        &self,
        text: &str,
        limit: Option<usize>,
    ) -> Result<Vec<ValidationResult>, LookupFailure> {
        let limit = limit.unwrap_or(self.default_fuzzy_limit);
        if limit == 0 {
            return Ok(Vec::new());
        }

        let params = query([("field", self.fuzzy_field.as_str()), ("q", text.trim())]);
        let Some(body) = self
            .validator
            .request("/fuzzycompletions", &params)
            .await
            .into_optional_body()?
        else {
            return Ok(Vec::new());
        };

        let mut seen = HashSet::new();
        let candidates: Vec<_> = wire::parse_completions(body)?
            .into_iter()
            .filter(|c| seen.insert(c.lei.clone()))
            .take(limit)
            .collect();
        tracing::debug!(query = text, candidates = candidates.len(), "Fuzzy candidates");

        let mut results = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let mut result = self.validator.validate(&candidate.lei).await;
            if let Some(score) = candidate.score {
                result.cap_confidence(score);
            }
            tracing::trace!(
                lei = %candidate.lei,
                matched = %candidate.matched_text,
                confidence = result.confidence,
                "Resolved fuzzy candidate"
            );
            results.push(result);
        }

        Ok(results)
    }

    async fn filtered_search(
        &self,
        filter: &str,
        value: &str,
        limit: usize,
    ) -> Result<Vec<ValidationResult>, LookupFailure> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let page_size = limit.to_string();
        let params = query([(filter, value), ("page[size]", page_size.as_str())]);
        let Some(body) = self
            .validator
            .request("/lei-records", &params)
            .await
            .into_optional_body()?
        else {
            return Ok(Vec::new());
        };

        let page = wire::parse_record_page(body)?;
        tracing::debug!(
            filter,
            value,
            returned = page.records.len(),
            total = ?page.total,
            skipped = page.skipped,
            "Registry search page"
        );

        Ok(page
            .records
            .into_iter()
            .take(limit)
            .map(RecordValidator::shape)
            .collect())
    }
}

fn degrade(
    kind: &str,
    input: &str,
    outcome: Result<Vec<ValidationResult>, LookupFailure>,
) -> Vec<ValidationResult> {
    outcome.unwrap_or_else(|failure| {
        tracing::warn!(kind, input, error = %failure, "Registry search failed");
        Vec::new()
    })
}
