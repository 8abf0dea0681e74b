//! Validation results and the failure taxonomy carried inside them.
//!
//! Public client operations never fail per identifier; a failed lookup is a
//! `ValidationResult` with `valid == false` and a [`LookupFailure`] attached.

use crate::record::RegistryRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Status reported for an identifier the registry does not know.
pub const STATUS_NOT_FOUND: &str = "NOT_FOUND";

/// Status reported when the lookup itself failed.
pub const STATUS_ERROR: &str = "ERROR";

/// Closed set of reasons a registry lookup can fail.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LookupFailure {
    /// The registry has no such identifier; a valid negative answer
    #[error("LEI {lei} not found")]
    NotFound {
        /// Identifier that was looked up
        lei: String,
    },

    /// Non-2xx, non-404 response
    #[error("registry returned HTTP {status}")]
    Http {
        /// HTTP status code
        status: u16,
    },

    /// The request exceeded its deadline
    #[error("request timed out after {millis}ms")]
    Timeout {
        /// Configured timeout in milliseconds
        millis: u64,
    },

    /// Connection-level failure
    #[error("network error: {message}")]
    Network {
        /// Transport error message
        message: String,
    },

    /// Response body did not match the expected shape
    #[error("malformed registry response: {message}")]
    MalformedResponse {
        /// What failed to parse
        message: String,
    },

    /// The caller cancelled the operation before this lookup completed
    #[error("lookup cancelled")]
    Cancelled,
}

/// Outcome of validating one identifier against the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// Whether the registry returned a usable record
    pub valid: bool,
    /// Identifier that was looked up
    pub lei: String,
    /// Legal name, when found
    pub entity_name: Option<String>,
    /// Jurisdiction code, when found
    pub jurisdiction: Option<String>,
    /// Entity status, or `NOT_FOUND` / `ERROR` for failed lookups
    pub status: String,
    /// Registration status, when found
    pub registration_status: Option<String>,
    /// Last update of the registry record
    pub last_update: Option<DateTime<Utc>>,
    /// Trust score in `[0, 1]`; always 0 when `valid` is false
    pub confidence: f64,
    /// Full record; present only when `valid` is true
    pub details: Option<RegistryRecord>,
    /// Human-readable warnings
    pub warnings: Vec<String>,
    /// Why the lookup failed, when it did
    pub failure: Option<LookupFailure>,
}

impl ValidationResult {
    /// Build a positive result from a record and its assessment.
    #[must_use]
    pub fn from_record(record: RegistryRecord, confidence: f64, warnings: Vec<String>) -> Self {
        Self {
            valid: true,
            lei: record.lei.clone(),
            entity_name: Some(record.legal_name.clone()),
            jurisdiction: record.jurisdiction.clone(),
            status: record.status.to_string(),
            registration_status: Some(record.registration.status.to_string()),
            last_update: record.registration.last_update_date,
            confidence: confidence.clamp(0.0, 1.0),
            details: Some(record),
            warnings,
            failure: None,
        }
    }

    /// Build a negative result for `lei`.
    ///
    /// `NotFound` maps to status `NOT_FOUND`; every other failure to `ERROR`.
    #[must_use]
    pub fn failed(lei: impl Into<String>, failure: LookupFailure) -> Self {
        let lei = lei.into();
        let (status, warning) = match &failure {
            LookupFailure::NotFound { .. } => (
                STATUS_NOT_FOUND,
                format!("LEI {lei} not found in GLEIF registry"),
            ),
            other => (STATUS_ERROR, format!("Validation error: {other}")),
        };

        Self {
            valid: false,
            lei,
            entity_name: None,
            jurisdiction: None,
            status: status.to_string(),
            registration_status: None,
            last_update: None,
            confidence: 0.0,
            details: None,
            warnings: vec![warning],
            failure: Some(failure),
        }
    }

    /// Lower the confidence to at most `ceiling`; never raises it.
    pub fn cap_confidence(&mut self, ceiling: f64) {
        if self.valid {
            self.confidence = self.confidence.min(ceiling).max(0.0);
        }
    }

    /// Whether the registry answered that the identifier does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self.failure, Some(LookupFailure::NotFound { .. }))
    }
}

/// Ownership neighbourhood of one entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipSet {
    /// Immediate owner
    pub direct_parent: Option<ValidationResult>,
    /// Top of the ownership chain
    pub ultimate_parent: Option<ValidationResult>,
    /// Directly owned entities, capped
    pub direct_children: Vec<ValidationResult>,
}

impl RelationshipSet {
    /// Whether no relationship was found at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.direct_parent.is_none()
            && self.ultimate_parent.is_none()
            && self.direct_children.is_empty()
    }
}
