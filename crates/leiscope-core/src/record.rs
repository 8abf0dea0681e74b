//! Registry records as the client sees them.
//!
//! These are sourced fresh from the registry on every call and never mutated
//! by the client; the registry is the system of record.

use crate::types::{CorroborationLevel, EntityStatus, RegistrationStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One legal entity as published by the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryRecord {
    /// The identifier, exactly as the registry reports it
    pub lei: String,
    /// Registered legal name
    pub legal_name: String,
    /// Alternate and transliterated names
    pub other_names: Vec<String>,
    /// Legal (registered) address
    pub legal_address: Address,
    /// Headquarters address, when published
    pub headquarters_address: Option<Address>,
    /// Jurisdiction code, e.g. `US-DE` or `GB`
    pub jurisdiction: Option<String>,
    /// Entity category, e.g. `GENERAL` or `FUND`
    pub category: Option<String>,
    /// Legal form code (ELF code or free text)
    pub legal_form: Option<String>,
    /// Entity status
    pub status: EntityStatus,
    /// Expiration details, present for entities that ceased to exist
    pub expiration: Option<Expiration>,
    /// Registration block
    pub registration: Registration,
    /// Associated BIC codes
    pub bic: Vec<String>,
}

impl RegistryRecord {
    /// Country of the legal address, if any.
    #[must_use]
    pub fn country(&self) -> Option<&str> {
        self.legal_address.country.as_deref()
    }
}

/// Postal address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    /// Street lines
    pub address_lines: Vec<String>,
    /// City
    pub city: Option<String>,
    /// Region or state code
    pub region: Option<String>,
    /// ISO 3166 country code
    pub country: Option<String>,
    /// Postal code
    pub postal_code: Option<String>,
}

/// Why and when an entity stopped existing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expiration {
    /// Expiration date as published
    pub date: Option<String>,
    /// Reason code, e.g. `DISSOLVED` or `CORPORATE_ACTION`
    pub reason: Option<String>,
}

/// Registration block of a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    /// First registration
    pub initial_registration_date: Option<DateTime<Utc>>,
    /// Last update of the record
    pub last_update_date: Option<DateTime<Utc>>,
    /// Registration status
    pub status: RegistrationStatus,
    /// Date the registration must be renewed by
    pub next_renewal_date: Option<DateTime<Utc>>,
    /// LEI of the managing local operating unit
    pub managing_lou: Option<String>,
    /// Corroboration level, when published
    pub corroboration_level: Option<CorroborationLevel>,
}
