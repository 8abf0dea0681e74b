//! GLEIF API response schemas (JSON:API envelopes).
//!
//! Reference: <https://api.gleif.org/api/v1/lei-records>
//!
//! Every shape the client reads is declared here. A body that does not match
//! becomes `LookupFailure::MalformedResponse`; inside list responses a single
//! unparseable resource is skipped instead of failing the page.

use chrono::{DateTime, NaiveDate, Utc};
use leiscope_core::{
    Address, CorroborationLevel, EntityStatus, Expiration, LookupFailure, Registration,
    RegistrationStatus, RegistryRecord,
};
use serde::Deserialize;
use serde_json::Value;

/// Top-level API response wrapper.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    /// Primary data
    pub data: T,
    /// Pagination metadata, on list endpoints
    #[serde(default)]
    pub meta: Option<ResponseMeta>,
}

/// `meta` block of list responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMeta {
    /// Pagination counters
    pub pagination: Option<PaginationInfo>,
}

/// Pagination counters.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    /// Total matches across all pages
    pub total: Option<u64>,
    /// Last page number
    pub last_page: Option<u64>,
}

/// `lei-records` resource.
#[derive(Debug, Clone, Deserialize)]
pub struct LeiRecordResource {
    /// The LEI
    pub id: String,
    /// Resource attributes
    pub attributes: LeiAttributes,
}

/// Attributes of a `lei-records` resource.
#[derive(Debug, Clone, Deserialize)]
pub struct LeiAttributes {
    /// The LEI, repeated
    pub lei: Option<String>,
    /// Level 1 entity data
    pub entity: EntityAttributes,
    /// Registration block
    pub registration: RegistrationAttributes,
    /// Mapped BIC codes
    #[serde(default)]
    pub bic: Option<Vec<String>>,
}

/// Entity data.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityAttributes {
    /// Legal name
    pub legal_name: NameValue,
    /// Other names
    #[serde(default)]
    pub other_names: Option<Vec<NameValue>>,
    /// Transliterated names
    #[serde(default)]
    pub transliterated_other_names: Option<Vec<NameValue>>,
    /// Legal address
    pub legal_address: AddressAttributes,
    /// Headquarters address
    #[serde(default)]
    pub headquarters_address: Option<AddressAttributes>,
    /// Jurisdiction code
    #[serde(default)]
    pub jurisdiction: Option<String>,
    /// Category, e.g. `GENERAL` or `FUND`
    #[serde(default)]
    pub category: Option<String>,
    /// Legal form
    #[serde(default)]
    pub legal_form: Option<LegalForm>,
    /// Entity status
    pub status: String,
    /// Expiration details
    #[serde(default)]
    pub expiration: Option<ExpirationAttributes>,
}

/// Name with optional language tag.
#[derive(Debug, Clone, Deserialize)]
pub struct NameValue {
    /// The name
    pub name: String,
}

/// Address as published.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressAttributes {
    /// Street lines
    #[serde(default)]
    pub address_lines: Option<Vec<String>>,
    /// City
    #[serde(default)]
    pub city: Option<String>,
    /// Region
    #[serde(default)]
    pub region: Option<String>,
    /// Country
    #[serde(default)]
    pub country: Option<String>,
    /// Postal code
    #[serde(default)]
    pub postal_code: Option<String>,
}

/// Legal form code or free text.
#[derive(Debug, Clone, Deserialize)]
pub struct LegalForm {
    /// ELF code
    pub id: Option<String>,
    /// Free-text form when no code applies
    pub other: Option<String>,
}

/// Expiration details.
#[derive(Debug, Clone, Deserialize)]
pub struct ExpirationAttributes {
    /// Date
    pub date: Option<String>,
    /// Reason
    pub reason: Option<String>,
}

/// Registration block.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationAttributes {
    /// First registration
    #[serde(default)]
    pub initial_registration_date: Option<String>,
    /// Last update
    #[serde(default)]
    pub last_update_date: Option<String>,
    /// Registration status
    pub status: String,
    /// Renewal deadline
    #[serde(default)]
    pub next_renewal_date: Option<String>,
    /// Managing LOU
    #[serde(default)]
    pub managing_lou: Option<String>,
    /// Corroboration level
    #[serde(default)]
    pub corroboration_level: Option<String>,
}

impl LeiRecordResource {
    /// Convert the wire resource into the client's record model.
    #[must_use]
    pub fn into_record(self) -> RegistryRecord {
        let attributes = self.attributes;
        let entity = attributes.entity;
        let registration = attributes.registration;

        let other_names = entity
            .other_names
            .into_iter()
            .chain(entity.transliterated_other_names)
            .flatten()
            .map(|n| n.name)
            .collect();

        let expiration = entity
            .expiration
            .filter(|e| e.date.is_some() || e.reason.is_some())
            .map(|e| Expiration {
                date: e.date,
                reason: e.reason,
            });

        RegistryRecord {
            lei: attributes.lei.unwrap_or(self.id),
            legal_name: entity.legal_name.name,
            other_names,
            legal_address: entity.legal_address.into(),
            headquarters_address: entity.headquarters_address.map(Into::into),
            jurisdiction: entity.jurisdiction,
            category: entity.category,
            legal_form: entity.legal_form.and_then(|f| f.id.or(f.other)),
            status: EntityStatus::from(entity.status),
            expiration,
            registration: Registration {
                initial_registration_date: registration
                    .initial_registration_date
                    .as_deref()
                    .and_then(parse_timestamp),
                last_update_date: registration
                    .last_update_date
                    .as_deref()
                    .and_then(parse_timestamp),
                status: RegistrationStatus::from(registration.status),
                next_renewal_date: registration
                    .next_renewal_date
                    .as_deref()
                    .and_then(parse_timestamp),
                managing_lou: registration.managing_lou,
                corroboration_level: registration
                    .corroboration_level
                    .map(CorroborationLevel::from),
            },
            bic: attributes.bic.unwrap_or_default(),
        }
    }
}

impl From<AddressAttributes> for Address {
    fn from(address: AddressAttributes) -> Self {
        Self {
            address_lines: address.address_lines.unwrap_or_default(),
            city: address.city,
            region: address.region,
            country: address.country,
            postal_code: address.postal_code,
        }
    }
}

/// `fuzzycompletions` resource.
#[derive(Debug, Clone, Deserialize)]
pub struct FuzzyCompletion {
    /// Match attributes
    pub attributes: FuzzyAttributes,
    /// Link to the matched record
    #[serde(default)]
    pub relationships: Option<FuzzyRelationships>,
}

/// Attributes of a fuzzy completion.
#[derive(Debug, Clone, Deserialize)]
pub struct FuzzyAttributes {
    /// Matched text
    pub value: String,
    /// Similarity score, when the registry reports one
    #[serde(default)]
    pub score: Option<f64>,
    /// Identifier, when inlined instead of linked
    #[serde(default)]
    pub lei: Option<String>,
}

/// Relationships of a fuzzy completion.
#[derive(Debug, Clone, Deserialize)]
pub struct FuzzyRelationships {
    /// The matched record
    #[serde(rename = "lei-records")]
    pub lei_records: Option<RelatedResource>,
}

/// JSON:API relationship object.
#[derive(Debug, Clone, Deserialize)]
pub struct RelatedResource {
    /// Resource identifier
    pub data: Option<ResourceIdentifier>,
}

/// JSON:API resource identifier.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceIdentifier {
    /// Resource id
    pub id: String,
}

/// One ranked fuzzy match.
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyCandidate {
    /// Matched identifier
    pub lei: String,
    /// Text that matched
    pub matched_text: String,
    /// Similarity score, if reported
    pub score: Option<f64>,
}

impl FuzzyCompletion {
    /// Flatten into a candidate; `None` when no identifier is attached.
    #[must_use]
    pub fn into_candidate(self) -> Option<FuzzyCandidate> {
        let linked = self
            .relationships
            .and_then(|r| r.lei_records)
            .and_then(|r| r.data)
            .map(|d| d.id);

        linked
            .or(self.attributes.lei)
            .map(|lei| FuzzyCandidate {
                lei,
                matched_text: self.attributes.value,
                score: self.attributes.score,
            })
    }
}

/// A page of records from a filtered list query.
#[derive(Debug, Clone, Default)]
pub struct RecordPage {
    /// Records that parsed
    pub records: Vec<RegistryRecord>,
    /// Registry-reported total across pages
    pub total: Option<u64>,
    /// Resources skipped because they did not parse
    pub skipped: usize,
}

/// Parse a single-record envelope.
pub fn parse_record(body: Value) -> Result<RegistryRecord, LookupFailure> {
    serde_json::from_value::<Envelope<LeiRecordResource>>(body)
        .map(|envelope| envelope.data.into_record())
        .map_err(|e| malformed("lei-record", &e))
}

/// Parse a list envelope of records, skipping resources that do not parse.
pub fn parse_record_page(body: Value) -> Result<RecordPage, LookupFailure> {
    let envelope: Envelope<Vec<Value>> =
        serde_json::from_value(body).map_err(|e| malformed("lei-records page", &e))?;

    let mut page = RecordPage {
        total: envelope
            .meta
            .and_then(|m| m.pagination)
            .and_then(|p| p.total),
        ..RecordPage::default()
    };

    for (index, resource) in envelope.data.into_iter().enumerate() {
        let id = resource
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or("?")
            .to_string();
        match serde_json::from_value::<LeiRecordResource>(resource) {
            Ok(record) => page.records.push(record.into_record()),
            Err(e) => {
                tracing::warn!(index, lei = %id, error = %e, "Skipping unparseable registry record");
                page.skipped += 1;
            }
        }
    }

    Ok(page)
}

/// Parse a fuzzy completions envelope into ranked candidates.
///
/// Entries without an identifier are dropped; order is preserved.
pub fn parse_completions(body: Value) -> Result<Vec<FuzzyCandidate>, LookupFailure> {
    let envelope: Envelope<Vec<FuzzyCompletion>> =
        serde_json::from_value(body).map_err(|e| malformed("fuzzycompletions", &e))?;

    Ok(envelope
        .data
        .into_iter()
        .filter_map(FuzzyCompletion::into_candidate)
        .collect())
}

/// Parse a registry timestamp: RFC 3339, or a bare `YYYY-MM-DD` date.
#[must_use]
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }

    let parsed = value
        .get(..10)
        .and_then(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc());

    if parsed.is_none() {
        tracing::debug!(value, "Ignoring unparseable registry timestamp");
    }
    parsed
}

fn malformed(what: &str, error: &serde_json::Error) -> LookupFailure {
    LookupFailure::MalformedResponse {
        message: format!("unexpected {what} shape: {error}"),
    }
}
