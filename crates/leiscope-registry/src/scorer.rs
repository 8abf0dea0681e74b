//! Confidence scoring for registry records.
//!
//! Starts at 1.0, subtracts a penalty per matching condition, floors at 0.0.
//! [`score_at`] is pure in its inputs; [`score`] evaluates against the
//! current time.

use chrono::{DateTime, Utc};
use leiscope_core::{CorroborationLevel, EntityStatus, RegistrationStatus, RegistryRecord};

/// Penalty when the entity is not `ACTIVE`.
pub const INACTIVE_ENTITY_PENALTY: f64 = 0.3;
/// Penalty for a `LAPSED` registration.
pub const LAPSED_PENALTY: f64 = 0.4;
/// Penalty for any registration status other than `ISSUED` or `LAPSED`.
pub const REGISTRATION_STATUS_PENALTY: f64 = 0.2;
/// Penalty for `PARTIALLY_CORROBORATED` data.
pub const PARTIAL_CORROBORATION_PENALTY: f64 = 0.1;
/// Penalty for `PENDING_CORROBORATION` data.
pub const PENDING_CORROBORATION_PENALTY: f64 = 0.2;
/// Penalty when the renewal date has passed.
pub const OVERDUE_RENEWAL_PENALTY: f64 = 0.2;
/// Renewals closer than this many days produce a warning.
pub const RENEWAL_WARNING_DAYS: i64 = 30;

const SECONDS_PER_DAY: i64 = 86_400;

/// Trust score and the reasons it is below 1.0.
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    /// Score in `[0, 1]`
    pub confidence: f64,
    /// Human-readable warnings, in rule order
    pub warnings: Vec<String>,
}

/// Score `record` as of now.
#[must_use]
pub fn score(record: &RegistryRecord) -> Assessment {
    score_at(record, Utc::now())
}

/// Score `record` as of `now`.
#[must_use]
pub fn score_at(record: &RegistryRecord, now: DateTime<Utc>) -> Assessment {
    let mut confidence = 1.0_f64;
    let mut warnings = Vec::new();

    if record.status != EntityStatus::Active {
        confidence -= INACTIVE_ENTITY_PENALTY;
        warnings.push(format!("Entity status is {}", record.status));
    }

    let registration = &record.registration;
    match &registration.status {
        RegistrationStatus::Issued => {}
        RegistrationStatus::Lapsed => {
            confidence -= LAPSED_PENALTY;
            warnings.push("LEI registration has lapsed".to_string());
        }
        other => {
            confidence -= REGISTRATION_STATUS_PENALTY;
            warnings.push(format!("Registration status is {other}"));
        }
    }

    match &registration.corroboration_level {
        Some(level @ CorroborationLevel::PartiallyCorroborated) => {
            confidence -= PARTIAL_CORROBORATION_PENALTY;
            warnings.push(format!("Corroboration level is {level}"));
        }
        Some(level @ CorroborationLevel::PendingCorroboration) => {
            confidence -= PENDING_CORROBORATION_PENALTY;
            warnings.push(format!("Corroboration level is {level}"));
        }
        _ => {}
    }

    if let Some(renewal) = registration.next_renewal_date {
        if renewal < now {
            confidence -= OVERDUE_RENEWAL_PENALTY;
            warnings.push("LEI renewal is overdue".to_string());
        } else {
            let seconds = (renewal - now).num_seconds();
            let days = (seconds + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY;
            if days <= RENEWAL_WARNING_DAYS {
                warnings.push(format!("LEI renewal due in {days} days"));
            }
        }
    }

    Assessment {
        confidence: confidence.max(0.0),
        warnings,
    }
}
