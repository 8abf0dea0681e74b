//! Shared types used across leiscope.
//!
//! Registry status fields are modelled as enums with an `Other` fallback so
//! a value the registry introduces later is preserved rather than rejected.

use crate::error::CoreError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Newtype for Legal Entity Identifiers with validation.
///
/// An LEI is 18 uppercase alphanumerics followed by two check digits
/// satisfying ISO 7064 MOD 97-10.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Lei(String);

impl Lei {
    /// Create a new `Lei` from a string.
    ///
    /// Surrounding whitespace is trimmed and letters are uppercased first.
    ///
    /// # Errors
    /// Returns error if the code has the wrong shape or a bad checksum.
    pub fn new(id: impl Into<String>) -> Result<Self, CoreError> {
        let id = id.into().trim().to_ascii_uppercase();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `id` is a well-formed LEI, checksum included.
    #[must_use]
    pub fn is_well_formed(id: &str) -> bool {
        Self::validate(id).is_ok()
    }

    fn validate(id: &str) -> Result<(), CoreError> {
        static LEI_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex =
            LEI_REGEX.get_or_init(|| Regex::new(r"^[A-Z0-9]{18}[0-9]{2}$").expect("valid regex"));

        if !regex.is_match(id) {
            return Err(CoreError::Validation(format!(
                "invalid LEI: expected 18 alphanumerics and 2 check digits, got '{id}'"
            )));
        }

        if mod97(id) == 1 {
            Ok(())
        } else {
            Err(CoreError::Validation(format!(
                "invalid LEI: checksum mismatch for '{id}'"
            )))
        }
    }
}

/// ISO 7064 MOD 97-10 remainder, letters expanded to 10..=35.
fn mod97(id: &str) -> u32 {
    id.chars().fold(0u32, |acc, c| {
        let value = c.to_digit(36).unwrap_or(0);
        if value >= 10 {
            (acc * 100 + value) % 97
        } else {
            (acc * 10 + value) % 97
        }
    })
}

impl fmt::Display for Lei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Lei {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Declares a registry status enum that round-trips through its wire string.
macro_rules! registry_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($(#[$vmeta:meta])* $variant:ident => $wire:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
            /// A value not known to this client, kept verbatim
            Other(String),
        }

        impl $name {
            /// The registry's spelling of this value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $wire,)+
                    Self::Other(value) => value,
                }
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                match value {
                    $($wire => Self::$variant,)+
                    other => Self::Other(other.to_string()),
                }
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::from(value.as_str())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.as_str().to_string()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

registry_enum! {
    /// Operational status of the legal entity itself.
    EntityStatus {
        /// The entity exists and operates
        Active => "ACTIVE",
        /// The entity has ceased to exist
        Inactive => "INACTIVE",
    }
}

registry_enum! {
    /// Status of the LEI registration with its managing unit.
    RegistrationStatus {
        /// Registered and maintained
        Issued => "ISSUED",
        /// Application under validation
        PendingValidation => "PENDING_VALIDATION",
        /// Moving between managing units
        PendingTransfer => "PENDING_TRANSFER",
        /// Renewal missed
        Lapsed => "LAPSED",
        /// Entity merged into another
        Merged => "MERGED",
        /// Registration retired
        Retired => "RETIRED",
    }
}

registry_enum! {
    /// How thoroughly the record's data has been independently verified.
    CorroborationLevel {
        /// Verified against authoritative sources
        FullyCorroborated => "FULLY_CORROBORATED",
        /// Partially verified
        PartiallyCorroborated => "PARTIALLY_CORROBORATED",
        /// Not verified yet
        PendingCorroboration => "PENDING_CORROBORATION",
    }
}
