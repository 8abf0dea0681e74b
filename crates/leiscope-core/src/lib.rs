//! Leiscope Core - Foundation crate for the leiscope registry client.
//!
//! This crate provides the shared domain model, error handling and
//! configuration that the registry client and the command-line shell depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths and env overrides
//! - [`types`] - The `Lei` newtype and the registry status enums
//! - [`record`] - Registry records as the client sees them
//! - [`result`] - Validation results, relationship sets and lookup failures
//!
//! # Example
//!
//! ```rust
//! use leiscope_core::{AppConfig, Lei};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! assert_eq!(config.registry.rate_limit_quota, 60);
//!
//! let lei = Lei::new("529900W18LQJJN6SJ336")?;
//! assert_eq!(lei.as_str(), "529900W18LQJJN6SJ336");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod record;
pub mod result;
pub mod types;

// Re-export commonly used types
pub use config::{AppConfig, RegistryConfig};
pub use error::{ConfigError, ConfigResult, CoreError};
pub use record::{Address, Expiration, Registration, RegistryRecord};
pub use result::{LookupFailure, RelationshipSet, ValidationResult};
pub use types::{CorroborationLevel, EntityStatus, Lei, RegistrationStatus};
