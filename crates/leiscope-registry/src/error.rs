//! Error types for the registry client.
//!
//! Only client construction can fail as a whole. Per-identifier failures are
//! reported through [`leiscope_core::LookupFailure`] inside results.

use leiscope_core::ConfigError;
use thiserror::Error;

/// Errors that can occur while building a registry client.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// The supplied configuration is unusable
    #[error("invalid registry configuration: {0}")]
    Config(#[from] ConfigError),

    /// The HTTP client could not be created
    #[error("failed to create HTTP client: {0}")]
    HttpClient(String),
}

/// Result type alias for registry client construction.
pub type Result<T> = std::result::Result<T, RegistryError>;
