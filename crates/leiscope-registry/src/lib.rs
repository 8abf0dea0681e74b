//! Leiscope Registry - Rate-limited client for the GLEIF LEI registry.
//!
//! Validates Legal Entity Identifiers, searches the registry by name, country
//! and BIC, discovers ownership relationships and validates batches, scoring
//! every record it returns with a confidence value.
//!
//! # Modules
//!
//! - [`client`] - The [`RegistryClient`] facade
//! - [`rate_limit`] - Fixed-window quota shared by every request
//! - [`transport`] - The [`RegistryTransport`] trait and outcome mapping
//! - [`http`] - reqwest implementation of the transport
//! - [`wire`] - JSON:API response schemas
//! - [`scorer`] - Confidence scoring
//! - [`validator`], [`search`], [`bic`], [`relationships`], [`batch`] - Operations
//!
//! # Example
//!
//! ```rust,no_run
//! use leiscope_core::RegistryConfig;
//! use leiscope_registry::RegistryClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = RegistryClient::new(RegistryConfig::default())?;
//! let result = client.validate("529900W18LQJJN6SJ336").await;
//! println!("{} -> {} ({:.2})", result.lei, result.status, result.confidence);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod batch;
pub mod bic;
pub mod client;
pub mod error;
pub mod http;
pub mod rate_limit;
pub mod relationships;
pub mod scorer;
pub mod search;
pub mod transport;
pub mod validator;
pub mod wire;

pub use batch::BatchCoordinator;
pub use bic::BicResolver;
pub use client::RegistryClient;
pub use error::{RegistryError, Result};
pub use http::HttpTransport;
pub use rate_limit::RateLimiter;
pub use relationships::RelationshipResolver;
pub use scorer::Assessment;
pub use search::SearchEngine;
pub use transport::{Query, RegistryTransport, TransportOutcome};
pub use validator::RecordValidator;
