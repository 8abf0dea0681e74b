//! reqwest-backed registry transport.

use crate::error::{RegistryError, Result};
use crate::transport::{Query, RegistryTransport, TransportOutcome};
use async_trait::async_trait;
use leiscope_core::RegistryConfig;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Media type the registry serves (JSON:API).
pub const JSON_API: &str = "application/vnd.api+json";

/// Talks to the registry over HTTPS.
pub struct HttpTransport {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpTransport {
    /// Build a transport from the registry configuration.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(config: &RegistryConfig) -> Result<Self> {
        let timeout = Duration::from_millis(config.request_timeout_ms);

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(JSON_API));

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .build()
            .map_err(|e| RegistryError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    /// Base URL requests are issued against.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn classify_error(&self, error: &reqwest::Error) -> TransportOutcome {
        if error.is_timeout() {
            TransportOutcome::Timeout {
                millis: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            }
        } else {
            TransportOutcome::NetworkError(error.to_string())
        }
    }
}

#[async_trait]
impl RegistryTransport for HttpTransport {
    async fn fetch(&self, path: &str, query: &Query) -> TransportOutcome {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(url = %url, params = query.len(), "Registry request");

        let response = match self.client.get(&url).query(query).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "Registry request failed");
                return self.classify_error(&e);
            }
        };

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return TransportOutcome::NotFound;
        }
        if !status.is_success() {
            tracing::debug!(url = %url, status = status.as_u16(), "Registry returned error status");
            return TransportOutcome::HttpError(status.as_u16());
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => return self.classify_error(&e),
        };

        match serde_json::from_slice(&body) {
            Ok(json) => TransportOutcome::Success(json),
            Err(e) => {
                let preview = String::from_utf8_lossy(&body[..body.len().min(200)]).into_owned();
                TransportOutcome::Malformed(format!("invalid JSON ({e}); body starts: {preview}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_creation() {
        let transport = HttpTransport::new(&RegistryConfig::default()).expect("create transport");
        assert_eq!(transport.base_url(), "https://api.gleif.org/api/v1");
        assert_eq!(transport.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let config = RegistryConfig {
            base_url: "http://localhost:9000/api/v1/".to_string(),
            ..RegistryConfig::default()
        };
        let transport = HttpTransport::new(&config).expect("create transport");
        assert_eq!(transport.base_url(), "http://localhost:9000/api/v1");
    }
}
