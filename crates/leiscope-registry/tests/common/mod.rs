//! Shared fixtures for the registry integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use leiscope_core::RegistryConfig;
use leiscope_registry::{Query, RegistryClient, RegistryTransport, TransportOutcome};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

pub const CLEAN_LEI: &str = "529900W18LQJJN6SJ336";
pub const LAPSED_LEI: &str = "5493001KJTIIGC8Y1R12";
pub const PARENT_LEI: &str = "HWUPKR0MPOU8FGXBT394";
pub const ULTIMATE_LEI: &str = "529900K9B0N5BT694847";
pub const CHILD_LEI: &str = "7LTWFZYICNSX8D621K86";
pub const UNKNOWN_LEI: &str = "INVALID1234567890XX";

/// One request seen by the fixture transport.
#[derive(Debug, Clone)]
pub struct Call {
    pub key: String,
    pub at: Instant,
}

/// Transport answering from a route table keyed by path and query.
///
/// Unrouted requests answer 404.
#[derive(Default)]
pub struct FixtureTransport {
    routes: Mutex<HashMap<String, TransportOutcome>>,
    calls: Mutex<Vec<Call>>,
    latency: Duration,
}

impl FixtureTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    pub fn route(&self, path: &str, query: &[(&str, &str)], outcome: TransportOutcome) {
        self.routes
            .lock()
            .unwrap()
            .insert(route_key(path, query), outcome);
    }

    /// Route `GET /lei-records/{lei}` to a single-record envelope.
    pub fn record(&self, resource: Value) {
        let lei = resource["id"].as_str().unwrap().to_string();
        self.route(
            &format!("/lei-records/{lei}"),
            &[],
            TransportOutcome::Success(json!({ "data": resource })),
        );
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_keys(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.key).collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl RegistryTransport for FixtureTransport {
    async fn fetch(&self, path: &str, query: &Query) -> TransportOutcome {
        let pairs: Vec<(&str, &str)> = query
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        let key = route_key(path, &pairs);

        self.calls.lock().unwrap().push(Call {
            key: key.clone(),
            at: Instant::now(),
        });

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        self.routes
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .unwrap_or(TransportOutcome::NotFound)
    }
}

pub fn route_key(path: &str, query: &[(&str, &str)]) -> String {
    if query.is_empty() {
        return path.to_string();
    }
    let encoded: Vec<String> = query.iter().map(|(k, v)| format!("{k}={v}")).collect();
    format!("{path}?{}", encoded.join("&"))
}

pub fn client(transport: &Arc<FixtureTransport>) -> RegistryClient {
    client_with(transport, RegistryConfig::default())
}

pub fn client_with(transport: &Arc<FixtureTransport>, config: RegistryConfig) -> RegistryClient {
    let transport: Arc<dyn RegistryTransport> = transport.clone();
    RegistryClient::with_transport(config, transport).expect("client")
}

/// A `lei-records` resource that scores 1.0 with no warnings.
pub fn clean_record(lei: &str, name: &str) -> Value {
    record_with(lei, name, "ACTIVE", "ISSUED")
}

pub fn record_with(lei: &str, name: &str, entity_status: &str, registration_status: &str) -> Value {
    json!({
        "type": "lei-records",
        "id": lei,
        "attributes": {
            "lei": lei,
            "entity": {
                "legalName": { "name": name, "language": "en" },
                "otherNames": [],
                "legalAddress": {
                    "language": "en",
                    "addressLines": ["1 Example Street"],
                    "city": "Frankfurt",
                    "region": "DE-HE",
                    "country": "DE",
                    "postalCode": "60311"
                },
                "headquartersAddress": {
                    "addressLines": ["1 Example Street"],
                    "city": "Frankfurt",
                    "country": "DE",
                    "postalCode": "60311"
                },
                "jurisdiction": "DE",
                "category": "GENERAL",
                "legalForm": { "id": "6QQB", "other": null },
                "status": entity_status,
                "expiration": { "date": null, "reason": null }
            },
            "registration": {
                "initialRegistrationDate": "2014-02-10T00:00:00Z",
                "lastUpdateDate": "2025-11-03T08:12:45Z",
                "status": registration_status,
                "nextRenewalDate": "2099-02-10T00:00:00Z",
                "managingLou": "5299000J2N45DDNE4Y28",
                "corroborationLevel": "FULLY_CORROBORATED"
            },
            "bic": ["DEUTDEFFXXX"]
        }
    })
}

pub fn page(resources: Vec<Value>) -> TransportOutcome {
    let total = resources.len();
    TransportOutcome::Success(json!({
        "meta": { "pagination": { "currentPage": 1, "perPage": 10, "from": 1, "to": total, "total": total, "lastPage": 1 } },
        "data": resources
    }))
}

/// Fuzzy completions body from `(matched text, lei, score)` triples.
pub fn completions(entries: &[(&str, &str, Option<f64>)]) -> TransportOutcome {
    let data: Vec<Value> = entries
        .iter()
        .map(|(value, lei, score)| {
            let mut attributes = json!({ "value": value });
            if let Some(score) = score {
                attributes["score"] = json!(score);
            }
            json!({
                "type": "fuzzycompletions",
                "attributes": attributes,
                "relationships": {
                    "lei-records": {
                        "data": { "type": "lei-records", "id": lei }
                    }
                }
            })
        })
        .collect();
    TransportOutcome::Success(json!({ "data": data }))
}
