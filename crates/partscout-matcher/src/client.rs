//! HTTP client for the remote part-matching service.
//!
//! Sends one POST per query: the query payload (text, or base64 image data)
//! together with the full catalog, and decodes the ranked response. The
//! service keeps no state between calls, so every request is self-contained.
//!
//! ## Wire contract
//!
//! Request: `{ "query", "queryType": "text" | "image", "parts": [...] }`
//! Response: `{ "identifiedPartType", "results": [...] }` where `results`
//! order is the authoritative ranking.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use partscout_core::catalog::{Catalog, PartRecord};
use partscout_core::config::NetworkConfig;
use partscout_core::matcher::{MatchCandidate, MatchQuery, PartMatcher, SearchOutcome};
use partscout_core::{Result, ScoutError};

use crate::payload;

/// Helper to create a remote-call error without a status code.
fn remote_err(msg: String) -> ScoutError {
    ScoutError::RemoteCallFailed {
        message: msg,
        status: None,
    }
}

/// Request body for the matcher endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MatchRequest<'a> {
    query: String,
    query_type: &'static str,
    parts: &'a [PartRecord],
}

/// Response body from the matcher endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MatchResponse {
    #[serde(default)]
    identified_part_type: Option<String>,
    #[serde(default)]
    results: Vec<MatchCandidate>,
}

impl MatchResponse {
    fn into_outcome(self) -> SearchOutcome {
        SearchOutcome {
            // The service sends "" when it could not identify a part type.
            identified_part_type: self
                .identified_part_type
                .filter(|s| !s.trim().is_empty()),
            candidates: self.results,
        }
    }
}

/// HTTP client for the part-matching service.
pub struct MatcherClient {
    endpoint: String,
    client: reqwest::Client,
}

impl MatcherClient {
    /// Create a new client targeting the given endpoint URL.
    ///
    /// If `endpoint` is `None`, defaults to
    /// [`NetworkConfig::DEFAULT_ENDPOINT`].
    pub fn new(endpoint: Option<&str>) -> Self {
        let endpoint = endpoint
            .unwrap_or(NetworkConfig::DEFAULT_ENDPOINT)
            .trim_end_matches('/')
            .to_string();

        let client = reqwest::Client::builder()
            .timeout(NetworkConfig::REQUEST_TIMEOUT)
            .connect_timeout(NetworkConfig::CONNECT_TIMEOUT)
            .user_agent(NetworkConfig::USER_AGENT)
            .build()
            .expect("failed to build reqwest client");

        Self { endpoint, client }
    }

    /// The endpoint this client posts to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn wire_query(query: &MatchQuery) -> String {
        match query {
            MatchQuery::Text(text) => text.clone(),
            MatchQuery::Image(bytes) => payload::image_payload(bytes),
        }
    }
}

#[async_trait]
impl PartMatcher for MatcherClient {
    async fn find_matches(&self, query: &MatchQuery, catalog: &Catalog) -> Result<SearchOutcome> {
        let body = MatchRequest {
            query: Self::wire_query(query),
            query_type: query.kind(),
            parts: catalog.records(),
        };
        debug!(
            "Posting {} query with {} catalog parts to {}",
            query.kind(),
            catalog.len(),
            self.endpoint
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                remote_err(format!(
                    "Failed to reach the matching service at {}: {}",
                    self.endpoint, e
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body_text: String = response.text().await.unwrap_or_default();
            return Err(ScoutError::RemoteCallFailed {
                message: format!("Matching service returned {}: {}", status, body_text),
                status: Some(status.as_u16()),
            });
        }

        let decoded: MatchResponse = response
            .json()
            .await
            .map_err(|e| remote_err(format!("Failed to parse matcher response: {}", e)))?;

        info!("Matcher returned {} candidates", decoded.results.len());
        Ok(decoded.into_outcome())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use partscout_core::matcher::Similarity;

    fn catalog() -> Catalog {
        let records = vec![
            PartRecord::from_cells("P100", "Pump").unwrap(),
            PartRecord::from_cells("P200", "Valve").unwrap(),
        ];
        Catalog::from_records(records)
    }

    #[test]
    fn test_request_wire_shape() {
        let catalog = catalog();
        let query = MatchQuery::text("hydraulic pump").unwrap();
        let body = MatchRequest {
            query: MatcherClient::wire_query(&query),
            query_type: query.kind(),
            parts: catalog.records(),
        };
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["query"], "hydraulic pump");
        assert_eq!(json["queryType"], "text");
        assert_eq!(json["parts"][0]["code"], "P100");
        assert_eq!(json["parts"][1]["description"], "Valve");
    }

    #[test]
    fn test_image_query_is_base64_on_the_wire() {
        let query = MatchQuery::image(vec![0xFF, 0xD8, 0xFF]).unwrap();
        assert_eq!(MatcherClient::wire_query(&query), "/9j/");
        assert_eq!(query.kind(), "image");
    }

    #[test]
    fn test_response_parses_ranked_results() {
        let decoded: MatchResponse = serde_json::from_str(
            r#"{
                "identifiedPartType": "Pump",
                "results": [
                    { "code": "P100", "description": "Pump", "similarity": "Alta" },
                    { "code": "P300", "description": "Gasket", "similarity": "Baixa" }
                ]
            }"#,
        )
        .unwrap();
        let outcome = decoded.into_outcome();

        assert_eq!(outcome.identified_part_type.as_deref(), Some("Pump"));
        let primary = outcome.primary().unwrap();
        assert_eq!(primary.code, "P100");
        assert_eq!(primary.similarity, Similarity::High);
        assert_eq!(outcome.candidates[1].similarity, Similarity::Low);
    }

    #[test]
    fn test_response_tolerates_missing_fields() {
        let decoded: MatchResponse = serde_json::from_str("{}").unwrap();
        let outcome = decoded.into_outcome();
        assert!(outcome.identified_part_type.is_none());
        assert!(!outcome.has_candidates());
    }

    #[test]
    fn test_empty_identified_type_maps_to_none() {
        let decoded: MatchResponse =
            serde_json::from_str(r#"{ "identifiedPartType": "  ", "results": [] }"#).unwrap();
        assert!(decoded.into_outcome().identified_part_type.is_none());
    }

    #[test]
    fn test_endpoint_normalization() {
        let client = MatcherClient::new(Some("https://matcher.example.com/"));
        assert_eq!(client.endpoint(), "https://matcher.example.com");

        let default = MatcherClient::new(None);
        assert_eq!(default.endpoint(), NetworkConfig::DEFAULT_ENDPOINT);
    }
}
