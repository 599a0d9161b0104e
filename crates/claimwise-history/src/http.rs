//! HTTP client for appending processed queries to the history service.

use claimwise_core::QueryRecord;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Client for the history service's query-log endpoint.
pub struct HistoryClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct AppendResponse {
    accepted: u64,
}

impl HistoryClient {
    /// Create a client for the given history service base URL.
    ///
    /// `base_url` should be like `http://localhost:4000` (no trailing slash).
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Append one processed query record to the log.
    ///
    /// Returns the count accepted by the server (1 on success).
    pub async fn append(&self, record: &QueryRecord) -> Result<u64, HistoryError> {
        let url = format!("{}/api/queries", self.base_url);

        info!(url = %url, id = %record.id, "appending query record");
        let resp = self.client.post(&url).json(record).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(HistoryError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let result: AppendResponse = resp.json().await?;
        info!(accepted = result.accepted, "append complete");
        Ok(result.accepted)
    }

    /// Fetch logged records, newest first.
    ///
    /// If `limit` is provided, at most that many records are returned.
    pub async fn recent(&self, limit: Option<usize>) -> Result<Vec<QueryRecord>, HistoryError> {
        let mut url = format!("{}/api/queries", self.base_url);
        if let Some(n) = limit {
            url.push_str(&format!("?limit={n}"));
        }

        info!(url = %url, "fetching query history");
        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(HistoryError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let records: Vec<QueryRecord> = resp.json().await?;
        info!(count = records.len(), "fetched query history");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claimwise_core::{evaluate, parse_query};

    fn sample_record() -> QueryRecord {
        let query = "55 year old female, hip replacement in delhi, 30 months".to_string();
        let parsed = parse_query(&query);
        let outcome = evaluate(&parsed);
        QueryRecord::new(
            query,
            parsed,
            outcome,
            vec!["Clause 9: joint replacement procedures".to_string()],
            "2025-06-01T12:00:00Z".to_string(),
        )
    }

    #[test]
    fn record_array_json_roundtrip() {
        let records = vec![sample_record(), sample_record()];
        let json = serde_json::to_string(&records).unwrap();
        let parsed: Vec<QueryRecord> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_ne!(parsed[0].id, parsed[1].id);
        assert_eq!(parsed[1].parsed.location.as_deref(), Some("Delhi"));
    }

    #[test]
    fn logged_record_carries_wire_sentinels() {
        let query = "dialysis for my father".to_string();
        let parsed = parse_query(&query);
        let outcome = evaluate(&parsed);
        let record = QueryRecord::new(query, parsed, outcome, vec![], "2025-06-01T12:00:00Z".into());

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["parsed"]["procedure"], "dialysis");
        assert_eq!(json["parsed"]["policy_duration"], "N/A");
        assert_eq!(json["decision"], "Approved");
    }

    #[test]
    fn history_client_trims_trailing_slash() {
        let client = HistoryClient::new("http://localhost:4000/".into());
        assert_eq!(client.base_url, "http://localhost:4000");
    }
}
