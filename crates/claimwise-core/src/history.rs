//! The record appended to the remote query log after each decision.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decision::{Decision, Outcome};
use crate::fields::ParsedFields;

/// One fully processed query, as logged to the history service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRecord {
    /// Opaque client-generated identifier.
    pub id: String,
    /// The raw query text as the user typed it.
    pub query: String,
    pub parsed: ParsedFields,
    pub decision: Decision,
    pub justification: String,
    /// Retrieved clause texts, most relevant first.
    pub clauses: Vec<String>,
    /// ISO 8601 timestamp string.
    pub logged_at: String,
}

impl QueryRecord {
    pub fn new(
        query: String,
        parsed: ParsedFields,
        outcome: Outcome,
        clauses: Vec<String>,
        logged_at: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            query,
            parsed,
            decision: outcome.decision,
            justification: outcome.justification,
            clauses,
            logged_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::evaluate;
    use crate::extract::parse_query;

    fn sample() -> QueryRecord {
        let query = "45 year old male, knee surgery in pune, 18 months".to_string();
        let parsed = parse_query(&query);
        let outcome = evaluate(&parsed);
        QueryRecord::new(
            query,
            parsed,
            outcome,
            vec!["Clause 4.2: orthopaedic procedures".to_string()],
            "2025-06-01T12:00:00Z".to_string(),
        )
    }

    #[test]
    fn ids_are_unique_per_record() {
        assert_ne!(sample().id, sample().id);
    }

    #[test]
    fn record_round_trips_through_json() {
        let record = sample();
        let json = serde_json::to_string(&record).unwrap();
        let back: QueryRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, record.id);
        assert_eq!(back.parsed, record.parsed);
        assert_eq!(back.decision, record.decision);
        assert_eq!(back.clauses, record.clauses);
        assert_eq!(back.logged_at, record.logged_at);
    }

    #[test]
    fn logged_json_has_flat_decision_and_sentinel_fields() {
        let query = "chemotherapy starting soon".to_string();
        let parsed = parse_query(&query);
        let outcome = evaluate(&parsed);
        let record = QueryRecord::new(query, parsed, outcome, vec![], "2025-06-01T12:00:00Z".into());

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["parsed"]["procedure"], "chemotherapy");
        assert_eq!(json["parsed"]["age"], "N/A");
        assert_eq!(json["parsed"]["location"], "N/A");
        assert_eq!(json["decision"], "Approved");
        assert!(json["id"].as_str().is_some());
    }
}
