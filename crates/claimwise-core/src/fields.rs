//! The structured record extracted from a free-text claim query.
//!
//! Five independent optional fields. A field that no extraction rule matched
//! is absent; on the wire (history log, JSON output) absence is rendered as
//! the fixed sentinel string `"N/A"`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Wire representation of a field no rule matched.
pub const SENTINEL: &str = "N/A";

/// Retrieval term used when the procedure field is missing, so clause
/// lookup still has something to search for.
pub const DEFAULT_RETRIEVAL_TERM: &str = "surgery";

/// The five extractable fields, in extraction order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Age,
    Gender,
    Procedure,
    Location,
    PolicyDuration,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Age => "age",
            Self::Gender => "gender",
            Self::Procedure => "procedure",
            Self::Location => "location",
            Self::PolicyDuration => "policy_duration",
        }
    }
}

/// Structured fields extracted from one claim query.
///
/// Created fresh per query by [`crate::extract::RuleTable::extract`], never
/// mutated afterwards. Values are stored as matched (lowercase, except
/// locations which are capitalized on the first letter).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedFields {
    #[serde(serialize_with = "ser_field", deserialize_with = "de_field")]
    pub age: Option<String>,
    #[serde(serialize_with = "ser_field", deserialize_with = "de_field")]
    pub gender: Option<String>,
    #[serde(serialize_with = "ser_field", deserialize_with = "de_field")]
    pub procedure: Option<String>,
    #[serde(serialize_with = "ser_field", deserialize_with = "de_field")]
    pub location: Option<String>,
    #[serde(serialize_with = "ser_field", deserialize_with = "de_field")]
    pub policy_duration: Option<String>,
}

impl ParsedFields {
    /// The all-sentinel record (what inert input text extracts to).
    pub fn all_missing() -> Self {
        Self::default()
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::Age => self.age.as_deref(),
            Field::Gender => self.gender.as_deref(),
            Field::Procedure => self.procedure.as_deref(),
            Field::Location => self.location.as_deref(),
            Field::PolicyDuration => self.policy_duration.as_deref(),
        }
    }

    pub(crate) fn set(&mut self, field: Field, value: String) {
        let slot = match field {
            Field::Age => &mut self.age,
            Field::Gender => &mut self.gender,
            Field::Procedure => &mut self.procedure,
            Field::Location => &mut self.location,
            Field::PolicyDuration => &mut self.policy_duration,
        };
        *slot = Some(value);
    }

    /// The extracted procedure, or [`DEFAULT_RETRIEVAL_TERM`] when extraction
    /// failed. Clause retrieval is keyed on this.
    pub fn procedure_or_default(&self) -> &str {
        self.procedure.as_deref().unwrap_or(DEFAULT_RETRIEVAL_TERM)
    }
}

/// Upper-case only the first character, leaving the rest as-is.
pub(crate) fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn ser_field<S: Serializer>(value: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(value.as_deref().unwrap_or(SENTINEL))
}

fn de_field<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let raw = String::deserialize(d)?;
    Ok(if raw == SENTINEL { None } else { Some(raw) })
}
