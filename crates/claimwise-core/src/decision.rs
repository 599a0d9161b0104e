//! The waiting-period decision rule.
//!
//! A surgical procedure claimed before the policy is 24 months old is
//! rejected; everything else is approved. The rule is deliberately blunt
//! and deterministic so the outcome is explainable from the parsed fields
//! alone, independent of whatever clauses retrieval later surfaces.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::fields::{ParsedFields, SENTINEL, capitalize_first};

/// Months a policy must be held before surgical procedures are covered.
pub const WAITING_PERIOD_MONTHS: u32 = 24;

/// The two possible claim outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Approved,
    Rejected,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }
}

/// A decision together with its one-sentence justification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub decision: Decision,
    pub justification: String,
}

/// Apply the waiting-period rule to a parsed query.
///
/// The procedure is surgical when its text contains "surgery" (case
/// insensitive). Missing or unparseable durations count as zero months,
/// so a surgical claim with no stated duration is rejected.
pub fn evaluate(fields: &ParsedFields) -> Outcome {
    let months = months_held(fields.policy_duration.as_deref());
    let procedure = fields.procedure.as_deref().unwrap_or(SENTINEL);
    let surgical = procedure.to_lowercase().contains("surgery");

    let outcome = if surgical && months < WAITING_PERIOD_MONTHS {
        Outcome {
            decision: Decision::Rejected,
            justification: format!(
                "{} is subject to a {WAITING_PERIOD_MONTHS}-month waiting period.",
                capitalize_first(procedure)
            ),
        }
    } else {
        Outcome {
            decision: Decision::Approved,
            justification: format!("{} is covered under the policy.", capitalize_first(procedure)),
        }
    };

    debug!(
        months,
        surgical,
        decision = outcome.decision.as_str(),
        "waiting-period rule evaluated"
    );
    outcome
}

/// Number of months a duration phrase represents.
///
/// Reads the first run of digits and multiplies by 12 when the phrase
/// mentions years. Anything unparseable degrades to zero rather than
/// failing, matching how absent fields are treated.
pub fn months_held(duration: Option<&str>) -> u32 {
    let Some(duration) = duration else { return 0 };
    let digits: String = duration
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();
    let Ok(count) = digits.parse::<u32>() else { return 0 };
    if duration.to_lowercase().contains("year") {
        count.saturating_mul(12)
    } else {
        count
    }
}
