//! Field extraction from free-text claim queries.
//!
//! Extraction is driven by a declarative rule table rather than a chain of
//! ad hoc regex branches: each rule names the field it feeds and how it
//! matches, and the table is evaluated in one pass over the lowercased
//! input. Table order is precedence order — within a field, the first rule
//! that produces a value wins and later rules are skipped. Extraction never
//! fails; unmatched fields stay absent.
//!
//! # Rule kinds
//!
//! - Regex capture (age: "aged N", "N year(s) old", "N f"/"N m" shorthand)
//! - Whole-word token class mapped to a fixed value (gender; the female
//!   class is checked before the male class)
//! - Ordered vocabulary scan by substring containment (procedures, cities;
//!   list order is priority order)
//! - Generic "<body-part> surgery|treatment" capture fallback, joined from
//!   its two groups
//! - "in X"/"from X" capture fallback with the city capitalized
//! - "N month(s)"/"N year(s)" duration, value rebuilt as "number unit"

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::fields::{Field, ParsedFields, capitalize_first};

/// Known procedures, scanned in priority order.
pub const KNOWN_PROCEDURES: &[&str] = &[
    "knee surgery",
    "back surgery",
    "eye surgery",
    "heart surgery",
    "brain surgery",
    "neck surgery",
    "shoulder surgery",
    "hip replacement",
    "bypass surgery",
    "dental treatment",
    "appendix removal",
    "chemotherapy",
    "dialysis",
];

/// Known cities, scanned in priority order.
pub const KNOWN_LOCATIONS: &[&str] = &[
    "pune",
    "delhi",
    "kolkata",
    "mumbai",
    "chennai",
    "bangalore",
    "hyderabad",
    "lucknow",
    "ahmedabad",
    "jaipur",
];

/// How a single rule recognises its value in the lowercased query text.
enum Matcher {
    /// First non-empty capture group of the pattern.
    FirstCapture(Regex),
    /// Fixed value when the token-class pattern matches anywhere.
    Keyword { pattern: Regex, value: &'static str },
    /// First vocabulary term contained in the text.
    Vocabulary {
        terms: &'static [&'static str],
        capitalize: bool,
    },
    /// All capture groups joined with a single space.
    JoinedCaptures(Regex),
    /// One capture group, capitalized on its first letter.
    CapitalizedCapture { pattern: Regex, group: usize },
}

impl Matcher {
    fn apply(&self, text: &str) -> Option<String> {
        match self {
            Self::FirstCapture(pattern) => {
                let caps = pattern.captures(text)?;
                caps.iter()
                    .skip(1)
                    .flatten()
                    .map(|m| m.as_str().to_string())
                    .next()
            }
            Self::Keyword { pattern, value } => {
                pattern.is_match(text).then(|| value.to_string())
            }
            Self::Vocabulary { terms, capitalize } => terms
                .iter()
                .find(|term| text.contains(*term))
                .map(|term| {
                    if *capitalize {
                        capitalize_first(term)
                    } else {
                        term.to_string()
                    }
                }),
            Self::JoinedCaptures(pattern) => {
                let caps = pattern.captures(text)?;
                let parts: Vec<&str> =
                    caps.iter().skip(1).flatten().map(|m| m.as_str()).collect();
                (!parts.is_empty()).then(|| parts.join(" "))
            }
            Self::CapitalizedCapture { pattern, group } => pattern
                .captures(text)?
                .get(*group)
                .map(|m| capitalize_first(m.as_str())),
        }
    }
}

/// One extraction rule: which field it feeds and how it matches.
struct Rule {
    field: Field,
    name: &'static str,
    matcher: Matcher,
}

/// Ordered table of extraction rules, evaluated in one pass.
pub struct RuleTable {
    rules: Vec<Rule>,
}

impl RuleTable {
    /// The standard insurance-claim rule set.
    pub fn standard() -> Self {
        let rules = vec![
            Rule {
                field: Field::Age,
                name: "age-pattern",
                matcher: Matcher::FirstCapture(re(
                    r"aged\s+(\d+)|(\d+)[-\s]?year[-\s]?old|(\d+)\s*[fm]\b",
                )),
            },
            Rule {
                field: Field::Gender,
                name: "female-tokens",
                matcher: Matcher::Keyword {
                    pattern: re(r"\b(female|wife|mother|she|f)\b"),
                    value: "female",
                },
            },
            Rule {
                field: Field::Gender,
                name: "male-tokens",
                matcher: Matcher::Keyword {
                    pattern: re(r"\b(male|husband|father|he|m)\b"),
                    value: "male",
                },
            },
            Rule {
                field: Field::Procedure,
                name: "procedure-vocabulary",
                matcher: Matcher::Vocabulary {
                    terms: KNOWN_PROCEDURES,
                    capitalize: false,
                },
            },
            Rule {
                field: Field::Procedure,
                name: "body-part-fallback",
                matcher: Matcher::JoinedCaptures(re(
                    r"(knee|eye|back|heart|brain|neck|hip|shoulder|lung|spine|liver|skin)\s+(surgery|treatment)",
                )),
            },
            Rule {
                field: Field::Location,
                name: "city-vocabulary",
                matcher: Matcher::Vocabulary {
                    terms: KNOWN_LOCATIONS,
                    capitalize: true,
                },
            },
            Rule {
                field: Field::Location,
                name: "in-from-fallback",
                matcher: Matcher::CapitalizedCapture {
                    pattern: re(r"(in|from)\s+([a-z]+)"),
                    group: 2,
                },
            },
            Rule {
                field: Field::PolicyDuration,
                name: "duration-pattern",
                matcher: Matcher::JoinedCaptures(re(r"(\d+)\s*(months|month|years|year)")),
            },
        ];
        Self { rules }
    }

    /// Extract structured fields from raw query text.
    ///
    /// Lowercases once, then walks the table. Pure and deterministic.
    pub fn extract(&self, text: &str) -> ParsedFields {
        let text = text.to_lowercase();
        let mut fields = ParsedFields::all_missing();

        for rule in &self.rules {
            if fields.get(rule.field).is_some() {
                continue;
            }
            if let Some(value) = rule.matcher.apply(&text) {
                debug!(
                    field = rule.field.as_str(),
                    rule = rule.name,
                    value = %value,
                    "extraction rule matched"
                );
                fields.set(rule.field, value);
            }
        }

        fields
    }
}

static STANDARD_TABLE: LazyLock<RuleTable> = LazyLock::new(RuleTable::standard);

/// Extract fields from a claim query using the standard rule table.
pub fn parse_query(text: &str) -> ParsedFields {
    STANDARD_TABLE.extract(text)
}

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("hard-coded extraction pattern")
}
