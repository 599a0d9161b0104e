pub mod decision;
pub mod extract;
pub mod fields;
pub mod history;
pub mod schema;

pub use decision::{Decision, Outcome, WAITING_PERIOD_MONTHS, evaluate, months_held};
pub use extract::{RuleTable, parse_query};
pub use fields::{Field, ParsedFields, SENTINEL};
pub use history::QueryRecord;
pub use schema::{CLAUSE_TABLE, policy_clause_schema};
