//! Storage layer: the LanceDB clause index.

mod error;
pub use error::StoreError;

#[cfg(feature = "lancedb")]
mod clauses;
#[cfg(feature = "lancedb")]
pub use clauses::{ClauseHit, ClauseStore, clause_batch};
