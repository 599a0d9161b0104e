//! History layer: JSON-over-HTTP client for the remote query log.

mod http;

pub use http::{HistoryClient, HistoryError};
