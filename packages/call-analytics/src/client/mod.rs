//! Analytics API client.

pub mod query;
pub mod vaac;

pub use query::FilterOperand;
pub use vaac::{VaacClient, DEFAULT_ENDPOINT, DEFAULT_USER_AGENT};
