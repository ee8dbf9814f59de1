//! Langbase Pipes integration.
//!
//! - [`LangbaseClient`]: HTTP client with retries
//! - [`MysteryOracle`]: case generation and hints on top of the client

mod client;
mod oracle;
mod types;


pub use client::LangbaseClient;
pub use oracle::{parse_case, MysteryOracle};
pub use types::*;
