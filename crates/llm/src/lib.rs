//! Model-invocation collaborator: sends the curated repository context to
//! the Anthropic Messages API and parses the structured summary it returns,
//! retrying transient failures with exponential backoff.

pub mod client;
pub mod error;
pub mod parse;

pub use client::{LlmClient, LlmConfig};
pub use error::{LlmError, Result};
pub use parse::{parse_response, SummaryResult};
