//! GitHub REST collaborator: repository metadata, recursive trees, and raw
//! file contents. The curator engine decides *what* to fetch; this crate
//! only fetches it and maps API failures onto [`GithubError`] kinds.

pub mod client;
pub mod error;

pub use client::{parse_github_url, token_from_env, GithubClient};
pub use error::{GithubError, Result};
