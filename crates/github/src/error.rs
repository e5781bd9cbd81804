use chrono::{DateTime, Utc};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GithubError>;

#[derive(Error, Debug)]
pub enum GithubError {
    #[error("invalid GitHub URL '{0}': expected https://github.com/<owner>/<repo>")]
    InvalidUrl(String),

    #[error("repository or resource not found (404): {0}")]
    NotFound(String),

    #[error("access denied: {0}")]
    AccessDenied(String),

    #[error("{message}")]
    RateLimited {
        message: String,
        reset_at: Option<DateTime<Utc>>,
    },

    #[error("network error while contacting GitHub API: {0}")]
    Network(String),

    #[error("GitHub could not process the request (422): {0}")]
    Unprocessable(String),

    #[error("unexpected GitHub API error {status}: {message}")]
    Api { status: u16, message: String },
}
