use thiserror::Error;

pub type Result<T> = std::result::Result<T, LlmError>;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("LLM configuration error: {0}")]
    Config(String),

    #[error("LLM request timed out: {0}")]
    Timeout(String),

    #[error("LLM request failed: {0}")]
    Response(String),

    #[error("LLM response could not be parsed: {0}")]
    Parse(String),
}
