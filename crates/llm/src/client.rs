use std::time::Duration;

use serde_json::{json, Value};

use crate::error::{LlmError, Result};
use crate::parse::{parse_response, SummaryResult};

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";
const MAX_TOKENS: u32 = 1024;

const SYSTEM_PROMPT: &str = "\
You are a senior software engineer. Your task is to analyse a GitHub repository \
and return a structured JSON summary.

You MUST respond with ONLY a valid JSON object - no markdown, no code fences, \
no prose, no extra keys, no explanation.

The JSON object must conform EXACTLY to this schema:

{
  \"summary\":      string,   // one concise paragraph: what the project does, who it is for, notable features
  \"technologies\": string[], // every meaningful language, framework, library, tool identified in the files
  \"structure\":    string    // one paragraph: directory layout and how the code is divided
}

Constraints:
- Output ONLY the JSON object. No text before '{' or after '}'.
- \"summary\"      - plain text, <= 200 words.
- \"technologies\" - array of short name strings (e.g. \"Python\", \"FastAPI\", \"PostgreSQL\").
                   No version numbers unless architecturally significant. No duplicates.
- \"structure\"    - plain text, <= 150 words.
- Do NOT add any key other than the three above.
- Do NOT wrap the JSON in a code block or backticks.
";

/// Client settings, all overridable via environment variables.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub model: String,
    /// Per-request timeout (connect + read).
    pub timeout: Duration,
    /// Total attempts; 1 means no retry.
    pub max_attempts: u32,
    /// Base backoff between retries, doubled each attempt.
    pub backoff_base: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(60),
            max_attempts: 3,
            backoff_base: Duration::from_secs(2),
        }
    }
}

impl LlmConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            model: env_string("ANTHROPIC_MODEL").unwrap_or(defaults.model),
            timeout: env_string("LLM_TIMEOUT")
                .and_then(|raw| raw.parse::<f64>().ok())
                .map(Duration::from_secs_f64)
                .unwrap_or(defaults.timeout),
            max_attempts: env_string("LLM_MAX_ATTEMPTS")
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(defaults.max_attempts),
            backoff_base: env_string("LLM_BACKOFF_BASE")
                .and_then(|raw| raw.parse::<f64>().ok())
                .map(Duration::from_secs_f64)
                .unwrap_or(defaults.backoff_base),
        }
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}

/// Anthropic Messages API client with retry/backoff and strict output
/// parsing.
pub struct LlmClient {
    http: reqwest::Client,
    config: LlmConfig,
    api_key: String,
}

impl LlmClient {
    /// Fails fast when `ANTHROPIC_API_KEY` is missing; every later call
    /// would fail anyway.
    pub fn from_env() -> Result<Self> {
        let api_key = env_string("ANTHROPIC_API_KEY").ok_or_else(|| {
            LlmError::Config(
                "ANTHROPIC_API_KEY environment variable is not set".to_string(),
            )
        })?;
        Ok(Self::new(LlmConfig::from_env(), api_key))
    }

    pub fn new(config: LlmConfig, api_key: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("reqwest client builds with static configuration");
        Self {
            http,
            config,
            api_key,
        }
    }

    /// Send the curated repository context to the model and return the
    /// structured summary.
    pub async fn get_summary(&self, context: &str) -> Result<SummaryResult> {
        let raw = self.call_api(context).await?;
        parse_response(&raw)
    }

    async fn call_api(&self, context: &str) -> Result<String> {
        let payload = json!({
            "model": self.config.model,
            "max_tokens": MAX_TOKENS,
            "system": SYSTEM_PROMPT,
            "messages": [{
                "role": "user",
                "content": format!(
                    "Analyse the repository context below and return the JSON summary.\n\n\
                     Remember: respond with ONLY the JSON object, nothing else.\n\n\
                     {context}\n\nJSON response:"
                ),
            }],
        });

        let mut timed_out = false;
        let mut last_failure = String::from("no attempts made");

        for attempt in 1..=self.config.max_attempts {
            let response = self
                .http
                .post(API_URL)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", API_VERSION)
                .json(&payload)
                .send()
                .await;

            let response = match response {
                Ok(response) => response,
                Err(err) => {
                    timed_out = err.is_timeout();
                    last_failure = err.to_string();
                    log::warn!(
                        "LLM request failed (attempt {attempt}/{}): {err}",
                        self.config.max_attempts
                    );
                    self.maybe_backoff(attempt).await;
                    continue;
                }
            };

            let status = response.status().as_u16();
            match status {
                429 => {
                    let retry_after = response
                        .headers()
                        .get("retry-after")
                        .and_then(|v| v.to_str().ok())
                        .and_then(|v| v.parse::<f64>().ok())
                        .map(Duration::from_secs_f64)
                        .unwrap_or_else(|| self.backoff_delay(attempt + 1));
                    timed_out = false;
                    last_failure = format!("rate limited (429), retry after {retry_after:?}");
                    log::warn!(
                        "LLM rate limited (attempt {attempt}/{}), waiting {retry_after:?}",
                        self.config.max_attempts
                    );
                    tokio::time::sleep(retry_after).await;
                    continue;
                }
                // 529 = API overloaded
                500 | 502 | 503 | 504 | 529 => {
                    timed_out = false;
                    last_failure = format!("server error {status}");
                    log::warn!(
                        "LLM server error {status} (attempt {attempt}/{})",
                        self.config.max_attempts
                    );
                    self.maybe_backoff(attempt).await;
                    continue;
                }
                401 => {
                    return Err(LlmError::Config(
                        "API returned 401 Unauthorized. Check ANTHROPIC_API_KEY.".to_string(),
                    ));
                }
                _ => {}
            }

            if !(200..300).contains(&status) {
                let body = response.text().await.unwrap_or_default();
                let prefix: String = body.chars().take(300).collect();
                return Err(LlmError::Response(format!(
                    "unexpected status {status}: {prefix}"
                )));
            }

            let body: Value = response
                .json()
                .await
                .map_err(|err| LlmError::Response(format!("invalid response body: {err}")))?;
            if let Some(text) = first_text_block(&body) {
                return Ok(text);
            }
            return Err(LlmError::Response(
                "API returned no text content in response".to_string(),
            ));
        }

        let attempts = self.config.max_attempts;
        if timed_out {
            Err(LlmError::Timeout(format!(
                "timed out after {attempts} attempt(s) (timeout={:?} per request)",
                self.config.timeout
            )))
        } else {
            Err(LlmError::Response(format!(
                "failed after {attempts} attempt(s): {last_failure}"
            )))
        }
    }

    fn backoff_delay(&self, attempt: u32) -> Duration {
        self.config.backoff_base * 2u32.saturating_pow(attempt.saturating_sub(1))
    }

    async fn maybe_backoff(&self, attempt: u32) {
        if attempt < self.config.max_attempts {
            let delay = self.backoff_delay(attempt);
            log::debug!("backing off {delay:?} before attempt {}", attempt + 1);
            tokio::time::sleep(delay).await;
        }
    }
}

// Response shape: {"content": [{"type": "text", "text": "..."}], ...}
fn first_text_block(body: &Value) -> Option<String> {
    body.get("content")?
        .as_array()?
        .iter()
        .find(|block| block.get("type").and_then(Value::as_str) == Some("text"))
        .and_then(|block| block.get("text").and_then(Value::as_str))
        .map(|text| text.to_string())
}
