use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use repolens_github::GithubError;
use repolens_llm::LlmError;

use crate::summarize::{summarize_repo, SharedState, SummarizeError};

#[derive(Debug, Deserialize)]
pub struct SummarizeRequest {
    pub github_url: String,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/summarize", post(summarize))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn summarize(
    State(state): State<SharedState>,
    Json(body): Json<SummarizeRequest>,
) -> Result<Json<repolens_llm::SummaryResult>, Response> {
    log::info!("summarize request: {}", body.github_url);
    summarize_repo(&state, &body.github_url)
        .await
        .map(Json)
        .map_err(error_response)
}

/// Map collaborator failures onto the HTTP boundary: a bad URL is the
/// caller's fault, an exhausted LLM deadline is a gateway timeout, and
/// everything else is an upstream failure.
fn error_response(err: SummarizeError) -> Response {
    let status = match &err {
        SummarizeError::Github(GithubError::InvalidUrl(_)) => StatusCode::UNPROCESSABLE_ENTITY,
        SummarizeError::Llm(LlmError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::BAD_GATEWAY,
    };
    log::warn!("summarize failed ({}): {err}", status.as_u16());
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_url_maps_to_unprocessable_entity() {
        let err = SummarizeError::Github(GithubError::InvalidUrl("nope".to_string()));
        assert_eq!(
            error_response(err).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn llm_timeout_maps_to_gateway_timeout() {
        let err = SummarizeError::Llm(LlmError::Timeout("deadline".to_string()));
        assert_eq!(error_response(err).status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn other_failures_map_to_bad_gateway() {
        let err = SummarizeError::Github(GithubError::Network("down".to_string()));
        assert_eq!(error_response(err).status(), StatusCode::BAD_GATEWAY);
    }
}
