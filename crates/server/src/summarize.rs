use std::sync::Arc;

use thiserror::Error;

use repolens_curator::{assemble, select, CuratorConfig, FileOutcome};
use repolens_github::{GithubClient, GithubError};
use repolens_llm::{LlmClient, LlmError, SummaryResult};

/// Process-wide collaborators, built once at startup and shared across
/// requests. Each request still gets its own snapshot and counters, so
/// concurrent summarizations are independent.
pub struct AppState {
    pub curator: CuratorConfig,
    pub github: GithubClient,
    pub llm: LlmClient,
}

pub type SharedState = Arc<AppState>;

#[derive(Error, Debug)]
pub enum SummarizeError {
    #[error(transparent)]
    Github(#[from] GithubError),
    #[error(transparent)]
    Llm(#[from] LlmError),
}

/// The full pipeline: snapshot the repository, curate a selection, fetch
/// the selected contents, assemble the budgeted context, summarize it.
pub async fn summarize_repo(
    state: &AppState,
    github_url: &str,
) -> Result<SummaryResult, SummarizeError> {
    let snapshot = state.github.fetch_repo(github_url).await?;
    log::info!(
        "snapshot {}/{}@{}: {} tree entries",
        snapshot.owner,
        snapshot.repo,
        snapshot.branch,
        snapshot.tree.len()
    );

    let selection = select(&snapshot.tree, &state.curator);
    let paths: Vec<String> = selection.iter().map(|file| file.path.clone()).collect();
    let contents = state
        .github
        .fetch_file_contents(&snapshot.owner, &snapshot.repo, &paths, &snapshot.ref_sha)
        .await?;

    let artifact = assemble(&snapshot, &selection, &contents, &state.curator);
    let (mut included, mut missing, mut exhausted) = (0usize, 0usize, 0usize);
    for report in &artifact.outcomes {
        match report.outcome {
            FileOutcome::Included { .. } | FileOutcome::Truncated { .. } => included += 1,
            FileOutcome::MissingContent => missing += 1,
            FileOutcome::BudgetExhausted => exhausted += 1,
        }
    }
    log::info!(
        "assembled {} chars for {}/{} ({included} files included, {missing} unfetched, \
         {exhausted} over budget)",
        artifact.text.chars().count(),
        snapshot.owner,
        snapshot.repo
    );

    Ok(state.llm.get_summary(&artifact.text).await?)
}
