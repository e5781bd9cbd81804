//! Repolens server: summarize a GitHub repository over HTTP.
//!
//! `POST /summarize` with `{"github_url": "https://github.com/owner/repo"}`
//! fetches the repository tree, curates a budgeted context from the most
//! informative files, and returns a structured model-written summary.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use repolens_curator::CuratorConfig;
use repolens_github::{token_from_env, GithubClient};
use repolens_llm::LlmClient;

mod app;
mod summarize;

use summarize::AppState;

#[derive(Parser)]
#[command(name = "repolens")]
#[command(about = "GitHub repository summarizer", version)]
struct Cli {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8080")]
    listen: SocketAddr,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let state = Arc::new(AppState {
        curator: CuratorConfig::from_env(),
        github: GithubClient::new(token_from_env()),
        llm: LlmClient::from_env().context("LLM client configuration")?,
    });

    let listener = tokio::net::TcpListener::bind(cli.listen)
        .await
        .with_context(|| format!("failed to bind {}", cli.listen))?;
    log::info!("repolens listening on {}", cli.listen);

    axum::serve(listener, app::router(state))
        .await
        .context("server error")?;
    Ok(())
}
