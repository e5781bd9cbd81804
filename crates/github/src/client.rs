use std::collections::HashMap;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use repolens_curator::types::{EntryKind, RepoSnapshot, TreeEntry};

use crate::error::{GithubError, Result};

const GITHUB_API: &str = "https://api.github.com";
const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("repolens/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

// Accepts https://github.com/owner/repo with optional .git, trailing slash,
// or extra path segments (/tree/branch etc.), and the http variant.
static URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://github\.com/(?P<owner>[^/]+)/(?P<repo>[^/?#]+?)(?:\.git)?(?:/.*)?$")
        .expect("valid GitHub URL regex")
});

/// Extract `(owner, repo)` from a GitHub repository URL.
pub fn parse_github_url(url: &str) -> Result<(String, String)> {
    let trimmed = url.trim();
    let captures = URL_RE
        .captures(trimmed)
        .ok_or_else(|| GithubError::InvalidUrl(trimmed.to_string()))?;
    Ok((captures["owner"].to_string(), captures["repo"].to_string()))
}

/// Read the auth token the way the rest of the process expects it.
pub fn token_from_env() -> Option<String> {
    std::env::var("GITHUB_TOKEN")
        .ok()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Thin client over the GitHub REST API. Fetches repository metadata, the
/// recursive tree, and raw file contents; it never decides what to fetch.
pub struct GithubClient {
    http: reqwest::Client,
    token: Option<String>,
}

impl GithubClient {
    pub fn new(token: Option<String>) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("reqwest client builds with static configuration");
        Self { http, token }
    }

    /// Fetch repository metadata plus the full recursive file tree.
    ///
    /// Does not fetch individual file contents; that is deferred until the
    /// curator has selected files.
    pub async fn fetch_repo(&self, url: &str) -> Result<RepoSnapshot> {
        let (owner, repo) = parse_github_url(url)?;

        let meta: RepoMeta = self
            .get_json(&format!("{GITHUB_API}/repos/{owner}/{repo}"), &[])
            .await?;
        let branch = meta.default_branch;

        let branch_data: BranchInfo = self
            .get_json(
                &format!("{GITHUB_API}/repos/{owner}/{repo}/branches/{branch}"),
                &[],
            )
            .await?;
        let ref_sha = branch_data.commit.sha;

        let tree_resp: TreeResponse = self
            .get_json(
                &format!("{GITHUB_API}/repos/{owner}/{repo}/git/trees/{ref_sha}"),
                &[("recursive", "1")],
            )
            .await?;
        if tree_resp.truncated {
            // Over the API's entry limit; proceed with the partial listing.
            log::warn!("tree listing for {owner}/{repo} was truncated by GitHub");
        }

        let tree = tree_resp
            .tree
            .into_iter()
            .map(|entry| TreeEntry {
                path: entry.path,
                kind: if entry.kind == "blob" {
                    EntryKind::Blob
                } else {
                    EntryKind::Tree
                },
                size_bytes: entry.size.unwrap_or(0),
            })
            .collect();

        Ok(RepoSnapshot {
            owner,
            repo,
            branch,
            ref_sha,
            description: meta.description,
            language: meta.language,
            topics: meta.topics,
            tree,
            token: self.token.clone(),
        })
    }

    /// Fetch raw text content for the given paths at `ref_sha`.
    ///
    /// Silently omits paths that are missing, binary, or fail to decode;
    /// the curator treats a missing key as "contributed nothing". Rate-limit
    /// and access errors propagate immediately.
    pub async fn fetch_file_contents(
        &self,
        owner: &str,
        repo: &str,
        paths: &[String],
        ref_sha: &str,
    ) -> Result<HashMap<String, String>> {
        let mut results = HashMap::new();

        for path in paths {
            let fetched: std::result::Result<ContentsResponse, GithubError> = self
                .get_json(
                    &format!("{GITHUB_API}/repos/{owner}/{repo}/contents/{path}"),
                    &[("ref", ref_sha)],
                )
                .await;

            let data = match fetched {
                Ok(data) => data,
                Err(err @ (GithubError::RateLimited { .. } | GithubError::AccessDenied(_))) => {
                    return Err(err);
                }
                Err(err) => {
                    // File vanished, network blip, or unexpected payload;
                    // the selection simply loses this entry.
                    log::debug!("skipping content fetch for {path}: {err}");
                    continue;
                }
            };

            if data.encoding != "base64" || data.content.is_empty() {
                continue; // binary, symlink, or empty
            }
            match decode_base64_text(&data.content) {
                Some(text) => {
                    results.insert(path.clone(), text);
                }
                None => log::debug!("undecodable content for {path}"),
            }
        }

        Ok(results)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let mut request = self
            .http
            .get(url)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
            .query(query);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|err| {
            if err.is_timeout() {
                GithubError::Network(format!("request timed out while contacting {url}"))
            } else if err.is_connect() {
                GithubError::Network(format!("could not connect to GitHub API ({err})"))
            } else {
                GithubError::Network(err.to_string())
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|err| GithubError::Network(format!("invalid response body: {err}")));
        }

        Err(self.classify_status(url, response).await)
    }

    async fn classify_status(&self, url: &str, response: reqwest::Response) -> GithubError {
        let status = response.status().as_u16();
        match status {
            401 => GithubError::AccessDenied(
                "GitHub API returned 401 Unauthorized. Provide a valid token via GITHUB_TOKEN."
                    .to_string(),
            ),
            403 => {
                let remaining = header_string(&response, "x-ratelimit-remaining");
                let retry_after = header_string(&response, "retry-after");
                if remaining.as_deref() == Some("0") || retry_after.is_some() {
                    let reset_at = parse_reset_time(&response);
                    let reset_str = reset_at
                        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                        .unwrap_or_else(|| "unknown time".to_string());
                    let wait_hint = retry_after
                        .map(|s| format!(" Retry after {s}s."))
                        .unwrap_or_default();
                    GithubError::RateLimited {
                        message: format!(
                            "GitHub API rate limit exceeded. Limit resets at {reset_str}.{wait_hint} \
                             Set GITHUB_TOKEN to increase your quota."
                        ),
                        reset_at,
                    }
                } else {
                    let reason = body_message(response).await;
                    GithubError::AccessDenied(format!(
                        "access denied (403): {reason}. The repository may be private, or the \
                         token may lack the required scopes."
                    ))
                }
            }
            404 => {
                let hint = if self.token.is_none() {
                    " If this is a private repository, set GITHUB_TOKEN with 'repo' scope."
                } else {
                    ""
                };
                GithubError::NotFound(format!("{url}.{hint}"))
            }
            422 => {
                let reason = body_message(response).await;
                GithubError::Unprocessable(format!(
                    "{reason}. The repository may be empty or its Git data unavailable."
                ))
            }
            451 => GithubError::NotFound(format!("unavailable for legal reasons (451): {url}")),
            _ => {
                let message = body_message(response).await;
                GithubError::Api { status, message }
            }
        }
    }
}

fn header_string(response: &reqwest::Response, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

/// Convert the X-RateLimit-Reset unix timestamp header to a UTC datetime.
fn parse_reset_time(response: &reqwest::Response) -> Option<DateTime<Utc>> {
    let raw = header_string(response, "x-ratelimit-reset")?;
    let secs = raw.parse::<i64>().ok()?;
    Utc.timestamp_opt(secs, 0).single()
}

async fn body_message(response: reqwest::Response) -> String {
    response
        .json::<serde_json::Value>()
        .await
        .ok()
        .and_then(|body| {
            body.get("message")
                .and_then(|m| m.as_str())
                .map(|m| m.to_string())
        })
        .unwrap_or_else(|| "Forbidden".to_string())
}

/// Decode GitHub's base64 blob payload (which interleaves newlines) into
/// lossy UTF-8 text.
fn decode_base64_text(content: &str) -> Option<String> {
    let compact: Vec<u8> = content
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    let decoded = BASE64.decode(compact).ok()?;
    Some(String::from_utf8_lossy(&decoded).into_owned())
}

#[derive(Deserialize)]
struct RepoMeta {
    default_branch: String,
    description: Option<String>,
    language: Option<String>,
    #[serde(default)]
    topics: Vec<String>,
}

#[derive(Deserialize)]
struct BranchInfo {
    commit: BranchCommit,
}

#[derive(Deserialize)]
struct BranchCommit {
    sha: String,
}

#[derive(Deserialize)]
struct TreeResponse {
    #[serde(default)]
    truncated: bool,
    #[serde(default)]
    tree: Vec<RawTreeEntry>,
}

#[derive(Deserialize)]
struct RawTreeEntry {
    path: String,
    #[serde(rename = "type")]
    kind: String,
    // Absent for trees and for some blobs; the curator excludes size-zero
    // entries by policy.
    size: Option<u64>,
}

#[derive(Deserialize, Default)]
struct ContentsResponse {
    #[serde(default)]
    encoding: String,
    #[serde(default)]
    content: String,
}
