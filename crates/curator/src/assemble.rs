use std::collections::HashMap;

use crate::config::CuratorConfig;
use crate::select::ScoredFile;
use crate::tree::render_tree;
use crate::truncate::truncate_to_chars;
use crate::types::RepoSnapshot;

/// What happened to one selected path during assembly. Production output
/// does not distinguish these; tests and logs do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    /// Block emitted in full; `chars` is the whole block including delimiters.
    Included { chars: usize },
    /// Block emitted but the body was cut at this effective cap.
    Truncated { cap: usize },
    /// The fetch collaborator returned no content for this path.
    MissingContent,
    /// The running total had already met the budget.
    BudgetExhausted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathOutcome {
    pub path: String,
    pub outcome: FileOutcome,
}

/// The assembled context artifact plus per-path diagnostics.
#[derive(Debug, Clone)]
pub struct ContextArtifact {
    pub text: String,
    pub outcomes: Vec<PathOutcome>,
}

/// Assemble the final context: repo header, rendered tree, then file blocks
/// in selection order, never exceeding the total character budget.
///
/// A pure fold over its inputs: no retries, no I/O. The header and tree are
/// always included and counted against the budget; a path missing from
/// `contents` consumes nothing; each emitted body is capped at the minimum
/// of its own cap and the remaining budget.
pub fn assemble(
    snapshot: &RepoSnapshot,
    selection: &[ScoredFile],
    contents: &HashMap<String, String>,
    config: &CuratorConfig,
) -> ContextArtifact {
    let budget = config.total_char_budget;
    let mut sections: Vec<String> = Vec::new();
    let mut outcomes: Vec<PathOutcome> = Vec::new();
    let mut chars_used = 0usize;

    // 1. Repo header
    let header = render_header(snapshot);
    chars_used += header.chars().count();
    sections.push(header);

    // 2. Directory tree
    let tree = render_tree(&snapshot.tree);
    chars_used += tree.chars().count();
    sections.push(tree);

    // 3. File contents in priority order
    let mut files = selection.iter();
    for scored in files.by_ref() {
        if chars_used >= budget {
            outcomes.push(exhausted(scored));
            break;
        }

        let content = match contents.get(&scored.path) {
            Some(content) if !content.is_empty() => content,
            _ => {
                outcomes.push(PathOutcome {
                    path: scored.path.clone(),
                    outcome: FileOutcome::MissingContent,
                });
                continue;
            }
        };

        let remaining = budget - chars_used;
        let effective_cap = scored.char_cap.min(remaining);
        if effective_cap == 0 {
            outcomes.push(exhausted(scored));
            break;
        }

        let content_chars = content.chars().count();
        let (body, outcome) = if content_chars > effective_cap {
            let mut cut = truncate_to_chars(content, effective_cap).to_string();
            cut.push_str(&format!(
                "\n… (file truncated at {effective_cap} chars: {})",
                scored.path
            ));
            (cut, FileOutcome::Truncated { cap: effective_cap })
        } else {
            (content.clone(), FileOutcome::Included { chars: 0 })
        };

        let block = format!("<file path=\"{}\">\n{body}\n</file>", scored.path);
        let block_chars = block.chars().count();
        chars_used += block_chars;
        sections.push(block);
        outcomes.push(PathOutcome {
            path: scored.path.clone(),
            outcome: match outcome {
                FileOutcome::Included { .. } => FileOutcome::Included { chars: block_chars },
                other => other,
            },
        });
    }

    // Entries after a budget stop are dropped silently in the artifact but
    // still tagged for diagnostics.
    outcomes.extend(files.map(exhausted));

    ContextArtifact {
        text: sections.join("\n\n"),
        outcomes,
    }
}

fn exhausted(scored: &ScoredFile) -> PathOutcome {
    PathOutcome {
        path: scored.path.clone(),
        outcome: FileOutcome::BudgetExhausted,
    }
}

fn render_header(snapshot: &RepoSnapshot) -> String {
    let mut lines = vec![
        format!("Repository: {}/{}", snapshot.owner, snapshot.repo),
        format!("Default branch: {}", snapshot.branch),
    ];
    if let Some(description) = non_empty(snapshot.description.as_deref()) {
        lines.push(format!("Description: {description}"));
    }
    if let Some(language) = non_empty(snapshot.language.as_deref()) {
        lines.push(format!("Primary language: {language}"));
    }
    if !snapshot.topics.is_empty() {
        lines.push(format!("Topics: {}", snapshot.topics.join(", ")));
    }
    format!("<repo_info>\n{}\n</repo_info>", lines.join("\n"))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
