use crate::classify::{basename, is_binary, is_excluded_dir};
use crate::config::TREE_CAP;
use crate::truncate::truncate_to_chars;
use crate::types::TreeEntry;

/// Render the file tree as an indented listing, capped at [`TREE_CAP`]
/// characters.
///
/// Independent of scoring: every blob passing only the excluded-directory
/// and binary checks appears, so the tree is a structural map of the repo
/// and intentionally shows more than gets fetched (generated files and
/// oversized blobs included).
pub fn render_tree(entries: &[TreeEntry]) -> String {
    let mut lines = vec!["<directory_tree>".to_string()];
    for entry in entries {
        if entry.is_blob() && !is_excluded_dir(&entry.path) && !is_binary(&entry.path) {
            let indent = "  ".repeat(entry.depth());
            lines.push(format!("{indent}{}", basename(&entry.path)));
        }
    }
    lines.push("</directory_tree>".to_string());

    let rendered = lines.join("\n");
    if rendered.chars().count() > TREE_CAP {
        let mut cut = truncate_to_chars(&rendered, TREE_CAP).to_string();
        cut.push_str("\n… (tree truncated)");
        cut
    } else {
        rendered
    }
}
