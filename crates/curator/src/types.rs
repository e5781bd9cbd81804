use serde::{Deserialize, Serialize};

/// Kind of an entry in a recursive git tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// A file leaf ("blob" in the tree API).
    Blob,
    /// A directory ("tree").
    Tree,
}

/// One entry of a flat recursive repository tree. Paths encode hierarchy
/// via `/` separators; entries carry no parent pointers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    pub path: String,
    pub kind: EntryKind,
    /// Byte size as reported by the tree API. Zero for directories and for
    /// blobs whose size was not reported; the classifier treats both as
    /// "skip".
    #[serde(default)]
    pub size_bytes: u64,
}

impl TreeEntry {
    pub fn blob(path: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Blob,
            size_bytes,
        }
    }

    pub fn is_blob(&self) -> bool {
        self.kind == EntryKind::Blob
    }

    /// Number of path separators; shallower entries outrank nested ones
    /// within a tier.
    pub fn depth(&self) -> usize {
        self.path.matches('/').count()
    }
}

/// Repository metadata plus the full recursive tree, as produced by the
/// metadata collaborator. Consumed read-only by one curation run.
#[derive(Debug, Clone)]
pub struct RepoSnapshot {
    pub owner: String,
    pub repo: String,
    /// Default branch name (e.g. "main").
    pub branch: String,
    /// Head SHA of the default branch; used for content fetches.
    pub ref_sha: String,
    pub description: Option<String>,
    pub language: Option<String>,
    pub topics: Vec<String>,
    pub tree: Vec<TreeEntry>,
    /// Opaque token, passed through to the content-fetch collaborator.
    pub token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn depth_counts_separators() {
        assert_eq!(TreeEntry::blob("README.md", 10).depth(), 0);
        assert_eq!(TreeEntry::blob("src/app/main.py", 10).depth(), 2);
    }
}
