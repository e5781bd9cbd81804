/// Per-file truncation cap applied when the matching rule does not set one.
pub const FILE_CAP: usize = 15_000;

/// Cap on the rendered directory tree. Independent of and smaller than the
/// total budget so the tree never crowds out file content.
pub const TREE_CAP: usize = 6_000;

/// Tunables for one curation run. All lengths are counted in characters,
/// not bytes.
#[derive(Debug, Clone)]
pub struct CuratorConfig {
    /// Global character budget for the assembled context. Roughly 80k chars
    /// at ~4 chars/token leaves headroom for the prompt itself.
    pub total_char_budget: usize,

    /// Blobs larger than this many bytes are never fetched; they are almost
    /// always generated, vendored, or binary-adjacent.
    pub max_blob_bytes: u64,

    /// Maximum number of source-tier ("candidate") files selected across all
    /// source extensions combined.
    pub max_source_files: usize,
}

impl Default for CuratorConfig {
    fn default() -> Self {
        Self {
            total_char_budget: 80_000,
            max_blob_bytes: 200_000,
            max_source_files: 6,
        }
    }
}

impl CuratorConfig {
    /// Environment-style overrides; blank or unparsable values fall back to
    /// the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            total_char_budget: parse_env("CONTEXT_CHAR_BUDGET", defaults.total_char_budget),
            max_blob_bytes: parse_env("MAX_BLOB_BYTES", defaults.max_blob_bytes),
            max_source_files: parse_env("MAX_SOURCE_FILES", defaults.max_source_files),
        }
    }
}

fn parse_env<T: std::str::FromStr + Copy>(key: &str, default_value: T) -> T {
    std::env::var(key)
        .ok()
        .as_deref()
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default_value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults() {
        let config = CuratorConfig::default();
        assert_eq!(config.total_char_budget, 80_000);
        assert_eq!(config.max_blob_bytes, 200_000);
        assert_eq!(config.max_source_files, 6);
    }
}
