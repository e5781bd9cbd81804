use crate::classify;
use crate::config::CuratorConfig;
use crate::rules::{RuleCap, SOURCE_TIER_THRESHOLD};
use crate::score::score;
use crate::types::TreeEntry;

/// A classifier-surviving file with its resolved priority, ready for
/// fetching and assembly. Ephemeral: produced and consumed within one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredFile {
    pub path: String,
    pub tier: u32,
    pub depth: usize,
    pub char_cap: usize,
}

/// Score all tree entries and return the final selection order.
///
/// Guaranteed files (tiers below the source threshold) are all included if
/// present. Candidates (threshold and above) are sorted the same way and
/// cut to `max_source_files`. Both groups sort by `(tier, depth)` so that
/// shallower paths outrank nested ones of identical classification; the
/// stable sort breaks remaining ties by tree order.
///
/// An empty or entirely-vendored tree yields an empty selection.
pub fn select(entries: &[TreeEntry], config: &CuratorConfig) -> Vec<ScoredFile> {
    let mut guaranteed: Vec<ScoredFile> = Vec::new();
    let mut candidates: Vec<ScoredFile> = Vec::new();

    for entry in entries {
        if classify::is_excluded(entry, config) {
            continue;
        }

        let scored = score(&entry.path);
        let char_cap = match scored.cap {
            RuleCap::Chars(cap) => cap,
            // lock files / generated noise
            RuleCap::Exclude => continue,
        };

        let file = ScoredFile {
            path: entry.path.clone(),
            tier: scored.tier,
            depth: entry.depth(),
            char_cap,
        };

        if scored.tier < SOURCE_TIER_THRESHOLD {
            guaranteed.push(file);
        } else {
            candidates.push(file);
        }
    }

    guaranteed.sort_by_key(|file| (file.tier, file.depth));
    candidates.sort_by_key(|file| (file.tier, file.depth));
    candidates.truncate(config.max_source_files);

    guaranteed.extend(candidates);
    guaranteed
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn paths(selection: &[ScoredFile]) -> Vec<&str> {
        selection.iter().map(|f| f.path.as_str()).collect()
    }

    #[test]
    fn orders_by_tier_then_depth() {
        let entries = vec![
            TreeEntry::blob("src/app/util.py", 900),
            TreeEntry::blob("main.py", 700),
            TreeEntry::blob("Cargo.toml", 400),
            TreeEntry::blob("README.md", 1_200),
        ];
        let selection = select(&entries, &CuratorConfig::default());
        assert_eq!(
            paths(&selection),
            vec!["README.md", "Cargo.toml", "main.py", "src/app/util.py"]
        );
    }

    #[test]
    fn guaranteed_files_never_count_limited() {
        let entries: Vec<TreeEntry> = (0..10)
            .map(|i| TreeEntry::blob(format!("conf{i}.toml"), 100))
            .collect();
        let config = CuratorConfig {
            max_source_files: 2,
            ..CuratorConfig::default()
        };
        assert_eq!(select(&entries, &config).len(), 10);
    }

    #[test]
    fn candidates_cut_to_max_source_files() {
        let entries: Vec<TreeEntry> = (0..7)
            .map(|i| TreeEntry::blob(format!("mod{i}.py"), 100))
            .collect();
        let selection = select(&entries, &CuratorConfig::default());
        assert_eq!(selection.len(), 6);
        // Stable sort: tree order decides among equal (tier, depth).
        assert_eq!(selection[0].path, "mod0.py");
        assert!(selection.iter().all(|f| f.path != "mod6.py"));
    }

    #[test]
    fn shallow_candidates_beat_nested_ones() {
        let entries = vec![
            TreeEntry::blob("pkg/a/b/c/deep.py", 100),
            TreeEntry::blob("app.py", 100),
        ];
        let selection = select(&entries, &CuratorConfig::default());
        assert_eq!(paths(&selection), vec!["app.py", "pkg/a/b/c/deep.py"]);
    }

    #[test]
    fn excluded_and_rule_dropped_entries_vanish() {
        let entries = vec![
            TreeEntry::blob("node_modules/pkg/index.js", 500),
            TreeEntry::blob("package-lock.json", 50_000),
            TreeEntry::blob("logo.png", 4_000),
            TreeEntry::blob("main.py", 3_000),
        ];
        let selection = select(&entries, &CuratorConfig::default());
        assert_eq!(paths(&selection), vec!["main.py"]);
    }

    #[test]
    fn empty_tree_selects_nothing() {
        assert!(select(&[], &CuratorConfig::default()).is_empty());
    }
}
