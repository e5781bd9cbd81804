use crate::classify::basename;
use crate::config::FILE_CAP;
use crate::rules::{RuleCap, DEFAULT_TIER, PRIORITY_RULES};

/// Resolved priority of a single path: its tier and the cap that the
/// winning rule assigns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileScore {
    pub tier: u32,
    pub cap: RuleCap,
}

/// Score a path against the full rule table.
///
/// This is deliberately a fold over every rule, not a first-match scan: the
/// rule with the lowest tier among all matches (on the full path or on the
/// final segment) wins and its cap applies. Ties between equal-tier rules
/// resolve to the first such rule in table order. Unmatched paths get the
/// default tier and cap.
pub fn score(path: &str) -> FileScore {
    let name = basename(path);
    let mut best = FileScore {
        tier: DEFAULT_TIER,
        cap: RuleCap::Chars(FILE_CAP),
    };

    for rule in PRIORITY_RULES.iter() {
        if rule.tier < best.tier && rule.matches(path, name) {
            best = FileScore {
                tier: rule.tier,
                cap: rule.cap,
            };
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn readme_wins_tier_zero() {
        assert_eq!(
            score("README.md"),
            FileScore {
                tier: 0,
                cap: RuleCap::Chars(20_000)
            }
        );
    }

    #[test]
    fn lowest_tier_wins_over_later_broad_rules() {
        // Cargo.toml matches both the tier-1 manifest rule and the tier-3
        // "*.toml" rule; the tier-1 cap must apply.
        assert_eq!(
            score("Cargo.toml"),
            FileScore {
                tier: 1,
                cap: RuleCap::Chars(5_000)
            }
        );
    }

    #[test]
    fn lowest_tier_wins_regardless_of_table_position() {
        // "*.min.js" sits in the exclude tier but "*.js" scores lower;
        // rule scoring alone keeps it (the binary-extension check is what
        // actually drops minified bundles).
        assert_eq!(
            score("dist/bundle.min.js"),
            FileScore {
                tier: 5,
                cap: RuleCap::Chars(10_000)
            }
        );
    }

    #[test]
    fn lock_files_resolve_to_exclude() {
        assert_eq!(score("package-lock.json").cap, RuleCap::Exclude);
        assert_eq!(score("poetry.lock").cap, RuleCap::Exclude);
    }

    #[test]
    fn unmatched_path_gets_defaults() {
        assert_eq!(
            score("LICENSE"),
            FileScore {
                tier: DEFAULT_TIER,
                cap: RuleCap::Chars(FILE_CAP)
            }
        );
    }

    #[test]
    fn nested_source_files_match_on_basename() {
        assert_eq!(score("src/deep/module.py").tier, 5);
        assert_eq!(score(".github/workflows/ci.yml").tier, 3);
    }
}
