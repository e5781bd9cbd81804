use globset::{Glob, GlobMatcher};
use once_cell::sync::Lazy;

/// Lower tier = higher priority. Paths matching no rule get this tier.
pub const DEFAULT_TIER: u32 = 99;

/// Tiers strictly below this are "guaranteed" (always included if present);
/// this tier and above compete for the candidate slots.
pub const SOURCE_TIER_THRESHOLD: u32 = 5;

/// Character cap a rule assigns to the files it matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleCap {
    /// Truncate the file body to this many characters.
    Chars(usize),
    /// Drop the file entirely (lock files, minified bundles).
    Exclude,
}

/// One priority rule: a glob, the tier it assigns, and the per-file cap.
/// The table order only breaks ties between equal-tier rules; matching is
/// otherwise a fold over every rule (lowest tier wins, see `score`).
#[derive(Debug, Clone, Copy)]
pub struct PriorityRule {
    pub pattern: &'static str,
    pub tier: u32,
    pub cap: RuleCap,
}

const fn rule(pattern: &'static str, tier: u32, cap: usize) -> PriorityRule {
    PriorityRule {
        pattern,
        tier,
        cap: RuleCap::Chars(cap),
    }
}

const fn exclude(pattern: &'static str, tier: u32) -> PriorityRule {
    PriorityRule {
        pattern,
        tier,
        cap: RuleCap::Exclude,
    }
}

/// The full rule table. Patterns are matched against both the full path and
/// the final path segment.
pub const RULE_TABLE: &[PriorityRule] = &[
    // Tier 0: project overview (guaranteed)
    rule("README*", 0, 20_000),
    rule("readme*", 0, 20_000),
    // Tier 1: dependency / build manifests (guaranteed)
    rule("pyproject.toml", 1, 5_000),
    rule("setup.py", 1, 5_000),
    rule("setup.cfg", 1, 4_000),
    rule("requirements*.txt", 1, 3_000),
    rule("package.json", 1, 5_000),
    rule("go.mod", 1, 3_000),
    rule("Cargo.toml", 1, 5_000),
    rule("Gemfile", 1, 3_000),
    rule("pom.xml", 1, 5_000),
    rule("build.gradle*", 1, 5_000),
    rule("*.csproj", 1, 5_000),
    // Tier 2: container / build tooling (guaranteed)
    rule("Dockerfile", 2, 4_000),
    rule("Dockerfile.*", 2, 4_000),
    rule("docker-compose*.yml", 2, 4_000),
    rule("docker-compose*.yaml", 2, 4_000),
    rule("Makefile", 2, 4_000),
    // Tier 3: top-level config & CI (guaranteed)
    rule(".env.example", 3, 2_000),
    rule(".env.sample", 3, 2_000),
    rule(".github/workflows/*.yml", 3, 3_000),
    rule("*.toml", 3, 4_000),
    rule("*.yaml", 3, 4_000),
    rule("*.yml", 3, 4_000),
    // Tier 5: source files (cardinality-limited by `max_source_files`;
    // the depth tiebreaker in the selector means top-level files win)
    rule("*.py", 5, 10_000),
    rule("*.ts", 5, 10_000),
    rule("*.tsx", 5, 10_000),
    rule("*.js", 5, 10_000),
    rule("*.go", 5, 10_000),
    rule("*.rs", 5, 10_000),
    rule("*.java", 5, 10_000),
    rule("*.rb", 5, 10_000),
    rule("*.cs", 5, 10_000),
    rule("*.cpp", 5, 10_000),
    rule("*.c", 5, 10_000),
    rule("*.kt", 5, 10_000),
    rule("*.swift", 5, 10_000),
    // Tier 90: lock files / generated noise, dropped entirely
    exclude("package-lock.json", 90),
    exclude("yarn.lock", 90),
    exclude("Cargo.lock", 90),
    exclude("Pipfile.lock", 90),
    exclude("poetry.lock", 90),
    exclude("go.sum", 90),
    exclude("*.lock", 90),
    exclude("*.min.js", 90),
    exclude("*.min.css", 90),
];

pub(crate) struct CompiledRule {
    matcher: GlobMatcher,
    pub tier: u32,
    pub cap: RuleCap,
}

impl CompiledRule {
    pub fn matches(&self, path: &str, basename: &str) -> bool {
        self.matcher.is_match(path) || self.matcher.is_match(basename)
    }
}

/// Compiled once at startup and read-only afterwards. A malformed pattern is
/// a programming error in the table above, so compilation failure panics
/// immediately rather than being handled per file.
pub(crate) static PRIORITY_RULES: Lazy<Vec<CompiledRule>> = Lazy::new(|| {
    RULE_TABLE
        .iter()
        .map(|rule| CompiledRule {
            matcher: Glob::new(rule.pattern)
                .unwrap_or_else(|err| {
                    panic!("invalid priority rule pattern '{}': {err}", rule.pattern)
                })
                .compile_matcher(),
            tier: rule.tier,
            cap: rule.cap,
        })
        .collect()
});
