use globset::{Glob, GlobSet, GlobSetBuilder};
use once_cell::sync::Lazy;

use crate::config::CuratorConfig;
use crate::types::TreeEntry;

/// Directory names (with trailing separator) excluded wherever they appear:
/// as the leading segment or as an interior segment bounded by separators.
const EXCLUDED_DIRS: &[&str] = &[
    // package managers / vendored deps
    "node_modules/",
    "vendor/",
    "third_party/",
    "third-party/",
    "extern/",
    "externals/",
    "bower_components/",
    // VCS
    ".git/",
    ".svn/",
    ".hg/",
    // build / dist output
    "dist/",
    "build/",
    "out/",
    "target/",
    ".next/",
    ".nuxt/",
    ".output/",
    "storybook-static/",
    "public/build/",
    // Python env / cache
    ".venv/",
    "venv/",
    "env/",
    "__pycache__/",
    ".pytest_cache/",
    ".mypy_cache/",
    ".ruff_cache/",
    ".tox/",
    "site-packages/",
    "htmlcov/",
    ".nyc_output/",
    "coverage/",
    // test snapshots & fixtures
    "__snapshots__/",
    "__mocks__/",
    "testdata/",
    "test_data/",
    "fixtures/data/",
    "spec/fixtures/",
    // misc generated / IDE
    ".idea/",
    ".vscode/",
    ".eggs/",
];

/// Extension suffixes that are definitively binary / non-informative.
/// Compared case-insensitively against the end of the path, so multi-dot
/// suffixes like `.min.js` work.
const BINARY_EXTENSIONS: &[&str] = &[
    // images
    ".png", ".jpg", ".jpeg", ".gif", ".bmp", ".ico", ".webp", ".tiff",
    // vector / fonts
    ".svg", ".woff", ".woff2", ".ttf", ".eot", ".otf",
    // documents
    ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx",
    // archives
    ".zip", ".tar", ".gz", ".tgz", ".bz2", ".xz", ".7z", ".rar", ".zst",
    // compiled / native
    ".exe", ".dll", ".so", ".dylib", ".a", ".o", ".wasm",
    // bytecode / JVM
    ".pyc", ".pyo", ".class", ".jar", ".war", ".ear",
    // databases
    ".db", ".sqlite", ".sqlite3",
    // media
    ".mp3", ".mp4", ".wav", ".avi", ".mov", ".webm", ".ogg",
    // generated web artifacts
    ".min.js", ".min.css", ".map",
    // data dumps
    ".parquet", ".pickle", ".pkl", ".npy", ".npz", ".h5", ".hdf5",
    // protobuf definitions are text but rarely explain the project
    ".proto",
];

/// Globs for generated / snapshot files excluded regardless of extension.
/// Matched against the full path and the final segment.
const GENERATED_PATTERNS: &[&str] = &[
    // test snapshots
    "*.snap",
    "*.snapshot",
    // protobuf / gRPC generated
    "*.pb.go",
    "*_grpc.pb.go",
    "*_pb2.py",
    "*_pb2_grpc.py",
    "*.pb.ts",
    "*.pb.js",
    // OpenAPI / GraphQL generated
    "*.generated.ts",
    "*.generated.js",
    "*_generated.go",
    "*generated*.go",
    // auto-generated migrations
    "**/migrations/[0-9]*.py",
    // bundler output left in source
    "*.bundle.js",
    "*.chunk.js",
];

static GENERATED_SET: Lazy<GlobSet> = Lazy::new(|| {
    let mut builder = GlobSetBuilder::new();
    for pattern in GENERATED_PATTERNS {
        builder.add(
            Glob::new(pattern)
                .unwrap_or_else(|err| panic!("invalid generated pattern '{pattern}': {err}")),
        );
    }
    builder
        .build()
        .expect("generated pattern set builds from valid globs")
});

pub fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// True if the path lives under an excluded directory.
pub fn is_excluded_dir(path: &str) -> bool {
    EXCLUDED_DIRS.iter().any(|prefix| {
        path.match_indices(prefix)
            .any(|(pos, _)| pos == 0 || path.as_bytes()[pos - 1] == b'/')
    })
}

/// True if the path ends with a known binary / non-text suffix.
pub fn is_binary(path: &str) -> bool {
    let lower = path.to_lowercase();
    BINARY_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// True if the path matches a known generated-file pattern.
pub fn is_generated(path: &str) -> bool {
    GENERATED_SET.is_match(path) || GENERATED_SET.is_match(basename(path))
}

/// Pure exclusion predicate over one tree entry: categorically excluded
/// paths, directories, empty blobs, and oversized blobs all fail.
///
/// Note: a blob whose size the tree API did not report defaults to zero and
/// is excluded like a genuinely empty file. This conflation is a deliberate
/// policy, not an accident.
pub fn is_excluded(entry: &TreeEntry, config: &CuratorConfig) -> bool {
    if !entry.is_blob() {
        return true;
    }
    if is_excluded_dir(&entry.path) || is_binary(&entry.path) || is_generated(&entry.path) {
        return true;
    }
    entry.size_bytes == 0 || entry.size_bytes > config.max_blob_bytes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EntryKind;

    #[test]
    fn excluded_dir_leading_and_interior() {
        assert!(is_excluded_dir("node_modules/pkg/index.js"));
        assert!(is_excluded_dir("web/node_modules/pkg/index.js"));
        assert!(is_excluded_dir("a/b/__pycache__/mod.cpython-311.pyc"));
        assert!(!is_excluded_dir("src/distance.py"));
        assert!(!is_excluded_dir("my_node_modules_doc.md"));
    }

    #[test]
    fn binary_extensions_case_insensitive() {
        assert!(is_binary("logo.PNG"));
        assert!(is_binary("app/bundle.min.js"));
        assert!(is_binary("api/schema.proto"));
        assert!(!is_binary("src/main.py"));
    }

    #[test]
    fn generated_patterns_match_path_or_basename() {
        assert!(is_generated("src/api_pb2.py"));
        assert!(is_generated("internal/service.pb.go"));
        assert!(is_generated("app/migrations/0001_initial.py"));
        assert!(is_generated("ui/__tests__/button.test.tsx.snap"));
        assert!(!is_generated("app/models.py"));
    }

    #[test]
    fn directories_and_empty_or_oversized_blobs_excluded() {
        let config = CuratorConfig::default();
        let dir = TreeEntry {
            path: "src".to_string(),
            kind: EntryKind::Tree,
            size_bytes: 0,
        };
        assert!(is_excluded(&dir, &config));
        assert!(is_excluded(&TreeEntry::blob("empty.py", 0), &config));
        assert!(is_excluded(&TreeEntry::blob("huge.py", 300_000), &config));
        assert!(!is_excluded(&TreeEntry::blob("main.py", 3_000), &config));
    }
}
