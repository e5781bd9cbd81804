use std::collections::HashMap;

use pretty_assertions::assert_eq;
use repolens_curator::{assemble, select, CuratorConfig, RepoSnapshot, TreeEntry};

fn snapshot(tree: Vec<TreeEntry>) -> RepoSnapshot {
    RepoSnapshot {
        owner: "octo".to_string(),
        repo: "demo".to_string(),
        branch: "main".to_string(),
        ref_sha: "deadbeef".to_string(),
        description: Some("Example project".to_string()),
        language: Some("Python".to_string()),
        topics: vec![],
        tree,
        token: None,
    }
}

#[test]
fn mixed_tree_keeps_signal_and_drops_noise() {
    let tree = vec![
        TreeEntry::blob("README.md", 1_200),
        TreeEntry::blob("src/main.py", 3_000),
        TreeEntry::blob("node_modules/pkg/index.js", 500),
        TreeEntry::blob("dist/bundle.min.js", 9_000),
        TreeEntry::blob("package-lock.json", 50_000),
    ];
    let config = CuratorConfig::default();
    let snap = snapshot(tree);

    let selection = select(&snap.tree, &config);
    let mut contents = HashMap::new();
    contents.insert("README.md".to_string(), "# Demo project".to_string());
    contents.insert("src/main.py".to_string(), "print('hello')".to_string());

    let artifact = assemble(&snap, &selection, &contents, &config);

    let readme = artifact.text.find("<file path=\"README.md\">").unwrap();
    let main = artifact.text.find("<file path=\"src/main.py\">").unwrap();
    assert!(readme < main);
    assert!(!artifact.text.contains("<file path=\"node_modules"));
    assert!(!artifact.text.contains("<file path=\"dist/bundle.min.js\">"));
    assert!(!artifact.text.contains("<file path=\"package-lock.json\">"));
}

#[test]
fn seven_equal_source_files_yield_six_blocks() {
    let tree: Vec<TreeEntry> = (0..7)
        .map(|i| TreeEntry::blob(format!("file{i}.py"), 1_000))
        .collect();
    let config = CuratorConfig::default();
    let snap = snapshot(tree);

    let selection = select(&snap.tree, &config);
    assert_eq!(selection.len(), 6);

    let contents: HashMap<String, String> = (0..7)
        .map(|i| (format!("file{i}.py"), format!("print({i})")))
        .collect();
    let artifact = assemble(&snap, &selection, &contents, &config);
    assert_eq!(artifact.text.matches("<file path=").count(), 6);
    assert!(!artifact.text.contains("<file path=\"file6.py\">"));
}

#[test]
fn selected_but_unfetched_path_is_free() {
    let tree = vec![
        TreeEntry::blob("README.md", 500),
        TreeEntry::blob("app.py", 500),
    ];
    let config = CuratorConfig::default();
    let snap = snapshot(tree);
    let selection = select(&snap.tree, &config);

    let mut contents = HashMap::new();
    contents.insert("app.py".to_string(), "run()".to_string());

    let artifact = assemble(&snap, &selection, &contents, &config);
    assert!(!artifact.text.contains("<file path=\"README.md\">"));
    assert!(artifact.text.contains("<file path=\"app.py\">\nrun()\n</file>"));

    // The skipped path must not have eaten budget: the emitted text matches
    // what a run without the unfetched file produces, section for section.
    let only_app = select(
        &[TreeEntry::blob("app.py", 500)],
        &config,
    );
    let snap_app = snapshot(vec![TreeEntry::blob("app.py", 500)]);
    let direct = assemble(&snap_app, &only_app, &contents, &config);
    assert_eq!(
        artifact.text.split("\n\n").last(),
        direct.text.split("\n\n").last()
    );
}

#[test]
fn output_length_never_exceeds_bound() {
    // Many large files against a small budget: total length stays within
    // header + tree cap + budget + one block's delimiter overhead.
    let tree: Vec<TreeEntry> = (0..50)
        .map(|i| TreeEntry::blob(format!("module_with_a_long_name_{i}.py"), 5_000))
        .collect();
    let config = CuratorConfig {
        total_char_budget: 2_000,
        ..CuratorConfig::default()
    };
    let snap = snapshot(tree);
    let selection = select(&snap.tree, &config);
    let contents: HashMap<String, String> = selection
        .iter()
        .map(|f| (f.path.clone(), "z".repeat(5_000)))
        .collect();

    let artifact = assemble(&snap, &selection, &contents, &config);

    let empty = assemble(&snap, &[], &HashMap::new(), &config);
    let header_and_tree = empty.text.chars().count();
    // One unclipped delimiter set plus the truncation marker and the
    // inter-section separators bound the overshoot.
    let overhead = 256;
    assert!(

        artifact.text.chars().count()
            <= header_and_tree + config.total_char_budget + overhead,
        "artifact length {} exceeds bound",
        artifact.text.chars().count()
    );
}

#[test]
fn entirely_vendored_repo_yields_header_and_tree_only() {
    let tree = vec![
        TreeEntry::blob("node_modules/a/index.js", 100),
        TreeEntry::blob("dist/app.js", 100),
    ];
    let config = CuratorConfig::default();
    let snap = snapshot(tree);

    let selection = select(&snap.tree, &config);
    assert!(selection.is_empty());

    let artifact = assemble(&snap, &selection, &HashMap::new(), &config);
    assert!(artifact.text.starts_with("<repo_info>"));
    assert!(artifact.text.ends_with("</directory_tree>"));
    assert!(!artifact.text.contains("<file path="));
}

#[test]
fn repeated_runs_are_byte_identical() {
    let tree = vec![
        TreeEntry::blob("README.md", 400),
        TreeEntry::blob("Cargo.toml", 300),
        TreeEntry::blob("src/lib.rs", 2_000),
        TreeEntry::blob("src/bin/tool.rs", 1_500),
    ];
    let config = CuratorConfig::default();
    let snap = snapshot(tree);
    let contents: HashMap<String, String> = snap
        .tree
        .iter()
        .map(|e| (e.path.clone(), format!("// {}", e.path)))
        .collect();

    let first = {
        let selection = select(&snap.tree, &config);
        assemble(&snap, &selection, &contents, &config)
    };
    let second = {
        let selection = select(&snap.tree, &config);
        assemble(&snap, &selection, &contents, &config)
    };
    assert_eq!(first.text, second.text);
}
