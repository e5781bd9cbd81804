//! Budget-aware curation of a repository's textual context.
//!
//! Given the flat file listing of a repository (paths, kinds, byte sizes),
//! this crate decides which files are worth including, how much of each to
//! include, and in what order, subject to a hard global character budget:
//!
//! - [`classify`] drops categorical noise (vendored dirs, binaries,
//!   generated artifacts, empty and oversized blobs);
//! - [`score`] maps surviving paths to a priority tier and per-file cap via
//!   an ordered glob rule table ([`rules`]);
//! - [`select`] orders guaranteed files ahead of count-capped candidates;
//! - [`render_tree`] produces a capped structural map of the repo;
//! - [`assemble`] folds externally fetched contents into a single artifact
//!   that never exceeds the budget.
//!
//! Everything here is pure and synchronous: no I/O, no model calls, no state
//! across invocations. The same snapshot and rule table always produce
//! byte-identical output. Fetching trees and file contents is the job of the
//! collaborator crates.

pub mod assemble;
pub mod classify;
pub mod config;
pub mod rules;
pub mod score;
pub mod select;
pub mod tree;
mod truncate;
pub mod types;

pub use assemble::{assemble, ContextArtifact, FileOutcome, PathOutcome};
pub use config::{CuratorConfig, FILE_CAP, TREE_CAP};
pub use rules::{RuleCap, DEFAULT_TIER, SOURCE_TIER_THRESHOLD};
pub use score::{score, FileScore};
pub use select::{select, ScoredFile};
pub use tree::render_tree;
pub use types::{EntryKind, RepoSnapshot, TreeEntry};
