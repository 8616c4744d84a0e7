//! # Trie Module
//!
//! The route tree: a path trie mapping patterns to per-method handler sets,
//! with a backtracking search that captures parameter values.
//!
//! ## Pattern grammar
//!
//! - Literal segments (`users`) match by exact text.
//! - `:name` matches any single non-empty segment and captures it.
//! - `*name` matches one or more trailing segments joined by `/` and is
//!   always terminal.
//!
//! ## Matching
//!
//! Specificity per segment is LITERAL > PARAM > WILDCARD. A greedy descent
//! committing to the first literal match can dead-end where a parameter or
//! wildcard sibling at a shallower level would have matched the full path,
//! so a failed descent backtracks through parent references and retries the
//! first untried less-specific branch at each ancestor. At most one param
//! and one wildcard child exist per node, which keeps backtracking linear in
//! the depth already walked.
//!
//! Nodes live in an arena (`Vec` indexed by [`NodeId`]); parent references
//! are plain indices, not owning pointers. The tree is built during
//! registration and read-only afterwards: `search` takes `&self` and needs
//! no locking while serving.

mod clean;
mod core;

pub use clean::clean_path;
pub use core::{any_method, NodeId, NodeKind, RouteTrie};
