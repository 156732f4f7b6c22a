//! Digit-analysis engine.
//!
//! This module is the home of the pattern trie and everything that queries
//! it. The code is split into focused submodules under `src/engine/` while
//! the public paths stay flat (`crate::engine::DaTree`,
//! `crate::engine::LeafQuery`, ...).
//!
//! ## How the parts work together
//!
//! ```text
//! Vec<Pattern> ── DaTree::insert ─────────────┐        (tree.rs)
//!                  - parse digit classes      │
//!                  - fan out into branches    │
//!                  - aggregate partitions     │
//!                                             v
//!                                   DaTree (read-only)
//!                                    │              │
//!            DaTree::walk (traversal.rs)      DaTree::matching_nodes (matcher.rs)
//!                    │                              │
//!       DaTree::find_leaves (leaves.rs)       DaTree::lookup
//!         Vec<Leaf>                             - best priority
//!                                               - partition tie-break
//!                                               - translate + look up again
//!                                                   │
//!                                                   v
//!                                             LookupResult
//! ```
//!
//! ## Responsibilities by module
//!
//! - `tree.rs`: the arena (`DaNode`, `NodeId`, `PatternId`) and insertion.
//! - `traversal.rs`: breadth-first walker with caller-driven descent.
//! - `leaves.rs`: bounded reachability query over the walker.
//! - `matcher.rs`: specificity scoring, lookup and the translation driver.
//! - `metrics.rs`: counts and timings for batch builds.
//! - `pretty.rs`: indented text dump of a trie.
//!
//! ## Public surface
//!
//! Most code interacts with the engine via:
//!
//! - [`DaTree`] (`insert`, `lookup`, `find_leaves`, `pretty`)
//! - [`LeafQuery`]
//! - [`LookupResult`]
//!
//! ## Debugging
//!
//! Set `RUST_LOG=dialwise::match=trace` (or `dialwise::traversal`,
//! `dialwise::build`) to follow the walks node by node.

#[path = "engine/leaves.rs"]
mod leaves;
#[path = "engine/matcher.rs"]
mod matcher;
#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/pretty.rs"]
mod pretty;
#[path = "engine/traversal.rs"]
mod traversal;
#[path = "engine/tree.rs"]
mod tree;


pub use leaves::{Leaf, LeafQuery};
pub use matcher::{LookupResult, NodeMatch, TranslationFailure, TranslationHop};
pub use metrics::{BuildMetrics, KindMetrics, SkippedPattern};
pub use traversal::{BreadthFirst, Descend};
pub use tree::{DaNode, DaTree, NodeId, PatternId};
