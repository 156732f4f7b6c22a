//! Reachability query (`find_leaves`).
//!
//! Answers "which dial strings can a caller with this visibility reach, down
//! to this depth, limited to these pattern kinds". Built on [`DaTree::walk`]:
//!
//! ```text
//! node ── kinds ∩ node.kinds = ∅ ? ──────────────▶ skip (no yield, no descent)
//!      ── visibility ∩ node.partitions = ∅ ? ────▶ skip
//!      ── depth = max | terminal | kinds = stop ─▶ yield (node, dial string)
//!      ── depth = max | kinds = stop ────────────▶ stop descending
//!      └─ otherwise descend into visible children
//! ```

use super::traversal::Descend;
use super::tree::{DaTree, NodeId};
use crate::pattern::PatternKinds;
use crate::visibility::Visibility;

/// Parameters for [`DaTree::find_leaves`].
#[derive(Debug, Clone)]
pub struct LeafQuery {
    pub max_depth: usize,
    /// Partitions the caller may use; `None` means every partition in the trie.
    pub visibility: Option<Visibility>,
    /// Kinds of interest.
    pub kinds: PatternKinds,
    /// A subtree holding exactly these kinds is not descended into.
    pub stop_kinds: PatternKinds,
}

impl LeafQuery {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth, visibility: None, kinds: PatternKinds::all(), stop_kinds: PatternKinds::DN }
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }

    pub fn kinds(mut self, kinds: PatternKinds) -> Self {
        self.kinds = kinds;
        self
    }

    pub fn stop_kinds(mut self, stop_kinds: PatternKinds) -> Self {
        self.stop_kinds = stop_kinds;
        self
    }
}

/// A node reported by [`DaTree::find_leaves`] and the dial string reaching it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
    pub node: NodeId,
    pub dial_string: String,
}

impl DaTree {
    /// Breadth-first reachability query; see the module docs for the rules.
    pub fn find_leaves(&self, query: &LeafQuery) -> Vec<Leaf> {
        let everything;
        let visibility = match &query.visibility {
            Some(visibility) => visibility,
            None => {
                everything = Visibility::from_partitions(self.root().partitions.iter().cloned());
                &everything
            }
        };
        log::debug!(
            target: "dialwise::traversal",
            "find_leaves: depth {} partitions {} kinds {} stop {}",
            query.max_depth,
            visibility,
            query.kinds,
            query.stop_kinds
        );

        let mut leaves = Vec::new();
        self.walk(
            String::new(),
            |child, dial_string: &String| format!("{dial_string}{}", child.representation),
            |id, dial_string| {
                let node = self.node(id);
                if !node.pattern_types.intersects(query.kinds) {
                    log::trace!(target: "dialwise::traversal", "{node}: no matching pattern kinds, skip");
                    return Descend::Stop;
                }
                if !visibility.intersects(&node.partitions) {
                    log::trace!(target: "dialwise::traversal", "{node}: no visible partitions, skip");
                    return Descend::Stop;
                }

                let at_max_depth = node.depth == query.max_depth;
                let only_stop_kinds = node.pattern_types == query.stop_kinds;
                if at_max_depth || only_stop_kinds || node.is_terminal() {
                    log::trace!(target: "dialwise::traversal", "{node}: yield {dial_string}");
                    leaves.push(Leaf { node: id, dial_string: dial_string.clone() });
                }
                if at_max_depth || only_stop_kinds {
                    return Descend::Stop;
                }
                Descend::Only(
                    node.child_nodes()
                        .into_iter()
                        .filter(|child| visibility.intersects(&self.node(*child).partitions))
                        .collect(),
                )
            },
        );
        log::debug!(target: "dialwise::traversal", "find_leaves: {} leaves", leaves.len());
        leaves
    }
}
