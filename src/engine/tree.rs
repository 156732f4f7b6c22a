//! The digit-analysis trie.
//!
//! Nodes live in an arena (`Vec<DaNode>`) and refer to each other by
//! [`NodeId`]. A node represents one digit class at one depth; it is created
//! once by its parent and registered under *every* digit of its class, so
//! `children` maps a digit to a list of nodes:
//!
//! ```text
//! patterns "5..." and "X..."
//!
//! root
//!  ├─ '4' -> [ X ]          the single "X" node is listed ...
//!  ├─ '5' -> [ 5, X ]       ... under every digit it matches,
//!  ├─ '6' -> [ X ]          next to the literal "5" branch
//!  └─ ...
//! ```
//!
//! ## Invariants
//!
//! - `partitions` / `pattern_types` of a node are the union over all patterns
//!   whose dial string passes through it, so a node's sets are supersets of
//!   its descendants' sets.
//! - `terminal_patterns` is only populated where a dial string is fully
//!   consumed, keyed by partition; a later pattern with the same text and
//!   partition replaces the earlier one.
//! - Every node has exactly one parent; nodes are never removed.

use crate::digits::{DigitClass, parse_pattern};
use crate::error::DialPlanError;
use crate::pattern::{Pattern, PatternKinds};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Index of a node in the trie arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of a pattern in the trie's pattern store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PatternId(u32);

impl PatternId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A trie vertex.
#[derive(Debug, Clone)]
pub struct DaNode {
    pub depth: usize,
    /// Normalized class token, e.g. `"5"`, `"[12345]"`, `"X"`. Empty for the root.
    pub representation: String,
    /// Concatenated representations along the root path.
    pub full_representation: String,
    pub children: BTreeMap<char, Vec<NodeId>>,
    /// Cardinality of this node's digit class.
    pub matching_digits: usize,
    pub partitions: BTreeSet<String>,
    pub pattern_types: PatternKinds,
    pub terminal_patterns: BTreeMap<String, PatternId>,
    pub parent: Option<NodeId>,
}

impl DaNode {
    fn root() -> Self {
        Self {
            depth: 0,
            representation: String::new(),
            full_representation: String::new(),
            children: BTreeMap::new(),
            matching_digits: 1,
            partitions: BTreeSet::new(),
            pattern_types: PatternKinds::empty(),
            terminal_patterns: BTreeMap::new(),
            parent: None,
        }
    }

    /// Distinct child nodes, in creation order.
    pub fn child_nodes(&self) -> Vec<NodeId> {
        let mut nodes: Vec<NodeId> = self.children.values().flatten().copied().collect();
        nodes.sort_unstable();
        nodes.dedup();
        nodes
    }

    pub fn is_terminal(&self) -> bool {
        !self.terminal_patterns.is_empty()
    }

    /// `true` for a `!` node, which matches one or more arbitrary digits.
    pub fn is_match_any(&self) -> bool {
        self.representation == "!"
    }
}

impl fmt::Display for DaNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.depth, self.full_representation)
    }
}

/// Digit-analysis trie: an arena of [`DaNode`]s plus the patterns they
/// terminate on.
///
/// Built once through [`DaTree::insert`] (or [`crate::build`]) and read-only
/// afterwards; lookups take `&self` and the type is `Send + Sync`.
#[derive(Debug, Clone)]
pub struct DaTree {
    nodes: Vec<DaNode>,
    patterns: Vec<Pattern>,
}

impl Default for DaTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DaTree {
    pub fn new() -> Self {
        Self { nodes: vec![DaNode::root()], patterns: Vec::new() }
    }

    /// Build a trie from `patterns` in order, stopping at the first invalid one.
    pub fn from_patterns<I>(patterns: I) -> Result<Self, DialPlanError>
    where
        I: IntoIterator<Item = Pattern>,
    {
        let mut tree = Self::new();
        for pattern in patterns {
            tree.insert(pattern)?;
        }
        Ok(tree)
    }

    pub fn root(&self) -> &DaNode {
        &self.nodes[NodeId::ROOT.index()]
    }

    pub fn node(&self, id: NodeId) -> &DaNode {
        &self.nodes[id.index()]
    }

    pub fn pattern(&self, id: PatternId) -> &Pattern {
        &self.patterns[id.index()]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// All inserted patterns, in insertion order.
    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    /// Insert a pattern.
    ///
    /// The dial string is parsed completely before the trie is touched, so a
    /// malformed pattern leaves the trie unchanged.
    pub fn insert(&mut self, pattern: Pattern) -> Result<PatternId, DialPlanError> {
        let classes = parse_pattern(&pattern.text)?;
        let id = u32::try_from(self.patterns.len())
            .map(PatternId)
            .map_err(|_| DialPlanError::CapacityExceeded("pattern ids"))?;
        if !node_ids_available(self.nodes.len(), classes.len()) {
            return Err(DialPlanError::CapacityExceeded("node ids"));
        }
        let partition = pattern.partition.clone();
        let kind = PatternKinds::from(pattern.kind());
        log::trace!(target: "dialwise::build", "insert {pattern}");
        self.patterns.push(pattern);
        self.add_classes(NodeId::ROOT, &classes, id, &partition, kind);
        Ok(id)
    }

    /// Register `pattern` on `node` and continue with the remaining classes.
    ///
    /// A class may lead into several existing children at once; every such
    /// branch continues over the same remaining classes.
    fn add_classes(&mut self, node: NodeId, classes: &[DigitClass], pattern: PatternId, partition: &str, kind: PatternKinds) {
        let current = &mut self.nodes[node.index()];
        if !current.partitions.contains(partition) {
            current.partitions.insert(partition.to_string());
        }
        current.pattern_types |= kind;

        let Some((class, rest)) = classes.split_first() else {
            current.terminal_patterns.insert(partition.to_string(), pattern);
            return;
        };

        let mut descend: Vec<NodeId> = Vec::new();
        let mut created: Option<NodeId> = None;
        for digit in class.digits.chars() {
            let existing = self.nodes[node.index()].children.get(&digit).and_then(|children| {
                children.iter().copied().find(|child| self.nodes[child.index()].representation == class.representation)
            });
            match existing {
                Some(child) => {
                    if !descend.contains(&child) {
                        descend.push(child);
                    }
                }
                None => {
                    let child = match created {
                        Some(child) => child,
                        None => {
                            let child = self.push_child(node, class);
                            created = Some(child);
                            descend.push(child);
                            child
                        }
                    };
                    self.nodes[node.index()].children.entry(digit).or_default().push(child);
                }
            }
        }

        for child in descend {
            self.add_classes(child, rest, pattern, partition, kind);
        }
    }

    fn push_child(&mut self, parent: NodeId, class: &DigitClass) -> NodeId {
        // `insert` reserved the id range up front.
        debug_assert!(u32::try_from(self.nodes.len()).is_ok());
        let id = NodeId(self.nodes.len() as u32);
        let parent_node = &self.nodes[parent.index()];
        let node = DaNode {
            depth: parent_node.depth + 1,
            representation: class.representation.clone(),
            full_representation: format!("{}{}", parent_node.full_representation, class.representation),
            children: BTreeMap::new(),
            matching_digits: class.digits.len(),
            partitions: BTreeSet::new(),
            pattern_types: PatternKinds::empty(),
            terminal_patterns: BTreeMap::new(),
            parent: Some(parent),
        };
        self.nodes.push(node);
        id
    }

    /// Nodes carrying terminal patterns, breadth first.
    pub fn terminal_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.breadth_first().filter(move |id| self.node(*id).is_terminal())
    }

    /// Patterns stored on terminal nodes, breadth first. A pattern that ends
    /// on several nodes is reported once per node.
    pub fn terminal_patterns(&self) -> impl Iterator<Item = &Pattern> + '_ {
        self.terminal_nodes()
            .flat_map(move |id| self.node(id).terminal_patterns.values().map(move |pattern| self.pattern(*pattern)))
    }
}

/// Whether inserting `classes` digit classes can never run out of `u32`
/// node ids. Each class level creates at most one node per branch, and there
/// are never more branches than existing nodes plus one.
fn node_ids_available(existing: usize, classes: usize) -> bool {
    existing
        .checked_add(1)
        .and_then(|branches| branches.checked_mul(classes))
        .and_then(|created| created.checked_add(existing))
        .is_some_and(|total| total <= u32::MAX as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dn(text: &str, partition: &str) -> Pattern {
        Pattern::directory_number(text, partition)
    }

    #[test]
    fn shared_prefix_is_one_path() {
        let tree = DaTree::from_patterns([dn("1001", "A"), dn("1002", "B")]).unwrap();
        // root + 1 + 0 + 0 + {1, 2}
        assert_eq!(tree.node_count(), 6);
        let root = tree.root();
        assert_eq!(root.partitions, BTreeSet::from(["A".to_string(), "B".to_string()]));
        assert_eq!(root.pattern_types, PatternKinds::DN);
    }

    #[test]
    fn node_id_headroom_is_checked_before_insertion() {
        assert!(node_ids_available(0, 12));
        assert!(node_ids_available(1_000_000, 20));
        assert!(!node_ids_available(u32::MAX as usize, 1));
        assert!(!node_ids_available(400_000_000, 12));
        assert!(!node_ids_available(usize::MAX, 2));
    }

    #[test]
    fn bang_node_matches_any_digits() {
        let tree = DaTree::from_patterns([Pattern::route_pattern("9.!", "PSTN")]).unwrap();
        let nine = tree.node(tree.root().children[&'9'][0]);
        assert!(!nine.is_match_any());
        let bang = tree.node(nine.children[&'5'][0]);
        assert!(bang.is_match_any());
        assert_eq!(bang.matching_digits, 11);
    }

    #[test]
    fn class_node_is_shared_across_its_digits() {
        let tree = DaTree::from_patterns([dn("[1-3]", "A")]).unwrap();
        let root = tree.root();
        let under_one = &root.children[&'1'];
        assert_eq!(under_one.len(), 1);
        assert_eq!(root.children[&'2'], *under_one);
        assert_eq!(root.children[&'3'], *under_one);
        let node = tree.node(under_one[0]);
        assert_eq!(node.representation, "[123]");
        assert_eq!(node.matching_digits, 3);
        assert_eq!(root.child_nodes().len(), 1);
    }

    #[test]
    fn overlapping_classes_fan_out_per_digit() {
        let tree = DaTree::from_patterns([dn("5", "A"), dn("X", "B")]).unwrap();
        let root = tree.root();
        assert_eq!(root.children[&'5'].len(), 2);
        assert_eq!(root.children[&'4'].len(), 1);
        assert_eq!(root.child_nodes().len(), 2);
    }

    #[test]
    fn same_text_in_two_partitions_shares_a_terminal_node() {
        let tree = DaTree::from_patterns([dn("5XXX", "RP1"), dn("5XXX", "RP2")]).unwrap();
        let terminals: Vec<NodeId> = tree.terminal_nodes().collect();
        assert_eq!(terminals.len(), 1);
        let node = tree.node(terminals[0]);
        assert_eq!(node.terminal_patterns.keys().collect::<Vec<_>>(), vec!["RP1", "RP2"]);
        assert_eq!(node.full_representation, "5XXX");
        assert_eq!(node.depth, 4);
    }

    #[test]
    fn last_write_wins_per_partition() {
        let mut tree = DaTree::new();
        tree.insert(dn("100", "A")).unwrap();
        tree.insert(Pattern::route_pattern("100", "A")).unwrap();
        let patterns: Vec<&Pattern> = tree.terminal_patterns().collect();
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].kind(), crate::PatternKind::RoutePattern);
        assert_eq!(tree.root().pattern_types, PatternKinds::DN | PatternKinds::RP);
    }

    #[test]
    fn invalid_pattern_leaves_tree_untouched() {
        let mut tree = DaTree::from_patterns([dn("100", "A")]).unwrap();
        let nodes = tree.node_count();
        assert!(tree.insert(dn("10a", "B")).is_err());
        assert_eq!(tree.node_count(), nodes);
        assert!(!tree.root().partitions.contains("B"));
        assert_eq!(tree.patterns().len(), 1);
    }

    #[test]
    fn parent_links_and_depths() {
        let tree = DaTree::from_patterns([dn("\\+12", "")]).unwrap();
        let leaf = tree.terminal_nodes().next().unwrap();
        let node = tree.node(leaf);
        assert_eq!(node.to_string(), "3:+12");
        let parent = tree.node(node.parent.unwrap());
        assert_eq!(parent.full_representation, "+1");
        assert_eq!(parent.depth, 2);
    }
}
