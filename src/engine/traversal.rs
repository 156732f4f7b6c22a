//! Breadth-first traversal with caller-driven descent.
//!
//! The walker keeps a FIFO queue of `(node, context)` pairs. After a node is
//! visited the caller decides which children go into the queue next
//! ([`Descend`]); each enqueued child gets a context derived from its parent's.
//! Nodes are enqueued by identity, so no node is visited twice even though it
//! may be listed under several digits of its parent.

use super::tree::{DaNode, DaTree, NodeId};
use std::collections::VecDeque;

/// Descent decision returned by a visit callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Descend {
    /// Enqueue every child.
    All,
    /// Enqueue only these children.
    Only(Vec<NodeId>),
    /// Do not descend below this node.
    Stop,
}

struct Traversal<C> {
    queue: VecDeque<(NodeId, C)>,
    enqueued: Vec<bool>,
}

impl<C> Traversal<C> {
    fn new(tree: &DaTree, start: NodeId, context: C) -> Self {
        let mut traversal = Self { queue: VecDeque::new(), enqueued: vec![false; tree.node_count()] };
        traversal.enqueue(start, context);
        traversal
    }

    fn enqueue(&mut self, node: NodeId, context: C) {
        let seen = &mut self.enqueued[node.index()];
        if !*seen {
            *seen = true;
            self.queue.push_back((node, context));
        }
    }

    fn pop(&mut self) -> Option<(NodeId, C)> {
        self.queue.pop_front()
    }
}

impl DaTree {
    /// Walk the trie breadth first from the root.
    ///
    /// `derive` computes a child's context from the child node and its
    /// parent's context; `visit` sees every dequeued node with its context
    /// and decides how to descend.
    pub fn walk<C, D, V>(&self, start: C, derive: D, mut visit: V)
    where
        D: Fn(&DaNode, &C) -> C,
        V: FnMut(NodeId, &C) -> Descend,
    {
        let mut traversal = Traversal::new(self, NodeId::ROOT, start);
        while let Some((id, context)) = traversal.pop() {
            log::trace!(target: "dialwise::traversal", "visit {}", self.node(id));
            let children = match visit(id, &context) {
                Descend::All => self.node(id).child_nodes(),
                Descend::Only(children) => children,
                Descend::Stop => continue,
            };
            for child in children {
                let child_context = derive(self.node(child), &context);
                traversal.enqueue(child, child_context);
            }
        }
    }

    /// Every node, breadth first, each exactly once.
    pub fn breadth_first(&self) -> BreadthFirst<'_> {
        BreadthFirst { tree: self, traversal: Traversal::new(self, NodeId::ROOT, ()) }
    }
}

/// Iterator returned by [`DaTree::breadth_first`].
pub struct BreadthFirst<'t> {
    tree: &'t DaTree,
    traversal: Traversal<()>,
}

impl Iterator for BreadthFirst<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let (id, ()) = self.traversal.pop()?;
        for child in self.tree.node(id).child_nodes() {
            self.traversal.enqueue(child, ());
        }
        Some(id)
    }
}
