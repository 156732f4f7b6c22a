//! Indented text dump of the trie.
//!
//! ```text
//! partitions: DN, SJC
//! kinds: DN, TP
//! 0: -> 1
//!   partitions: SJC
//!   kinds: TP
//!   1:1 -> 10
//!   ...
//!       4:10XX terminal SJC: 10XX:SJC(TP)
//! ```
//!
//! Each edge line names the digits the child is registered under, collapsed
//! to `X` when it covers every dialable digit.

use super::tree::{DaTree, NodeId};
use crate::digits::DigitSet;
use crate::visibility::display_partition;

impl DaTree {
    /// Render the whole trie, depth first. Every line ends in `\n`.
    pub fn pretty(&self) -> String {
        let mut lines = Vec::new();
        self.pretty_node(NodeId::ROOT, &mut lines);
        lines.iter().map(|line| format!("{line}\n")).collect()
    }

    fn pretty_node(&self, id: NodeId, lines: &mut Vec<String>) {
        let node = self.node(id);
        let indent = "  ".repeat(node.depth);
        let partitions: Vec<&str> = node.partitions.iter().map(|p| display_partition(p)).collect();
        lines.push(format!("{indent}partitions: {}", partitions.join(", ")));
        lines.push(format!("{indent}kinds: {}", node.pattern_types));
        for (partition, pattern) in &node.terminal_patterns {
            lines.push(format!("{indent}{node} terminal {}: {}", display_partition(partition), self.pattern(*pattern)));
        }

        for child in node.child_nodes() {
            let digits: String =
                node.children.iter().filter(|(_, nodes)| nodes.contains(&child)).map(|(digit, _)| *digit).collect();
            let edge = match digits.chars().count() {
                1 => digits,
                _ if digits.chars().count() == DigitSet::DIALABLE.len() => "X".to_string(),
                _ => format!("[{digits}]"),
            };
            lines.push(format!("{indent}{node} -> {}{edge}", node.full_representation));
            self.pretty_node(child, lines);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{DaTree, Pattern};

    #[test]
    fn lists_edges_and_terminals() {
        let tree = DaTree::from_patterns([
            Pattern::directory_number("12", "A"),
            Pattern::route_pattern("1X", ""),
        ])
        .unwrap();
        let dump = tree.pretty();
        assert!(dump.starts_with("partitions: NONE, A\nkinds: DN, RP\n"));
        assert!(dump.contains("0: -> 1\n"));
        assert!(dump.contains("  1:1 -> 12\n"));
        assert!(dump.contains("  1:1 -> 1X\n"));
        assert!(dump.contains("    2:12 terminal A: 12:A(DN)\n"));
        assert!(dump.contains("    2:1X terminal NONE: 1X:NONE(RP)\n"));
    }

    #[test]
    fn one_line_per_node_header_terminal_and_edge() {
        let tree = DaTree::from_patterns([Pattern::directory_number("1", "A")]).unwrap();
        // root: partitions, kinds, edge; child: partitions, kinds, terminal
        assert_eq!(
            tree.pretty(),
            "partitions: A\nkinds: DN\n0: -> 1\n  partitions: A\n  kinds: DN\n  1:1 terminal A: 1:A(DN)\n"
        );
    }
}
