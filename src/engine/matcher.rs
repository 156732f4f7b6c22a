//! Lookup engine: specificity scoring and the translation driver.
//!
//! ## Scoring
//!
//! [`DaTree::matching_nodes`] walks the trie depth first, consuming one digit
//! class of the query per step. The priority of a path is the product of the
//! `matching_digits` of every node it passes, so narrow classes score low:
//!
//! ```text
//! query "5101", visibility DN:RTP
//!
//! root(1) ─ 5(1) ─ X(11) ─ X(11) ─ X(11)    5XXX  priority 1331
//!         └ 5(1) ─ 1(1)  ─ X(11) ─ X(11)    51XX  priority  121   <- wins
//! ```
//!
//! A `!` node consumes further digits on itself. When the query is exhausted
//! a node is reported if it carries any terminal pattern.
//!
//! ## Lookup
//!
//! [`DaTree::lookup`] keeps the nodes with the lowest priority, collects
//! their visible terminal patterns per partition and picks the first
//! partition in visibility order that has any. Translation rules among the
//! winners are applied and looked up again, at most
//! [`LookupOptions::max_translation_depth`] hops deep.

use super::tree::{DaTree, NodeId};
use crate::api::LookupOptions;
use crate::digits::{DigitCursor, DigitSet, parse_pattern};
use crate::error::DialPlanError;
use crate::pattern::Pattern;
use crate::visibility::Visibility;
use std::collections::BTreeMap;

/// A node consistent with a query, with its specificity (lower is better).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeMatch {
    pub node: NodeId,
    pub priority: u64,
}

/// One translation applied while resolving a lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationHop<'t> {
    pub rule: &'t Pattern,
    /// Number of translations applied before this one.
    pub depth: usize,
    pub from: String,
    pub to: String,
    pub visibility: Visibility,
}

/// A translation rule that could not be applied or whose output could not be
/// looked up. Other candidates of the same lookup are unaffected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationFailure<'t> {
    pub rule: &'t Pattern,
    pub digits: String,
    pub error: DialPlanError,
}

/// Outcome of [`DaTree::lookup`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupResult<'t> {
    /// Resolved directory numbers and route patterns, in resolution order.
    pub patterns: Vec<&'t Pattern>,
    pub hops: Vec<TranslationHop<'t>>,
    /// Translation rules matched at the depth bound and not applied.
    pub exhausted: Vec<&'t Pattern>,
    pub failures: Vec<TranslationFailure<'t>>,
}

impl LookupResult<'_> {
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

struct Frame<'q> {
    node: NodeId,
    cursor: DigitCursor<'q>,
    priority: u64,
}

impl DaTree {
    /// All terminal nodes consistent with `digits` under `visibility`, in
    /// depth-first order, with their priority.
    ///
    /// The query may itself contain wildcard syntax; a malformed query fails
    /// with [`DialPlanError::InvalidPattern`].
    pub fn matching_nodes(&self, digits: &str, visibility: &Visibility) -> Result<Vec<NodeMatch>, DialPlanError> {
        parse_pattern(digits)?;

        let mut matches = Vec::new();
        let mut stack = vec![Frame { node: NodeId::ROOT, cursor: DigitCursor::new(digits), priority: 1 }];
        while let Some(Frame { node: id, mut cursor, priority }) = stack.pop() {
            let node = self.node(id);
            let Some(class) = cursor.next_class(node.depth)? else {
                if node.is_terminal() {
                    log::trace!(target: "dialwise::match", "{node}: end of digits, match ({priority})");
                    matches.push(NodeMatch { node: id, priority });
                } else {
                    log::trace!(target: "dialwise::match", "{node}: end of digits, no terminal pattern");
                }
                continue;
            };

            if node.is_match_any() {
                stack.push(Frame { node: id, cursor, priority: priority.saturating_mul(node.matching_digits as u64) });
                continue;
            }

            let mut children = self.children_matching(id, class.digits);
            children.retain(|child| visibility.intersects(&self.node(*child).partitions));
            if children.is_empty() {
                log::trace!(target: "dialwise::match", "{node}: no match on {}", class.representation);
                continue;
            }
            for child in children.into_iter().rev() {
                let weight = self.node(child).matching_digits as u64;
                stack.push(Frame { node: child, cursor, priority: priority.saturating_mul(weight) });
            }
        }
        log::debug!(target: "dialwise::match", "matching_nodes {digits} [{visibility}]: {} matches", matches.len());
        Ok(matches)
    }

    fn children_matching(&self, id: NodeId, digits: DigitSet) -> Vec<NodeId> {
        let node = self.node(id);
        let mut children: Vec<NodeId> =
            digits.chars().filter_map(|digit| node.children.get(&digit)).flatten().copied().collect();
        children.sort_unstable();
        children.dedup();
        children
    }

    /// Resolve `digits` dialed under `visibility` with default options.
    pub fn lookup(&self, digits: &str, visibility: &Visibility) -> Result<LookupResult<'_>, DialPlanError> {
        self.lookup_with(digits, visibility, &LookupOptions::default())
    }

    /// Resolve `digits` dialed under `visibility`.
    ///
    /// Only a malformed initial query is an error; failures further down a
    /// translation chain are reported in [`LookupResult::failures`].
    pub fn lookup_with(
        &self,
        digits: &str,
        visibility: &Visibility,
        options: &LookupOptions,
    ) -> Result<LookupResult<'_>, DialPlanError> {
        let mut result = LookupResult::default();
        let selected = self.best_patterns(digits, visibility)?;
        self.resolve_into(&mut result, selected, digits, visibility, options);
        log::debug!(
            target: "dialwise::match",
            "lookup {digits} [{visibility}]: {} patterns, {} hops",
            result.patterns.len(),
            result.hops.len()
        );
        Ok(result)
    }

    /// Patterns of the best-specificity nodes, restricted to the winning
    /// partition.
    fn best_patterns(&self, digits: &str, visibility: &Visibility) -> Result<Vec<&Pattern>, DialPlanError> {
        let matches = self.matching_nodes(digits, visibility)?;
        let Some(best) = matches.iter().map(|m| m.priority).min() else {
            return Ok(Vec::new());
        };

        let mut by_partition: BTreeMap<&str, Vec<&Pattern>> = BTreeMap::new();
        for found in matches.iter().filter(|m| m.priority == best) {
            for (partition, pattern) in &self.node(found.node).terminal_patterns {
                if visibility.contains(partition) {
                    by_partition.entry(partition.as_str()).or_default().push(self.pattern(*pattern));
                }
            }
        }

        let winner = visibility.partitions().find_map(|partition| by_partition.remove(partition));
        if let Some(patterns) = &winner {
            log::trace!(
                target: "dialwise::match",
                "best priority {best}: {}",
                patterns.iter().map(|p| p.to_string()).collect::<Vec<_>>().join(", ")
            );
        }
        Ok(winner.unwrap_or_default())
    }

    /// Resolve `selected` and every translation chain hanging off it.
    ///
    /// Chains are followed with an explicit stack of pending candidate lists,
    /// so the depth bound is limited by memory, not by the call stack.
    /// Results keep the order a depth-first recursion would produce.
    fn resolve_into<'t>(
        &'t self,
        result: &mut LookupResult<'t>,
        selected: Vec<&'t Pattern>,
        digits: &str,
        visibility: &Visibility,
        options: &LookupOptions,
    ) {
        let mut pending = vec![Pending {
            candidates: selected.into_iter(),
            digits: digits.to_string(),
            visibility: visibility.clone(),
            depth: 0,
        }];
        while let Some(top) = pending.last_mut() {
            let Some(pattern) = top.candidates.next() else {
                pending.pop();
                continue;
            };
            let depth = top.depth;
            if pattern.translation_rule().is_none() {
                result.patterns.push(pattern);
                continue;
            }
            if depth >= options.max_translation_depth {
                log::debug!(target: "dialwise::match", "{pattern}: translation depth {depth} reached, not applied");
                result.exhausted.push(pattern);
                continue;
            }

            let translation = match pattern.translate(&top.digits, &top.visibility) {
                Ok(translation) => translation,
                Err(error) => {
                    log::debug!(target: "dialwise::match", "{pattern}: {error}");
                    result.failures.push(TranslationFailure { rule: pattern, digits: top.digits.clone(), error });
                    continue;
                }
            };
            result.hops.push(TranslationHop {
                rule: pattern,
                depth,
                from: top.digits.clone(),
                to: translation.digits.clone(),
                visibility: translation.visibility.clone(),
            });

            match self.best_patterns(&translation.digits, &translation.visibility) {
                Ok(next) => pending.push(Pending {
                    candidates: next.into_iter(),
                    digits: translation.digits,
                    visibility: translation.visibility,
                    depth: depth + 1,
                }),
                Err(error) => {
                    log::debug!(target: "dialwise::match", "{pattern}: translated digits {}: {error}", translation.digits);
                    result.failures.push(TranslationFailure { rule: pattern, digits: translation.digits, error });
                }
            }
        }
    }
}

/// Candidates still to resolve for one translation step.
struct Pending<'t> {
    candidates: std::vec::IntoIter<&'t Pattern>,
    digits: String,
    visibility: Visibility,
    depth: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TranslationRule;

    #[test]
    fn narrower_classes_score_lower() {
        let tree = DaTree::from_patterns([
            Pattern::route_pattern("5XXX", "A"),
            Pattern::route_pattern("5[0-4]XX", "A"),
            Pattern::route_pattern("5001", "A"),
        ])
        .unwrap();
        let mut matches = tree.matching_nodes("5001", &Visibility::parse("A")).unwrap();
        matches.sort_by_key(|m| m.priority);
        let priorities: Vec<u64> = matches.iter().map(|m| m.priority).collect();
        assert_eq!(priorities, vec![1, 5 * 11 * 11, 11 * 11 * 11]);
        assert_eq!(tree.node(matches[0].node).full_representation, "5001");
    }

    #[test]
    fn bang_consumes_the_remaining_digits() {
        let tree = DaTree::from_patterns([Pattern::route_pattern("9.!", "PSTN")]).unwrap();
        let visibility = Visibility::parse("PSTN");
        let found = tree.lookup("914085551234", &visibility).unwrap();
        assert_eq!(found.patterns.len(), 1);
        assert_eq!(found.patterns[0].text, "9.!");
        assert!(tree.lookup("9", &visibility).unwrap().is_empty());
    }

    #[test]
    fn invisible_subtrees_are_not_entered() {
        let tree = DaTree::from_patterns([Pattern::directory_number("1001", "A")]).unwrap();
        assert!(tree.matching_nodes("1001", &Visibility::parse("B")).unwrap().is_empty());
    }

    #[test]
    fn malformed_query_is_an_error() {
        let tree = DaTree::from_patterns([Pattern::directory_number("1001", "A")]).unwrap();
        assert!(matches!(tree.lookup("10a1", &Visibility::parse("A")), Err(DialPlanError::InvalidPattern { .. })));
    }

    #[test]
    fn best_node_with_only_invisible_terminals_resolves_to_nothing() {
        // "1001" in A makes the "100" node visible, its terminal lives in B.
        let tree = DaTree::from_patterns([
            Pattern::directory_number("100", "B"),
            Pattern::route_pattern("1001", "A"),
            Pattern::route_pattern("1XX", "A"),
        ])
        .unwrap();
        let visibility = Visibility::parse("A");
        assert_eq!(tree.matching_nodes("100", &visibility).unwrap().len(), 2);
        assert!(tree.lookup("100", &visibility).unwrap().is_empty());
    }

    #[test]
    fn hops_are_recorded() {
        let tree = DaTree::from_patterns([
            Pattern::translation(
                "2XXX",
                "IN",
                TranslationRule { target_partitions: vec!["OUT".into()], mask: "1XXX".into(), ..Default::default() },
            ),
            Pattern::directory_number("1234", "OUT"),
        ])
        .unwrap();
        let found = tree.lookup("2234", &Visibility::parse("IN")).unwrap();
        assert_eq!(found.patterns[0].text, "1234");
        assert_eq!(found.hops.len(), 1);
        assert_eq!(found.hops[0].from, "2234");
        assert_eq!(found.hops[0].to, "1234");
        assert_eq!(found.hops[0].visibility.to_visibility_string(), "OUT");
    }

    #[test]
    fn depth_bound_is_configurable() {
        let tree = DaTree::from_patterns([
            Pattern::translation(
                "1",
                "A",
                TranslationRule { use_originator_visibility: true, mask: "2".into(), ..Default::default() },
            ),
            Pattern::directory_number("2", "A"),
        ])
        .unwrap();
        let visibility = Visibility::parse("A");
        let none = tree.lookup_with("1", &visibility, &LookupOptions { max_translation_depth: 0 }).unwrap();
        assert!(none.is_empty());
        assert_eq!(none.exhausted.len(), 1);
        let one = tree.lookup_with("1", &visibility, &LookupOptions { max_translation_depth: 1 }).unwrap();
        assert_eq!(one.patterns.len(), 1);
    }

    #[test]
    fn cyclic_rules_with_a_large_bound_stay_off_the_call_stack() {
        let swap = |from: &str, to: &str| {
            Pattern::translation(
                from,
                "A",
                TranslationRule { use_originator_visibility: true, mask: to.into(), ..Default::default() },
            )
        };
        let tree = DaTree::from_patterns([swap("1111", "2222"), swap("2222", "1111")]).unwrap();
        let bound = 200_000;
        let found =
            tree.lookup_with("1111", &Visibility::parse("A"), &LookupOptions { max_translation_depth: bound }).unwrap();
        assert!(found.is_empty());
        assert_eq!(found.hops.len(), bound);
        assert_eq!(found.hops[bound - 1].to, "1111");
        assert_eq!(found.exhausted.len(), 1);
        assert_eq!(found.exhausted[0].text, "1111");
    }
}
