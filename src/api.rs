use crate::engine::{BuildMetrics, DaTree, LeafQuery, LookupResult, SkippedPattern};
use crate::error::DialPlanError;
use crate::pattern::{Pattern, PatternKinds};
use crate::visibility::Visibility;
use std::time::Instant;

/// Number of translations a lookup applies before giving up on a chain.
pub const MAX_TRANSLATION_DEPTH: usize = 5;

/// Depth used by the dial plan analyses; deeper than any dial string in
/// practice.
pub const ANALYSIS_DEPTH: usize = 30;

/// Options that affect lookup behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupOptions {
    /// Translation hops allowed per lookup. A translation rule matched at
    /// this depth is reported in [`LookupResult::exhausted`] instead.
    pub max_translation_depth: usize,
}

impl Default for LookupOptions {
    fn default() -> Self {
        Self { max_translation_depth: MAX_TRANSLATION_DEPTH }
    }
}

/// What [`build`] does with a pattern that fails to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvalidPatternPolicy {
    /// Fail the whole build.
    #[default]
    Abort,
    /// Leave the pattern out and record it in [`BuildMetrics::skipped`].
    Skip,
}

/// Options that affect how a trie is built.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
    pub on_invalid: InvalidPatternPolicy,
}

/// Result from [`build`].
#[derive(Debug, Clone)]
pub struct BuildResult {
    pub tree: DaTree,
    pub metrics: BuildMetrics,
}

/// Build a trie from `patterns`, in order.
///
/// # Example
/// ```
/// use dialwise::{BuildOptions, Pattern, Visibility, build};
///
/// let built = build([Pattern::directory_number("1001", "DN")], &BuildOptions::default()).unwrap();
/// let found = built.tree.lookup("1001", &Visibility::parse("DN")).unwrap();
/// assert_eq!(found.patterns.len(), 1);
/// ```
pub fn build<I>(patterns: I, options: &BuildOptions) -> Result<BuildResult, DialPlanError>
where
    I: IntoIterator<Item = Pattern>,
{
    let started = Instant::now();
    let mut tree = DaTree::new();
    let mut metrics = BuildMetrics::default();

    for (index, pattern) in patterns.into_iter().enumerate() {
        let kind = pattern.kind();
        let text = pattern.text.clone();
        let inserted = Instant::now();
        match tree.insert(pattern) {
            Ok(_) => metrics.record(kind, inserted.elapsed()),
            Err(error) if options.on_invalid == InvalidPatternPolicy::Skip => {
                log::warn!(target: "dialwise::build", "skipping pattern #{index} {text}: {error}");
                metrics.skipped.push(SkippedPattern { index, text, error });
            }
            Err(error) => return Err(error),
        }
    }

    metrics.total = started.elapsed();
    metrics.nodes = tree.node_count();
    log::debug!(
        target: "dialwise::build",
        "built {} nodes from {} patterns ({} skipped) in {:?}",
        metrics.nodes,
        metrics.inserted(),
        metrics.skipped.len(),
        metrics.total
    );
    Ok(BuildResult { tree, metrics })
}

/// A translation rule reachable from a visibility and where dialing it leads.
#[derive(Debug, Clone)]
pub struct AbbreviatedDial<'t> {
    /// Dial string reaching the rule's node, e.g. `10XX`.
    pub dial_string: String,
    /// Visible translation rules terminating there.
    pub rules: Vec<&'t Pattern>,
    pub outcome: Result<LookupResult<'t>, DialPlanError>,
}

/// Find every translation rule a caller with `visibility` can dial and look
/// up its dial string.
///
/// The empty partition is appended to `visibility` unless it is already
/// part of it, as a phone would see it.
pub fn abbreviated_dialing<'t>(tree: &'t DaTree, visibility: &Visibility) -> Vec<AbbreviatedDial<'t>> {
    let visibility = visibility.clone().with_none_partition();
    let query = LeafQuery::new(ANALYSIS_DEPTH).visibility(visibility.clone()).kinds(PatternKinds::TP);

    let mut dials = Vec::new();
    for leaf in tree.find_leaves(&query) {
        let node = tree.node(leaf.node);
        let rules: Vec<&Pattern> = node
            .terminal_patterns
            .iter()
            .filter(|(partition, _)| visibility.contains(partition))
            .map(|(_, id)| tree.pattern(*id))
            .filter(|pattern| pattern.translation_rule().is_some())
            .collect();
        if rules.is_empty() {
            continue;
        }
        let outcome = tree.lookup(&leaf.dial_string, &visibility);
        dials.push(AbbreviatedDial { dial_string: leaf.dial_string, rules, outcome });
    }
    log::debug!(target: "dialwise::traversal", "abbreviated dialing [{visibility}]: {} dial strings", dials.len());
    dials
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TranslationRule;

    fn sjc_rule() -> Pattern {
        Pattern::translation(
            "10XX",
            "SJC",
            TranslationRule { use_originator_visibility: true, mask: "+14085551XXX".into(), ..Default::default() },
        )
    }

    #[test]
    fn build_counts_kinds() {
        let built = build(
            [
                Pattern::directory_number("\\+14085551001", "DN"),
                Pattern::directory_number("\\+14085551002", "DN"),
                sjc_rule(),
                Pattern::route_pattern("9.!", "PSTN"),
            ],
            &BuildOptions::default(),
        )
        .unwrap();
        assert_eq!(built.metrics.directory_numbers.inserted, 2);
        assert_eq!(built.metrics.translation_rules.inserted, 1);
        assert_eq!(built.metrics.route_patterns.inserted, 1);
        assert_eq!(built.metrics.nodes, built.tree.node_count());
        assert!(built.metrics.skipped.is_empty());
    }

    #[test]
    fn abort_policy_fails_the_build() {
        let patterns = [Pattern::directory_number("1001", "DN"), Pattern::directory_number("10+1", "DN")];
        let error = build(patterns, &BuildOptions::default()).unwrap_err();
        assert!(matches!(error, DialPlanError::InvalidPattern { offset: 2, .. }));
    }

    #[test]
    fn skip_policy_records_and_continues() {
        let patterns = [
            Pattern::directory_number("1001", "DN"),
            Pattern::directory_number("10[2", "DN"),
            Pattern::directory_number("1003", "DN"),
        ];
        let built = build(patterns, &BuildOptions { on_invalid: InvalidPatternPolicy::Skip }).unwrap();
        assert_eq!(built.metrics.directory_numbers.inserted, 2);
        assert_eq!(built.metrics.skipped.len(), 1);
        assert_eq!(built.metrics.skipped[0].index, 1);
        assert_eq!(built.metrics.skipped[0].text, "10[2");
        assert_eq!(built.tree.patterns().len(), 2);
    }

    #[test]
    fn lookup_options_default_to_five_hops() {
        assert_eq!(LookupOptions::default().max_translation_depth, 5);
    }

    #[test]
    fn abbreviated_dialing_resolves_rule_dial_strings() {
        let tree = DaTree::from_patterns([
            Pattern::directory_number("\\+14085551001", "DN"),
            Pattern::directory_number("\\+14085551002", "DN"),
            sjc_rule(),
            Pattern::translation("8XXX", "OTHER", TranslationRule::default()),
        ])
        .unwrap();
        let dials = abbreviated_dialing(&tree, &Visibility::parse("DN:SJC"));
        assert_eq!(dials.len(), 1);
        let dial = &dials[0];
        assert_eq!(dial.dial_string, "10XX");
        assert_eq!(dial.rules[0].text, "10XX");
        let outcome = dial.outcome.as_ref().unwrap();
        let mut reached: Vec<&str> = outcome.patterns.iter().map(|p| p.text.as_str()).collect();
        reached.sort_unstable();
        assert_eq!(reached, vec!["\\+14085551001", "\\+14085551002"]);
        assert_eq!(outcome.hops[0].to, "+140855510XX");
    }
}
