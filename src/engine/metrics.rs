//! Build metrics.
//!
//! A batch build ([`crate::build`]) records how many patterns of each kind
//! went into the trie, how long that took, and which patterns were skipped.
//! The CLI prints these in its report; library callers can ignore them.
//!
//! ## Design notes
//!
//! - Durations are wall-clock, measured around each `DaTree::insert` call and
//!   summed per kind.
//! - `skipped` is only populated under `InvalidPatternPolicy::Skip`.

use crate::error::DialPlanError;
use crate::pattern::PatternKind;
use std::time::Duration;

// --- Metrics -----------------------------------------------------------------

#[derive(Debug, Default, Clone)]
pub struct BuildMetrics {
    /// Total elapsed time for the batch.
    pub total: Duration,
    pub directory_numbers: KindMetrics,
    pub translation_rules: KindMetrics,
    pub route_patterns: KindMetrics,
    /// Node count of the finished trie.
    pub nodes: usize,
    /// Patterns rejected during the batch, with the reason.
    pub skipped: Vec<SkippedPattern>,
}

/// Count and cumulative insertion time for one pattern kind.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct KindMetrics {
    pub inserted: usize,
    pub duration: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedPattern {
    /// Position of the pattern in the input batch.
    pub index: usize,
    pub text: String,
    pub error: DialPlanError,
}

impl BuildMetrics {
    pub fn kind(&self, kind: PatternKind) -> &KindMetrics {
        match kind {
            PatternKind::DirectoryNumber => &self.directory_numbers,
            PatternKind::TranslationRule => &self.translation_rules,
            PatternKind::RoutePattern => &self.route_patterns,
        }
    }

    pub(crate) fn record(&mut self, kind: PatternKind, elapsed: Duration) {
        let slot = match kind {
            PatternKind::DirectoryNumber => &mut self.directory_numbers,
            PatternKind::TranslationRule => &mut self.translation_rules,
            PatternKind::RoutePattern => &mut self.route_patterns,
        };
        slot.inserted += 1;
        slot.duration += elapsed;
    }

    /// Number of patterns inserted, over all kinds.
    pub fn inserted(&self) -> usize {
        PatternKind::ALL.iter().map(|kind| self.kind(*kind).inserted).sum()
    }
}
