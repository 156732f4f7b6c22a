//! Dial plan pattern model.
//!
//! A [`Pattern`] is an immutable value: a dial string with wildcard syntax,
//! the partition it lives in, and what happens when it is the best match
//! (terminate on a directory number or route pattern, or rewrite the digits
//! and look them up again).

use crate::error::DialPlanError;
use crate::translate::{self, Translation};
use crate::visibility::Visibility;
use std::fmt;

/// Kind of a dialable entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PatternKind {
    DirectoryNumber,
    TranslationRule,
    RoutePattern,
}

impl PatternKind {
    pub const ALL: [PatternKind; 3] =
        [PatternKind::DirectoryNumber, PatternKind::TranslationRule, PatternKind::RoutePattern];

    /// Short name used in listings and on the command line.
    pub fn short_name(self) -> &'static str {
        match self {
            PatternKind::DirectoryNumber => "DN",
            PatternKind::TranslationRule => "TP",
            PatternKind::RoutePattern => "RP",
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

bitflags::bitflags! {
    /// Set of pattern kinds, as aggregated on trie nodes and used as filters.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PatternKinds: u8 {
        const DN = 1 << 0;
        const TP = 1 << 1;
        const RP = 1 << 2;
    }
}

impl From<PatternKind> for PatternKinds {
    fn from(kind: PatternKind) -> Self {
        match kind {
            PatternKind::DirectoryNumber => PatternKinds::DN,
            PatternKind::TranslationRule => PatternKinds::TP,
            PatternKind::RoutePattern => PatternKinds::RP,
        }
    }
}

impl fmt::Display for PatternKinds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> =
            PatternKind::ALL.iter().filter(|k| self.contains((**k).into())).map(|k| k.short_name()).collect();
        f.write_str(&names.join(", "))
    }
}

/// Digit and visibility rewrite carried by a translation rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRule {
    /// Partitions activated for the secondary lookup, in priority order.
    pub target_partitions: Vec<String>,
    pub blocking: bool,
    pub urgent: bool,
    /// Keep the caller's visibility instead of `target_partitions`.
    pub use_originator_visibility: bool,
    /// Drop every digit up to the `.` separator of the rule's pattern.
    pub discard_pre_dot: bool,
    pub prefix_digits: String,
    /// Right-aligned overlay; `X` keeps the dialed digit.
    pub mask: String,
    /// Route next hop by calling party number. Never supported.
    pub route_by_calling_number: bool,
}

impl Default for TranslationRule {
    fn default() -> Self {
        Self {
            target_partitions: Vec::new(),
            blocking: false,
            urgent: true,
            use_originator_visibility: false,
            discard_pre_dot: false,
            prefix_digits: String::new(),
            mask: String::new(),
            route_by_calling_number: false,
        }
    }
}

/// What a pattern does once it wins a lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternBody {
    DirectoryNumber,
    RoutePattern,
    Translation(Box<TranslationRule>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    /// Raw dial string, e.g. `\+14085551XXX` or `000.49!`.
    pub text: String,
    /// Partition name; empty for the implicit "no partition" scope.
    pub partition: String,
    pub body: PatternBody,
}

impl Pattern {
    pub fn directory_number(text: impl Into<String>, partition: impl Into<String>) -> Self {
        Self { text: text.into(), partition: partition.into(), body: PatternBody::DirectoryNumber }
    }

    pub fn route_pattern(text: impl Into<String>, partition: impl Into<String>) -> Self {
        Self { text: text.into(), partition: partition.into(), body: PatternBody::RoutePattern }
    }

    pub fn translation(text: impl Into<String>, partition: impl Into<String>, rule: TranslationRule) -> Self {
        Self { text: text.into(), partition: partition.into(), body: PatternBody::Translation(Box::new(rule)) }
    }

    pub fn kind(&self) -> PatternKind {
        match self.body {
            PatternBody::DirectoryNumber => PatternKind::DirectoryNumber,
            PatternBody::RoutePattern => PatternKind::RoutePattern,
            PatternBody::Translation(_) => PatternKind::TranslationRule,
        }
    }

    pub fn translation_rule(&self) -> Option<&TranslationRule> {
        match &self.body {
            PatternBody::Translation(rule) => Some(rule),
            _ => None,
        }
    }

    /// `text:partition`, with the empty partition shown as `NONE`.
    pub fn text_and_partition(&self) -> String {
        format!("{}:{}", self.text, crate::visibility::display_partition(&self.partition))
    }

    /// Apply this pattern's translation to `digits` dialed under `visibility`.
    ///
    /// Patterns that are not translation rules pass the digits through
    /// unchanged.
    pub fn translate(&self, digits: &str, visibility: &Visibility) -> Result<Translation, DialPlanError> {
        match &self.body {
            PatternBody::Translation(rule) => translate::apply(&self.text, rule, digits, visibility),
            _ => Ok(Translation { digits: digits.to_string(), visibility: visibility.clone() }),
        }
    }

    /// Number of digit positions this pattern matches; `None` for patterns
    /// ending in `!`, which match an unlimited number of digits.
    pub fn match_length(&self) -> Option<usize> {
        if self.text.ends_with('!') {
            return None;
        }
        Some(positions(&self.text).count())
    }

    /// Length of the dial string produced by this pattern's translation.
    ///
    /// For non-translation patterns this is the match length.
    pub fn translated_length(&self) -> Option<usize> {
        let Some(rule) = self.translation_rule() else {
            return self.match_length();
        };
        if !rule.mask.is_empty() {
            return Some(rule.mask.chars().count());
        }
        let mut length = self.match_length()?;
        if rule.discard_pre_dot {
            length = length.saturating_sub(pre_dot_positions(&self.text).unwrap_or(0));
        }
        Some(length + rule.prefix_digits.chars().count())
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.text_and_partition(), self.kind())
    }
}

/// Start offsets of the digit positions in a pattern; a bracketed class
/// counts as one position, separators and the escape marker as none.
fn positions(text: &str) -> impl Iterator<Item = usize> + '_ {
    let mut in_class = false;
    text.char_indices().filter_map(move |(idx, c)| match c {
        '[' => {
            in_class = true;
            Some(idx)
        }
        ']' => {
            in_class = false;
            None
        }
        _ if in_class => None,
        '.' | '#' | '\\' => None,
        _ => Some(idx),
    })
}

/// Number of digit positions in front of the first `.` separator, if any.
pub(crate) fn pre_dot_positions(text: &str) -> Option<usize> {
    let dot = text.find('.')?;
    Some(positions(text).take_while(|&idx| idx < dot).count())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_none_for_empty_partition() {
        let dn = Pattern::directory_number("1001", "");
        assert_eq!(dn.to_string(), "1001:NONE(DN)");
        let rp = Pattern::route_pattern("9.!", "PSTN");
        assert_eq!(rp.to_string(), "9.!:PSTN(RP)");
    }

    #[test]
    fn kinds_map_to_flags() {
        let kinds: PatternKinds = PatternKind::TranslationRule.into();
        assert_eq!(kinds, PatternKinds::TP);
        assert_eq!((PatternKinds::DN | PatternKinds::RP).to_string(), "DN, RP");
    }

    #[test]
    fn translation_rule_defaults_to_urgent() {
        let rule = TranslationRule::default();
        assert!(rule.urgent);
        assert!(!rule.blocking);
    }

    #[test]
    fn match_length_counts_positions() {
        assert_eq!(Pattern::directory_number("\\+14085551001", "").match_length(), Some(12));
        assert_eq!(Pattern::route_pattern("9.[2-9]XX", "").match_length(), Some(4));
        assert_eq!(Pattern::route_pattern("000.49!", "").match_length(), None);
    }

    #[test]
    fn translated_length_follows_mask_discard_and_prefix() {
        let masked = Pattern::translation(
            "84969XXX",
            "",
            TranslationRule { mask: "+4961007739XXX".into(), ..Default::default() },
        );
        assert_eq!(masked.translated_length(), Some(14));

        let discarding = Pattern::translation(
            "9.[2-9]XXXXXX",
            "",
            TranslationRule { discard_pre_dot: true, prefix_digits: "0".into(), ..Default::default() },
        );
        assert_eq!(discarding.translated_length(), Some(8));
    }

    #[test]
    fn pre_dot_positions_skip_classes_and_escape() {
        assert_eq!(pre_dot_positions("000.49!"), Some(3));
        assert_eq!(pre_dot_positions("\\+[1-3]9.X"), Some(3));
        assert_eq!(pre_dot_positions("00049!"), None);
    }
}
