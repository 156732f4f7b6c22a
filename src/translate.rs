//! Translation (digit rewrite) application.
//!
//! The dialed string is handled as a sequence of character sets, one set per
//! position, so strings that still carry enumerations (`10[2-4]X`) are
//! rewritten symbolically:
//!
//! ```text
//! "000491"  --discard pre-dot (pattern "000.49!")-->  [4][9][1]
//!           --prefix "+"-->                           [+][4][9][1]
//!           --mask "XXXX" (right aligned)-->          [+][4][9][1]
//!           --render-->                               "+491"
//! ```
//!
//! Rendering turns an empty set into nothing, a singleton into its character,
//! the ten decimal digits into `X` and anything else into a `[...]` class.

use crate::error::DialPlanError;
use crate::pattern::{TranslationRule, pre_dot_positions};
use crate::visibility::Visibility;
use std::collections::BTreeSet;

type Position = BTreeSet<char>;

const ALL_DECIMAL: &str = "0123456789";

/// Outcome of applying a translation rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub digits: String,
    /// Visibility for the secondary lookup.
    pub visibility: Visibility,
}

pub(crate) fn apply(
    pattern: &str,
    rule: &TranslationRule,
    digits: &str,
    visibility: &Visibility,
) -> Result<Translation, DialPlanError> {
    let mut positions = positions(digits)?;

    if rule.discard_pre_dot {
        let discard = pre_dot_positions(pattern)
            .ok_or_else(|| DialPlanError::MissingSeparator { pattern: pattern.to_string() })?;
        positions.drain(..discard.min(positions.len()));
    }
    if !rule.prefix_digits.is_empty() {
        positions.splice(0..0, rule.prefix_digits.chars().map(|c| Position::from([c])));
    }
    if rule.route_by_calling_number {
        return Err(DialPlanError::UnsupportedFeature("routing next hop by calling party number"));
    }
    if !rule.mask.is_empty() {
        positions = overlay(&rule.mask, &positions);
    }

    let translated = render(&positions);
    let visibility = if rule.use_originator_visibility {
        visibility.clone()
    } else {
        Visibility::parse(&rule.target_partitions.join(":"))
    };
    log::debug!(target: "dialwise::match", "{pattern} translate {digits} -> {translated} [{visibility}]");
    Ok(Translation { digits: translated, visibility })
}

fn positions(digits: &str) -> Result<Vec<Position>, DialPlanError> {
    let mut result = Vec::new();
    let mut chars = digits.char_indices();
    while let Some((start, c)) = chars.next() {
        match c {
            '.' | '#' | '\\' => continue,
            '[' => {}
            _ => {
                result.push(Position::from([c]));
                continue;
            }
        }
        let mut set = Position::new();
        let mut previous: Option<char> = None;
        loop {
            match chars.next() {
                None => return Err(DialPlanError::invalid(digits, start, "unterminated digit class")),
                Some((_, ']')) => break,
                Some((at, '-')) => {
                    let (low, high) = match (previous, chars.next()) {
                        (Some(low), Some((_, high))) if high != ']' => (low, high),
                        _ => return Err(DialPlanError::invalid(digits, at, "incomplete range")),
                    };
                    if high < low {
                        return Err(DialPlanError::invalid(digits, at, "descending range"));
                    }
                    set.extend(low..=high);
                    previous = None;
                }
                Some((_, d)) => {
                    set.insert(d);
                    previous = Some(d);
                }
            }
        }
        result.push(set);
    }
    Ok(result)
}

/// Right-align `mask` over `positions`. `X` keeps the dialed position, any
/// other mask character replaces it. Dialed positions left of the mask are
/// dropped, as are `X` positions left of the dialed digits.
fn overlay(mask: &str, positions: &[Position]) -> Vec<Position> {
    let mask: Vec<char> = mask.chars().collect();
    let width = mask.len().max(positions.len());
    let mut masked = Vec::with_capacity(width);
    for from_right in 1..=width {
        let m = mask.len().checked_sub(from_right).map(|idx| mask[idx]);
        let dialed = positions.len().checked_sub(from_right).map(|idx| &positions[idx]);
        match (m, dialed) {
            (Some('X'), Some(dialed)) => masked.push(dialed.clone()),
            (Some('X'), None) | (None, _) => {}
            (Some(literal), _) => masked.push(Position::from([literal])),
        }
    }
    masked.reverse();
    masked
}

fn render(positions: &[Position]) -> String {
    let mut out = String::new();
    for position in positions {
        match position.len() {
            0 => {}
            1 => out.extend(position.iter()),
            _ => {
                let class: String = position.iter().collect();
                if class == ALL_DECIMAL {
                    out.push('X');
                } else {
                    out.push('[');
                    out.push_str(&class);
                    out.push(']');
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use crate::error::DialPlanError;
    use crate::pattern::{Pattern, TranslationRule};
    use crate::visibility::Visibility;

    fn rule(pattern: &str, rule: TranslationRule) -> Pattern {
        Pattern::translation(pattern, "", rule)
    }

    fn translated() -> Vec<String> {
        vec!["translated".to_string()]
    }

    #[test]
    fn mask_overlays_right_aligned() {
        let tp = rule("2XXX", TranslationRule { target_partitions: translated(), mask: "1XXX".into(), ..Default::default() });
        let out = tp.translate("2234", &Visibility::parse("in")).unwrap();
        assert_eq!(out.digits, "1234");
        assert_eq!(out.visibility.to_visibility_string(), "translated");

        let literal =
            rule("2XXX", TranslationRule { target_partitions: translated(), mask: "1234".into(), ..Default::default() });
        assert_eq!(literal.translate("2345", &Visibility::parse("in")).unwrap().digits, "1234");
    }

    #[test]
    fn longer_mask_keeps_its_literals() {
        let tp = rule(
            "84969XXX",
            TranslationRule { mask: "+4961007739XXX".into(), use_originator_visibility: true, ..Default::default() },
        );
        let out = tp.translate("84969764", &Visibility::parse("in")).unwrap();
        assert_eq!(out.digits, "+4961007739764");
        assert_eq!(out.visibility.to_visibility_string(), "in");
    }

    #[test]
    fn discard_pre_dot_and_prefix() {
        let discard = TranslationRule { discard_pre_dot: true, use_originator_visibility: true, ..Default::default() };
        let tp = rule("000.49!", discard.clone());
        assert_eq!(tp.translate("000491", &Visibility::parse("in")).unwrap().digits, "491");

        let prefixed = rule("000.49!", TranslationRule { prefix_digits: "+".into(), ..discard });
        assert_eq!(prefixed.translate("000491", &Visibility::parse("in")).unwrap().digits, "+491");
    }

    #[test]
    fn discard_without_separator_fails() {
        let tp = rule("00049!", TranslationRule { discard_pre_dot: true, ..Default::default() });
        assert_eq!(
            tp.translate("000491", &Visibility::parse("in")),
            Err(DialPlanError::MissingSeparator { pattern: "00049!".into() })
        );
    }

    #[test]
    fn discard_then_mask_uses_target_partitions() {
        let tp = rule(
            "000.49!",
            TranslationRule {
                target_partitions: translated(),
                discard_pre_dot: true,
                mask: "XX".into(),
                ..Default::default()
            },
        );
        let out = tp.translate("000491", &Visibility::parse("in")).unwrap();
        assert_eq!(out.digits, "91");
        assert_eq!(out.visibility.to_visibility_string(), "translated");
    }

    #[test]
    fn enumerations_are_rewritten_symbolically() {
        let tp = rule("1XX", TranslationRule { prefix_digits: "9".into(), mask: "XXXX".into(), ..Default::default() });
        assert_eq!(tp.translate("1[2-4]X", &Visibility::parse("in")).unwrap().digits, "91[234]X");
        assert_eq!(tp.translate("1[0-9]5", &Visibility::parse("in")).unwrap().digits, "91X5");
    }

    #[test]
    fn descending_range_in_dialed_digits_is_rejected() {
        let tp = rule("1XX", TranslationRule { prefix_digits: "9".into(), ..Default::default() });
        let error = tp.translate("1[4-2]X", &Visibility::parse("in")).unwrap_err();
        assert_eq!(
            error,
            DialPlanError::InvalidPattern { pattern: "1[4-2]X".into(), offset: 3, reason: "descending range" }
        );
    }

    #[test]
    fn empty_target_partitions_select_the_none_partition() {
        let tp = rule("1XX", TranslationRule::default());
        let out = tp.translate("123", &Visibility::parse("A:B")).unwrap();
        assert!(out.visibility.contains(""));
        assert_eq!(out.digits, "123");
    }

    #[test]
    fn separators_in_dialed_digits_are_not_positions() {
        let tp = rule("000.49!", TranslationRule { discard_pre_dot: true, ..Default::default() });
        assert_eq!(tp.translate("000.491", &Visibility::parse("in")).unwrap().digits, "491");
    }

    #[test]
    fn calling_number_routing_is_unsupported() {
        let tp = rule("1XX", TranslationRule { route_by_calling_number: true, ..Default::default() });
        assert!(matches!(tp.translate("123", &Visibility::parse("A")), Err(DialPlanError::UnsupportedFeature(_))));
    }

    #[test]
    fn unterminated_class_in_dialed_digits_is_invalid() {
        let tp = rule("1XX", TranslationRule::default());
        assert!(matches!(tp.translate("1[23", &Visibility::parse("A")), Err(DialPlanError::InvalidPattern { .. })));
    }
}
