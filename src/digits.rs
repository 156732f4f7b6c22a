//! Digit-class parsing.
//!
//! A dial string is a sequence of *digit classes*: a literal (`5`, `*`), a
//! wildcard (`X`, `!`, `@`), a leading `+`, or a bracketed enumeration such as
//! `[1-5]` or `[2479]`. Each class has a normalized textual representation and
//! the set of concrete characters it matches:
//!
//! ```text
//! "5"      -> ("5",        {5})
//! "[3-1]"  -> error: descending range
//! "[7-91]" -> ("[1789]",   {1,7,8,9})
//! "X"      -> ("X",        {*,0..9})
//! "+"      -> ("+",        {+})        only at depth 0
//! ```
//!
//! Separators (`.` and `#`) and the leading escape marker `\` are skipped
//! without producing a class. The same parser is used for patterns at
//! insertion time and for query strings at lookup time.

use crate::error::DialPlanError;

const ALPHABET: [char; 12] = ['*', '+', '0', '1', '2', '3', '4', '5', '6', '7', '8', '9'];

bitflags::bitflags! {
    /// Set of concrete characters matched by a digit class.
    ///
    /// Bits are laid out in ASCII order so iterating the set yields sorted
    /// characters.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct DigitSet: u16 {
        const STAR = 1 << 0;
        const PLUS = 1 << 1;
        const D0 = 1 << 2;
        const D1 = 1 << 3;
        const D2 = 1 << 4;
        const D3 = 1 << 5;
        const D4 = 1 << 6;
        const D5 = 1 << 7;
        const D6 = 1 << 8;
        const D7 = 1 << 9;
        const D8 = 1 << 10;
        const D9 = 1 << 11;
        /// Everything a wildcard can stand for: `0`-`9` and `*`.
        const DIALABLE = Self::STAR.bits() | 0b1111_1111_1100;
    }
}

impl DigitSet {
    /// Set holding the single character `c`, if it is part of the alphabet.
    pub fn from_char(c: char) -> Option<Self> {
        ALPHABET.iter().position(|&a| a == c).map(|idx| Self::from_bits_retain(1 << idx))
    }

    /// Characters in the set, in ASCII order.
    pub fn chars(self) -> impl Iterator<Item = char> {
        ALPHABET.into_iter().enumerate().filter(move |(idx, _)| self.bits() & (1 << idx) != 0).map(|(_, c)| c)
    }

    /// Number of characters in the set.
    pub fn len(self) -> usize {
        self.bits().count_ones() as usize
    }
}

/// One parsed token of a dial string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DigitClass {
    /// Normalized representation, e.g. `"5"`, `"X"` or `"[12345]"`.
    pub representation: String,
    /// Concrete characters matched by this class.
    pub digits: DigitSet,
}

impl DigitClass {
    fn single(c: char, digits: DigitSet) -> Self {
        Self { representation: c.to_string(), digits }
    }
}

/// Cursor over the remaining characters of a dial string.
///
/// The cursor is `Copy`: continuing a walk into several subtrees is done by
/// handing each branch its own copy.
#[derive(Debug, Clone, Copy)]
pub struct DigitCursor<'a> {
    text: &'a str,
    offset: usize,
}

impl<'a> DigitCursor<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, offset: 0 }
    }

    /// Unconsumed part of the dial string.
    pub fn remaining(&self) -> &'a str {
        &self.text[self.offset..]
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn bump(&mut self, c: char) {
        self.offset += c.len_utf8();
    }

    /// Consume the next digit class, skipping leading separators.
    ///
    /// `depth` is the trie depth the class would be placed at; `+` and the
    /// escape marker are only accepted at depth 0. Returns `Ok(None)` once the
    /// string is exhausted.
    pub fn next_class(&mut self, depth: usize) -> Result<Option<DigitClass>, DialPlanError> {
        while let Some(c) = self.peek() {
            match c {
                '.' | '#' => self.bump(c),
                '\\' if depth == 0 => self.bump(c),
                '\\' => {
                    return Err(DialPlanError::invalid(self.text, self.offset, "escape marker after the first digit"));
                }
                _ => break,
            }
        }

        let start = self.offset;
        let Some(c) = self.peek() else {
            return Ok(None);
        };
        self.bump(c);

        let class = match c {
            '[' => {
                let digits = self.enumeration(start)?;
                let representation = format!("[{}]", digits.chars().collect::<String>());
                DigitClass { representation, digits }
            }
            '!' | 'X' | '@' => DigitClass::single(c, DigitSet::DIALABLE),
            '+' if depth == 0 => DigitClass::single(c, DigitSet::PLUS),
            '+' => return Err(DialPlanError::invalid(self.text, start, "'+' after the first digit")),
            _ => match DigitSet::from_char(c) {
                Some(digits) => DigitClass::single(c, digits),
                None => return Err(DialPlanError::invalid(self.text, start, "unexpected character")),
            },
        };
        Ok(Some(class))
    }

    /// Parse the body of a `[...]` enumeration; the opening bracket is
    /// already consumed.
    fn enumeration(&mut self, start: usize) -> Result<DigitSet, DialPlanError> {
        let mut digits = DigitSet::empty();
        let mut previous: Option<char> = None;
        loop {
            let Some(c) = self.peek() else {
                return Err(DialPlanError::invalid(self.text, start, "unterminated digit class"));
            };
            let at = self.offset;
            self.bump(c);
            match c {
                ']' => break,
                '-' => {
                    let low = previous
                        .filter(char::is_ascii_digit)
                        .ok_or_else(|| DialPlanError::invalid(self.text, at, "range without lower bound"))?;
                    let high = self
                        .peek()
                        .filter(char::is_ascii_digit)
                        .ok_or_else(|| DialPlanError::invalid(self.text, at, "range without upper bound"))?;
                    self.bump(high);
                    if high < low {
                        return Err(DialPlanError::invalid(self.text, at, "descending range"));
                    }
                    for d in low..=high {
                        digits |= DigitSet::from_char(d).unwrap_or(DigitSet::empty());
                    }
                    previous = None;
                }
                _ => match DigitSet::from_char(c).filter(|set| *set != DigitSet::PLUS) {
                    Some(set) => {
                        digits |= set;
                        previous = Some(c);
                    }
                    None => return Err(DialPlanError::invalid(self.text, at, "unexpected character in digit class")),
                },
            }
        }
        if digits.is_empty() {
            return Err(DialPlanError::invalid(self.text, start, "empty digit class"));
        }
        Ok(digits)
    }
}

/// Parse a whole pattern into its digit classes, depth by depth.
pub fn parse_pattern(text: &str) -> Result<Vec<DigitClass>, DialPlanError> {
    let mut cursor = DigitCursor::new(text);
    let mut classes = Vec::new();
    while let Some(class) = cursor.next_class(classes.len())? {
        classes.push(class);
    }
    Ok(classes)
}
