//! Value normalization applied before hashing
//!
//! Transforms always run in the same order: trim, lowercase, uppercase.
//! Lowercase and uppercase are meant to be exclusive; when both are set
//! both are applied, so uppercase wins.
//!
//! Case conversion is the Unicode *simple* mapping: each code point maps to
//! exactly one code point and its neighbours are never consulted. So `ß`
//! stays `ß` when uppercased and a final `Σ` lowercases to `σ`. Digests of
//! case-folded values depend on this staying fixed.

use std::borrow::Cow;

/// Normalization steps applied to a leaf value before it is hashed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValueTransform {
    /// Strip leading and trailing whitespace
    pub trim: bool,

    /// Convert to lowercase
    pub lowercase: bool,

    /// Convert to uppercase
    pub uppercase: bool,
}

impl ValueTransform {
    /// Returns true if no step is enabled
    pub fn is_identity(&self) -> bool {
        !self.trim && !self.lowercase && !self.uppercase
    }

    /// Returns true if both case conversions are enabled
    pub fn has_case_conflict(&self) -> bool {
        self.lowercase && self.uppercase
    }

    /// Apply the enabled steps in fixed order
    pub fn apply<'a>(&self, value: &'a str) -> Cow<'a, str> {
        let mut out = Cow::Borrowed(value);

        if self.trim {
            out = match out {
                Cow::Borrowed(s) => Cow::Borrowed(s.trim()),
                Cow::Owned(s) => Cow::Owned(s.trim().to_string()),
            };
        }
        if self.lowercase {
            out = map_chars(out, simple_lowercase);
        }
        if self.uppercase {
            out = map_chars(out, simple_uppercase);
        }

        out
    }
}

fn map_chars(value: Cow<'_, str>, map: fn(char) -> char) -> Cow<'_, str> {
    if value.chars().all(|c| map(c) == c) {
        value
    } else {
        Cow::Owned(value.chars().map(map).collect())
    }
}

/// Single code point lowercase mapping
pub fn simple_lowercase(c: char) -> char {
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        // U+0130 is the only code point whose full mapping expands
        _ if c == '\u{0130}' => 'i',
        _ => c,
    }
}

/// Single code point uppercase mapping
pub fn simple_uppercase(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) => u,
        // Greek letters with ypogegrammeni have a one code point
        // uppercase (the prosgegrammeni form) besides the expanding one
        _ => match c {
            '\u{1F80}'..='\u{1F87}' | '\u{1F90}'..='\u{1F97}' | '\u{1FA0}'..='\u{1FA7}' => {
                char::from_u32(c as u32 + 8).unwrap_or(c)
            }
            '\u{1FB3}' => '\u{1FBC}',
            '\u{1FC3}' => '\u{1FCC}',
            '\u{1FF3}' => '\u{1FFC}',
            _ => c,
        },
    }
}
