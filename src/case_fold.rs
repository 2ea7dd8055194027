//! Case folding for text keys.
//!
//! ASCII text is lowered byte-wise and only allocates when an uppercase
//! letter is present. Anything else is folded char by char with the simple
//! Unicode lowercase mapping, with final sigma folded onto `σ` so a word
//! compares the same regardless of where its sigma sits.

use std::borrow::Cow;

#[inline]
fn fold_char(c: char) -> impl Iterator<Item = char> {
    c.to_lowercase().map(|l| if l == 'ς' { 'σ' } else { l })
}

/// Returns the case-folded form of `text`.
pub fn fold(text: &str) -> Cow<'_, str> {
    if text.is_ascii() {
        if text.bytes().any(|b| b.is_ascii_uppercase()) {
            Cow::Owned(text.to_ascii_lowercase())
        } else {
            Cow::Borrowed(text)
        }
    } else {
        Cow::Owned(text.chars().flat_map(fold_char).collect())
    }
}

/// Whether `a` and `b` fold to the same text.
pub fn eq_folded(a: &str, b: &str) -> bool {
    if a.is_ascii() && b.is_ascii() {
        return a.eq_ignore_ascii_case(b);
    }
    a.chars().flat_map(fold_char).eq(b.chars().flat_map(fold_char))
}
