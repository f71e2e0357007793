//! French-style string ordering
//!
//! Comparison is case- and accent-insensitive at the primary level, so that
//! "é" sorts next to "e" and "Zola" next to "zola". Ties at the primary level
//! fall back to the raw strings to keep the ordering total.

use std::cmp::Ordering;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Lower-case and strip diacritics ("Éditions" -> "editions")
pub fn fold(s: &str) -> String {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Compare two strings with primary-strength collation
pub fn compare(a: &str, b: &str) -> Ordering {
    fold(a).cmp(&fold(b)).then_with(|| a.cmp(b))
}
