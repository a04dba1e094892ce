//! Vendor name canonicalization
//!
//! Raw vendor names arrive with trailing account or suite numbers,
//! parenthesized qualifiers and inconsistent casing. [`normalize`] reduces
//! them to a comparable key; [`custom_normalize`] additionally folds known
//! aliases onto one key.

use once_cell::sync::Lazy;
use regex::Regex;

/// Key every Charter variant collapses to
pub const CHARTER_KEY: &str = "spectrum business";

/// Known vendor aliases, keyed by normalized name
pub const VENDOR_ALIASES: &[(&str, &str)] = &[
    ("granite telecommunications", "granite communications"),
    ("windstream", "windstream communication"),
    ("charter communications", CHARTER_KEY),
];

static TRAILING_DIGITS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+\d+$").expect("hardcoded regex should be valid"));

static PARENTHESIZED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(.*?\)").expect("hardcoded regex should be valid"));

/// Normalize a vendor name into a comparison key
///
/// Trims, lowercases, drops a trailing run of digits and every
/// parenthesized substring, then trims again. The removals repeat until
/// nothing changes so that `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(raw: &str) -> String {
    let mut current = raw.trim().to_lowercase();

    loop {
        let without_digits = TRAILING_DIGITS.replace(&current, "");
        let without_parens = PARENTHESIZED.replace_all(&without_digits, "");
        let next = without_parens.trim().to_string();
        if next == current {
            return next;
        }
        current = next;
    }
}

/// Alias registered for an already-normalized name
pub fn alias_for(normalized: &str) -> Option<&'static str> {
    VENDOR_ALIASES
        .iter()
        .find(|(name, _)| *name == normalized)
        .map(|(_, alias)| *alias)
}

/// Normalize a vendor name and fold it onto its canonical alias
///
/// Anything mentioning "charter" becomes [`CHARTER_KEY`] before the alias
/// table is consulted.
pub fn custom_normalize(raw: &str) -> String {
    let normalized = normalize(raw);
    if normalized.contains("charter") {
        return CHARTER_KEY.to_string();
    }
    match alias_for(&normalized) {
        Some(alias) => alias.to_string(),
        None => normalized,
    }
}
