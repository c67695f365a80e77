//! URL slug derivation for titled content.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref NON_WORD: Regex = Regex::new(r"[^a-z0-9_\s-]").unwrap();
    static ref SEPARATORS: Regex = Regex::new(r"[\s-]+").unwrap();
}

/// Derives a URL slug from a human title.
///
/// The title is lowercased, characters outside `[a-z0-9_]` are stripped and
/// every run of whitespace or hyphens collapses into a single hyphen. Leading
/// and trailing hyphens are dropped, so `slugify(slugify(t)) == slugify(t)`.
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    let stripped = NON_WORD.replace_all(&lowered, "");
    let hyphenated = SEPARATORS.replace_all(stripped.trim(), "-");
    hyphenated.trim_matches('-').to_string()
}
