//! Tiny case-insensitive glob matcher for rule 011 (symbol blocklist
//! patterns, e.g. `MNQ*`, `*CRYPTO*`). Supports `*` (any run of characters)
//! and `?` (exactly one character) — the same two wildcards `fnmatch` gives
//! the source implementation.

pub fn matches(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.to_ascii_lowercase().chars().collect();
    let text: Vec<char> = text.to_ascii_lowercase().chars().collect();
    matches_from(&pattern, &text)
}

fn matches_from(pattern: &[char], text: &[char]) -> bool {
    match pattern.first() {
        None => text.is_empty(),
        Some('*') => {
            matches_from(&pattern[1..], text) || (!text.is_empty() && matches_from(pattern, &text[1..]))
        }
        Some('?') => !text.is_empty() && matches_from(&pattern[1..], &text[1..]),
        Some(c) => !text.is_empty() && text[0] == *c && matches_from(&pattern[1..], &text[1..]),
    }
}
