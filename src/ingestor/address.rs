//! Address token recognition shared by every extraction strategy

use regex::{Match, Regex};
use std::sync::OnceLock;

/// Optional `scheme://`, optional `@`, dotted IPv4 literal, port
pub const ADDRESS_TOKEN_PATTERN: &str =
    r"(?:[a-zA-Z][a-zA-Z0-9+.-]*://)?@?\d{1,3}(?:\.\d{1,3}){3}:\d{1,5}";

fn address_token() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| Regex::new(ADDRESS_TOKEN_PATTERN).expect("address token pattern is valid"))
}

/// First address token in `text`
pub fn find_address(text: &str) -> Option<Match<'_>> {
    address_token().find(text)
}

/// Every address token in `text`, left to right
pub fn find_addresses(text: &str) -> impl Iterator<Item = Match<'_>> {
    address_token().find_iter(text)
}

/// Row numbers, indices and stray counters are never channel names
pub fn is_numeric_label(text: &str) -> bool {
    let trimmed = text.trim();
    !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|c| c.is_ascii_digit() || c == '.' || c == '#' || c.is_whitespace())
}
