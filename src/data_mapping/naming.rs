//! Channel name normalization: display names, canonical keys, stable ids

use regex::Regex;

use crate::models::UNKNOWN_CHANNEL_NAME;

/// Strips cosmetic suffixes (quality tags, frame rates, bracketed notes) that
/// do not change which channel a name refers to.
#[derive(Debug, Clone)]
pub struct NameNormalizer {
    suffix_patterns: Vec<Regex>,
}

impl NameNormalizer {
    pub fn new(patterns: &[String]) -> Result<Self, regex::Error> {
        let mut suffix_patterns = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            suffix_patterns.push(Regex::new(pattern)?);
        }
        Ok(Self { suffix_patterns })
    }

    /// Name with every cosmetic suffix removed, applied until stable
    pub fn canonical_key(&self, name: &str) -> String {
        let mut current = name.trim().to_string();
        loop {
            let mut next = current.clone();
            for pattern in &self.suffix_patterns {
                next = pattern.replace(&next, "").trim().to_string();
            }
            if next == current || next.is_empty() {
                return current;
            }
            current = next;
        }
    }

    /// Lower-case alphanumerics of the canonical key.
    /// `stable_id("CCTV-1高清") == stable_id("CCTV-1") == "cctv1"`
    pub fn stable_id(&self, name: &str) -> String {
        self.canonical_key(name)
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect()
    }
}

/// Trimmed, single-spaced, free of characters that break an `#EXTINF` line
pub fn display_name(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| if c == '"' || c == ',' || c.is_control() { ' ' } else { c })
        .collect();
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.is_empty() {
        UNKNOWN_CHANNEL_NAME.to_string()
    } else {
        collapsed
    }
}
