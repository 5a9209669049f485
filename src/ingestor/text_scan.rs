//! Whole-text regex scan: addresses anywhere in the flattened page, named
//! from a closed list of known channel names found nearby.

use scraper::Html;
use tracing::debug;

use super::address::find_addresses;
use super::ExtractionStrategy;
use crate::config::ExtractionConfig;
use crate::models::RawRecord;

pub struct TextScanStrategy {
    context_window: usize,
    known_names: Vec<String>,
}

/// A known name found near a token; ordered so the best candidate is smallest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Candidate {
    distance: usize,
    longer_first: std::cmp::Reverse<usize>,
    after_token: bool,
}

impl TextScanStrategy {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            context_window: config.context_window,
            known_names: config
                .known_channel_names
                .iter()
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .collect(),
        }
    }

    fn flatten(content: &str) -> String {
        Html::parse_document(content)
            .root_element()
            .text()
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn nearest_name(&self, before: &str, after: &str) -> Option<&str> {
        self.known_names
            .iter()
            .filter_map(|name| {
                let length = std::cmp::Reverse(name.chars().count());
                let preceding = before.rfind(name.as_str()).map(|pos| Candidate {
                    distance: before[pos + name.len()..].chars().count(),
                    longer_first: length,
                    after_token: false,
                });
                let following = after.find(name.as_str()).map(|pos| Candidate {
                    distance: after[..pos].chars().count(),
                    longer_first: length,
                    after_token: true,
                });
                let best = match (preceding, following) {
                    (Some(p), Some(f)) => Some(p.min(f)),
                    (p, f) => p.or(f),
                };
                best.map(|candidate| (candidate, name.as_str()))
            })
            .min_by_key(|(candidate, _)| *candidate)
            .map(|(_, name)| name)
    }
}

/// Byte offset `count` chars before `index`, clamped to the start
fn back_chars(text: &str, index: usize, count: usize) -> usize {
    if count == 0 {
        return index;
    }
    text[..index]
        .char_indices()
        .rev()
        .nth(count.saturating_sub(1))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Byte offset `count` chars after `index`, clamped to the end
fn forward_chars(text: &str, index: usize, count: usize) -> usize {
    text[index..]
        .char_indices()
        .nth(count)
        .map(|(i, _)| index + i)
        .unwrap_or(text.len())
}

impl ExtractionStrategy for TextScanStrategy {
    fn name(&self) -> &'static str {
        "text-scan"
    }

    fn extract(&self, content: &str) -> Vec<RawRecord> {
        let text = Self::flatten(content);

        let records: Vec<RawRecord> = find_addresses(&text)
            .map(|token| {
                let window_start = back_chars(&text, token.start(), self.context_window);
                let window_end = forward_chars(&text, token.end(), self.context_window);
                let before = &text[window_start..token.start()];
                let after = &text[token.end()..window_end];

                match self.nearest_name(before, after) {
                    Some(name) => RawRecord::new(name, token.as_str()),
                    None => RawRecord::unnamed(token.as_str()),
                }
            })
            .collect();

        debug!("Text-scan strategy matched {} addresses", records.len());
        records
    }
}
