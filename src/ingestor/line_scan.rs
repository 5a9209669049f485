//! Heuristic line-scan strategy for listings laid out as text lines

use regex::Regex;
use tracing::debug;

use super::address::{find_addresses, is_numeric_label};
use super::ExtractionStrategy;
use crate::models::{RawRecord, UNKNOWN_CHANNEL_NAME};

const SEPARATORS: &[char] = &['|', ',', '，', '\t', ';', '；'];

pub struct LineScanStrategy {
    markup: Option<Regex>,
}

impl LineScanStrategy {
    pub fn new() -> Self {
        Self {
            markup: Regex::new(r"<[^>]*>").ok(),
        }
    }

    /// Tags become separators so adjacent cells on one line stay apart
    fn strip_markup(&self, line: &str) -> String {
        let stripped = match &self.markup {
            Some(re) => re.replace_all(line, "|").into_owned(),
            None => line.to_string(),
        };
        stripped
            .replace("&nbsp;", " ")
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&amp;", "&")
    }

    fn clean_segment(segment: &str) -> Option<String> {
        let cleaned = segment
            .trim()
            .trim_end_matches(|c: char| c == ':' || c == '：' || c == '-' || c.is_whitespace())
            .trim();
        if cleaned.is_empty() || is_numeric_label(cleaned) {
            return None;
        }
        Some(Self::strip_row_number(cleaned).to_string())
    }

    /// `"1 CCTV-1 综合"` -> `"CCTV-1 综合"`
    fn strip_row_number(segment: &str) -> &str {
        match segment.split_once(char::is_whitespace) {
            Some((first, rest)) if is_numeric_label(first) && !rest.trim().is_empty() => {
                rest.trim_start()
            }
            _ => segment,
        }
    }

    fn name_before(text: &str) -> Option<String> {
        text.split(SEPARATORS).rev().find_map(Self::clean_segment)
    }

    fn name_after(text: &str) -> Option<String> {
        text.split(SEPARATORS)
            .map(str::trim)
            .find(|segment| !segment.is_empty())
            .and_then(Self::clean_segment)
    }

    fn scan_line(line: &str, records: &mut Vec<RawRecord>) {
        let tokens: Vec<(usize, usize)> = find_addresses(line).map(|m| (m.start(), m.end())).collect();

        for (i, &(start, end)) in tokens.iter().enumerate() {
            let previous_end = if i == 0 { 0 } else { tokens[i - 1].1 };
            let next_start = tokens.get(i + 1).map(|t| t.0).unwrap_or(line.len());
            let address = &line[start..end];

            let name = Self::name_before(&line[previous_end..start])
                .or_else(|| Self::name_after(&line[end..next_start]));

            records.push(match name {
                Some(name) => RawRecord::new(name, address),
                None => RawRecord::unnamed(address),
            });
        }
    }
}

impl Default for LineScanStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionStrategy for LineScanStrategy {
    fn name(&self) -> &'static str {
        "line-scan"
    }

    fn extract(&self, content: &str) -> Vec<RawRecord> {
        let mut records = Vec::new();
        for line in content.lines() {
            let line = self.strip_markup(line);
            Self::scan_line(&line, &mut records);
        }

        // Addresses alone on their lines are a layout this strategy cannot name
        if records.iter().all(|record| record.name == UNKNOWN_CHANNEL_NAME) {
            debug!(
                "Line-scan found {} addresses but no names, deferring",
                records.len()
            );
            return Vec::new();
        }

        debug!("Line-scan strategy matched {} addresses", records.len());
        records
    }
}
