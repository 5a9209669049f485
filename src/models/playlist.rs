//! Playlist document model and its extended-M3U rendering

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::RelayEndpoint;

/// Format of the generation-time comment in the playlist header
pub const GENERATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single `#EXTINF` block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistEntry {
    pub stable_id: String,
    pub icon_url: String,
    pub group: String,
    pub display_name: String,
    pub stream_url: String,
}

/// Playlist for one relay endpoint, entries already grouped and ordered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistDocument {
    pub endpoint: RelayEndpoint,
    pub epg_url: String,
    pub generated_at: DateTime<FixedOffset>,
    pub entries: Vec<PlaylistEntry>,
}

impl PlaylistDocument {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// File name derived from the endpoint label
    pub fn file_name(&self) -> String {
        self.endpoint.file_name()
    }

    /// Render the document as extended M3U text
    pub fn render(&self) -> String {
        let mut lines = Vec::with_capacity(self.entries.len() * 3 + 4);
        lines.push(format!("#EXTM3U x-tvg-url=\"{}\"", self.epg_url));
        lines.push(format!(
            "# Generated: {}",
            self.generated_at.format(GENERATED_AT_FORMAT)
        ));
        if self.entries.is_empty() {
            lines.push("# No valid channels".to_string());
        }
        lines.push(String::new());

        for entry in &self.entries {
            lines.push(format!(
                "#EXTINF:-1 group-title=\"{}\" tvg-id=\"{}\" tvg-logo=\"{}\",{}",
                attribute_value(&entry.group),
                attribute_value(&entry.stable_id),
                attribute_value(&entry.icon_url),
                entry.display_name
            ));
            lines.push(entry.stream_url.clone());
            lines.push(String::new());
        }

        let mut content = lines.join("\n");
        if !content.ends_with('\n') {
            content.push('\n');
        }
        content
    }
}

/// Quotes would terminate the attribute early
fn attribute_value(value: &str) -> String {
    value.replace('"', "'")
}
