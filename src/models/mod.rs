use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use std::path::PathBuf;

pub mod playlist;

pub use playlist::{PlaylistDocument, PlaylistEntry};

/// Name given to an address whose channel name could not be resolved
pub const UNKNOWN_CHANNEL_NAME: &str = "unknown";

/// A `(name, address)` pair as scraped from the listing page, unvalidated
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RawRecord {
    pub name: String,
    pub address: String,
}

impl RawRecord {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }

    /// Record for an address token with no resolvable name
    pub fn unnamed(address: impl Into<String>) -> Self {
        Self::new(UNKNOWN_CHANNEL_NAME, address)
    }
}

/// Multicast group address parsed from a scraped `udp://@ip:port` style token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MulticastAddress {
    pub host: Ipv4Addr,
    pub port: u16,
}

impl MulticastAddress {
    /// Parse a raw address, stripping any `scheme://` prefix and a leading `@`.
    ///
    /// Exactly two colon-delimited parts must remain: an IPv4 literal and a port.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let without_scheme = match trimmed.find("://") {
            Some(pos) => &trimmed[pos + 3..],
            None => trimmed,
        };
        let bare = without_scheme
            .strip_prefix('@')
            .unwrap_or(without_scheme)
            .trim_end_matches('/');

        let parts: Vec<&str> = bare.split(':').collect();
        if parts.len() != 2 {
            return None;
        }

        let host = parts[0].trim().parse::<Ipv4Addr>().ok()?;
        let port = parts[1].trim().parse::<u16>().ok()?;
        Some(Self { host, port })
    }
}

impl fmt::Display for MulticastAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Fully enriched channel, created once per surviving record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelEntity {
    pub display_name: String,
    /// Address text exactly as scraped
    pub raw_address: String,
    /// `None` when `raw_address` is not a valid multicast address
    pub address: Option<MulticastAddress>,
    pub group: String,
    pub icon_url: String,
    pub stable_id: String,
}

/// A udpxy-style relay that turns multicast groups into HTTP streams
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelayEndpoint {
    pub host: String,
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl RelayEndpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Label used to name this endpoint's playlist file
    pub fn output_label(&self) -> String {
        match &self.label {
            Some(label) if !label.trim().is_empty() => label.trim().to_string(),
            _ => format!("tv_channels_{}_{}", self.host, self.port),
        }
    }

    /// Playlist file name, with path-hostile characters replaced
    pub fn file_name(&self) -> String {
        let label: String = self
            .output_label()
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
                c if c.is_control() => '_',
                c => c,
            })
            .collect();
        format!("{label}.m3u")
    }
}

impl fmt::Display for RelayEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Orchestrator states, in pipeline order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineState {
    Fetching,
    Extracting,
    Filtering,
    Enriching,
    Synthesizing,
    Writing,
    Done,
    Failed,
}

impl PipelineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineState::Fetching => "fetching",
            PipelineState::Extracting => "extracting",
            PipelineState::Filtering => "filtering",
            PipelineState::Enriching => "enriching",
            PipelineState::Synthesizing => "synthesizing",
            PipelineState::Writing => "writing",
            PipelineState::Done => "done",
            PipelineState::Failed => "failed",
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One playlist file written by a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WrittenDocument {
    pub label: String,
    pub relay: String,
    pub path: PathBuf,
    pub entries: usize,
}

/// Per-stage counts for a single pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub source_url: String,
    pub extracted: usize,
    pub extraction_strategy: Option<String>,
    pub fallback_used: bool,
    pub filtered_out: usize,
    pub enriched: usize,
    pub unparseable_addresses: usize,
    pub documents: Vec<WrittenDocument>,
    pub final_state: PipelineState,
}

impl RunReport {
    pub fn new(source_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            extracted: 0,
            extraction_strategy: None,
            fallback_used: false,
            filtered_out: 0,
            enriched: 0,
            unparseable_addresses: 0,
            documents: Vec::new(),
            final_state: PipelineState::Fetching,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_udp_address_with_at_prefix() {
        let addr = MulticastAddress::parse("udp://@239.136.116.100:8000").unwrap();
        assert_eq!(addr.host, Ipv4Addr::new(239, 136, 116, 100));
        assert_eq!(addr.port, 8000);
        assert_eq!(addr.to_string(), "239.136.116.100:8000");
    }

    #[test]
    fn test_parse_bare_and_rtp_addresses() {
        assert!(MulticastAddress::parse("239.1.1.1:1234").is_some());
        assert!(MulticastAddress::parse("@239.1.1.1:1234").is_some());
        assert!(MulticastAddress::parse("rtp://239.1.1.1:5140/").is_some());
    }

    #[test]
    fn test_parse_rejects_malformed_addresses() {
        assert!(MulticastAddress::parse("").is_none());
        assert!(MulticastAddress::parse("udp://@239.1.1.1").is_none());
        assert!(MulticastAddress::parse("udp://@239.1.1.1:80:90").is_none());
        assert!(MulticastAddress::parse("udp://@239.1.1.300:8000").is_none());
        assert!(MulticastAddress::parse("udp://@239.1.1.1:70000").is_none());
        assert!(MulticastAddress::parse("udp://@host.example:8000").is_none());
    }

    #[test]
    fn test_relay_output_label() {
        let relay = RelayEndpoint::new("192.168.16.254", 8866);
        assert_eq!(relay.output_label(), "tv_channels_192.168.16.254_8866");
        assert_eq!(relay.with_label("living-room").output_label(), "living-room");
    }
}
