use chrono::{DateTime, FixedOffset};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::PlaylistConfig;
use crate::errors::{PipelineError, PipelineResult};
use crate::models::*;

/// Documents plus the number of channels left out for lack of a valid address
#[derive(Debug, Clone)]
pub struct SynthesisOutcome {
    pub documents: Vec<PlaylistDocument>,
    pub skipped: usize,
}

pub struct PlaylistGenerator {
    epg_url: String,
    scheme: String,
    relay_path: String,
    group_order: Vec<String>,
}

impl PlaylistGenerator {
    pub fn new(config: &PlaylistConfig) -> Self {
        Self {
            epg_url: config.epg_url.clone(),
            scheme: config.scheme.clone(),
            relay_path: config.relay_path.trim_matches('/').to_string(),
            group_order: config.group_order.clone(),
        }
    }

    /// `{scheme}://{relay}/{relay_path}/{ip}:{port}/`
    pub fn stream_url(&self, endpoint: &RelayEndpoint, address: &MulticastAddress) -> String {
        if self.relay_path.is_empty() {
            format!(
                "{}://{}:{}/{}/",
                self.scheme, endpoint.host, endpoint.port, address
            )
        } else {
            format!(
                "{}://{}:{}/{}/{}/",
                self.scheme, endpoint.host, endpoint.port, self.relay_path, address
            )
        }
    }

    /// One document per endpoint, in endpoint order
    pub fn synthesize(
        &self,
        channels: &[ChannelEntity],
        endpoints: &[RelayEndpoint],
        generated_at: DateTime<FixedOffset>,
    ) -> Vec<PlaylistDocument> {
        self.synthesize_with_stats(channels, endpoints, generated_at)
            .documents
    }

    pub fn synthesize_with_stats(
        &self,
        channels: &[ChannelEntity],
        endpoints: &[RelayEndpoint],
        generated_at: DateTime<FixedOffset>,
    ) -> SynthesisOutcome {
        let mut playable: Vec<(&ChannelEntity, MulticastAddress)> = Vec::with_capacity(channels.len());
        let mut skipped = 0;

        for channel in channels {
            match channel.address {
                Some(address) => playable.push((channel, address)),
                None => {
                    info!(
                        "Skipping '{}': unparseable address '{}'",
                        channel.display_name, channel.raw_address
                    );
                    skipped += 1;
                }
            }
        }

        let ordered = self.order_by_group(playable);

        let documents = endpoints
            .iter()
            .map(|endpoint| {
                let entries: Vec<PlaylistEntry> = ordered
                    .iter()
                    .map(|(channel, address)| PlaylistEntry {
                        stable_id: channel.stable_id.clone(),
                        icon_url: channel.icon_url.clone(),
                        group: channel.group.clone(),
                        display_name: channel.display_name.clone(),
                        stream_url: self.stream_url(endpoint, address),
                    })
                    .collect();

                debug!("Playlist for {} has {} entries", endpoint, entries.len());
                PlaylistDocument {
                    endpoint: endpoint.clone(),
                    epg_url: self.epg_url.clone(),
                    generated_at,
                    entries,
                }
            })
            .collect();

        SynthesisOutcome { documents, skipped }
    }

    /// Configured groups first, then the rest in first-seen order.
    /// Stable within a group.
    fn order_by_group<'a>(
        &self,
        channels: Vec<(&'a ChannelEntity, MulticastAddress)>,
    ) -> Vec<(&'a ChannelEntity, MulticastAddress)> {
        let mut seen_groups: Vec<&str> = Vec::new();
        for &(channel, _) in &channels {
            if !seen_groups.contains(&channel.group.as_str()) {
                seen_groups.push(channel.group.as_str());
            }
        }

        let rank = |group: &str| -> usize {
            match self.group_order.iter().position(|g| g == group) {
                Some(position) => position,
                None => {
                    self.group_order.len()
                        + seen_groups.iter().position(|g| *g == group).unwrap_or(0)
                }
            }
        };

        let mut ranked: Vec<(usize, (&'a ChannelEntity, MulticastAddress))> = channels
            .into_iter()
            .map(|entry| (rank(entry.0.group.as_str()), entry))
            .collect();
        ranked.sort_by_key(|(rank, _)| *rank);
        ranked.into_iter().map(|(_, entry)| entry).collect()
    }

    /// Write a rendered document to `{output_dir}/{label}.m3u`
    pub fn save_playlist(document: &PlaylistDocument, output_dir: &Path) -> PipelineResult<PathBuf> {
        std::fs::create_dir_all(output_dir).map_err(|source| PipelineError::Output {
            path: output_dir.to_path_buf(),
            source,
        })?;

        let file_path = output_dir.join(document.file_name());
        std::fs::write(&file_path, document.render()).map_err(|source| PipelineError::Output {
            path: file_path.clone(),
            source,
        })?;

        Ok(file_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn channel(name: &str, group: &str, address: &str) -> ChannelEntity {
        ChannelEntity {
            display_name: name.to_string(),
            raw_address: address.to_string(),
            address: MulticastAddress::parse(address),
            group: group.to_string(),
            icon_url: "https://example.com/logo.png".to_string(),
            stable_id: name.to_lowercase(),
        }
    }

    fn generated_at() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(8 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 5, 1, 8, 0, 0)
            .unwrap()
    }

    fn generator(group_order: &[&str]) -> PlaylistGenerator {
        PlaylistGenerator::new(&PlaylistConfig {
            group_order: group_order.iter().map(|s| s.to_string()).collect(),
            ..PlaylistConfig::default()
        })
    }

    #[test]
    fn test_stream_url_template() {
        let gen = PlaylistGenerator::new(&PlaylistConfig {
            relay_path: "/relay-path/".to_string(),
            ..PlaylistConfig::default()
        });
        let address = MulticastAddress::parse("udp://@239.136.116.100:8000").unwrap();
        assert_eq!(
            gen.stream_url(&RelayEndpoint::new("192.168.16.254", 8866), &address),
            "http://192.168.16.254:8866/relay-path/239.136.116.100:8000/"
        );
    }

    #[test]
    fn test_group_order_then_first_seen() {
        let channels = vec![
            channel("b1", "B", "239.1.1.1:1"),
            channel("x1", "X", "239.1.1.2:1"),
            channel("a1", "A", "239.1.1.3:1"),
            channel("b2", "B", "239.1.1.4:1"),
            channel("y1", "Y", "239.1.1.5:1"),
            channel("x2", "X", "239.1.1.6:1"),
        ];

        let docs = generator(&["A", "B"]).synthesize(
            &channels,
            &[RelayEndpoint::new("10.0.0.1", 4022)],
            generated_at(),
        );
        let names: Vec<&str> = docs[0].entries.iter().map(|e| e.display_name.as_str()).collect();
        assert_eq!(names, vec!["a1", "b1", "b2", "x1", "x2", "y1"]);
    }

    #[test]
    fn test_unparseable_addresses_are_skipped_and_counted() {
        let channels = vec![
            channel("good", "A", "udp://@239.1.1.1:1234"),
            channel("bad", "A", "udp://@not-an-ip:1234"),
        ];
        let outcome = generator(&[]).synthesize_with_stats(
            &channels,
            &[RelayEndpoint::new("10.0.0.1", 4022), RelayEndpoint::new("10.0.0.2", 4022)],
            generated_at(),
        );

        assert_eq!(outcome.skipped, 1);
        assert_eq!(outcome.documents.len(), 2);
        assert!(outcome.documents.iter().all(|d| d.entries.len() == 1));
    }

    #[test]
    fn test_endpoints_differ_only_in_relay_address() {
        let channels = vec![channel("CCTV-1", "央视频道", "udp://@239.136.116.100:8000")];
        let docs = generator(&[]).synthesize(
            &channels,
            &[
                RelayEndpoint::new("192.168.16.254", 8866),
                RelayEndpoint::new("192.168.19.254", 8866),
            ],
            generated_at(),
        );

        let first = docs[0].render().replace("192.168.16.254:8866", "RELAY");
        let second = docs[1].render().replace("192.168.19.254:8866", "RELAY");
        assert_eq!(first, second);
    }

    #[test]
    fn test_save_playlist_writes_label_file() {
        let dir = tempfile::tempdir().unwrap();
        let docs = generator(&[]).synthesize(
            &[],
            &[RelayEndpoint::new("10.0.0.1", 4022).with_label("lab")],
            generated_at(),
        );

        let path = PlaylistGenerator::save_playlist(&docs[0], dir.path()).unwrap();
        assert_eq!(path, dir.path().join("lab.m3u"));
        let written = std::fs::read_to_string(path).unwrap();
        assert!(written.contains("# No valid channels"));
    }
}
