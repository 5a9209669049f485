//! End-to-end runs with canned pages in place of the network and the browser

use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use multicast_m3u::config::{Config, EmptyResultPolicy};
use multicast_m3u::data_mapping::ChannelEnricher;
use multicast_m3u::errors::{PipelineError, SourceError, SourceResult};
use multicast_m3u::models::{PipelineState, RelayEndpoint};
use multicast_m3u::pipeline::Orchestrator;
use multicast_m3u::proxy::FilterEngine;
use multicast_m3u::sources::{FilePageFetcher, PageFetcher, PageRenderer};

const LISTING: &str = r#"<!DOCTYPE html>
<html><body>
<div class="container">
  <table class="table table-striped">
    <thead><tr><th>序号</th><th>频道名称</th><th>组播地址</th></tr></thead>
    <tbody>
      <tr><td>1</td><td>CCTV-1 综合</td><td>udp://@239.136.116.100:8000</td></tr>
      <tr><td>2</td><td>CCTV-5 体育</td><td>udp://@239.136.116.105:8000</td></tr>
      <tr><td>3</td><td>CCTV-5 体育 画中画</td><td>udp://@239.136.116.106:8000</td></tr>
      <tr><td>4</td><td>湖南卫视</td><td>udp://@239.136.118.101:8000</td></tr>
      <tr><td>5</td><td>金鹰卡通</td><td>udp://@239.136.118.300:8000</td></tr>
      <tr><td>6</td><td>湖南卫视</td><td>udp://@239.136.118.101:8000</td></tr>
    </tbody>
  </table>
</div>
</body></html>"#;

struct StaticPage(String);

#[async_trait]
impl PageFetcher for StaticPage {
    async fn fetch(&self, _url: &str) -> SourceResult<String> {
        Ok(self.0.clone())
    }
}

struct DownSource;

#[async_trait]
impl PageFetcher for DownSource {
    async fn fetch(&self, _url: &str) -> SourceResult<String> {
        Err(SourceError::Http {
            status: 502,
            message: "Bad Gateway".to_string(),
        })
    }
}

struct CountingRenderer {
    dom: String,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl PageRenderer for CountingRenderer {
    async fn render(&self, _url: &str) -> SourceResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.dom.clone())
    }
}

fn test_config(output_dir: &Path) -> Config {
    let mut config = Config::default();
    config.output_dir = output_dir.to_path_buf();
    config.timezone = Some("Asia/Shanghai".to_string());
    config.relays = vec![RelayEndpoint::new("192.168.16.254", 8866)];
    config
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

#[tokio::test]
async fn round_trip_single_channel_through_custom_relay_path() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    config.playlist.relay_path = "relay-path".to_string();
    config.playlist.epg_url = "https://epg.example.com/guide.xml".to_string();
    config.filter.block_substrings = vec!["画中画".to_string()];

    let page = "<table>\
        <tr><td>CCTV-1</td><td>udp://@239.136.116.100:8000</td></tr>\
        <tr><td>CCTV-5 画中画</td><td>udp://@239.136.116.106:8000</td></tr>\
        </table>";
    let mut orchestrator = Orchestrator::new(config, Box::new(StaticPage(page.to_string())), None);
    let report = orchestrator.run().await.unwrap();

    assert_eq!(report.final_state, PipelineState::Done);
    assert_eq!(report.filtered_out, 1);
    assert_eq!(report.documents.len(), 1);
    assert_eq!(report.documents[0].entries, 1);
    let content = read(&report.documents[0].path);
    let lines: Vec<&str> = content.lines().collect();

    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], "#EXTM3U x-tvg-url=\"https://epg.example.com/guide.xml\"");
    assert!(lines[1].starts_with("# Generated: "));
    assert_eq!(lines[2], "");
    assert_eq!(
        lines[3],
        "#EXTINF:-1 group-title=\"央视频道\" tvg-id=\"cctv1\" tvg-logo=\"https://epg.pw/logos/cctv1.png\",CCTV-1"
    );
    assert_eq!(
        lines[4],
        "http://192.168.16.254:8866/relay-path/239.136.116.100:8000/"
    );
}

#[tokio::test]
async fn listing_is_filtered_deduplicated_and_grouped() {
    let dir = tempfile::tempdir().unwrap();
    let mut orchestrator = Orchestrator::new(
        test_config(dir.path()),
        Box::new(StaticPage(LISTING.to_string())),
        None,
    );
    let report = orchestrator.run().await.unwrap();

    assert_eq!(report.extraction_strategy.as_deref(), Some("table"));
    assert_eq!(report.extracted, 5);
    assert_eq!(report.filtered_out, 1);
    assert_eq!(report.enriched, 4);
    assert_eq!(report.unparseable_addresses, 1);
    assert_eq!(report.documents[0].entries, 3);

    let content = read(&report.documents[0].path);
    assert!(!content.contains("画中画"));
    assert!(!content.contains("金鹰卡通"));

    let names: Vec<&str> = content
        .lines()
        .filter(|l| l.starts_with("#EXTINF"))
        .filter_map(|l| l.rsplit(',').next())
        .collect();
    assert_eq!(names, vec!["CCTV-1 综合", "CCTV-5 体育", "湖南卫视"]);
}

#[tokio::test]
async fn multiple_endpoints_get_identical_playlists_apart_from_relay() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    config.relays = vec![
        RelayEndpoint::new("192.168.16.254", 8866),
        RelayEndpoint::new("192.168.19.254", 8866).with_label("bedroom"),
    ];

    let mut orchestrator = Orchestrator::new(config, Box::new(StaticPage(LISTING.to_string())), None);
    let report = orchestrator.run().await.unwrap();

    assert_eq!(report.documents.len(), 2);
    assert_eq!(
        report.documents[0].path,
        dir.path().join("tv_channels_192.168.16.254_8866.m3u")
    );
    assert_eq!(report.documents[1].path, dir.path().join("bedroom.m3u"));

    let first = read(&report.documents[0].path);
    let second = read(&report.documents[1].path);
    assert_eq!(
        first.replace("192.168.16.254:8866", "RELAY"),
        second.replace("192.168.19.254:8866", "RELAY")
    );
    // No per-relay comment in the header
    assert!(!first.contains("192.168.19.254"));
}

#[tokio::test]
async fn unreachable_source_uses_exactly_the_filtered_fallback_channels() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    config.fallback.policy = EmptyResultPolicy::Fallback;

    let kept = FilterEngine::new(&config.filter)
        .apply(config.fallback.channels.clone())
        .kept;
    let mut expected: Vec<String> = ChannelEnricher::new(&config.enrichment, &config.icons)
        .unwrap()
        .enrich_all(kept)
        .into_iter()
        .map(|channel| {
            format!(
                "#EXTINF:-1 group-title=\"{}\" tvg-id=\"{}\" tvg-logo=\"{}\",{}",
                channel.group, channel.stable_id, channel.icon_url, channel.display_name
            )
        })
        .collect();
    expected.sort();

    let mut orchestrator = Orchestrator::new(config, Box::new(DownSource), None);
    let report = orchestrator.run().await.unwrap();

    assert!(report.fallback_used);
    assert_eq!(report.extraction_strategy.as_deref(), Some("fallback"));
    let content = read(&report.documents[0].path);
    let mut written: Vec<String> = content
        .lines()
        .filter(|l| l.starts_with("#EXTINF"))
        .map(str::to_string)
        .collect();
    written.sort();

    assert_eq!(written.len(), 3);
    assert_eq!(written, expected);
    assert!(!content.contains("画中画"));
}

#[tokio::test]
async fn unreachable_source_with_fail_policy_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    config.fallback.policy = EmptyResultPolicy::Fail;

    let mut orchestrator = Orchestrator::new(config, Box::new(DownSource), None);
    let err = orchestrator.run().await.unwrap_err();

    assert!(matches!(err, PipelineError::Source(SourceError::Http { status: 502, .. })));
    assert_eq!(orchestrator.state(), PipelineState::Failed);
    assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
}

#[tokio::test]
async fn everything_filtered_still_writes_header_only_playlists() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    config.filter.block_substrings = vec!["CCTV".to_string(), "卫视".to_string(), "卡通".to_string()];

    let mut orchestrator =
        Orchestrator::new(config, Box::new(StaticPage(LISTING.to_string())), None);
    let report = orchestrator.run().await.unwrap();

    assert_eq!(report.enriched, 0);
    let content = read(&report.documents[0].path);
    assert!(content.starts_with("#EXTM3U"));
    assert!(content.contains("# No valid channels"));
    assert!(!content.contains("#EXTINF"));
}

#[tokio::test]
async fn renderer_is_only_consulted_when_static_extraction_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let calls = Arc::new(AtomicUsize::new(0));
    let renderer = CountingRenderer {
        dom: LISTING.to_string(),
        calls: Arc::clone(&calls),
    };

    let mut config = test_config(dir.path());
    config.fallback.policy = EmptyResultPolicy::Fail;
    let shell = "<html><body><div id=\"app\"></div><script src=\"app.js\"></script></body></html>";
    let mut orchestrator = Orchestrator::new(
        config.clone(),
        Box::new(StaticPage(shell.to_string())),
        Some(Box::new(renderer)),
    );
    let report = orchestrator.run().await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(report.extraction_strategy.as_deref(), Some("rendered-dom/table"));
    assert_eq!(report.documents[0].entries, 3);

    let renderer = CountingRenderer {
        dom: String::new(),
        calls: Arc::clone(&calls),
    };
    let mut orchestrator = Orchestrator::new(
        config,
        Box::new(StaticPage(LISTING.to_string())),
        Some(Box::new(renderer)),
    );
    orchestrator.run().await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn saved_page_can_be_used_as_input() {
    let dir = tempfile::tempdir().unwrap();
    let page = dir.path().join("listing.html");
    std::fs::write(&page, LISTING).unwrap();
    let output = dir.path().join("out");

    let mut orchestrator = Orchestrator::new(
        test_config(&output),
        Box::new(FilePageFetcher::new(&page)),
        None,
    );
    let report = orchestrator.run().await.unwrap();

    assert!(output.join("tv_channels_192.168.16.254_8866.m3u").exists());
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["final_state"], "done");
    assert_eq!(json["documents"][0]["entries"], 3);
}
