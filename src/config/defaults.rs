/// Configuration default values
///
/// This module contains the default values for configuration options, taken
/// from the deployment the generator was first written for, so a run without
/// any config file still produces usable playlists.
use crate::models::{RawRecord, RelayEndpoint};

// Output defaults
pub const DEFAULT_OUTPUT_DIR: &str = "./output";

// Source defaults
pub const DEFAULT_SOURCE_URL: &str = "https://epg.51zmt.top:8001/multicast/";
pub const DEFAULT_SOURCE_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_ACCEPT_INVALID_CERTS: bool = true;
pub const DEFAULT_USER_AGENT: &str = concat!("multicast-m3u/", env!("CARGO_PKG_VERSION"));

// Render defaults
pub const DEFAULT_RENDER_COMMAND: &str = "chromium";
pub const DEFAULT_RENDER_TIMEOUT_SECS: u64 = 45;

// Extraction defaults
pub const DEFAULT_CONTEXT_WINDOW: usize = 48;

// Playlist defaults
pub const DEFAULT_EPG_URL: &str = "https://epg.112114.xyz/epg.xml";
pub const DEFAULT_SCHEME: &str = "http";
pub const DEFAULT_RELAY_PATH: &str = "udp";

// Enrichment defaults
pub const DEFAULT_GROUP: &str = "其他频道";

// Icon defaults
pub const DEFAULT_PLACEHOLDER_TEMPLATE: &str = "https://via.placeholder.com/120x80?text={}";
pub const DEFAULT_PLACEHOLDER_MAX_CHARS: usize = 6;
pub const DEFAULT_PLACEHOLDER_TEXT: &str = "TV";

pub fn default_render_args() -> Vec<String> {
    ["--headless", "--disable-gpu", "--no-sandbox", "--dump-dom"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

pub fn default_block_substrings() -> Vec<String> {
    ["画中画", "PIP", "pip"].iter().map(|s| s.to_string()).collect()
}

pub fn default_relays() -> Vec<RelayEndpoint> {
    vec![
        RelayEndpoint::new("192.168.16.254", 8866),
        RelayEndpoint::new("192.168.19.254", 8866),
    ]
}

/// Ordered `(label, prefixes)` pairs; the first matching label wins
pub const DEFAULT_GROUP_RULES: &[(&str, &[&str])] = &[
    ("央视频道", &["CCTV-", "中央"]),
    (
        "卫视频道",
        &["湖南", "浙江", "江苏", "东方", "北京", "安徽", "广东", "山东", "四川"],
    ),
    (
        "地方频道",
        &["上海", "天津", "重庆", "河北", "河南", "辽宁", "黑龙江"],
    ),
    ("影视频道", &["电影", "影视", "剧场", "电视剧"]),
    ("体育频道", &["体育", "CCTV-5", "CCTV-5+"]),
    ("少儿频道", &["少儿", "CCTV-14", "卡通"]),
    ("新闻频道", &["新闻", "CCTV-13", "财经"]),
    ("综艺频道", &["综艺", "CCTV-3", "湖南卫视"]),
    ("科教频道", &["科教", "CCTV-10", "纪录"]),
];

/// Suffixes that do not change which channel a name refers to
pub fn default_cosmetic_suffix_patterns() -> Vec<String> {
    vec![
        r"\s*(?:超高清|高清|标清)$".to_string(),
        r"(?i)\s+(?:4K|8K|UHD|FHD|HD|SD)$".to_string(),
        r"(?i)\s*\d+\s*(?:P|I|FPS|帧)$".to_string(),
        r"\s*[\(（\[【][^\)）\]】]*[\)）\]】]$".to_string(),
    ]
}

pub const EPG_PW_BASE_URL: &str = "https://epg.pw/logos/";
pub const EPG_PW_LOGOS: &[(&str, &str)] = &[
    ("CCTV-1", "cctv1.png"),
    ("CCTV-2", "cctv2.png"),
    ("CCTV-3", "cctv3.png"),
    ("CCTV-4", "cctv4.png"),
    ("CCTV-5", "cctv5.png"),
    ("CCTV-6", "cctv6.png"),
    ("CCTV-7", "cctv7.png"),
    ("CCTV-8", "cctv8.png"),
    ("CCTV-9", "cctv9.png"),
    ("CCTV-10", "cctv10.png"),
    ("CCTV-11", "cctv11.png"),
    ("CCTV-12", "cctv12.png"),
    ("CCTV-13", "cctv13.png"),
    ("CCTV-14", "cctv14.png"),
    ("CCTV-15", "cctv15.png"),
    ("湖南卫视", "hunan.png"),
    ("浙江卫视", "zhejiang.png"),
    ("江苏卫视", "jiangsu.png"),
    ("东方卫视", "dongfang.png"),
    ("北京卫视", "beijing.png"),
    ("安徽卫视", "anhui.png"),
    ("广东卫视", "guangdong.png"),
    ("山东卫视", "shandong.png"),
    ("四川卫视", "sichuan.png"),
    ("深圳卫视", "shenzhen.png"),
];

pub const IPTV_LOGO_BASE_URL: &str = "https://iptv-logo.com/logos/";
pub const IPTV_LOGO_LOGOS: &[(&str, &str)] = &[
    ("黑龙江卫视", "heilongjiang.png"),
    ("辽宁卫视", "liaoning.png"),
    ("河南卫视", "henan.png"),
];

/// Names the whole-text scan recognises near an address token
pub fn default_known_channel_names() -> Vec<String> {
    let mut names: Vec<String> = EPG_PW_LOGOS
        .iter()
        .chain(IPTV_LOGO_LOGOS.iter())
        .map(|(name, _)| name.to_string())
        .collect();
    names.extend(
        ["CCTV-5+", "CCTV-16", "CCTV-17", "CGTN", "CETV-1"]
            .iter()
            .map(|s| s.to_string()),
    );
    names
}

/// Static records used when the listing yields nothing
pub fn default_fallback_channels() -> Vec<RawRecord> {
    vec![
        RawRecord::new("CCTV-1 综合", "udp://@239.136.116.100:8000"),
        RawRecord::new("CCTV-5 体育", "udp://@239.136.116.105:8000"),
        RawRecord::new("湖南卫视", "udp://@239.136.118.101:8000"),
        RawRecord::new("CCTV-5 体育 画中画", "udp://@239.136.116.106:8000"),
    ]
}
