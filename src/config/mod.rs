use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::errors::{AppError, AppResult};
use crate::models::{RawRecord, RelayEndpoint};
use crate::utils::time::validate_timezone;

pub mod defaults;

use defaults::*;

/// Prefix for environment overrides, e.g. `MCAST_M3U_SOURCE__URL`
pub const ENV_PREFIX: &str = "MCAST_M3U";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory the playlists are written to
    pub output_dir: PathBuf,
    /// IANA timezone for the generation-time comment; local time when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    pub source: SourceConfig,
    pub render: RenderConfig,
    pub extraction: ExtractionConfig,
    pub filter: FilterConfig,
    pub enrichment: EnrichmentConfig,
    pub icons: IconConfig,
    pub playlist: PlaylistConfig,
    pub relays: Vec<RelayEndpoint>,
    pub fallback: FallbackConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub url: String,
    pub timeout_secs: u64,
    /// The public listing has served broken certificate chains
    pub accept_invalid_certs: bool,
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Only consulted when every static strategy comes back empty
    pub enabled: bool,
    /// Browser binary, resolved through `$PATH` when not absolute
    pub command: String,
    /// Arguments placed before the URL; must make the browser print the DOM
    pub args: Vec<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Characters inspected on each side of an address token by the text scan
    pub context_window: usize,
    /// Closed list of names the text scan may attach to an address
    pub known_channel_names: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Case-sensitive substrings; a record whose name contains any is dropped
    pub block_substrings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRule {
    pub label: String,
    #[serde(default)]
    pub prefixes: Vec<String>,
    #[serde(default)]
    pub contains: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    pub default_group: String,
    /// Regexes anchored at the end of the name, applied until nothing changes
    pub cosmetic_suffix_patterns: Vec<String>,
    /// Evaluated in order, first match wins
    pub groups: Vec<GroupRule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconMapping {
    pub channel: String,
    pub file: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconSource {
    pub name: String,
    pub base_url: String,
    #[serde(default)]
    pub logos: Vec<IconMapping>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IconConfig {
    /// `{}` is replaced with a sanitized fragment of the channel name
    pub placeholder_template: String,
    pub placeholder_max_chars: usize,
    /// Consulted in declared order
    pub sources: Vec<IconSource>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaylistConfig {
    pub epg_url: String,
    pub scheme: String,
    pub relay_path: String,
    /// Groups listed here come first, in this order
    pub group_order: Vec<String>,
}

/// What to do when the listing cannot be fetched or yields no records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyResultPolicy {
    /// Continue with `fallback.channels`
    Fallback,
    /// Stop the run with a non-zero exit code
    Fail,
}

impl std::str::FromStr for EmptyResultPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fallback" => Ok(Self::Fallback),
            "fail" => Ok(Self::Fail),
            other => Err(format!(
                "Invalid policy '{}'. Expected 'fallback' or 'fail'",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    pub policy: EmptyResultPolicy,
    pub channels: Vec<RawRecord>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SOURCE_URL.to_string(),
            timeout_secs: DEFAULT_SOURCE_TIMEOUT_SECS,
            accept_invalid_certs: DEFAULT_ACCEPT_INVALID_CERTS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            command: DEFAULT_RENDER_COMMAND.to_string(),
            args: default_render_args(),
            timeout_secs: DEFAULT_RENDER_TIMEOUT_SECS,
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            context_window: DEFAULT_CONTEXT_WINDOW,
            known_channel_names: default_known_channel_names(),
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            block_substrings: default_block_substrings(),
        }
    }
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            default_group: DEFAULT_GROUP.to_string(),
            groups: DEFAULT_GROUP_RULES
                .iter()
                .map(|(label, prefixes)| GroupRule {
                    label: label.to_string(),
                    prefixes: prefixes.iter().map(|p| p.to_string()).collect(),
                    contains: Vec::new(),
                })
                .collect(),
            cosmetic_suffix_patterns: default_cosmetic_suffix_patterns(),
        }
    }
}

impl Default for IconConfig {
    fn default() -> Self {
        let source = |name: &str, base_url: &str, logos: &[(&str, &str)]| IconSource {
            name: name.to_string(),
            base_url: base_url.to_string(),
            logos: logos
                .iter()
                .map(|(channel, file)| IconMapping {
                    channel: channel.to_string(),
                    file: file.to_string(),
                })
                .collect(),
        };

        Self {
            sources: vec![
                source("epg.pw", EPG_PW_BASE_URL, EPG_PW_LOGOS),
                source("iptv-logo.com", IPTV_LOGO_BASE_URL, IPTV_LOGO_LOGOS),
            ],
            placeholder_template: DEFAULT_PLACEHOLDER_TEMPLATE.to_string(),
            placeholder_max_chars: DEFAULT_PLACEHOLDER_MAX_CHARS,
        }
    }
}

impl Default for PlaylistConfig {
    fn default() -> Self {
        let mut group_order: Vec<String> = DEFAULT_GROUP_RULES
            .iter()
            .map(|(label, _)| label.to_string())
            .collect();
        group_order.push(DEFAULT_GROUP.to_string());

        Self {
            epg_url: DEFAULT_EPG_URL.to_string(),
            scheme: DEFAULT_SCHEME.to_string(),
            relay_path: DEFAULT_RELAY_PATH.to_string(),
            group_order,
        }
    }
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            policy: EmptyResultPolicy::Fallback,
            channels: default_fallback_channels(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            timezone: None,
            source: SourceConfig::default(),
            render: RenderConfig::default(),
            extraction: ExtractionConfig::default(),
            filter: FilterConfig::default(),
            enrichment: EnrichmentConfig::default(),
            icons: IconConfig::default(),
            playlist: PlaylistConfig::default(),
            relays: default_relays(),
            fallback: FallbackConfig::default(),
        }
    }
}

impl Config {
    /// Load defaults, then the TOML file (if it exists), then `MCAST_M3U_*`
    /// environment variables, and validate the result.
    pub fn load(config_file: Option<&Path>) -> AppResult<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = config_file {
            if path.exists() {
                info!("Loading configuration from {}", path.display());
            } else {
                debug!(
                    "Config file {} not found, using built-in defaults",
                    path.display()
                );
            }
            builder = builder.add_source(config::File::from(path).required(false));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;
        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the built-in defaults, used by `--write-default-config`
    pub fn default_toml() -> AppResult<String> {
        toml::to_string_pretty(&Self::default())
            .map_err(|e| AppError::serialization(format!("Failed to serialize defaults: {e}")))
    }

    pub fn validate(&self) -> AppResult<()> {
        url::Url::parse(&self.source.url).map_err(|e| {
            AppError::configuration(format!("Invalid source.url '{}': {e}", self.source.url))
        })?;
        url::Url::parse(&self.playlist.epg_url).map_err(|e| {
            AppError::configuration(format!(
                "Invalid playlist.epg_url '{}': {e}",
                self.playlist.epg_url
            ))
        })?;

        if self.relays.is_empty() {
            return Err(AppError::configuration(
                "At least one relay endpoint must be configured",
            ));
        }
        let mut file_names: HashMap<String, &RelayEndpoint> = HashMap::new();
        for relay in &self.relays {
            if relay.host.trim().is_empty() || relay.port == 0 {
                return Err(AppError::configuration(format!(
                    "Invalid relay endpoint '{}:{}'",
                    relay.host, relay.port
                )));
            }
            if let Some(existing) = file_names.insert(relay.file_name(), relay) {
                return Err(AppError::configuration(format!(
                    "Relays '{}' and '{}' would both write {}",
                    existing,
                    relay,
                    relay.file_name()
                )));
            }
        }

        if let Some(tz) = &self.timezone {
            validate_timezone(tz).map_err(AppError::configuration)?;
        }

        for pattern in &self.enrichment.cosmetic_suffix_patterns {
            Regex::new(pattern).map_err(|e| {
                AppError::configuration(format!("Invalid cosmetic suffix pattern '{pattern}': {e}"))
            })?;
        }

        if !self.icons.placeholder_template.contains("{}") {
            return Err(AppError::configuration(
                "icons.placeholder_template must contain '{}'",
            ));
        }
        if self.icons.placeholder_max_chars == 0 {
            return Err(AppError::configuration(
                "icons.placeholder_max_chars must be greater than zero",
            ));
        }
        if self.extraction.context_window == 0 {
            return Err(AppError::configuration(
                "extraction.context_window must be greater than zero",
            ));
        }

        Ok(())
    }
}
