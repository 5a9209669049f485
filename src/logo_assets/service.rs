use tracing::debug;
use url::Url;

use crate::config::defaults::DEFAULT_PLACEHOLDER_TEXT;
use crate::config::{IconConfig, IconSource};

/// Resolves channel icons from the configured logo sources, falling back to a
/// generated placeholder so every channel ends up with a URL.
#[derive(Debug, Clone)]
pub struct IconResolver {
    sources: Vec<IconSource>,
    placeholder_template: String,
    placeholder_max_chars: usize,
}

impl IconResolver {
    pub fn new(config: &IconConfig) -> Self {
        Self {
            sources: config.sources.clone(),
            placeholder_template: config.placeholder_template.clone(),
            placeholder_max_chars: config.placeholder_max_chars,
        }
    }

    /// Icon URL for a channel. `canonical_key` selects the mapping,
    /// `display_name` feeds the placeholder text.
    pub fn resolve(&self, canonical_key: &str, display_name: &str) -> String {
        for source in &self.sources {
            if let Some(file) = Self::lookup(source, canonical_key) {
                debug!("Icon for '{}' found in {}", canonical_key, source.name);
                return Self::join(&source.base_url, file);
            }
        }

        debug!("No icon source for '{}', using placeholder", canonical_key);
        self.placeholder(display_name)
    }

    /// Exact key first, then the longest key that prefixes `canonical_key`
    /// and ends on a non-alphanumeric boundary.
    fn lookup<'a>(source: &'a IconSource, canonical_key: &str) -> Option<&'a str> {
        if let Some(mapping) = source.logos.iter().find(|m| m.channel == canonical_key) {
            return Some(mapping.file.as_str());
        }

        source
            .logos
            .iter()
            .filter(|m| !m.channel.is_empty())
            .filter(|m| match canonical_key.strip_prefix(m.channel.as_str()) {
                Some(rest) => rest.chars().next().map_or(true, |c| !c.is_alphanumeric()),
                None => false,
            })
            .max_by_key(|m| m.channel.len())
            .map(|m| m.file.as_str())
    }

    fn join(base_url: &str, file: &str) -> String {
        if Url::parse(file).is_ok() {
            return file.to_string();
        }
        format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            file.trim_start_matches('/')
        )
    }

    fn placeholder(&self, display_name: &str) -> String {
        let fragment: String = display_name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || is_cjk_ideograph(*c))
            .take(self.placeholder_max_chars)
            .collect();
        let text = if fragment.is_empty() {
            DEFAULT_PLACEHOLDER_TEXT.to_string()
        } else {
            urlencoding::encode(&fragment).into_owned()
        };
        self.placeholder_template.replace("{}", &text)
    }
}

fn is_cjk_ideograph(c: char) -> bool {
    matches!(
        c as u32,
        0x4E00..=0x9FFF | 0x3400..=0x4DBF | 0xF900..=0xFAFF | 0x20000..=0x2A6DF
    )
}
