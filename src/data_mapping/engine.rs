use tracing::debug;

use super::groups::GroupClassifier;
use super::naming::{display_name, NameNormalizer};
use crate::config::{EnrichmentConfig, IconConfig};
use crate::errors::{PipelineError, PipelineResult};
use crate::logo_assets::IconResolver;
use crate::models::{ChannelEntity, MulticastAddress, RawRecord};

/// Turns filtered records into fully described channels.
///
/// Pure and total: every record yields an entity, misses fall back to the
/// default group, a placeholder icon, or `address = None`.
pub struct ChannelEnricher {
    normalizer: NameNormalizer,
    classifier: GroupClassifier,
    icons: IconResolver,
}

impl ChannelEnricher {
    pub fn new(enrichment: &EnrichmentConfig, icons: &IconConfig) -> PipelineResult<Self> {
        let normalizer = NameNormalizer::new(&enrichment.cosmetic_suffix_patterns).map_err(|e| {
            PipelineError::configuration(format!("Invalid cosmetic suffix pattern: {e}"))
        })?;

        Ok(Self {
            normalizer,
            classifier: GroupClassifier::new(enrichment),
            icons: IconResolver::new(icons),
        })
    }

    pub fn enrich(&self, record: RawRecord) -> ChannelEntity {
        let name = display_name(&record.name);
        let canonical = self.normalizer.canonical_key(&name);
        let address = MulticastAddress::parse(&record.address);
        if address.is_none() {
            debug!("'{}' has an unparseable address '{}'", name, record.address);
        }

        ChannelEntity {
            group: self.classifier.classify(&name).to_string(),
            icon_url: self.icons.resolve(&canonical, &name),
            stable_id: self.normalizer.stable_id(&name),
            display_name: name,
            raw_address: record.address,
            address,
        }
    }

    pub fn enrich_all(&self, records: Vec<RawRecord>) -> Vec<ChannelEntity> {
        records.into_iter().map(|record| self.enrich(record)).collect()
    }
}
