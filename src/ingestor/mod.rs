//! Record extraction from a listing page of unknown structure
//!
//! Strategies run in a fixed priority order and the first one producing at
//! least one record wins. A rendered DOM snapshot is only requested when all
//! static strategies come back empty.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::config::ExtractionConfig;
use crate::models::RawRecord;
use crate::sources::PageRenderer;

pub mod address;
pub mod line_scan;
pub mod table;
pub mod text_scan;

pub use line_scan::LineScanStrategy;
pub use table::TableStrategy;
pub use text_scan::TextScanStrategy;

/// A single way of pulling `(name, address)` pairs out of page content.
///
/// Implementations never fail: content they cannot make sense of yields an
/// empty vector.
pub trait ExtractionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn extract(&self, content: &str) -> Vec<RawRecord>;
}

/// Records plus the strategy that produced them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionOutcome {
    pub records: Vec<RawRecord>,
    pub strategy: Option<&'static str>,
    /// Records came from a rendered DOM snapshot
    pub rendered: bool,
}

impl ExtractionOutcome {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Strategy label for the run report
    pub fn strategy_label(&self) -> Option<String> {
        self.strategy.map(|name| {
            if self.rendered {
                format!("rendered-dom/{name}")
            } else {
                name.to_string()
            }
        })
    }
}

pub struct RecordExtractor {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl RecordExtractor {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self::with_strategies(vec![
            Box::new(TableStrategy::new()),
            Box::new(LineScanStrategy::new()),
            Box::new(TextScanStrategy::new(config)),
        ])
    }

    pub fn with_strategies(strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        Self { strategies }
    }

    /// Deduplicated records from the first strategy that finds any
    pub fn extract(&self, content: &str) -> Vec<RawRecord> {
        self.run_cascade(content).records
    }

    pub fn run_cascade(&self, content: &str) -> ExtractionOutcome {
        if content.trim().is_empty() {
            debug!("Empty page content, nothing to extract");
            return ExtractionOutcome::default();
        }

        self.strategies
            .iter()
            .find_map(|strategy| {
                let records = dedup_records(strategy.extract(content));
                debug!(
                    strategy = strategy.name(),
                    records = records.len(),
                    "Extraction strategy finished"
                );
                (!records.is_empty()).then(|| ExtractionOutcome {
                    records,
                    strategy: Some(strategy.name()),
                    rendered: false,
                })
            })
            .unwrap_or_default()
    }

    /// Static cascade, then the same cascade over a rendered snapshot of `url`
    /// when nothing was found and a renderer is available.
    pub async fn extract_with_renderer(
        &self,
        content: &str,
        url: &str,
        renderer: Option<&dyn PageRenderer>,
    ) -> ExtractionOutcome {
        let outcome = self.run_cascade(content);
        if !outcome.is_empty() {
            info!(
                "Extracted {} records using {} strategy",
                outcome.records.len(),
                outcome.strategy.unwrap_or("unknown")
            );
            return outcome;
        }

        let Some(renderer) = renderer else {
            debug!("Static strategies found nothing and no renderer is configured");
            return outcome;
        };

        info!("Static strategies found nothing, requesting rendered DOM for {}", url);
        match renderer.render(url).await {
            Ok(snapshot) => {
                let mut rendered = self.run_cascade(&snapshot);
                rendered.rendered = true;
                info!(
                    "Extracted {} records from rendered DOM",
                    rendered.records.len()
                );
                rendered
            }
            Err(e) => {
                warn!("Page rendering failed for {}: {}", url, e);
                ExtractionOutcome::default()
            }
        }
    }
}

/// Drop repeated `(name, address)` pairs, keeping the first occurrence
pub fn dedup_records(records: Vec<RawRecord>) -> Vec<RawRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| seen.insert((record.name.clone(), record.address.clone())))
        .collect()
}
