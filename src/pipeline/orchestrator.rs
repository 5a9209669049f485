//! Single-pass pipeline run
//!
//! `Fetching → Extracting → Filtering → Enriching → Synthesizing → Writing → Done`,
//! with `Failed` reachable from the fetch and extract stages (under the `fail`
//! policy) and from writing.

use std::path::PathBuf;

use tracing::{error, info, warn};

use crate::config::{Config, EmptyResultPolicy};
use crate::data_mapping::ChannelEnricher;
use crate::errors::{AppResult, PipelineError, PipelineResult};
use crate::ingestor::RecordExtractor;
use crate::metrics::{log_run_summary, StageTimer};
use crate::models::{PipelineState, RawRecord, RunReport, WrittenDocument};
use crate::proxy::{FilterEngine, PlaylistGenerator};
use crate::sources::{
    FilePageFetcher, HeadlessBrowserRenderer, HttpPageFetcher, PageFetcher, PageRenderer,
};
use crate::utils::time::now_in;

pub struct Orchestrator {
    config: Config,
    fetcher: Box<dyn PageFetcher>,
    renderer: Option<Box<dyn PageRenderer>>,
    source_label: String,
    state: PipelineState,
}

impl Orchestrator {
    pub fn new(
        config: Config,
        fetcher: Box<dyn PageFetcher>,
        renderer: Option<Box<dyn PageRenderer>>,
    ) -> Self {
        let source_label = config.source.url.clone();
        Self {
            config,
            fetcher,
            renderer,
            source_label,
            state: PipelineState::Fetching,
        }
    }

    /// Wire up the HTTP (or local file) fetcher and the optional browser
    /// renderer from configuration.
    pub fn from_config(config: Config, input_file: Option<PathBuf>) -> AppResult<Self> {
        let renderer: Option<Box<dyn PageRenderer>> = if config.render.enabled {
            Some(Box::new(HeadlessBrowserRenderer::new(&config.render)))
        } else {
            None
        };

        let orchestrator = match input_file {
            Some(path) => {
                let label = path.display().to_string();
                let mut orchestrator =
                    Self::new(config, Box::new(FilePageFetcher::new(path)), renderer);
                orchestrator.source_label = label;
                orchestrator
            }
            None => {
                let fetcher = HttpPageFetcher::new(&config.source)?;
                Self::new(config, Box::new(fetcher), renderer)
            }
        };

        Ok(orchestrator)
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    fn transition(&mut self, next: PipelineState) {
        info!("Pipeline state: {} -> {}", self.state, next);
        self.state = next;
    }

    pub async fn run(&mut self) -> PipelineResult<RunReport> {
        let mut report = RunReport::new(self.source_label.clone());

        match self.execute(&mut report).await {
            Ok(()) => {
                self.transition(PipelineState::Done);
                report.final_state = PipelineState::Done;
                log_run_summary(&report);
                Ok(report)
            }
            Err(e) => {
                error!("Pipeline failed during {}: {}", self.state, e);
                self.transition(PipelineState::Failed);
                report.final_state = PipelineState::Failed;
                log_run_summary(&report);
                Err(e)
            }
        }
    }

    async fn execute(&mut self, report: &mut RunReport) -> PipelineResult<()> {
        // Built up front so a bad pattern fails before any network traffic
        let enricher = ChannelEnricher::new(&self.config.enrichment, &self.config.icons)?;

        self.state = PipelineState::Fetching;
        info!("Pipeline state: {}", self.state);
        let timer = StageTimer::start(PipelineState::Fetching);
        let fetched = self.fetcher.fetch(&self.config.source.url).await;
        timer.finish(1, usize::from(fetched.is_ok()), 0);

        self.transition(PipelineState::Extracting);
        let timer = StageTimer::start(PipelineState::Extracting);
        let records = match fetched {
            Ok(content) => {
                let extractor = RecordExtractor::new(&self.config.extraction);
                let outcome = extractor
                    .extract_with_renderer(
                        &content,
                        &self.config.source.url,
                        self.renderer.as_deref(),
                    )
                    .await;

                if outcome.is_empty() {
                    warn!("No channel records found in {}", self.source_label);
                    self.fallback_records(
                        report,
                        PipelineError::no_records(format!(
                            "no extraction strategy matched {}",
                            self.source_label
                        )),
                    )?
                } else {
                    report.extracted = outcome.records.len();
                    report.extraction_strategy = outcome.strategy_label();
                    outcome.records
                }
            }
            Err(e) => {
                warn!("Failed to fetch {}: {}", self.source_label, e);
                self.fallback_records(report, PipelineError::Source(e))?
            }
        };
        timer.finish(report.extracted, records.len(), 0);

        self.transition(PipelineState::Filtering);
        let timer = StageTimer::start(PipelineState::Filtering);
        let input = records.len();
        let filtered = FilterEngine::new(&self.config.filter).apply(records);
        report.filtered_out = filtered.removed;
        timer.finish(input, filtered.kept.len(), filtered.removed);
        if filtered.kept.is_empty() {
            warn!("Every record was filtered out, playlists will be header-only");
        }

        self.transition(PipelineState::Enriching);
        let timer = StageTimer::start(PipelineState::Enriching);
        let channels = enricher.enrich_all(filtered.kept);
        report.enriched = channels.len();
        timer.finish(channels.len(), channels.len(), 0);

        self.transition(PipelineState::Synthesizing);
        let timer = StageTimer::start(PipelineState::Synthesizing);
        let generator = PlaylistGenerator::new(&self.config.playlist);
        let synthesis = generator.synthesize_with_stats(
            &channels,
            &self.config.relays,
            now_in(self.config.timezone.as_deref()),
        );
        report.unparseable_addresses = synthesis.skipped;
        timer.finish(channels.len(), channels.len() - synthesis.skipped, synthesis.skipped);

        self.transition(PipelineState::Writing);
        let timer = StageTimer::start(PipelineState::Writing);
        for document in &synthesis.documents {
            let path = PlaylistGenerator::save_playlist(document, &self.config.output_dir)?;
            info!(
                "Wrote {} channels for {} to {}",
                document.entries.len(),
                document.endpoint,
                path.display()
            );
            report.documents.push(WrittenDocument {
                label: document.endpoint.output_label(),
                relay: document.endpoint.to_string(),
                path,
                entries: document.entries.len(),
            });
        }
        timer.finish(synthesis.documents.len(), report.documents.len(), 0);

        Ok(())
    }

    /// Apply the empty-result policy after a fetch failure or empty extraction
    fn fallback_records(
        &self,
        report: &mut RunReport,
        cause: PipelineError,
    ) -> PipelineResult<Vec<RawRecord>> {
        match self.config.fallback.policy {
            EmptyResultPolicy::Fail => Err(cause),
            EmptyResultPolicy::Fallback if self.config.fallback.channels.is_empty() => {
                warn!("Fallback policy is set but no fallback channels are configured");
                Err(cause)
            }
            EmptyResultPolicy::Fallback => {
                info!(
                    "Using {} fallback channels ({})",
                    self.config.fallback.channels.len(),
                    cause
                );
                report.fallback_used = true;
                report.extraction_strategy = Some("fallback".to_string());
                Ok(self.config.fallback.channels.clone())
            }
        }
    }
}
