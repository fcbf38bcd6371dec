use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::catalog::{self, CatalogResponse, WorkItem};
use crate::errors::AppError;
use crate::fetcher::{BackoffFetcher, JsonSource, ReqwestSource, Sleeper, TokioSleeper};
use crate::file_utils::{FileManager, TXT_EXTENSION, VTT_EXTENSION};
use crate::selection::Selection;
use crate::transcript::Transcript;

// @module: Application controller for transcript downloads

/// Stage of a download run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    FetchingCatalog,
    ResolvingIds,
    Filtering,
    ProcessingItems(usize),
    Done,
}

/// Result of handling one video
#[derive(Debug, Clone, PartialEq)]
pub enum ItemStatus {
    Success,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemOutcome {
    pub id: u32,
    pub status: ItemStatus,
}

/// Per-video outcomes of a finished run, in processing order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub outcomes: Vec<ItemOutcome>,
}

impl RunSummary {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.status == ItemStatus::Success).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

/// Main application controller
pub struct Controller<S, Z> {
    // @field: App configuration
    config: Config,
    // @field: Retrying JSON fetcher shared by every request of the run
    fetcher: BackoffFetcher<S, Z>,
    // @field: Used for the pause between videos
    sleeper: Z,
}

impl Controller<ReqwestSource, TokioSleeper> {
    // @method: Create a controller talking to the real API
    pub fn with_config(config: Config) -> Result<Self> {
        let source = ReqwestSource::with_timeout(config.timeout())?;
        Ok(Self::with_parts(config, source, TokioSleeper))
    }
}

impl<S: JsonSource, Z: Sleeper + Clone> Controller<S, Z> {
    /// Create a controller from an explicit source and sleeper
    pub fn with_parts(config: Config, source: S, sleeper: Z) -> Self {
        let fetcher = BackoffFetcher::new(source, sleeper.clone(), config.retry_policy());
        Self { config, fetcher, sleeper }
    }

    /// Run the whole download for an already parsed selection
    ///
    /// Catalog and resolution failures abort the run. Failures of a single
    /// video are reported in the summary and never stop the run.
    pub async fn run(&self, selection: &Selection) -> Result<RunSummary, AppError> {
        let start_time = Instant::now();

        Self::enter(RunState::FetchingCatalog);
        let catalog = self.fetch_catalog().await?;

        Self::enter(RunState::ResolvingIds);
        let ids = self.resolve_ids(selection, &catalog)?;

        Self::enter(RunState::Filtering);
        let items = catalog::filter(catalog.entries(), &ids);
        debug!("{} of {} requested videos have a transcript", items.len(), ids.len());

        let summary = self.process_items(&items).await;

        Self::enter(RunState::Done);
        if !summary.outcomes.is_empty() {
            info!(
                "Finished {} videos ({} failed) in {}.",
                summary.outcomes.len(),
                summary.failed(),
                Self::format_duration(start_time.elapsed())
            );
        }

        Ok(summary)
    }

    fn enter(state: RunState) {
        debug!("State: {:?}", state);
    }

    async fn fetch_catalog(&self) -> Result<CatalogResponse, AppError> {
        let url = self.config.catalog_url()?;
        let value = self.fetcher.fetch(url.as_str()).await?;
        CatalogResponse::from_value(value)
    }

    fn resolve_ids(&self, selection: &Selection, catalog: &CatalogResponse) -> Result<BTreeSet<u32>, AppError> {
        let existing = FileManager::scan_existing_ids(&self.config.output_dir)
            .map_err(|e| AppError::File(format!("{:#}", e)))?;
        Ok(selection.resolve(catalog, &existing))
    }

    async fn process_items(&self, items: &[WorkItem]) -> RunSummary {
        let progress_bar = self.create_progress_bar(items.len());
        let mut summary = RunSummary::default();

        for (index, item) in items.iter().enumerate() {
            Self::enter(RunState::ProcessingItems(index));

            let status = match self.process_item(item).await {
                Ok(_) => {
                    progress_bar.suspend(|| info!("Video ID {}: Done", item.id));
                    ItemStatus::Success
                }
                Err(e) => {
                    progress_bar.suspend(|| error!("Video ID {}: Error - {}", item.id, e));
                    ItemStatus::Failed(e.to_string())
                }
            };
            summary.outcomes.push(ItemOutcome { id: item.id, status });
            progress_bar.inc(1);

            self.sleeper.sleep(self.request_delay()).await;
        }

        progress_bar.finish_and_clear();
        summary
    }

    /// Fetch, convert and store the transcript of a single video
    async fn process_item(&self, item: &WorkItem) -> Result<(PathBuf, PathBuf), AppError> {
        let url = self.config.transcript_url(item.transcript_id)?;
        let value = self.fetcher.fetch(url.as_str()).await?;
        let transcript = Transcript::from_value(value)?;

        let output_dir = &self.config.output_dir;
        let vtt_path = FileManager::generate_output_path(output_dir, item.id, &item.title, VTT_EXTENSION);
        let txt_path = FileManager::generate_output_path(output_dir, item.id, &item.title, TXT_EXTENSION);

        FileManager::write_to_file(&vtt_path, &transcript.to_vtt())
            .map_err(|e| AppError::File(format!("{:#}", e)))?;
        FileManager::write_to_file(&txt_path, &transcript.to_plain_text())
            .map_err(|e| AppError::File(format!("{:#}", e)))?;

        debug!("Wrote {:?} and {:?}", vtt_path, txt_path);
        Ok((vtt_path, txt_path))
    }

    fn request_delay(&self) -> Duration {
        self.config.request_delay()
    }

    fn create_progress_bar(&self, len: usize) -> ProgressBar {
        if !self.config.show_progress || len == 0 {
            return ProgressBar::hidden();
        }

        let progress_bar = ProgressBar::new(len as u64);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} videos ({percent}%) {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%)"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));
        progress_bar
    }

    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
