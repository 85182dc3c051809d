//! Search, fetch, plan, sequence and render one blind test.

use std::path::PathBuf;
use std::time::Duration;

use rand::Rng;

use blindtest_core::{plan_batch, Assembler, MediaFetcher, SourceCatalog};
use blindtest_models::RunId;

use crate::config::BlindtestConfig;
use crate::error::{AppError, AppResult};
use crate::logging::RunLogger;

/// Pause between two downloads, to stay gentle with the platform.
const DEFAULT_FETCH_PAUSE: Duration = Duration::from_millis(100);

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub run_id: RunId,
    pub output: PathBuf,
    /// Clip titles in playback order
    pub answer_key: Vec<String>,
    /// Search results dropped because they could not be fetched or clipped
    pub skipped: usize,
    pub total_duration: Duration,
}

/// One blind test run over the three collaborators.
pub struct Pipeline<'a> {
    catalog: &'a dyn SourceCatalog,
    fetcher: &'a dyn MediaFetcher,
    assembler: &'a dyn Assembler,
    run_id: RunId,
    fetch_pause: Duration,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        catalog: &'a dyn SourceCatalog,
        fetcher: &'a dyn MediaFetcher,
        assembler: &'a dyn Assembler,
    ) -> Self {
        Self {
            catalog,
            fetcher,
            assembler,
            run_id: RunId::new(),
            fetch_pause: DEFAULT_FETCH_PAUSE,
        }
    }

    pub fn with_run_id(mut self, run_id: RunId) -> Self {
        self.run_id = run_id;
        self
    }

    pub fn with_fetch_pause(mut self, pause: Duration) -> Self {
        self.fetch_pause = pause;
        self
    }

    /// Build the blind test described by `config`.
    ///
    /// Items that fail to download or clip are skipped; the run only fails
    /// when the search or render fails, or when nothing usable is left.
    pub async fn run<R>(&self, config: &BlindtestConfig, rng: &mut R) -> AppResult<RunSummary>
    where
        R: Rng + ?Sized,
    {
        let logger = RunLogger::new(&self.run_id, "blindtest");
        let result = self.execute(config, rng, &logger).await;
        if let Err(e) = &result {
            logger.log_error(&format!("{} stage: {}", e.stage(), e));
        }
        result
    }

    async fn execute<R>(
        &self,
        config: &BlindtestConfig,
        rng: &mut R,
        logger: &RunLogger,
    ) -> AppResult<RunSummary>
    where
        R: Rng + ?Sized,
    {
        logger.log_start(&format!("query '{}', mode {}", config.query, config.mode));

        let planner = config.planner()?;

        let descriptors = self
            .catalog
            .search(&config.query, config.max_results)
            .await?;
        let found = descriptors.len();
        logger.log_progress(&format!("Catalog returned {found} results"));

        let mut fetched = Vec::with_capacity(found);
        for (i, descriptor) in descriptors.iter().enumerate() {
            if i > 0 && !self.fetch_pause.is_zero() {
                tokio::time::sleep(self.fetch_pause).await;
            }
            logger.log_progress(&format!(
                "Fetching {}/{}: {} ({})",
                i + 1,
                found,
                descriptor.title,
                descriptor.id
            ));
            fetched.push(self.fetcher.fetch(descriptor).await);
        }

        let batch = plan_batch(&planner, fetched);
        let skipped = batch.skipped.len();
        for item in &batch.skipped {
            logger.log_warning(&format!("Skipped {}: {}", item.id(), item));
        }

        if batch.is_empty() {
            return Err(AppError::NoUsableClips { found, skipped });
        }

        let timeline = config.sequencer().sequence(batch.plans, rng);
        let answer_key: Vec<String> = timeline.clips().map(|c| c.title().to_string()).collect();
        logger.log_progress(&format!(
            "Rendering {} clips ({} segments) to {}",
            answer_key.len(),
            timeline.len(),
            config.output.display()
        ));

        let output = self
            .assembler
            .render(&timeline, config.mode, &config.output)
            .await?;

        let summary = RunSummary {
            run_id: self.run_id.clone(),
            output,
            answer_key,
            skipped,
            total_duration: timeline.total_duration(),
        };
        logger.log_completion(&format!(
            "{} clips, {} skipped, {:.1}s",
            summary.answer_key.len(),
            summary.skipped,
            summary.total_duration.as_secs_f64()
        ));

        Ok(summary)
    }
}
