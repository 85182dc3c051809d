//! Per-item result collection.
//!
//! Fetch and planning failures are gathered as values and partitioned, so a
//! bad item is dropped without aborting the batch.

use tracing::debug;

use blindtest_models::{ClipPlan, FetchedMedia};

use crate::error::{FetchError, ItemError};
use crate::planner::ClipPlanner;

/// Outcome of planning a batch of fetched sources.
#[derive(Debug, Default)]
pub struct PlannedBatch {
    /// Successful plans, in input order
    pub plans: Vec<ClipPlan>,
    /// Items dropped along the way, in input order
    pub skipped: Vec<ItemError>,
}

impl PlannedBatch {
    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }
}

/// Plan every successfully fetched item and partition the results.
pub fn plan_batch<I>(planner: &ClipPlanner, fetched: I) -> PlannedBatch
where
    I: IntoIterator<Item = Result<FetchedMedia, FetchError>>,
{
    let results: Vec<Result<ClipPlan, ItemError>> = fetched
        .into_iter()
        .map(|item| {
            let media = item?;
            planner.plan(media).map_err(ItemError::from)
        })
        .collect();

    let mut batch = PlannedBatch::default();
    for result in results {
        match result {
            Ok(plan) => batch.plans.push(plan),
            Err(e) => {
                debug!(id = %e.id(), error = %e, "Skipping item");
                batch.skipped.push(e);
            }
        }
    }

    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use blindtest_models::MediaDescriptor;
    use tempfile::TempDir;

    fn fetched(dir: &TempDir, id: &str, secs: u64) -> Result<FetchedMedia, FetchError> {
        let path = dir.path().join(format!("{id}.mp4"));
        std::fs::write(&path, b"media").unwrap();
        Ok(FetchedMedia::new(
            MediaDescriptor::new(id, id),
            path,
            Duration::from_secs(secs),
        ))
    }

    #[test]
    fn test_scenario_mixed_durations() {
        let dir = TempDir::new().unwrap();
        let planner = ClipPlanner::new(Duration::from_secs(10)).unwrap();

        let batch = plan_batch(
            &planner,
            vec![
                fetched(&dir, "one", 20),
                fetched(&dir, "two", 5),
                fetched(&dir, "three", 15),
            ],
        );

        assert!(batch.skipped.is_empty());
        let bounds: Vec<_> = batch
            .plans
            .iter()
            .map(|p| (p.start_offset.as_secs(), p.length.as_secs()))
            .collect();
        assert_eq!(bounds, [(0, 10), (0, 5), (0, 10)]);
    }

    #[test]
    fn test_failures_are_skipped_not_fatal() {
        let dir = TempDir::new().unwrap();
        let planner = ClipPlanner::new(Duration::from_secs(10)).unwrap();

        let batch = plan_batch(
            &planner,
            vec![
                Err(FetchError::new("broken", "HTTP 403")),
                fetched(&dir, "ok", 30),
                fetched(&dir, "empty", 0),
            ],
        );

        assert_eq!(batch.plans.len(), 1);
        assert_eq!(batch.plans[0].source.id(), "ok");
        let skipped: Vec<_> = batch.skipped.iter().map(ItemError::id).collect();
        assert_eq!(skipped, ["broken", "empty"]);
        assert!(matches!(batch.skipped[0], ItemError::Fetch(_)));
        assert!(matches!(batch.skipped[1], ItemError::InvalidMedia(_)));
    }

    #[test]
    fn test_all_failed_is_empty() {
        let planner = ClipPlanner::new(Duration::from_secs(10)).unwrap();
        let batch = plan_batch(&planner, vec![Err(FetchError::new("x", "gone"))]);
        assert!(batch.is_empty());
        assert_eq!(batch.skipped.len(), 1);

        assert!(plan_batch(&planner, Vec::new()).is_empty());
    }
}
