//! Pipeline runs against in-memory collaborators.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::TempDir;

use blindtest_cli::{AppError, Args, BlindtestConfig, Pipeline};
use blindtest_core::{
    Assembler, FetchError, MediaFetcher, RenderError, SearchError, SourceCatalog,
};
use blindtest_models::{FetchedMedia, MediaDescriptor, RenderMode, Segment, Timeline};

struct FakeCatalog {
    results: Result<Vec<MediaDescriptor>, fn() -> SearchError>,
}

impl FakeCatalog {
    fn with(items: &[(&str, &str)]) -> Self {
        Self {
            results: Ok(items
                .iter()
                .map(|(id, title)| MediaDescriptor::new(*id, *title))
                .collect()),
        }
    }

    fn failing(err: fn() -> SearchError) -> Self {
        Self { results: Err(err) }
    }
}

#[async_trait]
impl SourceCatalog for FakeCatalog {
    async fn search(&self, _query: &str, max_results: u32) -> Result<Vec<MediaDescriptor>, SearchError> {
        match &self.results {
            Ok(items) => Ok(items.iter().take(max_results as usize).cloned().collect()),
            Err(make) => Err(make()),
        }
    }
}

/// Serves files from a temp dir with fixed durations; ids missing from the
/// map fail to fetch.
struct FakeFetcher {
    dir: PathBuf,
    durations: HashMap<String, Duration>,
    fetched: Mutex<Vec<String>>,
}

impl FakeFetcher {
    fn new(dir: &Path, durations: &[(&str, u64)]) -> Self {
        Self {
            dir: dir.to_path_buf(),
            durations: durations
                .iter()
                .map(|(id, secs)| (id.to_string(), Duration::from_secs(*secs)))
                .collect(),
            fetched: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl MediaFetcher for FakeFetcher {
    async fn fetch(&self, descriptor: &MediaDescriptor) -> Result<FetchedMedia, FetchError> {
        self.fetched.lock().unwrap().push(descriptor.id.clone());

        let duration = self
            .durations
            .get(&descriptor.id)
            .copied()
            .ok_or_else(|| FetchError::new(&descriptor.id, "video unavailable"))?;

        let path = self.dir.join(format!("{}.webm", descriptor.id));
        std::fs::write(&path, b"media").unwrap();
        Ok(FetchedMedia::new(descriptor.clone(), path, duration))
    }
}

/// Records the timeline and writes a placeholder output.
#[derive(Default)]
struct FakeAssembler {
    rendered: Mutex<Option<(Timeline, RenderMode)>>,
    fail: bool,
}

#[async_trait]
impl Assembler for FakeAssembler {
    async fn render(
        &self,
        timeline: &Timeline,
        mode: RenderMode,
        output: &Path,
    ) -> Result<PathBuf, RenderError> {
        if self.fail {
            return Err(RenderError::ConcatFailed("disk full".to_string()));
        }
        *self.rendered.lock().unwrap() = Some((timeline.clone(), mode));
        std::fs::write(output, b"rendered").map_err(|e| RenderError::Output(e.to_string()))?;
        Ok(output.to_path_buf())
    }
}

fn config(output: &Path, extra: &[&str]) -> BlindtestConfig {
    let output = output.to_string_lossy().to_string();
    let mut argv = vec!["blindtest", "quiz", "--api-key", "key", "--output", output.as_str()];
    argv.extend_from_slice(extra);
    BlindtestConfig::from_args(Args::try_parse_from(argv).unwrap()).unwrap()
}

fn clip_spans(timeline: &Timeline) -> Vec<(String, u64, u64)> {
    timeline
        .clips()
        .map(|c| {
            (
                c.source.id().to_string(),
                c.start_offset.as_secs(),
                c.length.as_secs(),
            )
        })
        .collect()
}

#[tokio::test]
async fn test_ordered_run_plans_every_clip() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("quiz.mp4");
    let catalog = FakeCatalog::with(&[("a", "Song A"), ("b", "Song B"), ("c", "Song C")]);
    let fetcher = FakeFetcher::new(dir.path(), &[("a", 20), ("b", 5), ("c", 15)]);
    let assembler = FakeAssembler::default();

    let pipeline = Pipeline::new(&catalog, &fetcher, &assembler).with_fetch_pause(Duration::ZERO);
    let summary = pipeline
        .run(
            &config(&output, &["--no-random", "--max-results", "3"]),
            &mut StdRng::seed_from_u64(1),
        )
        .await
        .unwrap();

    assert_eq!(summary.output, output);
    assert_eq!(summary.answer_key, ["Song A", "Song B", "Song C"]);
    assert_eq!(summary.skipped, 0);
    assert_eq!(summary.total_duration, Duration::from_secs(27));
    assert!(output.is_file());

    let (timeline, mode) = assembler.rendered.lock().unwrap().clone().unwrap();
    assert_eq!(mode, RenderMode::AudioVideo);
    assert_eq!(timeline.len(), 5);
    assert_eq!(
        clip_spans(&timeline),
        [
            ("a".to_string(), 0, 10),
            ("b".to_string(), 0, 5),
            ("c".to_string(), 0, 10)
        ]
    );
    assert!(matches!(timeline.segments()[1], Segment::Silence(s) if s.length == Duration::from_secs(1)));
}

#[tokio::test]
async fn test_failed_fetch_is_skipped() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("quiz.mp3");
    let catalog = FakeCatalog::with(&[("a", "Song A"), ("gone", "Removed"), ("c", "Song C")]);
    let fetcher = FakeFetcher::new(dir.path(), &[("a", 30), ("c", 30)]);
    let assembler = FakeAssembler::default();

    let pipeline = Pipeline::new(&catalog, &fetcher, &assembler).with_fetch_pause(Duration::ZERO);
    let summary = pipeline
        .run(
            &config(&output, &["--no-random", "--audio-only"]),
            &mut StdRng::seed_from_u64(1),
        )
        .await
        .unwrap();

    assert_eq!(summary.answer_key, ["Song A", "Song C"]);
    assert_eq!(summary.skipped, 1);
    assert_eq!(*fetcher.fetched.lock().unwrap(), ["a", "gone", "c"]);

    let (timeline, mode) = assembler.rendered.lock().unwrap().clone().unwrap();
    assert_eq!(mode, RenderMode::Audio);
    assert_eq!(timeline.len(), 3);
}

#[tokio::test]
async fn test_zero_duration_media_is_skipped() {
    let dir = TempDir::new().unwrap();
    let catalog = FakeCatalog::with(&[("live", "Live Stream"), ("a", "Song A")]);
    let fetcher = FakeFetcher::new(dir.path(), &[("live", 0), ("a", 12)]);
    let assembler = FakeAssembler::default();

    let pipeline = Pipeline::new(&catalog, &fetcher, &assembler).with_fetch_pause(Duration::ZERO);
    let summary = pipeline
        .run(&config(&dir.path().join("out.mp4"), &[]), &mut StdRng::seed_from_u64(3))
        .await
        .unwrap();

    assert_eq!(summary.answer_key, ["Song A"]);
    assert_eq!(summary.skipped, 1);

    let (timeline, _) = assembler.rendered.lock().unwrap().clone().unwrap();
    assert_eq!(timeline.len(), 1);
}

#[tokio::test]
async fn test_no_results_is_a_planning_failure() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("quiz.mp4");
    let catalog = FakeCatalog::with(&[]);
    let fetcher = FakeFetcher::new(dir.path(), &[]);
    let assembler = FakeAssembler::default();

    let pipeline = Pipeline::new(&catalog, &fetcher, &assembler);
    let err = pipeline
        .run(&config(&output, &[]), &mut StdRng::seed_from_u64(1))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NoUsableClips { found: 0, skipped: 0 }));
    assert_eq!(err.exit_code(), 1);
    assert!(assembler.rendered.lock().unwrap().is_none());
    assert!(!output.exists());
}

#[tokio::test]
async fn test_all_items_failing_is_a_planning_failure() {
    let dir = TempDir::new().unwrap();
    let catalog = FakeCatalog::with(&[("x", "X"), ("y", "Y")]);
    let fetcher = FakeFetcher::new(dir.path(), &[]);
    let assembler = FakeAssembler::default();

    let pipeline = Pipeline::new(&catalog, &fetcher, &assembler).with_fetch_pause(Duration::ZERO);
    let err = pipeline
        .run(&config(&dir.path().join("o.mp4"), &[]), &mut StdRng::seed_from_u64(1))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NoUsableClips { found: 2, skipped: 2 }));
}

#[tokio::test]
async fn test_search_failure_is_fatal() {
    let dir = TempDir::new().unwrap();
    let catalog = FakeCatalog::failing(|| SearchError::Unauthorized("HTTP 403".to_string()));
    let fetcher = FakeFetcher::new(dir.path(), &[]);
    let assembler = FakeAssembler::default();

    let pipeline = Pipeline::new(&catalog, &fetcher, &assembler);
    let err = pipeline
        .run(&config(&dir.path().join("o.mp4"), &[]), &mut StdRng::seed_from_u64(1))
        .await
        .unwrap_err();

    assert_eq!(err.stage(), "search");
    assert!(fetcher.fetched.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_render_failure_is_fatal() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("quiz.mp4");
    let catalog = FakeCatalog::with(&[("a", "Song A")]);
    let fetcher = FakeFetcher::new(dir.path(), &[("a", 30)]);
    let assembler = FakeAssembler {
        fail: true,
        ..Default::default()
    };

    let pipeline = Pipeline::new(&catalog, &fetcher, &assembler);
    let err = pipeline
        .run(&config(&output, &[]), &mut StdRng::seed_from_u64(1))
        .await
        .unwrap_err();

    assert_eq!(err.stage(), "render");
    assert_eq!(err.exit_code(), 1);
    assert!(!output.exists());
}

#[tokio::test]
async fn test_seeded_shuffle_is_reproducible() {
    let dir = TempDir::new().unwrap();
    let items = [("a", "A"), ("b", "B"), ("c", "C"), ("d", "D"), ("e", "E")];
    let durations = [("a", 30), ("b", 30), ("c", 30), ("d", 30), ("e", 30)];

    let mut keys = Vec::new();
    for _ in 0..2 {
        let catalog = FakeCatalog::with(&items);
        let fetcher = FakeFetcher::new(dir.path(), &durations);
        let assembler = FakeAssembler::default();
        let pipeline =
            Pipeline::new(&catalog, &fetcher, &assembler).with_fetch_pause(Duration::ZERO);

        let summary = pipeline
            .run(&config(&dir.path().join("o.mp4"), &[]), &mut StdRng::seed_from_u64(99))
            .await
            .unwrap();
        keys.push(summary.answer_key);
    }

    assert_eq!(keys[0], keys[1]);
    let mut sorted = keys[0].clone();
    sorted.sort();
    assert_eq!(sorted, ["A", "B", "C", "D", "E"]);
}
