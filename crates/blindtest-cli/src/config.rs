//! Validated run configuration.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, SecondsFormat};
use tempfile::TempDir;

use blindtest_catalog::{CatalogConfig, MAX_RESULTS_CAP};
use blindtest_core::{ClipPlanner, Sequencer};
use blindtest_models::{RenderMode, SilenceSpec};

use crate::cli::Args;
use crate::error::{AppError, AppResult};

/// Everything one run needs, checked once up front.
#[derive(Clone)]
pub struct BlindtestConfig {
    pub query: String,
    pub max_results: u32,
    pub clip_length: Duration,
    pub silence: SilenceSpec,
    pub output: PathBuf,
    pub mode: RenderMode,
    pub randomize: bool,
    pub seed: Option<u64>,
    /// Parent of the per-run scratch directory
    pub work_dir: PathBuf,
    /// Normalized RFC 3339 timestamp
    pub published_after: Option<String>,
    pub cookies: Option<PathBuf>,
    pub api_key: String,
    /// Catalog endpoint override
    pub api_base_url: Option<String>,
    pub lookup_durations: bool,
}

impl std::fmt::Debug for BlindtestConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlindtestConfig")
            .field("query", &self.query)
            .field("max_results", &self.max_results)
            .field("clip_length", &self.clip_length)
            .field("silence", &self.silence.length)
            .field("output", &self.output)
            .field("mode", &self.mode)
            .field("randomize", &self.randomize)
            .field("seed", &self.seed)
            .field("work_dir", &self.work_dir)
            .field("published_after", &self.published_after)
            .field("cookies", &self.cookies)
            .field("api_key", &"<redacted>")
            .field("api_base_url", &self.api_base_url)
            .field("lookup_durations", &self.lookup_durations)
            .finish()
    }
}

impl BlindtestConfig {
    /// Validate parsed arguments.
    pub fn from_args(args: Args) -> AppResult<Self> {
        let query = args.query.trim().to_string();
        if query.is_empty() {
            return Err(AppError::config("query must not be empty"));
        }

        if !(1..=MAX_RESULTS_CAP).contains(&args.max_results) {
            return Err(AppError::config(format!(
                "--max-results must be between 1 and {MAX_RESULTS_CAP}, got {}",
                args.max_results
            )));
        }

        let clip_length = seconds("--clip-duration", args.clip_duration)?;
        if clip_length.is_zero() {
            return Err(AppError::config("--clip-duration must be greater than zero"));
        }
        let silence = SilenceSpec::new(seconds("--silence-duration", args.silence_duration)?);

        let mode = RenderMode::from_audio_only(args.audio_only);
        if let Some(ext) = args.output.extension() {
            let ext = ext.to_string_lossy();
            if !mode.supports_container(&ext) {
                return Err(AppError::config(format!(
                    "cannot write a {mode} render to a .{ext} file (supported: {})",
                    mode.supported_containers().join(", ")
                )));
            }
        }

        let api_key = args
            .api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                AppError::config("a YouTube API key is required (--api-key or YOUTUBE_API_KEY)")
            })?;

        if let Some(cookies) = &args.cookies {
            if !cookies.is_file() {
                return Err(AppError::config(format!(
                    "cookies file not found: {}",
                    cookies.display()
                )));
            }
        }

        let published_after = args
            .published_after
            .as_deref()
            .map(parse_published_after)
            .transpose()?;

        Ok(Self {
            query,
            max_results: args.max_results,
            clip_length,
            silence,
            output: args.output,
            mode,
            randomize: !args.no_random,
            seed: args.seed,
            work_dir: args.work_dir.unwrap_or_else(std::env::temp_dir),
            published_after,
            cookies: args.cookies,
            api_key,
            api_base_url: args.api_base_url,
            lookup_durations: args.lookup_durations,
        })
    }

    pub fn planner(&self) -> AppResult<ClipPlanner> {
        Ok(ClipPlanner::new(self.clip_length)?)
    }

    pub fn sequencer(&self) -> Sequencer {
        Sequencer::new(self.randomize, self.silence)
    }

    pub fn catalog_config(&self) -> CatalogConfig {
        let mut config = CatalogConfig::new(self.api_key.clone())
            .with_published_after(self.published_after.clone())
            .with_duration_lookup(self.lookup_durations);
        if let Some(base_url) = &self.api_base_url {
            config = config.with_base_url(base_url.clone());
        }
        config
    }

    /// Create the per-run scratch directory under `work_dir`.
    ///
    /// Removed when the returned guard is dropped or closed.
    pub async fn create_scratch_dir(&self) -> AppResult<TempDir> {
        let setup_error = |e: std::io::Error| {
            AppError::setup(format!(
                "cannot create scratch directory in {}: {e}",
                self.work_dir.display()
            ))
        };

        tokio::fs::create_dir_all(&self.work_dir)
            .await
            .map_err(setup_error)?;
        tempfile::Builder::new()
            .prefix("blindtest-")
            .tempdir_in(&self.work_dir)
            .map_err(setup_error)
    }
}

/// Non-negative, finite seconds.
fn seconds(flag: &str, value: f64) -> AppResult<Duration> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::config(format!(
            "{flag} must be a non-negative number of seconds, got {value}"
        )));
    }
    Duration::try_from_secs_f64(value)
        .map_err(|e| AppError::config(format!("{flag} is out of range: {e}")))
}

/// Accept RFC 3339 or a bare `YYYY-MM-DD` date (midnight UTC).
fn parse_published_after(value: &str) -> AppResult<String> {
    let value = value.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.to_utc().to_rfc3339_opts(SecondsFormat::Secs, true));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().to_rfc3339_opts(SecondsFormat::Secs, true))
        .ok_or_else(|| {
            AppError::config(format!(
                "--published-after must be RFC 3339 or YYYY-MM-DD, got '{value}'"
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["blindtest", "eurovision", "--api-key", "test-key"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    fn config_error(extra: &[&str]) -> String {
        match BlindtestConfig::from_args(args(extra)) {
            Err(AppError::Config(msg)) => msg,
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn test_defaults() {
        let config = BlindtestConfig::from_args(args(&[])).unwrap();
        assert_eq!(config.query, "eurovision");
        assert_eq!(config.max_results, 5);
        assert_eq!(config.clip_length, Duration::from_secs(10));
        assert_eq!(config.silence, SilenceSpec::new(Duration::from_secs(1)));
        assert_eq!(config.mode, RenderMode::AudioVideo);
        assert!(config.randomize);
        assert_eq!(config.published_after, None);
    }

    #[test]
    fn test_audio_only_and_order() {
        let config = BlindtestConfig::from_args(args(&["--audio-only", "--no-random"])).unwrap();
        assert_eq!(config.mode, RenderMode::Audio);
        assert!(!config.sequencer().randomize());
    }

    #[test]
    fn test_rejects_bad_durations() {
        assert!(config_error(&["--clip-duration", "0"]).contains("--clip-duration"));
        assert!(config_error(&["--clip-duration", "-2"]).contains("--clip-duration"));
        assert!(config_error(&["--silence-duration", "-1"]).contains("--silence-duration"));
    }

    #[test]
    fn test_zero_silence_is_allowed() {
        let config = BlindtestConfig::from_args(args(&["--silence-duration", "0"])).unwrap();
        assert!(config.silence.is_empty());
    }

    #[test]
    fn test_max_results_bounds() {
        assert!(config_error(&["--max-results", "0"]).contains("--max-results"));
        assert!(config_error(&["--max-results", "51"]).contains("--max-results"));
        assert!(BlindtestConfig::from_args(args(&["--max-results", "50"])).is_ok());
    }

    #[test]
    fn test_blank_api_key() {
        let argv = ["blindtest", "eurovision", "--api-key", "  "];
        let result = BlindtestConfig::from_args(Args::try_parse_from(argv).unwrap());
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_missing_cookies_file() {
        assert!(config_error(&["--cookies", "/nonexistent/cookies.txt"]).contains("cookies"));
    }

    #[test]
    fn test_published_after_formats() {
        assert_eq!(
            parse_published_after("2020-05-01").unwrap(),
            "2020-05-01T00:00:00Z"
        );
        assert_eq!(
            parse_published_after("2021-03-04T10:00:00+02:00").unwrap(),
            "2021-03-04T08:00:00Z"
        );
        assert!(parse_published_after("last tuesday").is_err());
    }

    #[test]
    fn test_output_container_must_match_mode() {
        assert!(config_error(&["--output", "quiz.mp3"]).contains(".mp3"));
        assert!(config_error(&["--audio-only", "--output", "quiz.avi"]).contains(".avi"));

        for output in ["quiz.wav", "quiz.flac", "quiz.ogg", "quiz.opus", "quiz.MP3"] {
            let config = BlindtestConfig::from_args(args(&["--audio-only", "--output", output]));
            assert!(config.is_ok(), "{output}");
        }
        assert!(BlindtestConfig::from_args(args(&["--output", "quiz.webm"])).is_ok());
        assert!(BlindtestConfig::from_args(args(&["--output", "quiz"])).is_ok());
    }

    #[test]
    fn test_api_base_url_override() {
        let config =
            BlindtestConfig::from_args(args(&["--api-base-url", "http://127.0.0.1:9/v3"])).unwrap();
        assert_eq!(config.catalog_config().base_url, "http://127.0.0.1:9/v3");
    }

    #[tokio::test]
    async fn test_scratch_dir_is_created_and_removed() {
        let dir = TempDir::new().unwrap();
        let work_dir = dir.path().join("work");
        let mut config = BlindtestConfig::from_args(args(&[])).unwrap();
        config.work_dir = work_dir.clone();

        let scratch = config.create_scratch_dir().await.unwrap();
        let path = scratch.path().to_path_buf();
        assert!(path.starts_with(&work_dir) && path.is_dir());

        scratch.close().unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_unusable_work_dir_is_a_setup_failure() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("not-a-dir");
        std::fs::write(&file, b"x").unwrap();
        let mut config = BlindtestConfig::from_args(args(&[])).unwrap();
        config.work_dir = file;

        let err = config.create_scratch_dir().await.unwrap_err();
        assert_eq!(err.stage(), "setup");
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = BlindtestConfig::from_args(args(&[])).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("test-key"));
    }
}
