//! Source download using yt-dlp.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};

use blindtest_core::{FetchError, MediaFetcher};
use blindtest_models::{FetchedMedia, MediaDescriptor, RenderMode};

use crate::command::check_ytdlp;
use crate::error::{MediaError, MediaResult};
use crate::probe::probe_media;

/// Format selector when only the soundtrack is needed.
const AUDIO_FORMAT: &str = "bestaudio/best";

/// Format selector for audio+video renders.
const VIDEO_FORMAT: &str = "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best";

/// Per-download timeout.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(600);

/// Downloads sources into a run-owned directory with yt-dlp.
#[derive(Debug, Clone)]
pub struct YtDlpFetcher {
    download_dir: PathBuf,
    mode: RenderMode,
    cookies: Option<PathBuf>,
}

impl YtDlpFetcher {
    pub fn new(download_dir: impl Into<PathBuf>, mode: RenderMode) -> Self {
        Self {
            download_dir: download_dir.into(),
            mode,
            cookies: None,
        }
    }

    /// Netscape cookies file passed to yt-dlp for authenticated downloads.
    pub fn with_cookies(mut self, cookies: Option<PathBuf>) -> Self {
        self.cookies = cookies;
        self
    }

    fn format_selector(&self) -> &'static str {
        match self.mode {
            RenderMode::Audio => AUDIO_FORMAT,
            RenderMode::AudioVideo => VIDEO_FORMAT,
        }
    }

    /// yt-dlp arguments for one descriptor.
    fn build_args(&self, descriptor: &MediaDescriptor) -> Vec<String> {
        let template = self.download_dir.join(format!("{}.%(ext)s", descriptor.id));

        let mut args: Vec<String> = [
            "--no-playlist",
            "--no-progress",
            "--no-warnings",
            "--no-simulate",
            "--print",
            "after_move:filepath",
            "-f",
            self.format_selector(),
        ]
        .into_iter()
        .map(String::from)
        .collect();

        if self.mode.has_video() {
            args.push("--merge-output-format".to_string());
            args.push("mp4".to_string());
        }

        args.push("-o".to_string());
        args.push(template.to_string_lossy().to_string());

        if let Some(cookies) = &self.cookies {
            args.push("--cookies".to_string());
            args.push(cookies.to_string_lossy().to_string());
        }

        args.push(descriptor.watch_url());
        args
    }

    /// Download the source for `descriptor`, returning the local file.
    pub async fn download(&self, descriptor: &MediaDescriptor) -> MediaResult<PathBuf> {
        check_ytdlp()?;
        tokio::fs::create_dir_all(&self.download_dir).await?;

        let url = descriptor.watch_url();
        info!(id = %descriptor.id, url = %url, mode = %self.mode, "Downloading source");

        let args = self.build_args(descriptor);
        debug!("Running yt-dlp {}", args.join(" "));

        let output = Command::new("yt-dlp")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(DOWNLOAD_TIMEOUT, output)
            .await
            .map_err(|_| MediaError::Timeout(DOWNLOAD_TIMEOUT.as_secs()))??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!("yt-dlp stderr: {}", stderr);

            if is_rate_limited(&stderr) {
                warn!(id = %descriptor.id, "YouTube rate limit detected");
            }

            let error_msg = stderr
                .lines()
                .rev()
                .find(|l| !l.trim().is_empty())
                .unwrap_or("Unknown error");
            return Err(MediaError::download_failed(format!("yt-dlp failed: {}", error_msg)));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let path = printed_path(&stdout)
            .ok_or_else(|| MediaError::download_failed("yt-dlp did not report an output file"))?;

        if !path.is_file() {
            return Err(MediaError::FileNotFound(path));
        }

        let size = tokio::fs::metadata(&path).await?.len();
        info!(
            id = %descriptor.id,
            output = %path.display(),
            size_mb = size as f64 / (1024.0 * 1024.0),
            "Downloaded source"
        );

        Ok(path)
    }
}

#[async_trait]
impl MediaFetcher for YtDlpFetcher {
    async fn fetch(&self, descriptor: &MediaDescriptor) -> Result<FetchedMedia, FetchError> {
        let to_fetch_error = |e: MediaError| FetchError::new(&descriptor.id, e.detailed());

        let path = self.download(descriptor).await.map_err(to_fetch_error)?;
        let info = probe_media(&path).await.map_err(to_fetch_error)?;
        info.check_streams(self.mode).map_err(to_fetch_error)?;
        let actual_duration = info.playable_duration();

        if let Some(known) = descriptor.known_duration {
            debug!(
                id = %descriptor.id,
                catalog_secs = known.as_secs_f64(),
                probed_secs = actual_duration.as_secs_f64(),
                "Probed source duration"
            );
        }

        Ok(FetchedMedia::new(descriptor.clone(), path, actual_duration))
    }
}

/// Final file path printed by `--print after_move:filepath`.
fn printed_path(stdout: &str) -> Option<PathBuf> {
    stdout
        .lines()
        .map(str::trim)
        .rfind(|l| !l.is_empty())
        .map(PathBuf::from)
}

/// Detect YouTube throttling in yt-dlp output.
fn is_rate_limited(stderr: &str) -> bool {
    stderr.contains("429")
        || stderr.contains("Too Many Requests")
        || stderr.contains("rate limit")
        || stderr.contains("Sign in to confirm")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> MediaDescriptor {
        MediaDescriptor::new("abc123", "Song 1")
    }

    #[test]
    fn test_audio_mode_args() {
        let fetcher = YtDlpFetcher::new("/tmp/run/downloads", RenderMode::Audio);
        let args = fetcher.build_args(&descriptor());

        let format = args.iter().position(|a| a == "-f").unwrap();
        assert_eq!(args[format + 1], "bestaudio/best");
        assert!(!args.contains(&"--merge-output-format".to_string()));

        let template = args.iter().position(|a| a == "-o").unwrap();
        assert_eq!(args[template + 1], "/tmp/run/downloads/abc123.%(ext)s");
        assert_eq!(
            args.last().map(String::as_str),
            Some("https://www.youtube.com/watch?v=abc123")
        );
    }

    #[test]
    fn test_video_mode_args_with_cookies() {
        let fetcher = YtDlpFetcher::new("/tmp/dl", RenderMode::AudioVideo)
            .with_cookies(Some(PathBuf::from("/etc/cookies.txt")));
        let args = fetcher.build_args(&descriptor());

        let format = args.iter().position(|a| a == "-f").unwrap();
        assert_eq!(args[format + 1], VIDEO_FORMAT);
        let merge = args.iter().position(|a| a == "--merge-output-format").unwrap();
        assert_eq!(args[merge + 1], "mp4");
        let cookies = args.iter().position(|a| a == "--cookies").unwrap();
        assert_eq!(args[cookies + 1], "/etc/cookies.txt");
    }

    #[test]
    fn test_printed_path_takes_last_line() {
        let stdout = "/tmp/dl/abc123.webm\n/tmp/dl/abc123.m4a\n\n";
        assert_eq!(printed_path(stdout), Some(PathBuf::from("/tmp/dl/abc123.m4a")));
        assert_eq!(printed_path("  \n"), None);
    }

    #[test]
    fn test_rate_limit_detection() {
        assert!(is_rate_limited("ERROR: HTTP Error 429: Too Many Requests"));
        assert!(is_rate_limited("Sign in to confirm you're not a bot"));
        assert!(!is_rate_limited("ERROR: Video unavailable"));
    }
}
