//! FFmpeg command builder and runner.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};

/// Number of stderr lines kept in error reports.
const STDERR_TAIL_LINES: usize = 8;

/// FFmpeg `-v` level; progress noise stays out of captured stderr.
const LOG_LEVEL: &str = "error";

/// What FFmpeg reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    /// A media file or concat list
    File(PathBuf),
    /// A libavfilter source graph (`-f lavfi`)
    Lavfi(String),
}

/// Builder for FFmpeg commands.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    input: Input,
    /// Output file path
    output: PathBuf,
    /// Input arguments (before -i)
    input_args: Vec<String>,
    /// Output arguments (after -i)
    output_args: Vec<String>,
    /// Whether to overwrite output
    overwrite: bool,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command reading a file.
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self::with_input(Input::File(input.as_ref().to_path_buf()), output)
    }

    /// Create a command whose input is a generated lavfi source.
    pub fn lavfi(graph: impl Into<String>, output: impl AsRef<Path>) -> Self {
        Self::with_input(Input::Lavfi(graph.into()), output).input_args(["-f", "lavfi"])
    }

    fn with_input(input: Input, output: impl AsRef<Path>) -> Self {
        Self {
            input,
            output: output.as_ref().to_path_buf(),
            input_args: Vec::new(),
            output_args: Vec::new(),
            overwrite: true,
        }
    }

    /// Add input arguments (before -i).
    pub fn input_arg(mut self, arg: impl Into<String>) -> Self {
        self.input_args.push(arg.into());
        self
    }

    /// Add multiple input arguments.
    pub fn input_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.input_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Add output arguments (after -i).
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Add multiple output arguments.
    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set seek position (before input).
    pub fn seek(self, offset: Duration) -> Self {
        self.input_arg("-ss").input_arg(format_secs(offset))
    }

    /// Limit how much of the input is read.
    pub fn duration(self, length: Duration) -> Self {
        self.input_arg("-t").input_arg(format_secs(length))
    }

    /// Set video filter.
    pub fn video_filter(self, filter: impl Into<String>) -> Self {
        self.output_arg("-vf").output_arg(filter)
    }

    /// Drop every video stream.
    pub fn no_video(self) -> Self {
        self.output_arg("-vn")
    }

    /// Copy all streams without re-encoding.
    pub fn stream_copy(self) -> Self {
        self.output_arg("-c").output_arg("copy")
    }

    /// Move the moov atom to the front of MP4-family outputs.
    pub fn faststart(self) -> Self {
        self.output_arg("-movflags").output_arg("+faststart")
    }

    pub fn output_path(&self) -> &Path {
        &self.output
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if self.overwrite {
            args.push("-y".to_string());
        }

        args.push("-hide_banner".to_string());
        args.push("-nostdin".to_string());
        args.push("-v".to_string());
        args.push(LOG_LEVEL.to_string());

        args.extend(self.input_args.iter().cloned());

        args.push("-i".to_string());
        args.push(match &self.input {
            Input::File(path) => path.to_string_lossy().to_string(),
            Input::Lavfi(graph) => graph.clone(),
        });

        args.extend(self.output_args.iter().cloned());

        args.push(self.output.to_string_lossy().to_string());

        args
    }
}

/// Format a duration the way FFmpeg time options expect.
pub fn format_secs(d: Duration) -> String {
    format!("{:.3}", d.as_secs_f64())
}

/// Runner for FFmpeg commands with a timeout.
///
/// The child is killed if the runner's future is dropped, so abandoning a
/// run stops any encode in flight.
#[derive(Debug, Clone, Default)]
pub struct FfmpegRunner {
    /// Timeout in seconds
    timeout_secs: Option<u64>,
}

impl FfmpegRunner {
    /// Create a new runner.
    pub fn new() -> Self {
        Self { timeout_secs: None }
    }

    /// Set timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Run an FFmpeg command to completion.
    pub async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<()> {
        check_ffmpeg()?;

        let args = cmd.build_args();
        debug!("Running FFmpeg: ffmpeg {}", args.join(" "));

        let output = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = match self.timeout_secs {
            Some(secs) => tokio::time::timeout(Duration::from_secs(secs), output)
                .await
                .map_err(|_| {
                    warn!("FFmpeg timed out after {} seconds, killing process", secs);
                    MediaError::Timeout(secs)
                })??,
            None => output.await?,
        };

        if output.status.success() {
            return Ok(());
        }

        Err(MediaError::ffmpeg_failed(
            "FFmpeg exited with non-zero status",
            Some(stderr_tail(&output.stderr)),
            output.status.code(),
        ))
    }
}

/// Last few non-empty stderr lines.
pub(crate) fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}

/// Check if FFmpeg is available.
pub fn check_ffmpeg() -> MediaResult<PathBuf> {
    which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)
}

/// Check if FFprobe is available.
pub fn check_ffprobe() -> MediaResult<PathBuf> {
    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)
}

/// Check if yt-dlp is available.
pub fn check_ytdlp() -> MediaResult<PathBuf> {
    which::which("yt-dlp").map_err(|_| MediaError::YtDlpNotFound)
}
