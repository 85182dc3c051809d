//! FFprobe media information.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::process::Command;

use blindtest_models::RenderMode;

use crate::command::{check_ffprobe, stderr_tail};
use crate::error::{MediaError, MediaResult};

/// Media file information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Duration in seconds (0.0 when unknown)
    pub duration: f64,
    pub has_video: bool,
    pub has_audio: bool,
    /// Width in pixels of the first video stream
    pub width: u32,
    /// Height in pixels of the first video stream
    pub height: u32,
}

impl MediaInfo {
    /// Duration as a `Duration`; unknown, negative or non-finite values
    /// collapse to zero.
    pub fn playable_duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.duration).unwrap_or(Duration::ZERO)
    }

    /// Ensure the streams a `mode` render maps are present.
    pub fn check_streams(&self, mode: RenderMode) -> MediaResult<()> {
        if !self.has_audio {
            return Err(MediaError::InvalidMedia("source has no audio stream".to_string()));
        }
        if mode.has_video() && !self.has_video {
            return Err(MediaError::InvalidMedia("source has no video stream".to_string()));
        }
        Ok(())
    }
}

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    format: Option<FfprobeFormat>,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    duration: Option<String>,
}

/// Probe a media file for information.
pub async fn probe_media(path: impl AsRef<Path>) -> MediaResult<MediaInfo> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    check_ffprobe()?;

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await?;

    if !output.status.success() {
        return Err(MediaError::FfprobeFailed {
            message: format!("FFprobe failed on {}", path.display()),
            stderr: Some(stderr_tail(&output.stderr)),
        });
    }

    parse_probe_output(&output.stdout)
}

/// Interpret `ffprobe -print_format json` output.
fn parse_probe_output(stdout: &[u8]) -> MediaResult<MediaInfo> {
    let probe: FfprobeOutput = serde_json::from_slice(stdout)?;

    let stream_of = |kind: &str| {
        probe
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some(kind))
    };
    let video = stream_of("video");
    let audio = stream_of("audio");

    if video.is_none() && audio.is_none() {
        return Err(MediaError::InvalidMedia(
            "no audio or video stream found".to_string(),
        ));
    }

    // Container duration first; some muxers only report it per stream.
    let duration = probe
        .format
        .as_ref()
        .and_then(|f| parse_secs(f.duration.as_deref()))
        .or_else(|| {
            probe
                .streams
                .iter()
                .filter_map(|s| parse_secs(s.duration.as_deref()))
                .reduce(f64::max)
        })
        .unwrap_or(0.0);

    Ok(MediaInfo {
        duration,
        has_video: video.is_some(),
        has_audio: audio.is_some(),
        width: video.and_then(|v| v.width).unwrap_or(0),
        height: video.and_then(|v| v.height).unwrap_or(0),
    })
}

fn parse_secs(value: Option<&str>) -> Option<f64> {
    value?.trim().parse::<f64>().ok().filter(|d| d.is_finite())
}
