//! Render mode and encoding configuration.

use serde::{Deserialize, Serialize};

/// Default video codec (H.264)
pub const DEFAULT_VIDEO_CODEC: &str = "libx264";
/// Default audio codec
pub const DEFAULT_AUDIO_CODEC: &str = "aac";
/// Video codec for `.webm` outputs
pub const WEBM_VIDEO_CODEC: &str = "libvpx-vp9";
/// Default encoding preset
pub const DEFAULT_PRESET: &str = "fast";
/// Default CRF (Constant Rate Factor)
pub const DEFAULT_CRF: u8 = 18;
/// Default audio bitrate
pub const DEFAULT_AUDIO_BITRATE: &str = "128k";

/// Canvas every clip is scaled and padded onto.
pub const DEFAULT_WIDTH: u32 = 1280;
pub const DEFAULT_HEIGHT: u32 = 720;
pub const DEFAULT_FPS: u32 = 30;

/// Audio layout shared by clips and generated silence.
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;
pub const DEFAULT_CHANNELS: u8 = 2;
/// Opus only encodes at 48 kHz and its submultiples.
pub const OPUS_SAMPLE_RATE: u32 = 48_000;

/// Containers an audio-only render can be written to.
const AUDIO_CONTAINERS: &[&str] = &[
    "mp3", "m4a", "aac", "wav", "flac", "ogg", "opus", "mka", "mp4", "mkv", "mov", "webm",
];

/// Containers an audio+video render can be written to.
const VIDEO_CONTAINERS: &[&str] = &["mp4", "mkv", "mov", "webm"];

/// What the final file contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    Audio,
    #[default]
    AudioVideo,
}

impl RenderMode {
    pub fn from_audio_only(audio_only: bool) -> Self {
        if audio_only {
            RenderMode::Audio
        } else {
            RenderMode::AudioVideo
        }
    }

    pub fn has_video(&self) -> bool {
        matches!(self, RenderMode::AudioVideo)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RenderMode::Audio => "audio",
            RenderMode::AudioVideo => "audio_video",
        }
    }

    /// Whether a file with this extension can hold the render.
    pub fn supports_container(&self, extension: &str) -> bool {
        self.supported_containers()
            .iter()
            .any(|c| c.eq_ignore_ascii_case(extension))
    }

    pub fn supported_containers(&self) -> &'static [&'static str] {
        match self {
            RenderMode::Audio => AUDIO_CONTAINERS,
            RenderMode::AudioVideo => VIDEO_CONTAINERS,
        }
    }
}

impl std::fmt::Display for RenderMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Encoding settings applied to every rendered segment.
///
/// All segments share codec, canvas and audio layout so the concat demuxer
/// can join them without re-encoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodingConfig {
    /// Video codec (e.g., "libx264")
    #[serde(default = "default_video_codec")]
    pub codec: String,

    /// Encoding preset (e.g., "fast", "medium", "slow")
    #[serde(default = "default_preset")]
    pub preset: String,

    /// Constant Rate Factor (quality, 0-51, lower is better)
    #[serde(default = "default_crf")]
    pub crf: u8,

    /// Audio codec
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,

    /// Audio bitrate
    #[serde(default = "default_audio_bitrate")]
    pub audio_bitrate: String,

    #[serde(default = "default_width")]
    pub width: u32,

    #[serde(default = "default_height")]
    pub height: u32,

    #[serde(default = "default_fps")]
    pub fps: u32,

    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    #[serde(default = "default_channels")]
    pub channels: u8,
}

fn default_video_codec() -> String {
    DEFAULT_VIDEO_CODEC.to_string()
}
fn default_preset() -> String {
    DEFAULT_PRESET.to_string()
}
fn default_crf() -> u8 {
    DEFAULT_CRF
}
fn default_audio_codec() -> String {
    DEFAULT_AUDIO_CODEC.to_string()
}
fn default_audio_bitrate() -> String {
    DEFAULT_AUDIO_BITRATE.to_string()
}
fn default_width() -> u32 {
    DEFAULT_WIDTH
}
fn default_height() -> u32 {
    DEFAULT_HEIGHT
}
fn default_fps() -> u32 {
    DEFAULT_FPS
}
fn default_sample_rate() -> u32 {
    DEFAULT_SAMPLE_RATE
}
fn default_channels() -> u8 {
    DEFAULT_CHANNELS
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            codec: DEFAULT_VIDEO_CODEC.to_string(),
            preset: DEFAULT_PRESET.to_string(),
            crf: DEFAULT_CRF,
            audio_codec: DEFAULT_AUDIO_CODEC.to_string(),
            audio_bitrate: DEFAULT_AUDIO_BITRATE.to_string(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            fps: DEFAULT_FPS,
            sample_rate: DEFAULT_SAMPLE_RATE,
            channels: DEFAULT_CHANNELS,
        }
    }
}

impl EncodingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick codecs the output container accepts.
    ///
    /// Segments are joined with stream copy, so they must already be encoded
    /// in the final container's codecs.
    pub fn for_output_extension(mut self, extension: Option<&str>) -> Self {
        let extension = extension.map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("mp3") => self.audio_codec = "libmp3lame".to_string(),
            Some("wav") => self.audio_codec = "pcm_s16le".to_string(),
            Some("flac") => self.audio_codec = "flac".to_string(),
            Some("ogg") => self.audio_codec = "libvorbis".to_string(),
            Some("opus") => {
                self.audio_codec = "libopus".to_string();
                self.sample_rate = OPUS_SAMPLE_RATE;
            }
            Some("webm") => {
                self.codec = WEBM_VIDEO_CODEC.to_string();
                self.audio_codec = "libopus".to_string();
                self.sample_rate = OPUS_SAMPLE_RATE;
            }
            _ => {}
        }
        self
    }

    /// Video filter that fits any source onto the canvas.
    pub fn canvas_filter(&self) -> String {
        format!(
            "scale={w}:{h}:force_original_aspect_ratio=decrease,pad={w}:{h}:(ow-iw)/2:(oh-ih)/2,setsar=1,fps={fps}",
            w = self.width,
            h = self.height,
            fps = self.fps
        )
    }

    /// Video encoder arguments.
    pub fn video_args(&self) -> Vec<String> {
        let mut args = vec!["-c:v".to_string(), self.codec.clone()];
        if self.codec == WEBM_VIDEO_CODEC {
            // libvpx has no presets; constant quality needs a zero bitrate
            args.extend(["-b:v".to_string(), "0".to_string()]);
        } else {
            args.extend(["-preset".to_string(), self.preset.clone()]);
        }
        args.extend([
            "-crf".to_string(),
            self.crf.to_string(),
            "-pix_fmt".to_string(),
            "yuv420p".to_string(),
        ]);
        args
    }

    /// Audio encoder arguments, resampled to the shared layout.
    pub fn audio_args(&self) -> Vec<String> {
        vec![
            "-c:a".to_string(),
            self.audio_codec.clone(),
            "-b:a".to_string(),
            self.audio_bitrate.clone(),
            "-ar".to_string(),
            self.sample_rate.to_string(),
            "-ac".to_string(),
            self.channels.to_string(),
        ]
    }
}
