//! External media tooling for blind tests.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building and execution
//! - FFprobe media inspection
//! - `YtDlpFetcher`: source download via yt-dlp
//! - `FfmpegAssembler`: trimming, silence generation and concatenation

pub mod command;
pub mod download;
pub mod error;
pub mod fs_utils;
pub mod probe;
pub mod render;

pub use command::{check_ffmpeg, check_ffprobe, check_ytdlp, FfmpegCommand, FfmpegRunner};
pub use download::YtDlpFetcher;
pub use error::{MediaError, MediaResult};
pub use probe::{probe_media, MediaInfo};
pub use render::FfmpegAssembler;
