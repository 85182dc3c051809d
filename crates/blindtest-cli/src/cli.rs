//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Build a blind test from the results of a YouTube search.
#[derive(Debug, Clone, Parser)]
#[command(name = "blindtest", version)]
#[command(about = "Build a blind test video from YouTube search results", long_about = None)]
pub struct Args {
    /// Search query sent to the catalog
    pub query: String,

    /// Number of search results to turn into clips
    #[arg(long, default_value_t = 5)]
    pub max_results: u32,

    /// Length of each clip in seconds
    #[arg(long, default_value_t = 10.0, allow_negative_numbers = true)]
    pub clip_duration: f64,

    /// Output file
    #[arg(short, long, default_value = "blindtest.mp4", value_name = "FILE")]
    pub output: PathBuf,

    /// Render the soundtrack only
    #[arg(long)]
    pub audio_only: bool,

    /// Silence between clips in seconds
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub silence_duration: f64,

    /// Keep catalog order instead of shuffling
    #[arg(long)]
    pub no_random: bool,

    /// Seed for a reproducible shuffle
    #[arg(long)]
    pub seed: Option<u64>,

    /// Directory holding the per-run scratch directory
    #[arg(long, env = "BLINDTEST_WORK_DIR", value_name = "DIR")]
    pub work_dir: Option<PathBuf>,

    /// Only use videos published after this date (RFC 3339 or YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub published_after: Option<String>,

    /// Netscape cookies file handed to yt-dlp
    #[arg(long, value_name = "FILE")]
    pub cookies: Option<PathBuf>,

    /// YouTube Data API key
    #[arg(long, env = "YOUTUBE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// YouTube Data API endpoint
    #[arg(long, env = "YOUTUBE_API_BASE_URL", hide = true)]
    pub api_base_url: Option<String>,

    /// Ask the catalog for each video's duration
    #[arg(long)]
    pub lookup_durations: bool,
}
