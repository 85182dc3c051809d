//! Blind test builder.
//!
//! Wires the YouTube catalog, the yt-dlp fetcher and the FFmpeg assembler
//! around the clip planner and sequencer:
//! - `cli`: command-line arguments
//! - `config`: validated run configuration
//! - `pipeline`: one run from search to rendered file
//! - `logging`: tracing setup and run-scoped log lines

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;

pub use cli::Args;
pub use config::BlindtestConfig;
pub use error::{AppError, AppResult};
pub use logging::{init_tracing, RunLogger};
pub use pipeline::{Pipeline, RunSummary};
