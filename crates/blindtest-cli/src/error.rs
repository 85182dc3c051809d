//! Run-level errors and exit codes.

use thiserror::Error;

use blindtest_catalog::CatalogError;
use blindtest_core::{RenderError, SearchError};
use blindtest_media::MediaError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing tool: {0}")]
    Preflight(String),

    #[error("Setup failed: {0}")]
    Setup(String),

    #[error("Search failed: {0}")]
    Search(#[from] SearchError),

    #[error("No usable clips: {skipped} of {found} results were skipped")]
    NoUsableClips { found: usize, skipped: usize },

    #[error("Render failed: {0}")]
    Render(#[from] RenderError),

    #[error("Interrupted")]
    Cancelled,
}

impl AppError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn setup(msg: impl Into<String>) -> Self {
        Self::Setup(msg.into())
    }

    /// Pipeline stage the error belongs to.
    pub fn stage(&self) -> &'static str {
        match self {
            AppError::Config(_) => "config",
            AppError::Preflight(_) => "preflight",
            AppError::Setup(_) => "setup",
            AppError::Search(_) => "search",
            AppError::NoUsableClips { .. } => "planning",
            AppError::Render(_) => "render",
            AppError::Cancelled => "cancelled",
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Config(_) => 2,
            AppError::Cancelled => 130,
            _ => 1,
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::MissingApiKey => AppError::config(e.to_string()),
            other => AppError::Search(other.into()),
        }
    }
}

impl From<MediaError> for AppError {
    fn from(e: MediaError) -> Self {
        match e {
            MediaError::FfmpegNotFound | MediaError::FfprobeNotFound | MediaError::YtDlpNotFound => {
                AppError::Preflight(e.to_string())
            }
            other => AppError::Render(RenderError::Output(other.detailed())),
        }
    }
}

impl From<blindtest_core::ConfigError> for AppError {
    fn from(e: blindtest_core::ConfigError) -> Self {
        AppError::config(e.to_string())
    }
}
