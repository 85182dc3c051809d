//! Error taxonomy for a blind test run.
//!
//! Search and render errors are fatal. Fetch and invalid-media errors are
//! per-item: the item is dropped and the run continues.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// The catalog could not be queried.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Catalog rejected credentials: {0}")]
    Unauthorized(String),

    #[error("Catalog unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid catalog response: {0}")]
    InvalidResponse(String),
}

/// A single source could not be retrieved.
#[derive(Debug, Error)]
#[error("Failed to fetch {id}: {reason}")]
pub struct FetchError {
    pub id: String,
    pub reason: String,
}

impl FetchError {
    pub fn new(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            reason: reason.into(),
        }
    }
}

/// A fetched source cannot be clipped.
#[derive(Debug, Error)]
pub enum InvalidMediaError {
    #[error("Media {id} has no playable duration ({duration:?})")]
    NonPositiveDuration { id: String, duration: Duration },

    #[error("Media {id} handle is unusable: {path}")]
    UnusableHandle { id: String, path: PathBuf },
}

impl InvalidMediaError {
    pub fn id(&self) -> &str {
        match self {
            InvalidMediaError::NonPositiveDuration { id, .. }
            | InvalidMediaError::UnusableHandle { id, .. } => id,
        }
    }
}

/// Per-item failure collected during fetch and planning.
#[derive(Debug, Error)]
pub enum ItemError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    InvalidMedia(#[from] InvalidMediaError),
}

impl ItemError {
    /// Identifier of the dropped item.
    pub fn id(&self) -> &str {
        match self {
            ItemError::Fetch(e) => &e.id,
            ItemError::InvalidMedia(e) => e.id(),
        }
    }

    /// Item failures never abort a run; the item is skipped.
    pub fn is_recoverable(&self) -> bool {
        true
    }
}

/// The timeline could not be turned into an output file.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Nothing to render: timeline is empty")]
    EmptyTimeline,

    #[error("Tool unavailable: {0}")]
    ToolUnavailable(String),

    #[error("Segment {index} failed: {message}")]
    SegmentFailed { index: usize, message: String },

    #[error("Concatenation failed: {0}")]
    ConcatFailed(String),

    #[error("Output could not be written: {0}")]
    Output(String),
}

/// Invalid planning parameters.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Clip length must be greater than zero")]
    NonPositiveClipLength,
}
