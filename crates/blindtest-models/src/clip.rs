//! Clip intervals and silence gaps.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::media::FetchedMedia;

/// A contiguous interval to extract from a fetched source.
///
/// `start_offset + length` never exceeds the source's actual duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipPlan {
    pub source: FetchedMedia,
    pub start_offset: Duration,
    pub length: Duration,
}

impl ClipPlan {
    /// Offset where the clip stops in the source.
    pub fn end(&self) -> Duration {
        self.start_offset + self.length
    }

    pub fn title(&self) -> &str {
        self.source.title()
    }
}

/// A gap of generated silence between two clips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SilenceSpec {
    pub length: Duration,
}

impl SilenceSpec {
    pub fn new(length: Duration) -> Self {
        Self { length }
    }

    /// A zero-length gap renders to nothing.
    pub fn is_empty(&self) -> bool {
        self.length.is_zero()
    }
}
