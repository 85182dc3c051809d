//! Clip boundary planning.

use std::time::Duration;

use blindtest_models::{ClipPlan, FetchedMedia};

use crate::error::{ConfigError, InvalidMediaError};

/// Derives a start-anchored clip of a fixed length from each source.
///
/// The offset is always zero so a clip's boundary relative to the source
/// start is deterministic. Sources shorter than the requested length are
/// used in full.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipPlanner {
    requested_length: Duration,
}

impl ClipPlanner {
    pub fn new(requested_length: Duration) -> Result<Self, ConfigError> {
        if requested_length.is_zero() {
            return Err(ConfigError::NonPositiveClipLength);
        }
        Ok(Self { requested_length })
    }

    /// Plan the clip for one source.
    pub fn plan(&self, media: FetchedMedia) -> Result<ClipPlan, InvalidMediaError> {
        if media.actual_duration.is_zero() {
            return Err(InvalidMediaError::NonPositiveDuration {
                id: media.descriptor.id,
                duration: media.actual_duration,
            });
        }

        if !is_usable_handle(&media) {
            return Err(InvalidMediaError::UnusableHandle {
                id: media.descriptor.id,
                path: media.local_handle,
            });
        }

        let length = self.requested_length.min(media.actual_duration);

        Ok(ClipPlan {
            source: media,
            start_offset: Duration::ZERO,
            length,
        })
    }
}

fn is_usable_handle(media: &FetchedMedia) -> bool {
    !media.local_handle.as_os_str().is_empty() && media.local_handle.is_file()
}
