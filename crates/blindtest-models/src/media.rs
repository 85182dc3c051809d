//! Catalog descriptors and locally fetched media.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Base URL of a watch page on the video platform.
pub const WATCH_URL_BASE: &str = "https://www.youtube.com/watch?v=";

/// A candidate returned by the source catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaDescriptor {
    /// Opaque platform identifier
    pub id: String,
    /// Human readable title (the blind test answer)
    pub title: String,
    /// Duration reported by the catalog, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub known_duration: Option<Duration>,
}

impl MediaDescriptor {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            known_duration: None,
        }
    }

    /// Public watch page for this descriptor.
    pub fn watch_url(&self) -> String {
        format!("{}{}", WATCH_URL_BASE, self.id)
    }
}

/// Media downloaded for a descriptor, ready to be clipped.
///
/// Owned by the run that fetched it. The file behind `local_handle` lives in
/// the run's work directory and disappears with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchedMedia {
    pub descriptor: MediaDescriptor,
    /// Path to the playable file
    pub local_handle: PathBuf,
    /// Duration measured on the downloaded file
    pub actual_duration: Duration,
}

impl FetchedMedia {
    pub fn new(
        descriptor: MediaDescriptor,
        local_handle: impl Into<PathBuf>,
        actual_duration: Duration,
    ) -> Self {
        Self {
            descriptor,
            local_handle: local_handle.into(),
            actual_duration,
        }
    }

    pub fn id(&self) -> &str {
        &self.descriptor.id
    }

    pub fn title(&self) -> &str {
        &self.descriptor.title
    }

    pub fn path(&self) -> &Path {
        &self.local_handle
    }
}
