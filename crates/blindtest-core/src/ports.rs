//! Collaborator traits driven by the pipeline.
//!
//! Implementations live in the catalog and media crates; tests substitute
//! in-memory fakes.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use blindtest_models::{FetchedMedia, MediaDescriptor, RenderMode, Timeline};

use crate::error::{FetchError, RenderError, SearchError};

/// Searches a video catalog.
#[async_trait]
pub trait SourceCatalog: Send + Sync {
    /// Up to `max_results` descriptors, in catalog order.
    async fn search(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<MediaDescriptor>, SearchError>;
}

/// Retrieves playable media for a descriptor.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    async fn fetch(&self, descriptor: &MediaDescriptor) -> Result<FetchedMedia, FetchError>;
}

/// Renders a timeline into a single output file.
#[async_trait]
pub trait Assembler: Send + Sync {
    /// Render `timeline` to `output`, returning the written path.
    ///
    /// On failure no partial output is left at `output`.
    async fn render(
        &self,
        timeline: &Timeline,
        mode: RenderMode,
        output: &Path,
    ) -> Result<PathBuf, RenderError>;
}
