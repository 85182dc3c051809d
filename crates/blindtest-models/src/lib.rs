//! Shared data models for the blind test builder.
//!
//! This crate provides Serde-serializable types for:
//! - Catalog results and fetched media
//! - Clip plans, silence gaps and the ordered timeline
//! - Render mode and encoding configuration
//! - Run identifiers

pub mod clip;
pub mod encoding;
pub mod media;
pub mod run;
pub mod timeline;

// Re-export common types
pub use clip::{ClipPlan, SilenceSpec};
pub use encoding::{EncodingConfig, RenderMode};
pub use media::{FetchedMedia, MediaDescriptor};
pub use run::RunId;
pub use timeline::{Segment, Timeline};
