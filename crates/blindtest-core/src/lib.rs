//! Clip planning and timeline sequencing.
//!
//! This crate provides:
//! - `ClipPlanner`: clip boundaries for each fetched source
//! - `Sequencer`: ordering policy and silence interleaving
//! - `plan_batch`: per-item result collection with skip-on-failure
//! - The error taxonomy shared by every stage
//! - Traits for the catalog, fetcher and assembler collaborators
//!
//! Nothing here performs I/O beyond reading file metadata.

pub mod batch;
pub mod error;
pub mod planner;
pub mod ports;
pub mod sequencer;

pub use batch::{plan_batch, PlannedBatch};
pub use error::{
    ConfigError, FetchError, InvalidMediaError, ItemError, RenderError, SearchError,
};
pub use planner::ClipPlanner;
pub use ports::{Assembler, MediaFetcher, SourceCatalog};
pub use sequencer::Sequencer;
