//! YouTube Data API catalog.
//!
//! Searches for embeddable videos matching a query and turns the results
//! into [`MediaDescriptor`](blindtest_models::MediaDescriptor)s, optionally
//! enriched with their durations.

pub mod client;
pub mod config;
pub mod duration;
pub mod error;
pub mod types;

pub use client::YoutubeCatalog;
pub use config::{CatalogConfig, DEFAULT_BASE_URL, MAX_RESULTS_CAP};
pub use error::{CatalogError, CatalogResult};
