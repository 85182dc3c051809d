//! YouTube Data API search client.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, info, info_span, warn, Instrument};

use blindtest_core::{SearchError, SourceCatalog};
use blindtest_models::MediaDescriptor;

use crate::config::{CatalogConfig, MAX_RESULTS_CAP};
use crate::duration::parse_iso8601_duration;
use crate::error::{CatalogError, CatalogResult};
use crate::types::{SearchListResponse, VideoListResponse};

/// Title used when the catalog returns none.
const UNTITLED: &str = "Untitled";

/// Catalog backed by the YouTube Data API v3.
#[derive(Debug, Clone)]
pub struct YoutubeCatalog {
    http: Client,
    config: CatalogConfig,
}

impl YoutubeCatalog {
    /// Create a new catalog client.
    pub fn new(config: CatalogConfig) -> CatalogResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(CatalogError::MissingApiKey);
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(5))
            .user_agent(concat!("blindtest-catalog/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, config })
    }

    /// Search for embeddable videos matching `query`.
    pub async fn search_videos(
        &self,
        query: &str,
        max_results: u32,
    ) -> CatalogResult<Vec<MediaDescriptor>> {
        let capped = max_results.clamp(1, MAX_RESULTS_CAP);
        if capped != max_results {
            warn!(
                requested = max_results,
                used = capped,
                "maxResults outside the accepted range, clamping"
            );
        }

        let max_results_param = capped.to_string();
        let mut params: Vec<(&str, &str)> = vec![
            ("part", "snippet"),
            ("q", query),
            ("maxResults", &max_results_param),
            ("type", "video"),
            ("videoEmbeddable", "true"),
            ("key", &self.config.api_key),
        ];
        if let Some(published_after) = self.config.published_after.as_deref() {
            params.push(("publishedAfter", published_after));
        }

        let response: SearchListResponse = self.get_json("search", &params).await?;

        let total = response.items.len();
        let mut descriptors: Vec<MediaDescriptor> = response
            .items
            .into_iter()
            .filter_map(|item| {
                let id = item.id.video_id.filter(|id| !id.is_empty())?;
                let title = item
                    .snippet
                    .and_then(|s| s.title)
                    .unwrap_or_else(|| UNTITLED.to_string());
                Some(MediaDescriptor::new(id, title))
            })
            .collect();

        if descriptors.len() < total {
            debug!(
                skipped = total - descriptors.len(),
                "Ignoring search results without a video id"
            );
        }

        if self.config.lookup_durations && !descriptors.is_empty() {
            match self.lookup_durations(&descriptors).await {
                Ok(durations) => {
                    for descriptor in &mut descriptors {
                        descriptor.known_duration = durations.get(&descriptor.id).copied();
                    }
                }
                Err(e) => warn!(error = %e, "Duration lookup failed, continuing without durations"),
            }
        }

        Ok(descriptors)
    }

    /// Durations for the given descriptors, keyed by video id.
    async fn lookup_durations(
        &self,
        descriptors: &[MediaDescriptor],
    ) -> CatalogResult<HashMap<String, Duration>> {
        let ids = descriptors
            .iter()
            .map(|d| d.id.as_str())
            .collect::<Vec<_>>()
            .join(",");

        let params = [
            ("part", "contentDetails"),
            ("id", ids.as_str()),
            ("key", self.config.api_key.as_str()),
        ];
        let response: VideoListResponse = self.get_json("videos", &params).await?;

        Ok(response
            .items
            .into_iter()
            .filter_map(|video| {
                let raw = video.content_details?.duration?;
                let duration = parse_iso8601_duration(&raw);
                if duration.is_none() {
                    debug!(id = %video.id, duration = %raw, "Unparseable video duration");
                }
                Some((video.id, duration?))
            })
            .collect())
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> CatalogResult<T> {
        let url = self.config.endpoint(endpoint);

        async {
            let response = self.http.get(&url).query(params).send().await?;
            let response = Self::check_status(response).await?;
            let body = response.bytes().await?;
            Ok::<T, CatalogError>(serde_json::from_slice(&body)?)
        }
        .instrument(info_span!("youtube_api", endpoint = endpoint))
        .await
    }

    async fn check_status(response: Response) -> CatalogResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(CatalogError::from_http_status(status.as_u16(), body))
    }
}

#[async_trait]
impl SourceCatalog for YoutubeCatalog {
    async fn search(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<MediaDescriptor>, SearchError> {
        info!(query = %query, max_results, "Searching catalog");
        let descriptors = self.search_videos(query, max_results).await?;
        info!(found = descriptors.len(), "Catalog search complete");
        Ok(descriptors)
    }
}
