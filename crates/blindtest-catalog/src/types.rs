//! YouTube Data API response types.
//!
//! Only the fields the catalog reads are modelled; everything else is
//! ignored by serde.

use serde::Deserialize;

/// `GET /search` response.
#[derive(Debug, Deserialize)]
pub struct SearchListResponse {
    #[serde(default)]
    pub items: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
pub struct SearchResult {
    pub id: ResourceId,
    #[serde(default)]
    pub snippet: Option<Snippet>,
}

#[derive(Debug, Deserialize)]
pub struct ResourceId {
    #[serde(rename = "videoId")]
    pub video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Snippet {
    pub title: Option<String>,
}

/// `GET /videos?part=contentDetails` response.
#[derive(Debug, Deserialize)]
pub struct VideoListResponse {
    #[serde(default)]
    pub items: Vec<VideoResource>,
}

#[derive(Debug, Deserialize)]
pub struct VideoResource {
    pub id: String,
    #[serde(rename = "contentDetails")]
    pub content_details: Option<ContentDetails>,
}

#[derive(Debug, Deserialize)]
pub struct ContentDetails {
    /// ISO 8601 duration, e.g. `PT4M13S`
    pub duration: Option<String>,
}
