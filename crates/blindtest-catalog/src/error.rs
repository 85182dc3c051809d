//! Catalog error types.

use blindtest_core::SearchError;
use thiserror::Error;

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors that can occur while querying the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("A YouTube API key must be supplied (YOUTUBE_API_KEY)")]
    MissingApiKey,

    #[error("Request rejected with HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CatalogError {
    pub fn from_http_status(status: u16, body: impl Into<String>) -> Self {
        Self::Http {
            status,
            body: body.into(),
        }
    }

    pub fn http_status(&self) -> Option<u16> {
        match self {
            CatalogError::Http { status, .. } => Some(*status),
            CatalogError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// True for credential problems.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, CatalogError::MissingApiKey) || matches!(self.http_status(), Some(401 | 403))
    }
}

impl From<CatalogError> for SearchError {
    fn from(e: CatalogError) -> Self {
        if e.is_auth_error() {
            return SearchError::Unauthorized(e.to_string());
        }
        match e {
            CatalogError::Json(_) => SearchError::InvalidResponse(e.to_string()),
            CatalogError::Network(ref inner) if inner.is_decode() => {
                SearchError::InvalidResponse(e.to_string())
            }
            _ => SearchError::Unavailable(e.to_string()),
        }
    }
}
