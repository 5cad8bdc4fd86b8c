//! Data access for the TVmaze catalog.
//!
//! The catalog store never talks HTTP itself; it goes through the
//! [`ShowRepository`] trait so tests can swap in a mock.

mod tvmaze;

pub use tvmaze::{TvmazeClient, TvmazeConfig};

use async_trait::async_trait;
use thiserror::Error;

use crate::show::{SearchHit, Show, ShowImage};

/// Low-level failure of a single HTTP exchange.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Resource not found (404).
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded (429).
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Any other non-success status.
    #[error("API error: {status} - {message}")]
    Status { status: u16, message: String },

    /// Response body did not match the expected shape.
    #[error("Failed to parse response: {0}")]
    Decode(String),
}

/// Operation-specific repository failure.
///
/// The `Display` text is what the store surfaces to users, so it names the
/// operation and not the transport detail; the detail stays reachable
/// through `source()`.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Failed to fetch shows")]
    FetchShows {
        page: u32,
        #[source]
        source: TransportError,
    },

    #[error("Failed to fetch show with ID {id}")]
    FetchShow {
        id: u64,
        #[source]
        source: TransportError,
    },

    #[error("Failed to search shows with query \"{query}\"")]
    SearchShows {
        query: String,
        #[source]
        source: TransportError,
    },

    #[error("Failed to fetch show image for show {id}")]
    FetchImages {
        id: u64,
        #[source]
        source: TransportError,
    },
}

impl RepositoryError {
    /// Operation label used in logs and metrics.
    pub fn operation(&self) -> &'static str {
        match self {
            RepositoryError::FetchShows { .. } => "list_shows",
            RepositoryError::FetchShow { .. } => "get_show",
            RepositoryError::SearchShows { .. } => "search_shows",
            RepositoryError::FetchImages { .. } => "get_show_images",
        }
    }

    /// The underlying transport failure.
    pub fn transport(&self) -> &TransportError {
        match self {
            RepositoryError::FetchShows { source, .. }
            | RepositoryError::FetchShow { source, .. }
            | RepositoryError::SearchShows { source, .. }
            | RepositoryError::FetchImages { source, .. } => source,
        }
    }
}

/// Typed reads against the show catalog.
#[async_trait]
pub trait ShowRepository: Send + Sync {
    /// List one page of the full show index (page 0 is the first).
    async fn list_shows(&self, page: u32) -> Result<Vec<Show>, RepositoryError>;

    /// Get a single show by ID.
    async fn get_show(&self, id: u64) -> Result<Show, RepositoryError>;

    /// Free-text show search, in relevance order.
    async fn search_shows(&self, query: &str) -> Result<Vec<SearchHit>, RepositoryError>;

    /// Get the image gallery of a show.
    async fn get_show_images(&self, id: u64) -> Result<Vec<ShowImage>, RepositoryError>;
}

#[async_trait]
impl<R: ShowRepository + ?Sized> ShowRepository for std::sync::Arc<R> {
    async fn list_shows(&self, page: u32) -> Result<Vec<Show>, RepositoryError> {
        (**self).list_shows(page).await
    }

    async fn get_show(&self, id: u64) -> Result<Show, RepositoryError> {
        (**self).get_show(id).await
    }

    async fn search_shows(&self, query: &str) -> Result<Vec<SearchHit>, RepositoryError> {
        (**self).search_shows(query).await
    }

    async fn get_show_images(&self, id: u64) -> Result<Vec<ShowImage>, RepositoryError> {
        (**self).get_show_images(id).await
    }
}
