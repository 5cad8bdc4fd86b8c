//! Mock show repository for testing.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::repository::{RepositoryError, ShowRepository, TransportError};
use crate::show::{SearchHit, Show, ShowImage};

/// A recorded repository call for test assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    ListShows { page: u32 },
    GetShow { id: u64 },
    SearchShows { query: String },
    GetShowImages { id: u64 },
}

/// Mock implementation of the ShowRepository trait.
///
/// Provides controllable behavior for testing:
/// - Serve configurable pages, shows and image galleries
/// - Track calls for assertions
/// - Simulate failures, either once or for specific pages
/// - Delay every call to exercise in-flight guards
///
/// Clones share state, so a test can keep a handle after moving the mock
/// into a store.
///
/// # Example
///
/// ```rust,ignore
/// use tvshelf_core::testing::{MockShowRepository, fixtures};
///
/// let repo = MockShowRepository::new();
/// repo.set_page(0, vec![fixtures::show(1, "Breaking Bad", &["Drama"], Some(9.2), Some(60))]).await;
///
/// let shows = repo.list_shows(0).await?;
/// assert_eq!(shows.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockShowRepository {
    /// Show index pages by page number.
    pages: Arc<RwLock<BTreeMap<u32, Vec<Show>>>>,
    /// Individually fetchable shows by ID.
    shows: Arc<RwLock<HashMap<u64, Show>>>,
    /// Canned search responses by exact query, served in the given order.
    search_hits: Arc<RwLock<HashMap<String, Vec<SearchHit>>>>,
    /// Image galleries by show ID.
    images: Arc<RwLock<HashMap<u64, Vec<ShowImage>>>>,
    /// Recorded calls.
    calls: Arc<RwLock<Vec<RecordedCall>>>,
    /// If set, the next operation will fail with this error.
    next_error: Arc<RwLock<Option<TransportError>>>,
    /// Pages that always fail.
    failing_pages: Arc<RwLock<HashSet<u32>>>,
    /// Artificial latency applied to every call.
    delay: Arc<RwLock<Option<Duration>>>,
}

impl MockShowRepository {
    /// Create a new empty mock repository.
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Data Configuration
    // =========================================================================

    /// Set the shows returned for one index page.
    pub async fn set_page(&self, page: u32, shows: Vec<Show>) {
        self.pages.write().await.insert(page, shows);
    }

    /// Add a show fetchable by ID and findable by search.
    pub async fn add_show(&self, show: Show) {
        self.shows.write().await.insert(show.id, show);
    }

    /// Serve `hits` verbatim for `query` instead of matching by name.
    pub async fn set_search_hits(&self, query: &str, hits: Vec<SearchHit>) {
        self.search_hits.write().await.insert(query.to_string(), hits);
    }

    /// Set the image gallery of a show.
    pub async fn set_images(&self, id: u64, images: Vec<ShowImage>) {
        self.images.write().await.insert(id, images);
    }

    // =========================================================================
    // Call Recording
    // =========================================================================

    /// Get all recorded calls.
    pub async fn recorded_calls(&self) -> Vec<RecordedCall> {
        self.calls.read().await.clone()
    }

    /// Pages requested through `list_shows`, in request order.
    pub async fn requested_pages(&self) -> Vec<u32> {
        self.calls
            .read()
            .await
            .iter()
            .filter_map(|call| match call {
                RecordedCall::ListShows { page } => Some(*page),
                _ => None,
            })
            .collect()
    }

    /// Get the number of calls performed.
    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }

    /// Clear recorded calls.
    pub async fn clear_recorded(&self) {
        self.calls.write().await.clear();
    }

    // =========================================================================
    // Error Injection
    // =========================================================================

    /// Configure the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: TransportError) {
        *self.next_error.write().await = Some(error);
    }

    /// Make every request for `page` fail with a 500.
    pub async fn fail_page(&self, page: u32) {
        self.failing_pages.write().await.insert(page);
    }

    /// Delay every call by `delay` before answering.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    /// Record the call, wait out the configured delay, then hand back any
    /// pending injected error.
    async fn enter(&self, call: RecordedCall) -> Result<(), TransportError> {
        self.calls.write().await.push(call);

        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match self.next_error.write().await.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ShowRepository for MockShowRepository {
    async fn list_shows(&self, page: u32) -> Result<Vec<Show>, RepositoryError> {
        self.enter(RecordedCall::ListShows { page })
            .await
            .map_err(|source| RepositoryError::FetchShows { page, source })?;

        if self.failing_pages.read().await.contains(&page) {
            return Err(RepositoryError::FetchShows {
                page,
                source: TransportError::Status {
                    status: 500,
                    message: format!("page {} unavailable", page),
                },
            });
        }

        Ok(self
            .pages
            .read()
            .await
            .get(&page)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_show(&self, id: u64) -> Result<Show, RepositoryError> {
        self.enter(RecordedCall::GetShow { id })
            .await
            .map_err(|source| RepositoryError::FetchShow { id, source })?;

        self.shows
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::FetchShow {
                id,
                source: TransportError::NotFound(format!("/shows/{}", id)),
            })
    }

    async fn search_shows(&self, query: &str) -> Result<Vec<SearchHit>, RepositoryError> {
        self.enter(RecordedCall::SearchShows {
            query: query.to_string(),
        })
        .await
        .map_err(|source| RepositoryError::SearchShows {
            query: query.to_string(),
            source,
        })?;

        if let Some(hits) = self.search_hits.read().await.get(query) {
            return Ok(hits.clone());
        }

        let query_lower = query.to_lowercase();
        let mut hits: Vec<SearchHit> = self
            .shows
            .read()
            .await
            .values()
            .filter(|s| s.name.to_lowercase().contains(&query_lower))
            .map(|s| SearchHit {
                score: 1.0,
                show: s.clone(),
            })
            .collect();
        hits.sort_by_key(|hit| hit.show.id);

        Ok(hits)
    }

    async fn get_show_images(&self, id: u64) -> Result<Vec<ShowImage>, RepositoryError> {
        self.enter(RecordedCall::GetShowImages { id })
            .await
            .map_err(|source| RepositoryError::FetchImages { id, source })?;

        Ok(self
            .images
            .read()
            .await
            .get(&id)
            .cloned()
            .unwrap_or_default())
    }
}
