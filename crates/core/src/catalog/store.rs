use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use super::types::{CatalogSnapshot, FilterCriteria, LoadOutcome, SearchOutcome};
use super::views;
use crate::metrics;
use crate::repository::ShowRepository;
use crate::show::{GenreSection, ImageType, Show, ShowImage, ShowType};

/// Pages fetched by [`CatalogStore::load_default_catalog`] unless configured.
pub const DEFAULT_CATALOG_PAGES: [u32; 5] = [0, 1, 2, 3, 4];

#[derive(Debug, Default)]
struct CatalogState {
    shows: Vec<Arc<Show>>,
    /// Operations currently holding the loading flag. Detail fetches nest
    /// inside a catalog load, so this is a count rather than a bool.
    loading: usize,
    error: Option<String>,
    search_query: String,
    search_results: Vec<Arc<Show>>,
    searching: usize,
    show: Option<Arc<Show>>,
    show_banner: Option<ShowImage>,
    filters: FilterCriteria,
}

/// In-flight flags guarding store operations.
#[derive(Debug, Clone, Copy)]
enum Activity {
    Loading,
    Searching,
}

impl CatalogState {
    fn depth(&mut self, activity: Activity) -> &mut usize {
        match activity {
            Activity::Loading => &mut self.loading,
            Activity::Searching => &mut self.searching,
        }
    }
}

/// Holds one level of an in-flight flag and releases it on drop, so the flag
/// also clears when the owning future is dropped mid-request. The flag stays
/// raised until every holder is gone.
struct InFlight<'a> {
    state: &'a Mutex<CatalogState>,
    activity: Activity,
}

impl<'a> InFlight<'a> {
    /// Raise the flag unconditionally and clear the error field.
    fn begin(state: &'a Mutex<CatalogState>, activity: Activity) -> Self {
        let mut guard = lock(state);
        *guard.depth(activity) += 1;
        guard.error = None;
        Self { state, activity }
    }

    /// Raise the flag and clear the error field unless the flag is already
    /// raised.
    fn try_begin(state: &'a Mutex<CatalogState>, activity: Activity) -> Option<Self> {
        let mut guard = lock(state);
        if *guard.depth(activity) > 0 {
            return None;
        }
        *guard.depth(activity) = 1;
        guard.error = None;
        Some(Self { state, activity })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut state = lock(self.state);
        let depth = state.depth(self.activity);
        *depth = depth.saturating_sub(1);
    }
}

fn lock(state: &Mutex<CatalogState>) -> MutexGuard<'_, CatalogState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The single source of truth for catalog data on the client.
///
/// Holds the canonical show collection, search state, filter criteria and
/// the currently opened show. All mutation goes through the methods below;
/// views are derived from the current state on every call.
///
/// Network failures never escape: they are logged and stored in the `error`
/// field, and the affected state keeps its previous value.
///
/// Operations take `&self` and the internal lock is never held across an
/// await. Overlapping catalog loads or searches are rejected by the
/// `loading`/`is_searching` flags rather than queued.
pub struct CatalogStore<R> {
    repository: R,
    default_pages: Vec<u32>,
    state: Mutex<CatalogState>,
}

impl<R: ShowRepository> CatalogStore<R> {
    /// Create an empty store backed by `repository`.
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            default_pages: DEFAULT_CATALOG_PAGES.to_vec(),
            state: Mutex::new(CatalogState::default()),
        }
    }

    /// Override the pages fetched by [`Self::load_default_catalog`].
    pub fn with_default_pages(mut self, pages: Vec<u32>) -> Self {
        self.default_pages = pages;
        self
    }

    /// The repository this store reads from.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    fn state(&self) -> MutexGuard<'_, CatalogState> {
        lock(&self.state)
    }

    // =========================================================================
    // Actions
    // =========================================================================

    /// Load the configured default pages.
    pub async fn load_default_catalog(&self) -> LoadOutcome {
        let pages = self.default_pages.clone();
        self.load_shows_catalog(&pages).await
    }

    /// Fetch `pages` one after another and replace the canonical collection.
    ///
    /// The collection is replaced only when every page succeeded. On the
    /// first failing page the remaining pages are not requested, `error` is
    /// set and the previous collection stays in place.
    pub async fn load_shows_catalog(&self, pages: &[u32]) -> LoadOutcome {
        let Some(_in_flight) = InFlight::try_begin(&self.state, Activity::Loading) else {
            debug!("Catalog load already in flight, skipping");
            metrics::CATALOG_LOADS.with_label_values(&["skipped"]).inc();
            return LoadOutcome::Skipped;
        };

        info!("Loading show catalog: pages={:?}", pages);

        let mut accumulated: Vec<Arc<Show>> = Vec::new();
        for &page in pages {
            match self.repository.list_shows(page).await {
                Ok(shows) => {
                    debug!("Fetched catalog page {}: {} shows", page, shows.len());
                    accumulated.extend(shows.into_iter().map(Arc::new));
                }
                Err(e) => {
                    warn!("Catalog load failed at page {}: {}", page, e);
                    self.state().error = Some(e.to_string());
                    metrics::CATALOG_LOADS.with_label_values(&["failed"]).inc();
                    return LoadOutcome::Failed;
                }
            }
        }

        let count = accumulated.len();
        self.state().shows = accumulated;

        info!("Show catalog loaded: {} shows", count);
        metrics::CATALOG_LOADS.with_label_values(&["loaded"]).inc();
        metrics::CATALOG_SIZE.set(count as i64);

        LoadOutcome::Loaded { shows: count }
    }

    /// Search the API for `query` and store the hits.
    ///
    /// A blank query clears the search state instead of issuing a request.
    /// On failure the previous results are kept.
    pub async fn search_shows(&self, query: &str) -> SearchOutcome {
        if !views::is_search_query(query) {
            self.clear_search();
            metrics::SEARCHES.with_label_values(&["cleared"]).inc();
            return SearchOutcome::Cleared;
        }

        let Some(_in_flight) = InFlight::try_begin(&self.state, Activity::Searching) else {
            debug!("Search already in flight, skipping query '{}'", query);
            metrics::SEARCHES.with_label_values(&["skipped"]).inc();
            return SearchOutcome::Skipped;
        };
        self.state().search_query = query.to_string();

        debug!("Searching shows: query='{}'", query);

        match self.repository.search_shows(query).await {
            Ok(hits) => {
                let results: Vec<Arc<Show>> =
                    hits.into_iter().map(|hit| Arc::new(hit.show)).collect();
                let count = results.len();
                self.state().search_results = results;
                metrics::SEARCHES.with_label_values(&["success"]).inc();
                SearchOutcome::Completed { hits: count }
            }
            Err(e) => {
                warn!("Show search failed: {}", e);
                self.state().error = Some(e.to_string());
                metrics::SEARCHES.with_label_values(&["failed"]).inc();
                SearchOutcome::Failed
            }
        }
    }

    /// Reset query, results and error.
    pub fn clear_search(&self) {
        let mut state = self.state();
        state.search_query.clear();
        state.search_results.clear();
        state.error = None;
    }

    /// Fetch one show and make it the current detail show.
    ///
    /// Returns `None` on failure; the message is stored in `error`.
    pub async fn get_show_by_id(&self, id: u64) -> Option<Arc<Show>> {
        let _in_flight = InFlight::begin(&self.state, Activity::Loading);

        match self.repository.get_show(id).await {
            Ok(show) => {
                let show = Arc::new(show);
                self.state().show = Some(Arc::clone(&show));
                Some(show)
            }
            Err(e) => {
                warn!("Failed to load show {}: {}", id, e);
                self.state().error = Some(e.to_string());
                None
            }
        }
    }

    /// Fetch a show's images and remember its first background as the banner.
    ///
    /// Returns the complete image set, whether or not a banner was found, or
    /// `None` on failure.
    pub async fn get_show_banner(&self, id: u64) -> Option<Vec<ShowImage>> {
        let _in_flight = InFlight::begin(&self.state, Activity::Loading);

        match self.repository.get_show_images(id).await {
            Ok(images) => {
                let banner = images
                    .iter()
                    .find(|image| image.kind == ImageType::Background)
                    .cloned();
                if banner.is_none() {
                    debug!("Show {} has no background image", id);
                }
                self.state().show_banner = banner;
                Some(images)
            }
            Err(e) => {
                warn!("Failed to load banner for show {}: {}", id, e);
                self.state().error = Some(e.to_string());
                None
            }
        }
    }

    /// Drop the collection and search state. Filters and the detail show are
    /// kept.
    pub fn clear_data(&self) {
        let mut state = self.state();
        state.shows.clear();
        state.search_results.clear();
        state.search_query.clear();
        state.error = None;
        metrics::CATALOG_SIZE.set(0);
    }

    // =========================================================================
    // Filter mutators
    // =========================================================================

    pub fn set_selected_genres(&self, genres: impl IntoIterator<Item = String>) {
        self.state().filters.selected_genres = genres.into_iter().collect();
    }

    /// Add `genre` to the selection, or remove it if already selected.
    pub fn toggle_genre(&self, genre: &str) {
        let mut state = self.state();
        let selected = &mut state.filters.selected_genres;
        if !selected.remove(genre) {
            selected.insert(genre.to_string());
        }
    }

    pub fn set_min_rating(&self, rating: f64) {
        self.state().filters.min_rating = rating;
    }

    pub fn set_selected_type(&self, kind: ShowType) {
        self.state().filters.selected_type = kind;
    }

    /// Reset all filter criteria to their defaults.
    pub fn clear_filters(&self) {
        self.state().filters = FilterCriteria::default();
    }

    // =========================================================================
    // State accessors
    // =========================================================================

    /// The canonical show collection.
    pub fn shows(&self) -> Vec<Arc<Show>> {
        self.state().shows.clone()
    }

    pub fn loading(&self) -> bool {
        self.state().loading > 0
    }

    /// Message of the last failed operation, if the latest attempt failed.
    pub fn error(&self) -> Option<String> {
        self.state().error.clone()
    }

    pub fn search_query(&self) -> String {
        self.state().search_query.clone()
    }

    /// Raw search hits, in API order.
    pub fn search_results(&self) -> Vec<Arc<Show>> {
        self.state().search_results.clone()
    }

    pub fn is_searching(&self) -> bool {
        self.state().searching > 0
    }

    /// The current detail show.
    pub fn show(&self) -> Option<Arc<Show>> {
        self.state().show.clone()
    }

    pub fn show_banner(&self) -> Option<ShowImage> {
        self.state().show_banner.clone()
    }

    pub fn filters(&self) -> FilterCriteria {
        self.state().filters.clone()
    }

    pub fn selected_genres(&self) -> BTreeSet<String> {
        self.state().filters.selected_genres.clone()
    }

    /// Copy of the whole state.
    pub fn snapshot(&self) -> CatalogSnapshot {
        let state = self.state();
        CatalogSnapshot {
            shows: state.shows.clone(),
            loading: state.loading > 0,
            error: state.error.clone(),
            search_query: state.search_query.clone(),
            search_results: state.search_results.clone(),
            is_searching: state.searching > 0,
            show: state.show.clone(),
            show_banner: state.show_banner.clone(),
            filters: state.filters.clone(),
        }
    }

    // =========================================================================
    // Derived views
    // =========================================================================

    pub fn available_genres(&self) -> Vec<String> {
        views::available_genres(&self.state().shows)
    }

    pub fn shows_by_genre(&self) -> Vec<GenreSection> {
        views::shows_by_genre(&self.state().shows)
    }

    pub fn filtered_shows(&self) -> Vec<Arc<Show>> {
        let state = self.state();
        views::filtered_shows(&state.shows, &state.filters)
    }

    pub fn filtered_search_results(&self) -> Vec<Arc<Show>> {
        let state = self.state();
        views::filtered_search_results(&state.search_results, &state.search_query)
    }

    pub fn is_in_search_mode(&self) -> bool {
        views::is_search_query(&self.state().search_query)
    }

    pub fn has_active_filters(&self) -> bool {
        self.state().filters.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::TransportError;
    use crate::testing::{fixtures, MockShowRepository};

    fn store() -> CatalogStore<MockShowRepository> {
        CatalogStore::new(MockShowRepository::new())
    }

    #[test]
    fn test_initial_state() {
        let store = store();
        let snapshot = store.snapshot();

        assert!(snapshot.shows.is_empty());
        assert!(!snapshot.loading);
        assert!(snapshot.error.is_none());
        assert_eq!(snapshot.search_query, "");
        assert!(snapshot.search_results.is_empty());
        assert!(!snapshot.is_searching);
        assert!(snapshot.show.is_none());
        assert!(snapshot.show_banner.is_none());
        assert_eq!(snapshot.filters, FilterCriteria::default());
    }

    #[test]
    fn test_filter_mutators() {
        let store = store();

        store.set_selected_genres(vec!["Drama".to_string(), "Crime".to_string()]);
        store.set_min_rating(7.0);
        store.set_selected_type(ShowType::Movie);
        assert!(store.has_active_filters());
        assert_eq!(store.filters().selected_genres.len(), 2);

        store.clear_filters();
        assert!(!store.has_active_filters());
        assert_eq!(store.filters(), FilterCriteria::default());
    }

    #[test]
    fn test_toggle_genre() {
        let store = store();

        store.toggle_genre("Drama");
        assert!(store.selected_genres().contains("Drama"));

        store.toggle_genre("Drama");
        assert!(store.selected_genres().is_empty());
    }

    #[tokio::test]
    async fn test_load_default_catalog_uses_configured_pages() {
        let repo = MockShowRepository::new();
        repo.set_page(7, vec![fixtures::show(1, "Seven", &["Drama"], None, None)])
            .await;
        let store = CatalogStore::new(repo).with_default_pages(vec![7]);

        let outcome = store.load_default_catalog().await;

        assert_eq!(outcome, LoadOutcome::Loaded { shows: 1 });
        assert_eq!(store.repository().requested_pages().await, vec![7]);
    }

    #[tokio::test]
    async fn test_clear_data_keeps_filters_and_detail_show() {
        let repo = MockShowRepository::new();
        repo.set_page(0, vec![fixtures::show(1, "One", &["Drama"], None, None)])
            .await;
        repo.add_show(fixtures::show(5, "Detail", &[], None, None))
            .await;
        let store = CatalogStore::new(repo);

        store.load_shows_catalog(&[0]).await;
        store.get_show_by_id(5).await;
        store.search_shows("one").await;
        store.set_min_rating(3.0);

        store.clear_data();

        assert!(store.shows().is_empty());
        assert!(store.search_results().is_empty());
        assert_eq!(store.search_query(), "");
        assert_eq!(store.filters().min_rating, 3.0);
        assert_eq!(store.show().map(|s| s.id), Some(5));
    }

    #[tokio::test]
    async fn test_in_flight_flag_cleared_when_future_dropped() {
        let repo = MockShowRepository::new();
        repo.set_delay(std::time::Duration::from_secs(60)).await;
        let store = CatalogStore::new(repo);

        {
            let mut load = tokio_test::task::spawn(store.load_shows_catalog(&[0]));
            tokio_test::assert_pending!(load.poll());
            assert!(store.loading());
        }

        assert!(!store.loading());
    }

    #[tokio::test]
    async fn test_detail_fetch_during_load_keeps_load_guarded() {
        let repo = MockShowRepository::new();
        repo.add_show(fixtures::show(9, "Detail", &[], None, None)).await;
        repo.set_delay(std::time::Duration::from_millis(50)).await;
        let store = CatalogStore::new(repo);

        let mut load = tokio_test::task::spawn(store.load_shows_catalog(&[0, 1, 2]));
        tokio_test::assert_pending!(load.poll());

        assert!(store.get_show_by_id(9).await.is_some());
        assert!(store.loading());
        assert_eq!(store.load_shows_catalog(&[7]).await, LoadOutcome::Skipped);

        assert_eq!(load.await, LoadOutcome::Loaded { shows: 0 });
        assert!(!store.loading());
        assert_eq!(store.repository().requested_pages().await, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_error_cleared_on_next_attempt() {
        let repo = MockShowRepository::new();
        repo.set_next_error(TransportError::RateLimitExceeded).await;
        let store = CatalogStore::new(repo);

        assert_eq!(store.load_shows_catalog(&[0]).await, LoadOutcome::Failed);
        assert_eq!(store.error().as_deref(), Some("Failed to fetch shows"));

        assert_eq!(
            store.load_shows_catalog(&[0]).await,
            LoadOutcome::Loaded { shows: 0 }
        );
        assert!(store.error().is_none());
    }
}
