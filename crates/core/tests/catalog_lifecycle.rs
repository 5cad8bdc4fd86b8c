//! Catalog store integration tests.
//!
//! These tests drive the store through a mock repository and verify:
//! - Sequential page loading and all-or-nothing commits
//! - Search, clear and failure handling
//! - Detail show and banner selection
//! - In-flight guards rejecting overlapping operations

use std::time::Duration;

use tvshelf_core::{
    testing::{fixtures, MockShowRepository, RecordedCall},
    CatalogStore, ImageType, LoadOutcome, SearchOutcome, ShowType, TransportError,
};

/// Test helper bundling a store with a handle on its mock repository.
struct TestHarness {
    store: CatalogStore<MockShowRepository>,
    repo: MockShowRepository,
}

impl TestHarness {
    fn new() -> Self {
        let repo = MockShowRepository::new();
        let store = CatalogStore::new(repo.clone());
        Self { store, repo }
    }

    /// Serve the same two shows on each of pages 0-4.
    async fn with_default_pages() -> Self {
        let harness = Self::new();
        for page in 0..5 {
            harness
                .repo
                .set_page(
                    page,
                    vec![
                        fixtures::show(1, "Show 1", &["Drama"], Some(8.0), Some(45)),
                        fixtures::show(2, "Show 2", &["Comedy"], Some(7.0), Some(30)),
                    ],
                )
                .await;
        }
        harness
    }
}

#[tokio::test]
async fn test_default_load_fetches_five_pages_in_order() {
    let h = TestHarness::with_default_pages().await;

    let outcome = h.store.load_default_catalog().await;

    assert_eq!(outcome, LoadOutcome::Loaded { shows: 10 });
    assert!(!h.store.loading());
    assert!(h.store.error().is_none());
    assert_eq!(h.repo.requested_pages().await, vec![0, 1, 2, 3, 4]);

    // Duplicated IDs stay in the canonical collection, the filtered view drops them.
    assert_eq!(h.store.shows().len(), 10);
    let ids: Vec<u64> = h.store.filtered_shows().iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[tokio::test]
async fn test_pages_concatenate_in_request_order() {
    let h = TestHarness::new();
    h.repo
        .set_page(0, vec![fixtures::show(1, "Show 1", &["Drama"], None, None)])
        .await;
    h.repo
        .set_page(
            1,
            vec![
                fixtures::show(3, "Show 3", &["Comedy"], None, None),
                fixtures::show(2, "Show 2", &["Comedy"], None, None),
            ],
        )
        .await;

    h.store.load_shows_catalog(&[1, 0]).await;

    let ids: Vec<u64> = h.store.shows().iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![3, 2, 1]);
}

#[tokio::test]
async fn test_first_page_failure_keeps_empty_collection() {
    let h = TestHarness::new();
    h.repo.fail_page(0).await;
    h.repo
        .set_page(1, vec![fixtures::show(1, "Show 1", &["Drama"], None, None)])
        .await;

    let outcome = h.store.load_shows_catalog(&[0, 1]).await;

    assert_eq!(outcome, LoadOutcome::Failed);
    assert!(h.store.shows().is_empty());
    assert_eq!(h.store.error().as_deref(), Some("Failed to fetch shows"));
    assert!(!h.store.loading());
    assert_eq!(h.repo.requested_pages().await, vec![0]);
}

#[tokio::test]
async fn test_partial_failure_keeps_previous_collection() {
    let h = TestHarness::with_default_pages().await;
    h.store.load_shows_catalog(&[0]).await;
    assert_eq!(h.store.shows().len(), 2);

    h.repo.fail_page(2).await;
    let outcome = h.store.load_shows_catalog(&[1, 2, 3]).await;

    assert_eq!(outcome, LoadOutcome::Failed);
    assert_eq!(h.store.shows().len(), 2);
    assert!(h.store.error().is_some());
    assert_eq!(h.repo.requested_pages().await, vec![0, 1, 2]);
}

#[tokio::test]
async fn test_overlapping_catalog_load_rejected() {
    let h = TestHarness::with_default_pages().await;
    h.repo.set_delay(Duration::from_millis(20)).await;

    let (first, second) = tokio::join!(
        h.store.load_shows_catalog(&[0, 1]),
        h.store.load_shows_catalog(&[2, 3])
    );

    assert_eq!(first, LoadOutcome::Loaded { shows: 4 });
    assert_eq!(second, LoadOutcome::Skipped);
    assert_eq!(h.repo.requested_pages().await, vec![0, 1]);
    assert!(!h.store.loading());
}

#[tokio::test]
async fn test_search_stores_hits_in_order() {
    let h = TestHarness::new();
    h.repo
        .add_show(fixtures::show(1, "Breaking Bad", &["Drama", "Crime"], Some(9.2), Some(60)))
        .await;
    h.repo
        .add_show(fixtures::show(2, "Bad Sisters", &["Comedy"], Some(8.0), Some(50)))
        .await;

    let outcome = h.store.search_shows("bad").await;

    assert_eq!(outcome, SearchOutcome::Completed { hits: 2 });
    assert!(!h.store.is_searching());
    assert!(h.store.error().is_none());
    assert_eq!(h.store.search_query(), "bad");
    assert!(h.store.is_in_search_mode());

    let names: Vec<String> = h
        .store
        .search_results()
        .iter()
        .map(|s| s.name.clone())
        .collect();
    assert_eq!(names, vec!["Breaking Bad", "Bad Sisters"]);
}

#[tokio::test]
async fn test_search_keeps_response_order() {
    let h = TestHarness::new();
    h.repo
        .set_search_hits(
            "girls",
            vec![
                fixtures::search_hit(fixtures::show(7, "Girls", &["Comedy"], None, None), 0.9),
                fixtures::search_hit(fixtures::show(2, "Gilmore Girls", &["Drama"], None, None), 0.7),
                fixtures::search_hit(fixtures::show(5, "Girls5eva", &["Comedy"], None, None), 0.5),
            ],
        )
        .await;

    h.store.search_shows("girls").await;

    let ids: Vec<u64> = h.store.search_results().iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![7, 2, 5]);
    let ids: Vec<u64> = h.store.filtered_search_results().iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![7, 2, 5]);
}

#[tokio::test]
async fn test_filtered_search_results_follow_stored_query() {
    let h = TestHarness::new();
    h.repo
        .add_show(fixtures::show(1, "Crime Drama Show", &["Drama", "Crime"], None, None))
        .await;
    h.repo
        .add_show(fixtures::show(2, "Crime Comedy Show", &["Comedy"], None, None))
        .await;
    h.store.search_shows("crime").await;
    assert_eq!(h.store.filtered_search_results().len(), 2);

    h.store.clear_search();
    assert!(h.store.filtered_search_results().is_empty());
}

#[tokio::test]
async fn test_blank_search_clears_without_request() {
    let h = TestHarness::new();
    h.repo
        .add_show(fixtures::show(1, "Breaking Bad", &["Drama"], None, None))
        .await;
    h.store.search_shows("breaking").await;
    assert_eq!(h.store.search_results().len(), 1);
    h.repo.clear_recorded().await;

    let outcome = h.store.search_shows("   ").await;

    assert_eq!(outcome, SearchOutcome::Cleared);
    assert_eq!(h.store.search_query(), "");
    assert!(h.store.search_results().is_empty());
    assert!(h.store.error().is_none());
    assert!(!h.store.is_in_search_mode());
    assert_eq!(h.repo.call_count().await, 0);
}

#[tokio::test]
async fn test_search_failure_keeps_previous_results() {
    let h = TestHarness::new();
    h.repo
        .add_show(fixtures::show(1, "Breaking Bad", &["Drama"], None, None))
        .await;
    h.store.search_shows("breaking").await;

    h.repo.set_next_error(TransportError::RateLimitExceeded).await;
    let outcome = h.store.search_shows("test").await;

    assert_eq!(outcome, SearchOutcome::Failed);
    assert!(!h.store.is_searching());
    assert_eq!(
        h.store.error().as_deref(),
        Some("Failed to search shows with query \"test\"")
    );
    assert_eq!(h.store.search_results().len(), 1);
}

#[tokio::test]
async fn test_overlapping_search_rejected() {
    let h = TestHarness::new();
    h.repo.set_delay(Duration::from_millis(20)).await;

    let (first, second) = tokio::join!(h.store.search_shows("one"), h.store.search_shows("two"));

    assert_eq!(first, SearchOutcome::Completed { hits: 0 });
    assert_eq!(second, SearchOutcome::Skipped);
    assert_eq!(
        h.repo.recorded_calls().await,
        vec![RecordedCall::SearchShows {
            query: "one".to_string()
        }]
    );
    assert_eq!(h.store.search_query(), "one");
}

#[tokio::test]
async fn test_get_show_by_id() {
    let h = TestHarness::new();
    h.repo
        .add_show(fixtures::show(42, "The Answer", &["Science-Fiction"], Some(9.0), Some(42)))
        .await;

    let show = h.store.get_show_by_id(42).await.unwrap();

    assert_eq!(show.name, "The Answer");
    assert_eq!(h.store.show().map(|s| s.id), Some(42));
    assert!(!h.store.loading());
    assert!(h.store.error().is_none());
}

#[tokio::test]
async fn test_get_show_by_id_failure_returns_none() {
    let h = TestHarness::new();

    assert!(h.store.get_show_by_id(7).await.is_none());
    assert_eq!(
        h.store.error().as_deref(),
        Some("Failed to fetch show with ID 7")
    );
    assert!(h.store.show().is_none());
    assert!(!h.store.loading());
}

#[tokio::test]
async fn test_banner_is_first_background_and_full_set_returned() {
    let h = TestHarness::new();
    h.repo
        .set_images(
            1,
            vec![
                fixtures::image(10, ImageType::Poster),
                fixtures::image(11, ImageType::Banner),
                fixtures::image(12, ImageType::Background),
                fixtures::image(13, ImageType::Background),
            ],
        )
        .await;

    let images = h.store.get_show_banner(1).await.unwrap();

    assert_eq!(images.len(), 4);
    assert_eq!(h.store.show_banner().map(|b| b.id), Some(12));
    assert!(!h.store.loading());
}

#[tokio::test]
async fn test_banner_absent_still_returns_images() {
    let h = TestHarness::new();
    h.repo
        .set_images(1, vec![fixtures::image(10, ImageType::Poster)])
        .await;

    let images = h.store.get_show_banner(1).await.unwrap();

    assert_eq!(images.len(), 1);
    assert!(h.store.show_banner().is_none());
    assert!(h.store.error().is_none());
}

#[tokio::test]
async fn test_banner_failure_returns_none() {
    let h = TestHarness::new();
    h.repo.set_next_error(TransportError::NotFound("/shows/1/images".to_string())).await;

    assert!(h.store.get_show_banner(1).await.is_none());
    assert_eq!(
        h.store.error().as_deref(),
        Some("Failed to fetch show image for show 1")
    );
}

#[tokio::test]
async fn test_filters_apply_to_loaded_catalog() {
    let h = TestHarness::new();
    h.repo
        .set_page(
            0,
            vec![
                fixtures::show(1, "Feature", &["Drama"], Some(8.0), Some(120)),
                fixtures::show(2, "Sitcom", &["Comedy"], Some(7.0), Some(30)),
                fixtures::show(3, "Mystery", &["Drama"], None, None),
            ],
        )
        .await;
    h.store.load_shows_catalog(&[0]).await;

    h.store.set_selected_type(ShowType::Movie);
    let ids: Vec<u64> = h.store.filtered_shows().iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![1]);

    h.store.clear_filters();
    h.store.set_selected_genres(vec!["Drama".to_string()]);
    h.store.set_min_rating(1.0);
    let ids: Vec<u64> = h.store.filtered_shows().iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![1]);

    assert_eq!(h.store.available_genres(), vec!["Comedy", "Drama"]);
    let sections = h.store.shows_by_genre();
    assert_eq!(sections[1].genre, "Drama");
    let drama: Vec<u64> = sections[1].shows.iter().map(|s| s.id).collect();
    assert_eq!(drama, vec![1, 3]);
}
