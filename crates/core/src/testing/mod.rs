//! Testing utilities and mock implementations.
//!
//! This module provides a mock of the show repository plus fixture builders,
//! allowing the catalog store to be exercised without network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use tvshelf_core::testing::{fixtures, MockShowRepository};
//! use tvshelf_core::CatalogStore;
//!
//! let repo = MockShowRepository::new();
//! repo.set_page(0, vec![fixtures::show(1, "Lost", &["Drama"], Some(8.1), Some(45))]).await;
//!
//! let store = CatalogStore::new(repo.clone());
//! store.load_shows_catalog(&[0]).await;
//! ```

mod mock_repository;

pub use mock_repository::{MockShowRepository, RecordedCall};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::show::{
        ImageResolution, ImageResolutions, ImageType, Rating, SearchHit, Show, ShowImage,
    };

    /// Create a test show with the fields the catalog cares about.
    pub fn show(
        id: u64,
        name: &str,
        genres: &[&str],
        rating: Option<f64>,
        runtime: Option<u32>,
    ) -> Show {
        Show {
            id,
            name: name.to_string(),
            genres: genres.iter().map(|g| g.to_string()).collect(),
            rating: Rating { average: rating },
            runtime,
            url: format!("https://www.tvmaze.com/shows/{}", id),
            kind: "Scripted".to_string(),
            language: Some("English".to_string()),
            status: Some("Ended".to_string()),
            average_runtime: runtime,
            premiered: Some("2010-01-01".to_string()),
            ended: None,
            official_site: None,
            image: None,
            summary: Some(format!("<p>{}</p>", name)),
            updated: 1_700_000_000,
        }
    }

    /// Create `count` shows with consecutive IDs starting at `first_id`.
    pub fn numbered_shows(first_id: u64, count: u64) -> Vec<Show> {
        (first_id..first_id + count)
            .map(|id| show(id, &format!("Show {}", id), &["Drama"], Some(7.0), Some(60)))
            .collect()
    }

    /// Wrap a show as a search hit.
    pub fn search_hit(show: Show, score: f64) -> SearchHit {
        SearchHit { score, show }
    }

    /// Create a test gallery image of the given type.
    pub fn image(id: u64, kind: ImageType) -> ShowImage {
        ShowImage {
            id,
            kind,
            main: false,
            resolutions: ImageResolutions {
                original: ImageResolution {
                    url: format!("https://static.tvmaze.com/original/{}.jpg", id),
                    width: 1920,
                    height: 1080,
                },
                medium: Some(ImageResolution {
                    url: format!("https://static.tvmaze.com/medium/{}.jpg", id),
                    width: 250,
                    height: 140,
                }),
            },
        }
    }
}
