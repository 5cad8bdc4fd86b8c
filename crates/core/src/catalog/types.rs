use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::show::{Show, ShowImage, ShowType};

/// Client-side filter criteria applied to the canonical collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FilterCriteria {
    /// Genres to keep. A show passes if it lists any of them; empty keeps all.
    #[serde(default)]
    pub selected_genres: BTreeSet<String>,
    /// Inclusive rating floor. Unrated shows count as 0.
    #[serde(default)]
    pub min_rating: f64,
    #[serde(default)]
    pub selected_type: ShowType,
}

impl FilterCriteria {
    /// Whether any criterion deviates from its default.
    pub fn is_active(&self) -> bool {
        !self.selected_genres.is_empty()
            || self.min_rating > 0.0
            || self.selected_type != ShowType::All
    }

    /// Whether `show` passes type, genre and rating criteria.
    ///
    /// Deduplication is a property of a whole collection and is applied by
    /// [`super::views::filtered_shows`], not here.
    pub fn matches(&self, show: &Show) -> bool {
        if !self.selected_type.matches(show) {
            return false;
        }

        if !self.selected_genres.is_empty()
            && !show.genres.iter().any(|g| self.selected_genres.contains(g))
        {
            return false;
        }

        show.rating_or_zero() >= self.min_rating
    }
}

/// Result of a catalog load request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// All pages fetched and committed.
    Loaded { shows: usize },
    /// A page failed; the previous collection was kept.
    Failed,
    /// Another load was already in flight.
    Skipped,
}

/// Result of a search request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Results were stored.
    Completed { hits: usize },
    /// Blank query, search state was cleared without a request.
    Cleared,
    /// The request failed; previous results were kept.
    Failed,
    /// Another search was already in flight.
    Skipped,
}

/// Point-in-time copy of the store state for consumers that render it.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    pub shows: Vec<Arc<Show>>,
    pub loading: bool,
    pub error: Option<String>,
    pub search_query: String,
    pub search_results: Vec<Arc<Show>>,
    pub is_searching: bool,
    pub show: Option<Arc<Show>>,
    pub show_banner: Option<ShowImage>,
    pub filters: FilterCriteria,
}
