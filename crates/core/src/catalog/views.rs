//! Derived views over show collections.
//!
//! Every function here is pure: the output depends only on the arguments, so
//! the store can recompute views on each access and they never go stale.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;

use super::FilterCriteria;
use crate::show::{GenreSection, Show};

/// Distinct genres across `shows`, sorted.
pub fn available_genres(shows: &[Arc<Show>]) -> Vec<String> {
    shows
        .iter()
        .flat_map(|show| show.genres.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Group `shows` into one section per genre, sections sorted by genre name.
///
/// A show appears once in every section of a genre it lists, even when the
/// collection or its genre list holds duplicates. Within a section shows are
/// ordered by rating, best first, with unrated shows counted as 0; equal
/// ratings keep collection order.
pub fn shows_by_genre(shows: &[Arc<Show>]) -> Vec<GenreSection> {
    let mut sections: BTreeMap<&str, (HashSet<u64>, Vec<Arc<Show>>)> = BTreeMap::new();

    for show in shows {
        for genre in &show.genres {
            let (seen, members) = sections.entry(genre.as_str()).or_default();
            if seen.insert(show.id) {
                members.push(Arc::clone(show));
            }
        }
    }

    sections
        .into_iter()
        .map(|(genre, (_, mut members))| {
            members.sort_by(|a, b| b.rating_or_zero().total_cmp(&a.rating_or_zero()));
            GenreSection {
                genre: genre.to_string(),
                shows: members,
            }
        })
        .collect()
}

/// Apply `criteria` to `shows`, dropping repeated IDs (first one wins).
pub fn filtered_shows(shows: &[Arc<Show>], criteria: &FilterCriteria) -> Vec<Arc<Show>> {
    let mut seen = HashSet::new();

    shows
        .iter()
        .filter(|show| criteria.matches(show) && seen.insert(show.id))
        .cloned()
        .collect()
}

/// Narrow search results to those whose name or a genre contains `query`.
///
/// Matching is case-insensitive on the trimmed query. A blank query yields
/// nothing.
pub fn filtered_search_results(results: &[Arc<Show>], query: &str) -> Vec<Arc<Show>> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }

    results
        .iter()
        .filter(|show| {
            show.name.to_lowercase().contains(&query)
                || show
                    .genres
                    .iter()
                    .any(|genre| genre.to_lowercase().contains(&query))
        })
        .cloned()
        .collect()
}

/// Whether `query` puts the catalog into search mode.
pub fn is_search_query(query: &str) -> bool {
    !query.trim().is_empty()
}
