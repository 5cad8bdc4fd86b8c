//! Catalog store - the client-side state of the show browser.
//!
//! The store keeps what was fetched from the repository; everything the
//! presentation layer renders (genre rows, filtered grids, narrowed search
//! results) is derived from it through the pure functions in [`views`].

mod store;
mod types;
pub mod views;

pub use store::{CatalogStore, DEFAULT_CATALOG_PAGES};
pub use types::*;
