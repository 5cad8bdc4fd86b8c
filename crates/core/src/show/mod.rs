//! Show data model as served by the TVmaze API.
//!
//! Wire types double as domain types: every field the catalog does not rely
//! on is optional or defaulted so partial payloads still deserialize.

mod types;

pub use types::*;
