use serde::{Deserialize, Serialize};

use crate::catalog::DEFAULT_CATALOG_PAGES;
use crate::disclosure::DisclosureConfig;
use crate::drag::DragConfig;
use crate::repository::TvmazeConfig;

/// Root configuration. Every section is optional in the file.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub api: TvmazeConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub disclosure: DisclosureConfig,
    #[serde(default)]
    pub drag: DragConfig,
}

/// Catalog loading configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct CatalogConfig {
    /// Index pages fetched on a default catalog load (default: 0-4).
    #[serde(default = "default_pages")]
    pub pages: Vec<u32>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            pages: default_pages(),
        }
    }
}

fn default_pages() -> Vec<u32> {
    DEFAULT_CATALOG_PAGES.to_vec()
}
