pub mod catalog;
pub mod config;
pub mod disclosure;
pub mod drag;
pub mod metrics;
pub mod repository;
pub mod show;
pub mod testing;

pub use catalog::{
    CatalogSnapshot, CatalogStore, FilterCriteria, LoadOutcome, SearchOutcome,
    DEFAULT_CATALOG_PAGES,
};
pub use config::{
    load_config, load_config_from_str, load_config_or_default, validate_config, CatalogConfig,
    Config, ConfigError,
};
pub use disclosure::{
    DisclosureConfig, DisclosureError, LazyDisclosure, ScrollListener, ScrollMetrics,
};
pub use drag::{DragConfig, DragNavigator, DragOutcome, DragPhase, DragSurface};
pub use repository::{
    RepositoryError, ShowRepository, TransportError, TvmazeClient, TvmazeConfig,
};
pub use show::{
    GenreSection, ImageResolution, ImageResolutions, ImageType, Rating, SearchHit, Show,
    ShowImage, ShowImageLinks, ShowType,
};
