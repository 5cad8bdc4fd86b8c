//! TVmaze API client.
//!
//! TVmaze needs no API key for the public read endpoints.
//! Rate limit is around 20 calls per 10 seconds per IP.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{RepositoryError, ShowRepository, TransportError};
use crate::metrics;
use crate::show::{SearchHit, Show, ShowImage};

const DEFAULT_BASE_URL: &str = "https://api.tvmaze.com";
const DEFAULT_USER_AGENT: &str = concat!("tvshelf/", env!("CARGO_PKG_VERSION"));

/// TVmaze client configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TvmazeConfig {
    /// Base URL (default: https://api.tvmaze.com).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds (default: 30).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u32,
    /// User-Agent header sent with every request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl Default for TvmazeConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: None,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u32 {
    30
}

/// TVmaze API client.
pub struct TvmazeClient {
    client: Client,
    base_url: String,
}

impl TvmazeClient {
    /// Create a new TVmaze client.
    pub fn new(config: TvmazeConfig) -> Result<Self, TransportError> {
        let user_agent = config
            .user_agent
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL requests are issued against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the path for one page of the show index.
    fn shows_page_path(page: u32) -> String {
        format!("/shows?page={}", page)
    }

    fn show_path(id: u64) -> String {
        format!("/shows/{}", id)
    }

    fn search_path(query: &str) -> String {
        format!("/search/shows?q={}", urlencoding::encode(query))
    }

    fn images_path(id: u64) -> String {
        format!("/shows/{}/images", id)
    }

    /// GET `path` and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, TransportError> {
        let url = format!("{}{}", self.base_url, path);

        debug!("TVmaze GET {}", url);

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if status == 404 {
            return Err(TransportError::NotFound(path.to_string()));
        }
        if status == 429 {
            return Err(TransportError::RateLimitExceeded);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                message: body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| TransportError::Decode(format!("{}: {}", path, e)))
    }

    /// Run `get_json` for one repository operation, recording metrics.
    async fn timed_get<T: DeserializeOwned>(
        &self,
        operation: &str,
        path: &str,
    ) -> Result<T, TransportError> {
        let timer = metrics::REPOSITORY_DURATION
            .with_label_values(&[operation])
            .start_timer();
        let result = self.get_json(path).await;
        timer.observe_duration();

        let outcome = if result.is_ok() { "success" } else { "failure" };
        metrics::REPOSITORY_REQUESTS
            .with_label_values(&[operation, outcome])
            .inc();

        result
    }
}

#[async_trait]
impl ShowRepository for TvmazeClient {
    async fn list_shows(&self, page: u32) -> Result<Vec<Show>, RepositoryError> {
        self.timed_get("list_shows", &Self::shows_page_path(page))
            .await
            .map_err(|source| RepositoryError::FetchShows { page, source })
    }

    async fn get_show(&self, id: u64) -> Result<Show, RepositoryError> {
        self.timed_get("get_show", &Self::show_path(id))
            .await
            .map_err(|source| RepositoryError::FetchShow { id, source })
    }

    async fn search_shows(&self, query: &str) -> Result<Vec<SearchHit>, RepositoryError> {
        self.timed_get("search_shows", &Self::search_path(query))
            .await
            .map_err(|source| RepositoryError::SearchShows {
                query: query.to_string(),
                source,
            })
    }

    async fn get_show_images(&self, id: u64) -> Result<Vec<ShowImage>, RepositoryError> {
        self.timed_get("get_show_images", &Self::images_path(id))
            .await
            .map_err(|source| RepositoryError::FetchImages { id, source })
    }
}
