use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Runtime (in minutes) above which a show is classified as a movie.
pub const MOVIE_RUNTIME_THRESHOLD: u32 = 60;

/// A show from the TVmaze catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Show {
    /// TVmaze show ID. Stable and unique, used as the deduplication key.
    pub id: u64,
    /// Show name.
    pub name: String,
    /// Genre names in API order. May be empty.
    #[serde(default)]
    pub genres: Vec<String>,
    /// Aggregate rating.
    #[serde(default)]
    pub rating: Rating,
    /// Episode runtime in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<u32>,
    /// Canonical TVmaze page.
    #[serde(default)]
    pub url: String,
    /// Show type as reported by TVmaze ("Scripted", "Reality", ...).
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_runtime: Option<u32>,
    /// Premiere date (YYYY-MM-DD).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub premiered: Option<String>,
    /// End date (YYYY-MM-DD), absent for running shows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub official_site: Option<String>,
    /// Poster links.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ShowImageLinks>,
    /// HTML summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Last update as a unix timestamp.
    #[serde(default)]
    pub updated: i64,
}

impl Show {
    /// Rating used for ordering and floors; an absent rating counts as zero.
    pub fn rating_or_zero(&self) -> f64 {
        self.rating.average.unwrap_or(0.0)
    }

    /// Release year taken from the premiere date.
    pub fn premiere_year(&self) -> Option<u32> {
        self.premiered
            .as_ref()
            .and_then(|d| d.split('-').next())
            .and_then(|y| y.parse().ok())
    }

    /// Whether any of the show's genres equals `genre`.
    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres.iter().any(|g| g == genre)
    }
}

/// Aggregate rating of a show.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Rating {
    /// Average score (0-10). `None` when TVmaze has no rating, which is not
    /// the same as a zero rating.
    #[serde(default)]
    pub average: Option<f64>,
}

/// Poster links embedded in a show record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShowImageLinks {
    pub medium: String,
    pub original: String,
}

/// One hit from the show search endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    /// Relevance score assigned by TVmaze.
    pub score: f64,
    pub show: Show,
}

/// Image type tag.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ImageType {
    Poster,
    Banner,
    Background,
    /// Any tag this client does not know about ("typography", ...).
    #[serde(other)]
    Other,
}

/// One entry from a show's image gallery.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShowImage {
    pub id: u64,
    /// Image type. TVmaze sends `null` for untagged images.
    #[serde(
        rename = "type",
        default = "default_image_type",
        deserialize_with = "image_type_or_other"
    )]
    pub kind: ImageType,
    /// Whether this is the main image of its type.
    #[serde(default)]
    pub main: bool,
    pub resolutions: ImageResolutions,
}

fn default_image_type() -> ImageType {
    ImageType::Other
}

fn image_type_or_other<'de, D>(deserializer: D) -> Result<ImageType, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<ImageType>::deserialize(deserializer)?.unwrap_or(ImageType::Other))
}

/// Available resolutions of an image.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageResolutions {
    pub original: ImageResolution,
    /// Not every gallery image has a medium rendition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium: Option<ImageResolution>,
}

/// A single rendition of an image.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageResolution {
    pub url: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

/// Shows sharing a genre, best rated first.
///
/// Sections are derived on demand and share the store's `Arc<Show>` values;
/// they never own show data.
#[derive(Debug, Clone, PartialEq)]
pub struct GenreSection {
    pub genre: String,
    pub shows: Vec<Arc<Show>>,
}

/// Show type filter. Classification is by runtime only.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ShowType {
    #[default]
    All,
    Movie,
    Tv,
}

impl ShowType {
    /// Whether `show` belongs to this type.
    ///
    /// Runtime above 60 minutes is a movie, 60 or less is TV. A show without
    /// a runtime only matches `All`.
    pub fn matches(self, show: &Show) -> bool {
        match self {
            ShowType::All => true,
            ShowType::Movie => show.runtime.is_some_and(|r| r > MOVIE_RUNTIME_THRESHOLD),
            ShowType::Tv => show.runtime.is_some_and(|r| r <= MOVIE_RUNTIME_THRESHOLD),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ShowType::All => "all",
            ShowType::Movie => "movie",
            ShowType::Tv => "tv",
        }
    }
}

impl fmt::Display for ShowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShowType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(ShowType::All),
            "movie" => Ok(ShowType::Movie),
            "tv" => Ok(ShowType::Tv),
            other => Err(format!("unknown show type '{}'", other)),
        }
    }
}
