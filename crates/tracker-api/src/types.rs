//! Wire types for the tracking service (JSON:API style).
//!
//! These types represent the JSON payloads exchanged with the service and
//! their mapping into the shared `SeriesModel`.

use crate::error::ApiError;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use shared::models::{SeriesModel, SeriesType, UserSeriesStatus};

/// Wrapper for list responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub data: Vec<T>,
}

/// Wrapper for single-resource responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SingleResponse<T> {
    pub data: T,
}

/// A catalogue resource (anime or manga entry)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceItem {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub attributes: SeriesAttributes,
}

/// Attributes of a catalogue resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesAttributes {
    #[serde(default)]
    pub slug: String,
    #[serde(rename = "canonicalTitle")]
    pub canonical_title: String,
    #[serde(default)]
    pub synopsis: Option<String>,
    #[serde(rename = "posterImage", default)]
    pub poster_image: Option<ImageSet>,
    #[serde(rename = "episodeCount", default)]
    pub episode_count: Option<u32>,
    #[serde(rename = "chapterCount", default)]
    pub chapter_count: Option<u32>,
    #[serde(rename = "startDate", default)]
    pub start_date: Option<String>,
    #[serde(rename = "endDate", default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub subtype: Option<String>,
}

/// Poster image variants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageSet {
    #[serde(default)]
    pub small: Option<String>,
    #[serde(default)]
    pub medium: Option<String>,
    #[serde(default)]
    pub large: Option<String>,
    #[serde(default)]
    pub original: Option<String>,
}

impl ImageSet {
    /// Best available URL, preferring larger variants
    pub fn best(&self) -> Option<String> {
        self.original
            .clone()
            .or_else(|| self.large.clone())
            .or_else(|| self.medium.clone())
            .or_else(|| self.small.clone())
    }
}

impl ResourceItem {
    /// Map a wire resource into the shared model.
    ///
    /// Unrecognised kinds map to `SeriesType::Unknown` rather than failing;
    /// an unparseable id is a decode error.
    pub fn into_series_model(self) -> Result<SeriesModel, ApiError> {
        let id: i64 = self
            .id
            .parse()
            .map_err(|_| ApiError::Decode(format!("non-numeric resource id '{}'", self.id)))?;

        let series_type = match self.kind.as_str() {
            "anime" => SeriesType::Anime,
            "manga" => SeriesType::Manga,
            _ => SeriesType::Unknown,
        };

        let attributes = self.attributes;
        let now = Utc::now();
        Ok(SeriesModel {
            id,
            series_type,
            slug: attributes.slug,
            title: attributes.canonical_title,
            synopsis: attributes.synopsis,
            poster_url: attributes.poster_image.as_ref().and_then(ImageSet::best),
            user_status: UserSeriesStatus::Planned,
            progress: 0,
            total_length: attributes.episode_count.or(attributes.chapter_count),
            rating: None,
            start_date: attributes.start_date,
            end_date: attributes.end_date,
            added_at: now,
            updated_at: now,
        })
    }
}

/// Body of a library-entry push
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryEntryRequest {
    pub data: LibraryEntryData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryEntryData {
    #[serde(rename = "type")]
    pub kind: String,
    pub attributes: LibraryEntryAttributes,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryEntryAttributes {
    #[serde(rename = "seriesId")]
    pub series_id: i64,
    #[serde(rename = "seriesType")]
    pub series_type: String,
    pub status: String,
    pub progress: u32,
}

impl LibraryEntryRequest {
    pub fn for_series(series: &SeriesModel) -> Self {
        Self {
            data: LibraryEntryData {
                kind: "libraryEntries".to_string(),
                attributes: LibraryEntryAttributes {
                    series_id: series.id,
                    series_type: series.series_type.to_string(),
                    status: series.user_status.to_string(),
                    progress: series.progress,
                },
            },
        }
    }
}
