//! Data models for the tracker.
//!
//! This module defines the series model shared by the search flow, the local
//! library and the remote API, along with the mutable search parameters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// A trackable anime/manga work.
///
/// Identity is the remote service id; everything else is content. Library
/// membership checks and list diffing key on `id` alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesModel {
    pub id: i64,                  // Remote service ID, sole identity key
    pub series_type: SeriesType,
    pub slug: String,
    pub title: String,
    pub synopsis: Option<String>,
    pub poster_url: Option<String>,

    // User tracking state
    pub user_status: UserSeriesStatus,
    pub progress: u32,
    pub total_length: Option<u32>, // None = unknown/ongoing
    pub rating: Option<u16>,

    // Dates as reported by the service (ISO strings)
    pub start_date: Option<String>,
    pub end_date: Option<String>,

    // Timestamps
    pub added_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SeriesModel {
    /// Create a minimal model with defaults for everything but the identity
    pub fn new(id: i64, series_type: SeriesType, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            series_type,
            slug: String::new(),
            title: title.into(),
            synopsis: None,
            poster_url: None,
            user_status: UserSeriesStatus::Planned,
            progress: 0,
            total_length: None,
            rating: None,
            start_date: None,
            end_date: None,
            added_at: now,
            updated_at: now,
        }
    }

    /// Identity comparison, used for membership and diff keying
    pub fn same_identity(&self, other: &Self) -> bool {
        self.id == other.id
    }

    /// Full content comparison
    pub fn same_content(&self, other: &Self) -> bool {
        self == other
    }
}

/// Kind of series being tracked
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SeriesType {
    /// Sentinel for unrecognised input; never dispatched to the service
    Unknown,
    Anime,
    Manga,
}

impl std::fmt::Display for SeriesType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeriesType::Unknown => write!(f, "unknown"),
            SeriesType::Anime => write!(f, "anime"),
            SeriesType::Manga => write!(f, "manga"),
        }
    }
}

impl std::str::FromStr for SeriesType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unknown" => Ok(SeriesType::Unknown),
            "anime" => Ok(SeriesType::Anime),
            "manga" => Ok(SeriesType::Manga),
            _ => Err(anyhow::anyhow!("Invalid series type: {}", s)),
        }
    }
}

/// Where a series sits in the user's tracking lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserSeriesStatus {
    Current,
    Completed,
    OnHold,
    Dropped,
    Planned,
}

impl std::fmt::Display for UserSeriesStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserSeriesStatus::Current => write!(f, "current"),
            UserSeriesStatus::Completed => write!(f, "completed"),
            UserSeriesStatus::OnHold => write!(f, "onhold"),
            UserSeriesStatus::Dropped => write!(f, "dropped"),
            UserSeriesStatus::Planned => write!(f, "planned"),
        }
    }
}

impl std::str::FromStr for UserSeriesStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "current" => Ok(UserSeriesStatus::Current),
            "completed" => Ok(UserSeriesStatus::Completed),
            "onhold" => Ok(UserSeriesStatus::OnHold),
            "dropped" => Ok(UserSeriesStatus::Dropped),
            "planned" => Ok(UserSeriesStatus::Planned),
            _ => Err(anyhow::anyhow!("Invalid user series status: {}", s)),
        }
    }
}

/// Mutable search input shared between the UI and the workflow controller.
///
/// The `searching` flag is true only between request dispatch and its
/// completion, error or cancellation; it is reset exactly once per request.
#[derive(Debug, Default)]
pub struct SearchParams {
    text: Mutex<String>,
    searching: AtomicBool,
}

impl SearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_text(&self, text: impl Into<String>) {
        *self.text.lock().unwrap_or_else(|e| e.into_inner()) = text.into();
    }

    pub fn text(&self) -> String {
        self.text.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn is_searching(&self) -> bool {
        self.searching.load(Ordering::SeqCst)
    }

    pub fn set_searching(&self, searching: bool) {
        self.searching.store(searching, Ordering::SeqCst);
    }
}
