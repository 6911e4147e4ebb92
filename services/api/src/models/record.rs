//! Catalog record models for the API service

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use super::reference::RecordId;
use crate::validation::{ValidationError, require_text, trim_optional};

/// Year of the first commercially pressed disc records
const EARLIEST_RELEASE_YEAR: i32 = 1877;

/// Canonical music release in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: RecordId,
    pub title: String,
    pub artist: String,
    pub year: Option<i32>,
    pub label: Option<String>,
    pub genre: Option<String>,
    pub format: Option<String>,
    pub cover_image_url: Option<String>,
    pub discogs_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Record payload as received from a client, used for create and replace
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordDraft {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub year: Option<i32>,
    pub label: Option<String>,
    pub genre: Option<String>,
    pub format: Option<String>,
    pub cover_image_url: Option<String>,
    pub discogs_id: Option<i64>,
}

/// Validated record fields
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub title: String,
    pub artist: String,
    pub year: Option<i32>,
    pub label: Option<String>,
    pub genre: Option<String>,
    pub format: Option<String>,
    pub cover_image_url: Option<String>,
    pub discogs_id: Option<i64>,
}

impl RecordDraft {
    pub fn validate(self) -> Result<NewRecord, ValidationError> {
        let title = require_text("title", self.title)?;
        let artist = require_text("artist", self.artist)?;

        if let Some(year) = self.year {
            let latest = Utc::now().year() + 1;
            if !(EARLIEST_RELEASE_YEAR..=latest).contains(&year) {
                return Err(ValidationError::Invalid(format!(
                    "year must be between {} and {}",
                    EARLIEST_RELEASE_YEAR, latest
                )));
            }
        }

        Ok(NewRecord {
            title,
            artist,
            year: self.year,
            label: trim_optional(self.label),
            genre: trim_optional(self.genre),
            format: trim_optional(self.format),
            cover_image_url: trim_optional(self.cover_image_url),
            discogs_id: self.discogs_id,
        })
    }
}

/// Query parameters for record listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordQuery {
    /// Page number (1-based)
    pub page: Option<u32>,
    /// Number of items per page
    pub limit: Option<u32>,
    /// Case-insensitive match on title or artist
    pub search: Option<String>,
}

impl RecordQuery {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(20).clamp(1, 100)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) as i64 * self.limit() as i64
    }

    /// Search term, ignoring blank input
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Response for record listing with pagination
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordListResponse {
    pub items: Vec<Record>,
    pub page: u32,
    pub limit: u32,
    pub total: i64,
}
