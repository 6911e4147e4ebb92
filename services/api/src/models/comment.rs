//! Comment models for the API service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::reference::{RecordId, UserId};

/// Comment left by a user on a catalog record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub record: RecordId,
    pub user: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for comment creation
///
/// By the time a handler sees this, the content guard has already trimmed
/// `content` and checked its length.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
}

/// Comment ready for insertion
#[derive(Debug, Clone, PartialEq)]
pub struct NewComment {
    pub record: RecordId,
    pub user: UserId,
    pub content: String,
}
