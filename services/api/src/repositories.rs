//! Repositories for database operations
//!
//! Each entity is reached through a store trait so handlers can run against
//! PostgreSQL in production and against [`memory::MemoryStore`] in tests and
//! local runs. Uniqueness is always decided by the store at write time.

use async_trait::async_trait;
use common::error::DatabaseError;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    NewUser, RecordId, User, UserId,
    comment::{Comment, NewComment},
    record::{NewRecord, Record, RecordQuery},
    user_record::{NewUserRecord, UserRecord, UserRecordUpdate},
};

pub mod comment;
pub mod memory;
pub mod record;
pub mod user;
pub mod user_record;

pub use comment::CommentRepository;
pub use record::RecordRepository;
pub use user::UserRepository;
pub use user_record::UserRecordRepository;

/// Unique key on the `(user, record)` pair of a collection entry
pub const USER_RECORD_PAIR_KEY: &str = "user_records_user_record_key";
/// Unique key on usernames
pub const USERNAME_KEY: &str = "users_username_key";
/// Unique key on emails
pub const EMAIL_KEY: &str = "users_email_key";
/// Foreign key from a collection entry to its catalog record
pub const USER_RECORD_RECORD_FKEY: &str = "user_records_record_id_fkey";
/// Foreign key from a comment to its catalog record
pub const COMMENT_RECORD_FKEY: &str = "comments_record_id_fkey";

/// Error type for store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// A write collided with a unique key, named by the constraint
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// A write referenced a row that does not exist, named by the constraint
    #[error("Missing reference: {0}")]
    MissingReference(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        let err = DatabaseError::Query(err);
        let key = err.constraint().unwrap_or("unknown").to_string();

        if err.is_unique_violation() {
            StoreError::DuplicateKey(key)
        } else if err.is_foreign_key_violation() {
            StoreError::MissingReference(key)
        } else {
            StoreError::Database(err)
        }
    }
}

/// Type alias for store results
pub type StoreResult<T> = Result<T, StoreError>;

/// Registered users
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create a user; fails with a duplicate key on a taken username or email
    async fn create(&self, new_user: NewUser) -> StoreResult<User>;

    async fn find_by_username_or_email(&self, username_or_email: &str)
    -> StoreResult<Option<User>>;

    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<User>>;
}

/// Catalog records
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn create(&self, new_record: NewRecord) -> StoreResult<Record>;

    async fn find_by_id(&self, id: RecordId) -> StoreResult<Option<Record>>;

    /// One page of records, newest first, with the total match count
    async fn list(&self, query: &RecordQuery) -> StoreResult<(Vec<Record>, i64)>;

    /// Replace every editable field; `None` when the record does not exist
    async fn replace(&self, id: RecordId, fields: NewRecord) -> StoreResult<Option<Record>>;

    /// Delete a record together with the collection entries and comments on it
    async fn delete(&self, id: RecordId) -> StoreResult<bool>;
}

/// Collection entries
#[async_trait]
pub trait UserRecordStore: Send + Sync {
    /// Insert an entry; a second entry for the same `(user, record)` pair
    /// fails with [`StoreError::DuplicateKey`], an entry for a record that no
    /// longer exists with [`StoreError::MissingReference`]
    async fn insert(&self, entry: NewUserRecord) -> StoreResult<UserRecord>;

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<UserRecord>>;

    /// A user's entries, most recently added first
    async fn list_by_user(&self, user: UserId) -> StoreResult<Vec<UserRecord>>;

    async fn update(&self, id: Uuid, update: UserRecordUpdate) -> StoreResult<Option<UserRecord>>;

    async fn delete(&self, id: Uuid) -> StoreResult<bool>;
}

/// Comments on catalog records
#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn create(&self, comment: NewComment) -> StoreResult<Comment>;

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Comment>>;

    /// Comments on a record, oldest first
    async fn list_by_record(&self, record: RecordId) -> StoreResult<Vec<Comment>>;

    async fn delete(&self, id: Uuid) -> StoreResult<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_unique_sqlx_errors_stay_database_errors() {
        let err = StoreError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Database(DatabaseError::Query(_))));
    }
}
