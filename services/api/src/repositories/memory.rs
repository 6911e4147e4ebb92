//! In-memory store used by tests and by `PHONO_STORAGE=memory` runs
//!
//! Every map lives behind a single lock. The `(user, record)` guard is
//! checked and updated while the write lock is held, which gives inserts the
//! same all-or-nothing behaviour as the PostgreSQL unique constraint.
//! Entries and comments must point at an existing record, as the foreign
//! keys require.

use async_trait::async_trait;
use chrono::Utc;
use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    COMMENT_RECORD_FKEY, CommentStore, EMAIL_KEY, RecordStore, StoreError, StoreResult,
    USER_RECORD_PAIR_KEY, USER_RECORD_RECORD_FKEY, USERNAME_KEY, UserRecordStore, UserStore,
};
use crate::models::{
    NewUser, RecordId, User, UserId,
    comment::{Comment, NewComment},
    record::{NewRecord, Record, RecordQuery},
    user_record::{NewUserRecord, UserRecord, UserRecordUpdate},
};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<UserId, User>,
    records: HashMap<RecordId, Record>,
    user_records: HashMap<Uuid, UserRecord>,
    owned_pairs: HashSet<(UserId, RecordId)>,
    comments: HashMap<Uuid, Comment>,
}

/// Store keeping every entity in process memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, new_user: NewUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;

        if tables.users.values().any(|u| u.username == new_user.username) {
            return Err(StoreError::DuplicateKey(USERNAME_KEY.to_string()));
        }
        if tables.users.values().any(|u| u.email == new_user.email) {
            return Err(StoreError::DuplicateKey(EMAIL_KEY.to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: UserId::new(),
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_by_username_or_email(
        &self,
        username_or_email: &str,
    ) -> StoreResult<Option<User>> {
        let email = username_or_email.to_lowercase();
        let tables = self.tables.read().await;

        Ok(tables
            .users
            .values()
            .find(|u| u.username == username_or_email || u.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn create(&self, new_record: NewRecord) -> StoreResult<Record> {
        let now = Utc::now();
        let record = Record {
            id: RecordId::new(),
            title: new_record.title,
            artist: new_record.artist,
            year: new_record.year,
            label: new_record.label,
            genre: new_record.genre,
            format: new_record.format,
            cover_image_url: new_record.cover_image_url,
            discogs_id: new_record.discogs_id,
            created_at: now,
            updated_at: now,
        };

        self.tables
            .write()
            .await
            .records
            .insert(record.id, record.clone());

        Ok(record)
    }

    async fn find_by_id(&self, id: RecordId) -> StoreResult<Option<Record>> {
        Ok(self.tables.read().await.records.get(&id).cloned())
    }

    async fn list(&self, query: &RecordQuery) -> StoreResult<(Vec<Record>, i64)> {
        let needle = query.search_term().map(str::to_lowercase);
        let tables = self.tables.read().await;

        let mut matches: Vec<&Record> = tables
            .records
            .values()
            .filter(|r| match &needle {
                Some(needle) => {
                    r.title.to_lowercase().contains(needle)
                        || r.artist.to_lowercase().contains(needle)
                }
                None => true,
            })
            .collect();
        matches.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.0.cmp(&b.id.0))
        });

        let total = matches.len() as i64;
        let items = matches
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.limit() as usize)
            .cloned()
            .collect();

        Ok((items, total))
    }

    async fn replace(&self, id: RecordId, fields: NewRecord) -> StoreResult<Option<Record>> {
        let mut tables = self.tables.write().await;
        let Some(record) = tables.records.get_mut(&id) else {
            return Ok(None);
        };

        record.title = fields.title;
        record.artist = fields.artist;
        record.year = fields.year;
        record.label = fields.label;
        record.genre = fields.genre;
        record.format = fields.format;
        record.cover_image_url = fields.cover_image_url;
        record.discogs_id = fields.discogs_id;
        record.updated_at = Utc::now();

        Ok(Some(record.clone()))
    }

    async fn delete(&self, id: RecordId) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.records.remove(&id).is_none() {
            return Ok(false);
        }

        tables.user_records.retain(|_, entry| entry.record != id);
        tables.owned_pairs.retain(|(_, record)| *record != id);
        tables.comments.retain(|_, comment| comment.record != id);

        Ok(true)
    }
}

#[async_trait]
impl UserRecordStore for MemoryStore {
    async fn insert(&self, entry: NewUserRecord) -> StoreResult<UserRecord> {
        let mut tables = self.tables.write().await;

        if !tables.records.contains_key(&entry.record) {
            return Err(StoreError::MissingReference(
                USER_RECORD_RECORD_FKEY.to_string(),
            ));
        }
        if !tables.owned_pairs.insert((entry.user, entry.record)) {
            return Err(StoreError::DuplicateKey(USER_RECORD_PAIR_KEY.to_string()));
        }

        let now = Utc::now();
        let user_record = UserRecord {
            id: Uuid::new_v4(),
            user: entry.user,
            record: entry.record,
            storage_location: entry.storage_location,
            condition: entry.condition,
            notes: entry.notes,
            purchase_date: entry.purchase_date,
            purchase_price: entry.purchase_price,
            is_for_sale: entry.is_for_sale,
            asking_price: entry.asking_price,
            created_at: now,
            updated_at: now,
        };
        tables
            .user_records
            .insert(user_record.id, user_record.clone());

        Ok(user_record)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<UserRecord>> {
        Ok(self.tables.read().await.user_records.get(&id).cloned())
    }

    async fn list_by_user(&self, user: UserId) -> StoreResult<Vec<UserRecord>> {
        let tables = self.tables.read().await;
        let mut entries: Vec<UserRecord> = tables
            .user_records
            .values()
            .filter(|entry| entry.user == user)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));

        Ok(entries)
    }

    async fn update(&self, id: Uuid, update: UserRecordUpdate) -> StoreResult<Option<UserRecord>> {
        let mut tables = self.tables.write().await;
        let Some(entry) = tables.user_records.get_mut(&id) else {
            return Ok(None);
        };

        update.apply_to(entry, Utc::now());
        Ok(Some(entry.clone()))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.user_records.remove(&id) {
            Some(entry) => {
                tables.owned_pairs.remove(&(entry.user, entry.record));
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl CommentStore for MemoryStore {
    async fn create(&self, comment: NewComment) -> StoreResult<Comment> {
        let mut tables = self.tables.write().await;

        if !tables.records.contains_key(&comment.record) {
            return Err(StoreError::MissingReference(COMMENT_RECORD_FKEY.to_string()));
        }

        let now = Utc::now();
        let comment = Comment {
            id: Uuid::new_v4(),
            record: comment.record,
            user: comment.user,
            content: comment.content,
            created_at: now,
            updated_at: now,
        };

        tables.comments.insert(comment.id, comment.clone());

        Ok(comment)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Comment>> {
        Ok(self.tables.read().await.comments.get(&id).cloned())
    }

    async fn list_by_record(&self, record: RecordId) -> StoreResult<Vec<Comment>> {
        let tables = self.tables.read().await;
        let mut comments: Vec<Comment> = tables
            .comments
            .values()
            .filter(|comment| comment.record == record)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));

        Ok(comments)
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.tables.write().await.comments.remove(&id).is_some())
    }
}
