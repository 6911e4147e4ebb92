//! Application state shared across handlers

use sqlx::PgPool;
use std::sync::Arc;

use crate::{
    jwt::JwtService,
    repositories::{
        CommentRepository, CommentStore, RecordRepository, RecordStore, UserRecordRepository,
        UserRecordStore, UserRepository, UserStore, memory::MemoryStore,
    },
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Present when running against PostgreSQL
    pub db_pool: Option<PgPool>,
    pub jwt_service: JwtService,
    pub users: Arc<dyn UserStore>,
    pub records: Arc<dyn RecordStore>,
    pub user_records: Arc<dyn UserRecordStore>,
    pub comments: Arc<dyn CommentStore>,
}

impl AppState {
    /// State backed by PostgreSQL repositories sharing one pool
    pub fn with_postgres(pool: PgPool, jwt_service: JwtService) -> Self {
        Self {
            users: Arc::new(UserRepository::new(pool.clone())),
            records: Arc::new(RecordRepository::new(pool.clone())),
            user_records: Arc::new(UserRecordRepository::new(pool.clone())),
            comments: Arc::new(CommentRepository::new(pool.clone())),
            db_pool: Some(pool),
            jwt_service,
        }
    }

    /// State backed by a single in-memory store
    pub fn in_memory(jwt_service: JwtService) -> Self {
        let store = MemoryStore::new();

        Self {
            db_pool: None,
            jwt_service,
            users: Arc::new(store.clone()),
            records: Arc::new(store.clone()),
            user_records: Arc::new(store.clone()),
            comments: Arc::new(store),
        }
    }
}
