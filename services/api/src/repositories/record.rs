//! Catalog record repository for database operations

use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use super::{RecordStore, StoreResult};
use crate::models::{
    RecordId,
    record::{NewRecord, Record, RecordQuery},
};

const RECORD_COLUMNS: &str = "id, title, artist, year, label, genre, format, cover_image_url, \
                              discogs_id, created_at, updated_at";

/// Record repository for database operations
#[derive(Clone)]
pub struct RecordRepository {
    pool: PgPool,
}

impl RecordRepository {
    /// Create a new record repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn record_from_row(row: &PgRow) -> StoreResult<Record> {
    Ok(Record {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        artist: row.try_get("artist")?,
        year: row.try_get("year")?,
        label: row.try_get("label")?,
        genre: row.try_get("genre")?,
        format: row.try_get("format")?,
        cover_image_url: row.try_get("cover_image_url")?,
        discogs_id: row.try_get("discogs_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// ILIKE pattern matching `term` anywhere, with its wildcards taken literally
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[async_trait]
impl RecordStore for RecordRepository {
    async fn create(&self, new_record: NewRecord) -> StoreResult<Record> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO records (id, title, artist, year, label, genre, format, cover_image_url, discogs_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {RECORD_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&new_record.title)
        .bind(&new_record.artist)
        .bind(new_record.year)
        .bind(&new_record.label)
        .bind(&new_record.genre)
        .bind(&new_record.format)
        .bind(&new_record.cover_image_url)
        .bind(new_record.discogs_id)
        .fetch_one(&self.pool)
        .await?;

        record_from_row(&row)
    }

    async fn find_by_id(&self, id: RecordId) -> StoreResult<Option<Record>> {
        let row = sqlx::query(&format!(
            "SELECT {RECORD_COLUMNS} FROM records WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(record_from_row).transpose()
    }

    async fn list(&self, query: &RecordQuery) -> StoreResult<(Vec<Record>, i64)> {
        let pattern = query.search_term().map(contains_pattern);

        let rows = sqlx::query(&format!(
            r#"
            SELECT {RECORD_COLUMNS}
            FROM records
            WHERE $1::TEXT IS NULL OR title ILIKE $1 ESCAPE '\' OR artist ILIKE $1 ESCAPE '\'
            ORDER BY created_at DESC, id
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(&pattern)
        .bind(query.limit() as i64)
        .bind(query.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM records
            WHERE $1::TEXT IS NULL OR title ILIKE $1 ESCAPE '\' OR artist ILIKE $1 ESCAPE '\'
            "#,
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        let records = rows
            .iter()
            .map(record_from_row)
            .collect::<StoreResult<Vec<_>>>()?;

        Ok((records, total))
    }

    async fn replace(&self, id: RecordId, fields: NewRecord) -> StoreResult<Option<Record>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE records
            SET title = $2, artist = $3, year = $4, label = $5, genre = $6, format = $7,
                cover_image_url = $8, discogs_id = $9, updated_at = NOW()
            WHERE id = $1
            RETURNING {RECORD_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&fields.title)
        .bind(&fields.artist)
        .bind(fields.year)
        .bind(&fields.label)
        .bind(&fields.genre)
        .bind(&fields.format)
        .bind(&fields.cover_image_url)
        .bind(fields.discogs_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(record_from_row).transpose()
    }

    async fn delete(&self, id: RecordId) -> StoreResult<bool> {
        // Collection entries and comments go with it through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM records WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
