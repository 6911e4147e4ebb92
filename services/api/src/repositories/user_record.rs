//! Collection entry repository for database operations
//!
//! The `(user_id, record_id)` pair is guarded by the
//! `user_records_user_record_key` unique constraint. Inserts never check for
//! an existing pair first; the constraint decides, so two racing inserts end
//! with exactly one row and one duplicate-key error.

use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use super::{StoreResult, UserRecordStore};
use crate::models::{
    UserId,
    user_record::{Condition, NewUserRecord, UserRecord, UserRecordUpdate},
};

const USER_RECORD_COLUMNS: &str = "id, user_id, record_id, storage_location, condition, notes, \
                                   purchase_date, purchase_price, is_for_sale, asking_price, \
                                   created_at, updated_at";

/// Collection entry repository
#[derive(Clone)]
pub struct UserRecordRepository {
    pool: PgPool,
}

impl UserRecordRepository {
    /// Create a new collection entry repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn user_record_from_row(row: &PgRow) -> StoreResult<UserRecord> {
    let condition = row
        .try_get::<Option<String>, _>("condition")?
        .map(|value| value.parse::<Condition>())
        .transpose()
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

    Ok(UserRecord {
        id: row.try_get("id")?,
        user: row.try_get("user_id")?,
        record: row.try_get("record_id")?,
        storage_location: row.try_get("storage_location")?,
        condition,
        notes: row.try_get("notes")?,
        purchase_date: row.try_get("purchase_date")?,
        purchase_price: row.try_get("purchase_price")?,
        is_for_sale: row.try_get("is_for_sale")?,
        asking_price: row.try_get("asking_price")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Split a tri-state field into a "was sent" flag and the value to store
fn provided<T>(field: Option<Option<T>>) -> (bool, Option<T>) {
    (field.is_some(), field.flatten())
}

#[async_trait]
impl UserRecordStore for UserRecordRepository {
    async fn insert(&self, entry: NewUserRecord) -> StoreResult<UserRecord> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO user_records (
                id, user_id, record_id, storage_location, condition, notes,
                purchase_date, purchase_price, is_for_sale, asking_price
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {USER_RECORD_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(entry.user)
        .bind(entry.record)
        .bind(&entry.storage_location)
        .bind(entry.condition.map(|c| c.as_str()))
        .bind(&entry.notes)
        .bind(entry.purchase_date)
        .bind(entry.purchase_price)
        .bind(entry.is_for_sale)
        .bind(entry.asking_price)
        .fetch_one(&self.pool)
        .await?;

        user_record_from_row(&row)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<UserRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_RECORD_COLUMNS} FROM user_records WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_record_from_row).transpose()
    }

    async fn list_by_user(&self, user: UserId) -> StoreResult<Vec<UserRecord>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {USER_RECORD_COLUMNS}
            FROM user_records
            WHERE user_id = $1
            ORDER BY created_at DESC, id
            "#
        ))
        .bind(user)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(user_record_from_row).collect()
    }

    async fn update(&self, id: Uuid, update: UserRecordUpdate) -> StoreResult<Option<UserRecord>> {
        let (set_storage_location, storage_location) = provided(update.storage_location);
        let (set_condition, condition) = provided(update.condition);
        let (set_notes, notes) = provided(update.notes);
        let (set_purchase_date, purchase_date) = provided(update.purchase_date);
        let (set_purchase_price, purchase_price) = provided(update.purchase_price);
        let (set_asking_price, asking_price) = provided(update.asking_price);

        let row = sqlx::query(&format!(
            r#"
            UPDATE user_records
            SET storage_location = CASE WHEN $2 THEN $3 ELSE storage_location END,
                condition = CASE WHEN $4 THEN $5 ELSE condition END,
                notes = CASE WHEN $6 THEN $7 ELSE notes END,
                purchase_date = CASE WHEN $8 THEN $9 ELSE purchase_date END,
                purchase_price = CASE WHEN $10 THEN $11 ELSE purchase_price END,
                is_for_sale = COALESCE($12, is_for_sale),
                asking_price = CASE WHEN $13 THEN $14 ELSE asking_price END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_RECORD_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(set_storage_location)
        .bind(storage_location)
        .bind(set_condition)
        .bind(condition.map(|c| c.as_str()))
        .bind(set_notes)
        .bind(notes)
        .bind(set_purchase_date)
        .bind(purchase_date)
        .bind(set_purchase_price)
        .bind(purchase_price)
        .bind(update.is_for_sale)
        .bind(set_asking_price)
        .bind(asking_price)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_record_from_row).transpose()
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM user_records WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
