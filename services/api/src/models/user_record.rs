//! Collection entries: one user's ownership of one catalog record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

use super::reference::{RecordId, UserId};
use crate::validation::{ValidationError, trim_optional};

/// Grading of a physical record's condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
    Mint,
    #[serde(rename = "Near Mint")]
    NearMint,
    #[serde(rename = "Very Good")]
    VeryGood,
    Good,
    Fair,
    Poor,
}

impl Condition {
    pub const ALL: [Condition; 6] = [
        Condition::Mint,
        Condition::NearMint,
        Condition::VeryGood,
        Condition::Good,
        Condition::Fair,
        Condition::Poor,
    ];

    /// Wire and storage spelling of the grade
    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::Mint => "Mint",
            Condition::NearMint => "Near Mint",
            Condition::VeryGood => "Very Good",
            Condition::Good => "Good",
            Condition::Fair => "Fair",
            Condition::Poor => "Poor",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Condition {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Condition::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidCondition(s.to_string()))
    }
}

/// Persisted collection entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: Uuid,
    pub user: UserId,
    pub record: RecordId,
    pub storage_location: Option<String>,
    pub condition: Option<Condition>,
    pub notes: Option<String>,
    pub purchase_date: Option<DateTime<Utc>>,
    pub purchase_price: Option<f64>,
    pub is_for_sale: bool,
    /// Only meaningful while `is_for_sale` is set. Not enforced.
    pub asking_price: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    /// An asking price is recorded on an entry that is not for sale
    pub fn has_orphan_asking_price(&self) -> bool {
        self.asking_price.is_some() && !self.is_for_sale
    }
}

/// Unvalidated collection entry as received from a client
///
/// `condition` stays a plain string here so an unknown grade surfaces as a
/// [`ValidationError`] rather than a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecordDraft {
    pub user: Option<UserId>,
    pub record: Option<RecordId>,
    pub storage_location: Option<String>,
    pub condition: Option<String>,
    pub notes: Option<String>,
    pub purchase_date: Option<DateTime<Utc>>,
    pub purchase_price: Option<f64>,
    pub is_for_sale: Option<bool>,
    pub asking_price: Option<f64>,
}

/// Validated collection entry ready for insertion
#[derive(Debug, Clone, PartialEq)]
pub struct NewUserRecord {
    pub user: UserId,
    pub record: RecordId,
    pub storage_location: Option<String>,
    pub condition: Option<Condition>,
    pub notes: Option<String>,
    pub purchase_date: Option<DateTime<Utc>>,
    pub purchase_price: Option<f64>,
    pub is_for_sale: bool,
    pub asking_price: Option<f64>,
}

impl UserRecordDraft {
    /// Check required references and the condition grade, trim free text
    pub fn validate(self) -> Result<NewUserRecord, ValidationError> {
        let user = self.user.ok_or(ValidationError::Missing("user"))?;
        let record = self.record.ok_or(ValidationError::Missing("record"))?;
        let condition = parse_condition(self.condition)?;

        Ok(NewUserRecord {
            user,
            record,
            storage_location: trim_optional(self.storage_location),
            condition,
            notes: trim_optional(self.notes),
            purchase_date: self.purchase_date,
            purchase_price: self.purchase_price,
            is_for_sale: self.is_for_sale.unwrap_or(false),
            asking_price: self.asking_price,
        })
    }
}

/// Partial edit of a collection entry as received from a client
///
/// The owner and the catalog record of an entry never change. For the
/// optional fields an absent key leaves the stored value alone while an
/// explicit `null` clears it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecordChanges {
    #[serde(default, deserialize_with = "present")]
    pub storage_location: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub condition: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub notes: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub purchase_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "present")]
    pub purchase_price: Option<Option<f64>>,
    pub is_for_sale: Option<bool>,
    #[serde(default, deserialize_with = "present")]
    pub asking_price: Option<Option<f64>>,
}

/// Validated partial edit
///
/// `None` leaves a field untouched, `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserRecordUpdate {
    pub storage_location: Option<Option<String>>,
    pub condition: Option<Option<Condition>>,
    pub notes: Option<Option<String>>,
    pub purchase_date: Option<Option<DateTime<Utc>>>,
    pub purchase_price: Option<Option<f64>>,
    pub is_for_sale: Option<bool>,
    pub asking_price: Option<Option<f64>>,
}

/// Wrap a field that was sent, `null` included, in `Some`
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl UserRecordChanges {
    pub fn validate(self) -> Result<UserRecordUpdate, ValidationError> {
        Ok(UserRecordUpdate {
            storage_location: self.storage_location.map(trim_optional),
            condition: self.condition.map(parse_condition).transpose()?,
            notes: self.notes.map(trim_optional),
            purchase_date: self.purchase_date,
            purchase_price: self.purchase_price,
            is_for_sale: self.is_for_sale,
            asking_price: self.asking_price,
        })
    }
}

impl UserRecordUpdate {
    /// Apply the edit in place and bump `updated_at`
    pub fn apply_to(self, entry: &mut UserRecord, now: DateTime<Utc>) {
        if let Some(storage_location) = self.storage_location {
            entry.storage_location = storage_location;
        }
        if let Some(condition) = self.condition {
            entry.condition = condition;
        }
        if let Some(notes) = self.notes {
            entry.notes = notes;
        }
        if let Some(purchase_date) = self.purchase_date {
            entry.purchase_date = purchase_date;
        }
        if let Some(purchase_price) = self.purchase_price {
            entry.purchase_price = purchase_price;
        }
        if let Some(is_for_sale) = self.is_for_sale {
            entry.is_for_sale = is_for_sale;
        }
        if let Some(asking_price) = self.asking_price {
            entry.asking_price = asking_price;
        }
        entry.updated_at = now;
    }
}

fn parse_condition(value: Option<String>) -> Result<Option<Condition>, ValidationError> {
    value.as_deref().map(str::parse::<Condition>).transpose()
}
