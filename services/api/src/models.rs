//! API models for request and response payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::{ValidationError, validate_email, validate_password, validate_username};

pub mod comment;
pub mod record;
pub mod reference;
pub mod user_record;

pub use reference::{RecordId, UserId};

/// User entity
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New user creation payload, password already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Request for user registration
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    /// Trim identifiers, lowercase the email and check every field
    pub fn normalize(self) -> Result<Self, ValidationError> {
        let username = self.username.trim().to_string();
        let email = self.email.trim().to_lowercase();

        validate_username(&username)?;
        validate_email(&email)?;
        validate_password(&self.password)?;

        Ok(Self {
            username,
            email,
            password: self.password,
        })
    }
}

/// Request for user login
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username_or_email: String,
    pub password: String,
}

/// Response for user operations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Response for register and login
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub user: UserResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_is_normalized() {
        let request = RegisterRequest {
            username: " crate_digger ".to_string(),
            email: " Digger@Phono.App".to_string(),
            password: "Needle-Drop9".to_string(),
        }
        .normalize()
        .unwrap();

        assert_eq!(request.username, "crate_digger");
        assert_eq!(request.email, "digger@phono.app");
    }

    #[test]
    fn test_register_request_rejects_weak_password() {
        let result = RegisterRequest {
            username: "crate_digger".to_string(),
            email: "digger@phono.app".to_string(),
            password: "password".to_string(),
        }
        .normalize();

        assert!(matches!(result, Err(ValidationError::Invalid(_))));
    }
}
