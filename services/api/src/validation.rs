//! Input validation rules shared by the handlers and models

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// Maximum comment length, counted in characters before trimming
pub const MAX_COMMENT_LENGTH: usize = 1000;

/// Field-level validation failure on an entity payload
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A required field was absent or blank
    #[error("{0} is required")]
    Missing(&'static str),

    /// The condition grade is not one of the known values
    #[error("`{0}` is not a valid condition")]
    InvalidCondition(String),

    /// Any other rule violation, carrying a client-facing message
    #[error("{0}")]
    Invalid(String),
}

/// Rejection raised by the comment content guard
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentContentError {
    #[error("Comment content is required")]
    EmptyContent,

    #[error("Comment content must be less than 1000 characters")]
    ContentTooLong,
}

/// Validate comment content and return its trimmed form
///
/// Emptiness is judged on the trimmed text, length on the raw text, so a
/// padded comment can be rejected as too long even when its trimmed form
/// would fit. Emptiness is checked first.
pub fn validate_comment_content(content: &str) -> Result<&str, CommentContentError> {
    let trimmed = content.trim();

    if trimmed.is_empty() {
        return Err(CommentContentError::EmptyContent);
    }

    if content.chars().count() > MAX_COMMENT_LENGTH {
        return Err(CommentContentError::ContentTooLong);
    }

    Ok(trimmed)
}

/// Trim an optional free-text field
pub fn trim_optional(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

/// Trim a required text field, rejecting it when blank
pub fn require_text(field: &'static str, value: Option<String>) -> Result<String, ValidationError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ValidationError::Missing(field)),
    }
}

/// Validate username
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.is_empty() {
        return Err(ValidationError::Missing("username"));
    }

    let length = username.chars().count();
    if !(3..=32).contains(&length) {
        return Err(ValidationError::Invalid(
            "Username must be between 3 and 32 characters long".to_string(),
        ));
    }

    static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = USERNAME_REGEX
        .get_or_init(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("Failed to compile username regex"));

    if !regex.is_match(username) {
        return Err(ValidationError::Invalid(
            "Username can only contain letters, numbers, and underscores".to_string(),
        ));
    }

    Ok(())
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::Missing("email"));
    }

    if email.len() > 254 {
        return Err(ValidationError::Invalid(
            "Email must be at most 254 characters long".to_string(),
        ));
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err(ValidationError::Invalid("Invalid email format".to_string()));
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::Missing("password"));
    }

    if password.len() < 8 || password.len() > 128 {
        return Err(ValidationError::Invalid(
            "Password must be between 8 and 128 characters long".to_string(),
        ));
    }

    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| !c.is_alphanumeric());

    if !(has_upper && has_lower && has_digit && has_special) {
        return Err(ValidationError::Invalid(
            "Password must contain an uppercase letter, a lowercase letter, a digit and a special character"
                .to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_comment_is_trimmed() {
        assert_eq!(validate_comment_content("  hi  "), Ok("hi"));
        assert_eq!(validate_comment_content("\n\tgreat pressing\n"), Ok("great pressing"));
    }

    #[test]
    fn test_blank_comment_is_empty() {
        for content in ["", " ", "   ", "\n\t \r\n"] {
            assert_eq!(
                validate_comment_content(content),
                Err(CommentContentError::EmptyContent),
                "content {:?}",
                content
            );
        }
    }

    #[test]
    fn test_length_is_measured_before_trimming() {
        let exact = "a".repeat(MAX_COMMENT_LENGTH);
        assert_ok!(validate_comment_content(&exact));

        let too_long = "a".repeat(MAX_COMMENT_LENGTH + 1);
        assert_eq!(
            validate_comment_content(&too_long),
            Err(CommentContentError::ContentTooLong)
        );

        let padded = format!("   {}  ", "b".repeat(995));
        assert_eq!(padded.chars().count(), 1000);
        assert_ok!(validate_comment_content(&padded));

        // 995 characters once trimmed, 1005 as sent
        let padded = format!("{}{}", " ".repeat(10), "b".repeat(995));
        assert_eq!(
            validate_comment_content(&padded),
            Err(CommentContentError::ContentTooLong)
        );
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let vinyl = "é".repeat(MAX_COMMENT_LENGTH);
        assert!(vinyl.len() > MAX_COMMENT_LENGTH);
        assert_ok!(validate_comment_content(&vinyl));
    }

    #[test]
    fn test_error_messages_match_wire_contract() {
        assert_eq!(
            CommentContentError::EmptyContent.to_string(),
            "Comment content is required"
        );
        assert_eq!(
            CommentContentError::ContentTooLong.to_string(),
            "Comment content must be less than 1000 characters"
        );
    }

    #[test]
    fn test_require_text() {
        assert_eq!(
            require_text("title", Some("  Kind of Blue ".to_string())),
            Ok("Kind of Blue".to_string())
        );
        assert_eq!(
            require_text("title", Some("   ".to_string())),
            Err(ValidationError::Missing("title"))
        );
        assert_eq!(require_text("title", None), Err(ValidationError::Missing("title")));
    }

    #[test]
    fn test_username_rules() {
        assert_ok!(validate_username("crate_digger"));
        assert_err!(validate_username(""));
        assert_err!(validate_username("ab"));
        assert_err!(validate_username(&"a".repeat(33)));
        assert_err!(validate_username("no spaces"));
    }

    #[test]
    fn test_email_rules() {
        assert_ok!(validate_email("listener@phono.app"));
        assert_err!(validate_email(""));
        assert_err!(validate_email("not-an-email"));
    }

    #[test]
    fn test_password_rules() {
        assert_ok!(validate_password("Needle-Drop9"));
        assert_err!(validate_password(""));
        assert_err!(validate_password("Sh0rt!"));
        assert_err!(validate_password("alllowercase1!"));
        assert_err!(validate_password("NoDigitsHere!"));
        assert_err!(validate_password("NoSpecial123"));
    }
}
