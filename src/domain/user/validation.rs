//! User validation utilities

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Errors that can occur during user validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UserValidationError {
    #[error("Invalid user ID: '{0}'")]
    InvalidId(String),

    #[error("Email cannot be empty")]
    EmptyEmail,

    #[error("Email exceeds maximum length of {0} characters")]
    EmailTooLong(usize),

    #[error("Invalid email address: '{0}'")]
    InvalidEmail(String),

    #[error("Password cannot be empty")]
    EmptyPassword,

    #[error("Password is too short. Minimum length is {0} characters")]
    PasswordTooShort(usize),

    #[error("Password exceeds maximum length of {0} characters")]
    PasswordTooLong(usize),

    #[error("Unknown role: '{0}'")]
    UnknownRole(String),
}

const MAX_EMAIL_LENGTH: usize = 254;
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 128;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

/// Canonical form used for storage and comparison
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate an email address
///
/// Rules:
/// - Cannot be empty
/// - Maximum 254 characters
/// - A single `@` with a dotted domain, no whitespace
pub fn validate_email(email: &str) -> Result<(), UserValidationError> {
    let email = email.trim();

    if email.is_empty() {
        return Err(UserValidationError::EmptyEmail);
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(UserValidationError::EmailTooLong(MAX_EMAIL_LENGTH));
    }

    if !EMAIL_PATTERN.is_match(email) {
        return Err(UserValidationError::InvalidEmail(email.to_string()));
    }

    Ok(())
}

/// Validate a password against explicit length bounds
pub fn validate_password_with(
    password: &str,
    min: usize,
    max: usize,
) -> Result<(), UserValidationError> {
    if password.is_empty() {
        return Err(UserValidationError::EmptyPassword);
    }

    let length = password.chars().count();

    if length < min {
        return Err(UserValidationError::PasswordTooShort(min));
    }

    if length > max {
        return Err(UserValidationError::PasswordTooLong(max));
    }

    Ok(())
}

/// Validate a password with the default bounds (8..=128 characters)
pub fn validate_password(password: &str) -> Result<(), UserValidationError> {
    validate_password_with(password, MIN_PASSWORD_LENGTH, MAX_PASSWORD_LENGTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Foo@Example.COM "), "foo@example.com");
    }

    // Email tests
    #[test]
    fn test_valid_emails() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("first.last+tag@sub.example.nl").is_ok());
        assert!(validate_email(" padded@example.com ").is_ok());
    }

    #[test]
    fn test_empty_email() {
        assert_eq!(validate_email(""), Err(UserValidationError::EmptyEmail));
        assert_eq!(validate_email("   "), Err(UserValidationError::EmptyEmail));
    }

    #[test]
    fn test_email_too_long() {
        let long_email = format!("{}@example.com", "a".repeat(250));
        assert_eq!(
            validate_email(&long_email),
            Err(UserValidationError::EmailTooLong(254))
        );
    }

    #[test]
    fn test_invalid_emails() {
        assert!(matches!(
            validate_email("no-at-sign"),
            Err(UserValidationError::InvalidEmail(_))
        ));
        assert!(validate_email("two@@example.com").is_err());
        assert!(validate_email("user@nodot").is_err());
        assert!(validate_email("sp ace@example.com").is_err());
    }

    // Password tests
    #[test]
    fn test_valid_passwords() {
        assert!(validate_password("password123").is_ok());
        assert!(validate_password("P@ssw0rd!").is_ok());
        assert!(validate_password("12345678").is_ok());
    }

    #[test]
    fn test_empty_password() {
        assert_eq!(validate_password(""), Err(UserValidationError::EmptyPassword));
    }

    #[test]
    fn test_password_too_short() {
        assert_eq!(
            validate_password("1234567"),
            Err(UserValidationError::PasswordTooShort(8))
        );
    }

    #[test]
    fn test_password_too_long() {
        let long_password = "a".repeat(129);
        assert_eq!(
            validate_password(&long_password),
            Err(UserValidationError::PasswordTooLong(128))
        );
    }

    #[test]
    fn test_custom_bounds() {
        assert!(validate_password_with("abc", 3, 5).is_ok());
        assert_eq!(
            validate_password_with("abcdef", 3, 5),
            Err(UserValidationError::PasswordTooLong(5))
        );
    }
}
