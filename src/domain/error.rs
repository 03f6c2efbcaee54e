use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Already exists: {message}")]
    AlreadyExists { message: String },

    #[error("Invalid parameter: {message}")]
    InvalidParameter { message: String },

    #[error("Unauthenticated: {message}")]
    Unauthenticated { message: String },

    /// Unique-constraint violation reported by a store
    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::AlreadyExists {
            message: message.into(),
        }
    }

    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }

    pub fn is_invalid_parameter(&self) -> bool {
        matches!(self, Self::InvalidParameter { .. })
    }

    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Unauthenticated { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let error = DomainError::not_found("User 'a@b.io' not found");
        assert_eq!(error.to_string(), "Not found: User 'a@b.io' not found");
        assert!(error.is_not_found());
    }

    #[test]
    fn test_already_exists_error() {
        let error = DomainError::already_exists("Email 'a@b.io' is already in use");
        assert_eq!(
            error.to_string(),
            "Already exists: Email 'a@b.io' is already in use"
        );
        assert!(error.is_already_exists());
    }

    #[test]
    fn test_invalid_parameter_error() {
        let error = DomainError::invalid_parameter("New password must differ");
        assert_eq!(error.to_string(), "Invalid parameter: New password must differ");
        assert!(error.is_invalid_parameter());
    }

    #[test]
    fn test_conflict_is_distinct_from_already_exists() {
        let error = DomainError::conflict("duplicate email");
        assert_eq!(error.to_string(), "Conflict: duplicate email");
        assert!(!error.is_already_exists());
    }
}
