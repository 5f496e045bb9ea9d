use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Email '{email}' already exists")]
    DuplicateEmail { email: String },

    #[error("Username '{username}' already exists")]
    DuplicateUsername { username: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Password hashing failed: {message}")]
    HashingFailure { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn duplicate_email(email: impl Into<String>) -> Self {
        Self::DuplicateEmail {
            email: email.into(),
        }
    }

    pub fn duplicate_username(username: impl Into<String>) -> Self {
        Self::DuplicateUsername {
            username: username.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn hashing(message: impl Into<String>) -> Self {
        Self::HashingFailure {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Turns a `NotFound` lookup failure into `Ok(None)`, leaving every other
/// error untouched.
pub trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>, DomainError>;
}

impl<T> OptionalExt<T> for Result<T, DomainError> {
    fn optional(self) -> Result<Option<T>, DomainError> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let error = DomainError::not_found("User '7' not found");
        assert_eq!(error.to_string(), "Not found: User '7' not found");
        assert!(error.is_not_found());
    }

    #[test]
    fn test_duplicate_errors() {
        let error = DomainError::duplicate_email("a@x.com");
        assert_eq!(error.to_string(), "Email 'a@x.com' already exists");

        let error = DomainError::duplicate_username("alice");
        assert_eq!(error.to_string(), "Username 'alice' already exists");
        assert!(!error.is_not_found());
    }

    #[test]
    fn test_optional_maps_not_found_to_none() {
        let found: Result<u32, DomainError> = Ok(1);
        assert_eq!(found.optional().unwrap(), Some(1));

        let missing: Result<u32, DomainError> = Err(DomainError::not_found("gone"));
        assert_eq!(missing.optional().unwrap(), None);
    }

    #[test]
    fn test_optional_keeps_other_errors() {
        let failed: Result<u32, DomainError> = Err(DomainError::storage("connection reset"));
        assert!(matches!(
            failed.optional(),
            Err(DomainError::Storage { .. })
        ));
    }
}
