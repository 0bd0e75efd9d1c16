use medtour_storage::StorageError;
use thiserror::Error;

/// Core error types for MedTour operations
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("{entity} not found")]
    NotFound { entity: String, id: String },

    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("{entity} with this {field} already exists")]
    Conflict { entity: String, field: String },

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Create a new NotFound error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Create a Validation error carrying a single message
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(vec![message.into()])
    }

    /// Create a new Conflict error
    pub fn conflict(entity: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Conflict {
            entity: entity.into(),
            field: field.into(),
        }
    }

    /// Create a new Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Maps a storage error raised while working on `entity` records.
    pub fn from_storage(entity: &str, err: StorageError) -> Self {
        match err {
            StorageError::NotFound { id, .. } => Self::not_found(entity, id),
            StorageError::AlreadyExists { field, .. } => Self::conflict(entity, field),
            StorageError::InvalidDocument { message } => Self::Validation(vec![message]),
            StorageError::ConnectionError { message } => Self::Unavailable(message),
            StorageError::Internal { message } => Self::Internal(message),
        }
    }

    /// Short machine-readable category, used in HTTP error bodies
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Validation(_) => "validation",
            Self::Conflict { .. } => "conflict",
            Self::Unavailable(_) => "unavailable",
            Self::Internal(_) => "internal",
        }
    }

    /// Check if this error is a client error (4xx category)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::Validation(_) | Self::Conflict { .. }
        )
    }
}

impl From<StorageError> for CoreError {
    fn from(err: StorageError) -> Self {
        let collection = match &err {
            StorageError::NotFound { collection, .. }
            | StorageError::AlreadyExists { collection, .. } => collection.clone(),
            _ => String::new(),
        };
        Self::from_storage(&collection, err)
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        // Malformed or mistyped input surfaces from deserialization
        if err.is_data() || err.is_syntax() || err.is_eof() {
            Self::Validation(vec![err.to_string()])
        } else {
            Self::Internal(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            CoreError::not_found("Patient", "p-1").to_string(),
            "Patient not found"
        );
        assert_eq!(
            CoreError::conflict("Hospital", "name").to_string(),
            "Hospital with this name already exists"
        );
        assert_eq!(
            CoreError::Validation(vec!["name is required".into(), "email is invalid".into()])
                .to_string(),
            "Validation failed: name is required; email is invalid"
        );
    }

    #[test]
    fn test_from_storage_by_variant() {
        let duplicate = StorageError::already_exists("hospitals", "name");
        let err = CoreError::from_storage("Hospital", duplicate);
        assert!(matches!(
            &err,
            CoreError::Conflict { entity, field } if entity == "Hospital" && field == "name"
        ));

        let err: CoreError = StorageError::connection_error("refused").into();
        assert!(matches!(err, CoreError::Unavailable(_)));
        assert_eq!(err.code(), "unavailable");

        let err: CoreError = StorageError::not_found("patients", "p-9").into();
        assert!(err.is_client_error());
        assert_eq!(err.code(), "not_found");

        let err: CoreError = StorageError::internal("boom").into();
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_serde_errors_are_validation() {
        let err = serde_json::from_str::<u32>("\"x\"").unwrap_err();
        assert!(matches!(CoreError::from(err), CoreError::Validation(_)));
    }
}
