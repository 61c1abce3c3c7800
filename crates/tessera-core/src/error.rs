//! Error types for the Tessera entity store.

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors that can occur during store operations.
///
/// The store is purely in-memory, so there are no transient failures: every
/// variant describes a caller mistake and is surfaced synchronously.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No entity of the given type has the referenced identifier.
    #[error("{type_name} with id '{id}' was not found")]
    EntityNotFound {
        /// The entity type that was searched.
        type_name: &'static str,
        /// The identifier that was looked up, rendered for display.
        id: String,
    },

    /// An entity without an identifier reached a path that needs one.
    #[error("{type_name} has no identifier")]
    MissingId {
        /// The entity type.
        type_name: &'static str,
    },

    /// An interceptor refused the write. The collection is left unchanged.
    #[error("{type_name} write rejected: {message}")]
    Rejected {
        /// The entity type being written.
        type_name: &'static str,
        /// Why the write was refused.
        message: String,
    },

    /// A page request is outside the accepted bounds.
    #[error("Invalid page request: {message}")]
    InvalidPageRequest {
        /// What was wrong with the request.
        message: String,
    },
}

impl StoreError {
    /// Create a not-found error for an entity type and identifier.
    pub fn not_found(type_name: &'static str, id: impl std::fmt::Display) -> Self {
        Self::EntityNotFound {
            type_name,
            id: id.to_string(),
        }
    }

    /// Create a rejected-write error.
    pub fn rejected(type_name: &'static str, message: impl Into<String>) -> Self {
        Self::Rejected {
            type_name,
            message: message.into(),
        }
    }

    /// Create a page request error.
    pub fn invalid_page_request(message: impl Into<String>) -> Self {
        Self::InvalidPageRequest {
            message: message.into(),
        }
    }

    /// Returns `true` if this error reports a missing entity.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::EntityNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = StoreError::not_found("Widget", 42);
        assert_eq!(err.to_string(), "Widget with id '42' was not found");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_page_request_display() {
        let err = StoreError::invalid_page_request("per_page must be positive");
        assert!(err.to_string().contains("per_page must be positive"));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_rejected_display() {
        let err = StoreError::rejected("Widget", "z-index space exhausted");
        assert_eq!(err.to_string(), "Widget write rejected: z-index space exhausted");
        assert!(!err.is_not_found());
    }
}
