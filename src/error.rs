// src/error.rs

//! Error types for the assembly model

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Initialization error: {0}")]
    InitError(String),

    #[error("Not found: {0}")]
    NotFoundError(String),

    /// A field value was rejected before it reached the store
    #[error("Invalid value for `{field}`: {message}")]
    Validation { field: &'static str, message: String },

    #[error("Element {0} is composite and cannot hold components")]
    CompositeCannotHoldComponents(i64),

    #[error("Element {0} is not a composite element")]
    NotAComposite(i64),

    #[error("Component {0} is not a layer")]
    NotALayer(i64),

    #[error("Component {0} already has a layer sibling")]
    AlreadyHasSibling(i64),

    #[error("Component {component_id} points to sibling {sibling_id}, which does not point back")]
    AsymmetricSibling { component_id: i64, sibling_id: i64 },

    #[error("Element {0} is nested inside itself")]
    CyclicAssembly(i64),
}

impl Error {
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub(crate) fn not_found(what: &str, id: i64) -> Self {
        Self::NotFoundError(format!("{} {}", what, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::validation("name", "must not be empty");
        assert_eq!(err.to_string(), "Invalid value for `name`: must not be empty");

        let err = Error::not_found("element", 42);
        assert_eq!(err.to_string(), "Not found: element 42");

        let err = Error::AsymmetricSibling {
            component_id: 1,
            sibling_id: 2,
        };
        assert!(err.to_string().contains("does not point back"));
    }
}
