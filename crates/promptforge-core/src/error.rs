//! Error types for the PromptForge engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire PromptForge engine.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum PromptForgeError {
    /// Invalid or missing user input; blocks the triggering action.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The generation collaborator was unreachable or returned a transport failure.
    #[error("Network error: {message}")]
    Network { message: String, retryable: bool },

    /// The collaborator response was not parseable JSON.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The collaborator response was well-formed JSON but missing required fields.
    #[error("Schema error: missing or invalid field '{field}' in {context}")]
    Schema { field: String, context: String },

    /// Save/load/delete against the persistence collaborator failed.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Entity not found error with type information.
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// IO error (file system operations).
    #[error("IO error: {message}")]
    Io { message: String },

    /// Internal error (should not happen in normal operation).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PromptForgeError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a Network error.
    pub fn network(message: impl Into<String>, retryable: bool) -> Self {
        Self::Network {
            message: message.into(),
            retryable,
        }
    }

    /// Creates a Parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Creates a Schema error.
    pub fn schema(field: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Schema {
            field: field.into(),
            context: context.into(),
        }
    }

    /// Creates a Persistence error.
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence(message.into())
    }

    /// Creates a NotFound error.
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an Internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a Validation error.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a Network error.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    /// Check if this is a Parse error.
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse(_))
    }

    /// Check if this is a Schema error.
    pub fn is_schema(&self) -> bool {
        matches!(self, Self::Schema { .. })
    }

    /// Check if this is a Persistence error.
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }

    /// Check if this is a NotFound error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this error leaves the session retryable by the user.
    ///
    /// Everything except validation is recoverable by retrying the same
    /// action or starting over; validation requires changing the input first.
    pub fn is_recoverable(&self) -> bool {
        !self.is_validation()
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for PromptForgeError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for PromptForgeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<toml::de::Error> for PromptForgeError {
    fn from(err: toml::de::Error) -> Self {
        Self::Persistence(format!("TOML decode: {}", err))
    }
}

impl From<toml::ser::Error> for PromptForgeError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Persistence(format!("TOML encode: {}", err))
    }
}

/// Conversion from anyhow::Error for repository implementations.
impl From<anyhow::Error> for PromptForgeError {
    fn from(err: anyhow::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// A type alias for `Result<T, PromptForgeError>`.
pub type Result<T> = std::result::Result<T, PromptForgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructor_helpers() {
        assert!(PromptForgeError::validation("empty input").is_validation());
        assert!(PromptForgeError::network("timeout", true).is_network());
        assert!(PromptForgeError::parse("no braces").is_parse());
        assert!(
            PromptForgeError::schema("enhanced_prompt", "final result").is_schema()
        );
        assert!(PromptForgeError::persistence("save failed").is_persistence());
        assert!(PromptForgeError::not_found("prompt", "abc").is_not_found());
    }

    #[test]
    fn test_parse_and_schema_are_distinct() {
        let parse = PromptForgeError::parse("not json");
        let schema = PromptForgeError::schema("score", "analysis");
        assert!(parse.is_parse() && !parse.is_schema());
        assert!(schema.is_schema() && !schema.is_parse());
    }

    #[test]
    fn test_serde_json_conversion() {
        let err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let converted: PromptForgeError = err.into();
        assert!(converted.is_parse());
    }

    #[test]
    fn test_validation_is_not_recoverable_by_retry() {
        assert!(!PromptForgeError::validation("blank").is_recoverable());
        assert!(PromptForgeError::network("down", true).is_recoverable());
    }
}
