//! Error types for the context engine

use fieldstate_common::{ErrorSeverity, Severity};
use thiserror::Error;

/// Result type for context operations
pub type Result<T> = std::result::Result<T, ContextError>;

/// Broad classification of a [`ContextError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Raised while normalizing a schema or materializing its defaults
    Schema,
    /// Raised by `update` when a candidate value is rejected
    Validation,
    /// Raised when code tries to write through the read-only view
    Immutability,
    /// Raised while parsing or rendering JSON/YAML
    Serialization,
    /// Raised while loading configuration
    Configuration,
}

/// Write operations the read-only view refuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Set,
    Delete,
    Define,
}

impl std::fmt::Display for MutationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            MutationKind::Set => "set",
            MutationKind::Delete => "delete",
            MutationKind::Define => "define",
        };
        f.write_str(label)
    }
}

/// Errors that can occur while building or updating a context
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContextError {
    /// A required field was declared without a default
    #[error("schema error on field '{field}': required field must declare a default")]
    RequiredWithoutDefault { field: String },

    /// A declared default does not fit its field kind
    #[error("schema error on field '{field}': {message}")]
    InvalidDefault { field: String, message: String },

    /// A field uses a name the view reserves for itself
    #[error("schema error on field '{field}': name is reserved by the read-only view")]
    ReservedFieldName { field: String },

    /// `null` sent to a required field
    #[error("validation error on field '{field}': field cannot be null")]
    NullOnRequired { field: String },

    /// Array field received something that is not an array
    #[error("validation error on field '{field}': expected an array, got {actual}")]
    NotAnArray { field: String, actual: &'static str },

    /// Array field received a nested array or object element
    #[error("validation error on field '{field}': element {index} is {actual}, arrays must be flat sequences of primitives")]
    NonPrimitiveElement {
        field: String,
        index: usize,
        actual: &'static str,
    },

    /// Array element does not share the field's element type
    #[error("validation error on field '{field}': element type mismatch at index {index}, expected {expected}, got {actual}")]
    ElementTypeMismatch {
        field: String,
        index: usize,
        expected: &'static str,
        actual: &'static str,
    },

    /// Enum field received a value outside its declared set
    #[error("validation error on field '{field}': value {value} is not one of [{allowed}]")]
    NotInEnum {
        field: String,
        value: String,
        allowed: String,
    },

    /// Scalar field received an object or array
    #[error("validation error on field '{field}': expected a primitive value, got {actual}")]
    NotPrimitive { field: String, actual: &'static str },

    /// Scalar field received a primitive of another kind (strict mode only)
    #[error("validation error on field '{field}': expected {expected}, got {actual}")]
    KindMismatch {
        field: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// Write attempted through the read-only view
    #[error("cannot {operation} '{key}': direct mutation forbidden, use update()")]
    Immutable {
        operation: MutationKind,
        key: String,
    },

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(#[from] Box<figment::Error>),
}

impl From<figment::Error> for ContextError {
    fn from(error: figment::Error) -> Self {
        ContextError::Config(Box::new(error))
    }
}

impl ContextError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ContextError::RequiredWithoutDefault { .. }
            | ContextError::InvalidDefault { .. }
            | ContextError::ReservedFieldName { .. } => ErrorCategory::Schema,
            ContextError::NullOnRequired { .. }
            | ContextError::NotAnArray { .. }
            | ContextError::NonPrimitiveElement { .. }
            | ContextError::ElementTypeMismatch { .. }
            | ContextError::NotInEnum { .. }
            | ContextError::NotPrimitive { .. }
            | ContextError::KindMismatch { .. } => ErrorCategory::Validation,
            ContextError::Immutable { .. } => ErrorCategory::Immutability,
            ContextError::Json(_) | ContextError::Yaml(_) => ErrorCategory::Serialization,
            ContextError::Config(_) => ErrorCategory::Configuration,
        }
    }

    pub fn is_schema(&self) -> bool {
        self.category() == ErrorCategory::Schema
    }

    pub fn is_validation(&self) -> bool {
        self.category() == ErrorCategory::Validation
    }

    pub fn is_immutability(&self) -> bool {
        self.category() == ErrorCategory::Immutability
    }

    /// Name of the field the error is about, when there is one.
    pub fn field(&self) -> Option<&str> {
        match self {
            ContextError::RequiredWithoutDefault { field }
            | ContextError::InvalidDefault { field, .. }
            | ContextError::ReservedFieldName { field }
            | ContextError::NullOnRequired { field }
            | ContextError::NotAnArray { field, .. }
            | ContextError::NonPrimitiveElement { field, .. }
            | ContextError::ElementTypeMismatch { field, .. }
            | ContextError::NotInEnum { field, .. }
            | ContextError::NotPrimitive { field, .. }
            | ContextError::KindMismatch { field, .. } => Some(field),
            ContextError::Immutable { key, .. } => Some(key),
            ContextError::Json(_) | ContextError::Yaml(_) | ContextError::Config(_) => None,
        }
    }

    pub(crate) fn invalid_default(field: &str, message: impl Into<String>) -> Self {
        ContextError::InvalidDefault {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn immutable(operation: MutationKind, key: &str) -> Self {
        ContextError::Immutable {
            operation,
            key: key.to_string(),
        }
    }
}

impl Severity for ContextError {
    fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // Critical: no context can be built from this input
            ErrorCategory::Schema | ErrorCategory::Configuration => ErrorSeverity::Critical,

            // Error: the call was rejected, state is unchanged
            ErrorCategory::Validation
            | ErrorCategory::Immutability
            | ErrorCategory::Serialization => ErrorSeverity::Error,
        }
    }
}
