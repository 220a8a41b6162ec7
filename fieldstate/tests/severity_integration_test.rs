//! Severity classification across every `ContextError` variant.

use fieldstate::{ContextError, ErrorCategory, MutationKind};
use fieldstate_common::{ErrorSeverity, Severity};

fn schema_errors() -> Vec<ContextError> {
    vec![
        ContextError::RequiredWithoutDefault {
            field: "name".to_string(),
        },
        ContextError::InvalidDefault {
            field: "tags".to_string(),
            message: "default must be an array, got string".to_string(),
        },
        ContextError::ReservedFieldName {
            field: "$titles".to_string(),
        },
    ]
}

fn validation_errors() -> Vec<ContextError> {
    vec![
        ContextError::NullOnRequired {
            field: "name".to_string(),
        },
        ContextError::NotAnArray {
            field: "tags".to_string(),
            actual: "string",
        },
        ContextError::NonPrimitiveElement {
            field: "tags".to_string(),
            index: 0,
            actual: "object",
        },
        ContextError::ElementTypeMismatch {
            field: "tags".to_string(),
            index: 1,
            expected: "number",
            actual: "string",
        },
        ContextError::NotInEnum {
            field: "role".to_string(),
            value: "\"guest\"".to_string(),
            allowed: "\"user\", \"admin\"".to_string(),
        },
        ContextError::NotPrimitive {
            field: "age".to_string(),
            actual: "array",
        },
        ContextError::KindMismatch {
            field: "age".to_string(),
            expected: "number",
            actual: "string",
        },
    ]
}

#[test]
fn test_schema_errors_are_critical() {
    for error in schema_errors() {
        assert_eq!(error.category(), ErrorCategory::Schema, "{error}");
        assert_eq!(
            error.severity(),
            ErrorSeverity::Critical,
            "Expected Critical severity for: {}",
            error
        );
    }
}

#[test]
fn test_validation_errors_are_errors() {
    for error in validation_errors() {
        assert_eq!(error.category(), ErrorCategory::Validation, "{error}");
        assert_eq!(
            error.severity(),
            ErrorSeverity::Error,
            "Expected Error severity for: {}",
            error
        );
        assert!(error.field().is_some());
    }
}

#[test]
fn test_immutability_errors_are_errors() {
    for operation in [MutationKind::Set, MutationKind::Delete, MutationKind::Define] {
        let error = ContextError::Immutable {
            operation,
            key: "name".to_string(),
        };
        assert_eq!(error.severity(), ErrorSeverity::Error);
        assert!(error.to_string().contains(&operation.to_string()));
    }
}

#[test]
fn test_serialization_errors_are_errors() {
    let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let error = ContextError::from(json);
    assert_eq!(error.category(), ErrorCategory::Serialization);
    assert_eq!(error.severity(), ErrorSeverity::Error);
}
