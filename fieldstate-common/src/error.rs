//! Error severity model shared across fieldstate crates
//!
//! Each crate defines its own `thiserror` error enum and classifies its
//! variants through the [`Severity`] trait so that callers can decide how
//! loudly to report a failure without matching on crate-specific variants.

/// Severity levels for error classification
///
/// # Severity Levels
///
/// - **Warning**: Potential issue but the operation still completed.
/// - **Error**: The operation was rejected; the container is unchanged and
///   remains usable.
/// - **Critical**: The container cannot be built or used at all.
///
/// # Examples
///
/// ```rust
/// use fieldstate_common::ErrorSeverity;
///
/// // Rejected update: the caller passed a bad value, state is untouched
/// let rejected = ErrorSeverity::Error;
///
/// // Unusable schema: no context can be constructed from it
/// let broken_schema = ErrorSeverity::Critical;
/// assert_ne!(rejected, broken_schema);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorSeverity {
    /// Potential issue but operation can proceed
    Warning,

    /// Operation failed but the system can continue
    ///
    /// # Examples
    /// - Update rejected by field validation
    /// - Write attempted through a read-only view
    Error,

    /// System cannot continue, requires immediate attention
    ///
    /// # Examples
    /// - Schema that cannot be normalized
    /// - Configuration that cannot be parsed
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ErrorSeverity::Warning => "warning",
            ErrorSeverity::Error => "error",
            ErrorSeverity::Critical => "critical",
        };
        f.write_str(label)
    }
}

/// Trait for error types that have severity levels
///
/// # Example
///
/// ```rust
/// use fieldstate_common::{ErrorSeverity, Severity};
///
/// #[derive(Debug)]
/// enum MyError {
///     BadSchema,
///     RejectedValue,
/// }
///
/// impl Severity for MyError {
///     fn severity(&self) -> ErrorSeverity {
///         match self {
///             MyError::BadSchema => ErrorSeverity::Critical,
///             MyError::RejectedValue => ErrorSeverity::Error,
///         }
///     }
/// }
///
/// assert_eq!(MyError::BadSchema.severity(), ErrorSeverity::Critical);
/// ```
pub trait Severity {
    /// Get the severity level of this error
    fn severity(&self) -> ErrorSeverity;
}
