//! # Fieldstate Common
//!
//! Foundational pieces shared by the fieldstate crates.
//!
//! ## Modules
//!
//! - [`error`] - Severity classification implemented by every crate's error type
//! - [`logging`] - Tracing subscriber setup and the [`Pretty`] log formatter

pub mod error;
pub mod logging;

// Re-export error severity types for convenience
pub use error::{ErrorSeverity, Severity};

// Re-export logging helpers for convenience
pub use logging::{init_tracing, init_tracing_with_filter, Pretty, DEFAULT_LOG_FILTER};
