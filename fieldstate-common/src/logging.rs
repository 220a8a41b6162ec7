//! Logging utilities for fieldstate
//!
//! Library code only emits `tracing` events. Binaries and tests decide where
//! they go by installing a subscriber with [`init_tracing`].

use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, trace};
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "fieldstate=info";

/// Install a global fmt subscriber filtered by `RUST_LOG`, falling back to
/// [`DEFAULT_LOG_FILTER`].
///
/// Returns `false` when a global subscriber was already installed; calling
/// this more than once is harmless.
pub fn init_tracing() -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    install(filter)
}

/// Install a global fmt subscriber with an explicit filter directive such as
/// `"fieldstate=trace"`. Invalid directives fall back to [`DEFAULT_LOG_FILTER`].
pub fn init_tracing_with_filter(directives: &str) -> bool {
    let filter = EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    install(filter)
}

fn install(filter: EnvFilter) -> bool {
    let directives = filter.to_string();
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok();
    if installed {
        debug!(filter = %directives, "tracing subscriber installed");
    } else {
        trace!("global subscriber already set, keeping it");
    }
    installed
}

/// Wrapper for pretty-printing types in logs as YAML
///
/// ```ignore
/// use fieldstate_common::Pretty;
/// use tracing::debug;
///
/// debug!("applied delta: {}", Pretty(&delta));
/// ```
///
/// Outputs YAML with a leading newline. Debug is used as a fallback if YAML
/// serialization fails.
pub struct Pretty<T>(pub T);

impl<T: Serialize + Debug> std::fmt::Display for Pretty<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_yaml_ng::to_string(&self.0) {
            Ok(yaml) => write!(f, "\n{}", yaml),
            Err(_) => write!(f, "\n{:#?}", self.0),
        }
    }
}

impl<T: Serialize + Debug> std::fmt::Debug for Pretty<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pretty_renders_yaml_with_leading_newline() {
        let value = json!({"name": "Ann", "age": 30});
        let rendered = Pretty(&value).to_string();
        assert!(rendered.starts_with('\n'));
        assert!(rendered.contains("name: Ann"));
        assert!(rendered.contains("age: 30"));
    }

    #[test]
    fn pretty_debug_matches_display() {
        let value = json!(["a", "b"]);
        assert_eq!(format!("{:?}", Pretty(&value)), Pretty(&value).to_string());
    }

    #[test]
    fn init_tracing_is_idempotent() {
        let _ = init_tracing_with_filter("fieldstate=debug");
        assert!(!init_tracing());
    }
}
