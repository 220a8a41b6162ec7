//! Context configuration loaded with figment.
//!
//! Sources are merged in precedence order (later sources override earlier
//! ones):
//! 1. Default values
//! 2. An optional configuration file (TOML, YAML or JSON by extension)
//! 3. Environment variables with the `FIELDSTATE_` prefix

use std::path::Path;

use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

/// Environment variable prefix read by [`ContextConfig::load`].
pub const ENV_PREFIX: &str = "FIELDSTATE_";

/// How array assignments are compared against the stored array.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArrayChangePolicy {
    /// An array equal element-by-element to the stored one is not a change.
    #[default]
    ByValue,
    /// Every array assignment is a change, even when the contents match.
    Always,
}

/// Behavior switches for a context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    pub array_change: ArrayChangePolicy,
    /// Require scalar fields to receive a primitive of their own kind rather
    /// than any primitive.
    pub strict_scalars: bool,
}

impl ContextConfig {
    /// Defaults overridden by `FIELDSTATE_*` environment variables.
    pub fn load() -> Result<Self> {
        Self::extract(Self::figment())
    }

    /// Defaults, then the given file, then `FIELDSTATE_*` environment variables.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Figment::from(Yaml::file(path)),
            Some("json") => Figment::from(Json::file(path)),
            _ => Figment::from(Toml::file(path)),
        };
        debug!(path = %path.display(), "loading context configuration file");
        Self::extract(
            Figment::from(Serialized::defaults(Self::default()))
                .merge(file)
                .merge(Env::prefixed(ENV_PREFIX)),
        )
    }

    fn figment() -> Figment {
        Figment::from(Serialized::defaults(Self::default())).merge(Env::prefixed(ENV_PREFIX))
    }

    fn extract(figment: Figment) -> Result<Self> {
        let config: Self = figment.extract()?;
        debug!(?config, "context configuration loaded");
        Ok(config)
    }

    pub fn with_array_change(mut self, policy: ArrayChangePolicy) -> Self {
        self.array_change = policy;
        self
    }

    pub fn with_strict_scalars(mut self, strict: bool) -> Self {
        self.strict_scalars = strict;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults() {
        let config = ContextConfig::default();
        assert_eq!(config.array_change, ArrayChangePolicy::ByValue);
        assert!(!config.strict_scalars);
    }

    #[test]
    fn env_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.set_env("FIELDSTATE_ARRAY_CHANGE", "always");
            jail.set_env("FIELDSTATE_STRICT_SCALARS", "true");
            let config = ContextConfig::load().expect("config loads");
            assert_eq!(config.array_change, ArrayChangePolicy::Always);
            assert!(config.strict_scalars);
            Ok(())
        });
    }

    #[test]
    fn toml_file_then_env() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "fieldstate.toml",
                "array_change = \"always\"\nstrict_scalars = true\n",
            )?;
            jail.set_env("FIELDSTATE_STRICT_SCALARS", "false");
            let config = ContextConfig::load_from("fieldstate.toml").expect("config loads");
            assert_eq!(config.array_change, ArrayChangePolicy::Always);
            assert!(!config.strict_scalars);
            Ok(())
        });
    }

    #[test]
    fn yaml_and_json_files() {
        Jail::expect_with(|jail| {
            jail.create_file("fieldstate.yaml", "strict_scalars: true\n")?;
            jail.create_file("fieldstate.json", r#"{"array_change": "always"}"#)?;

            let yaml = ContextConfig::load_from("fieldstate.yaml").expect("yaml loads");
            assert!(yaml.strict_scalars);
            assert_eq!(yaml.array_change, ArrayChangePolicy::ByValue);

            let json = ContextConfig::load_from("fieldstate.json").expect("json loads");
            assert_eq!(json.array_change, ArrayChangePolicy::Always);
            Ok(())
        });
    }

    #[test]
    fn invalid_value_is_a_configuration_error() {
        Jail::expect_with(|jail| {
            jail.set_env("FIELDSTATE_ARRAY_CHANGE", "sometimes");
            let err = ContextConfig::load().unwrap_err();
            assert_eq!(
                err.category(),
                crate::error::ErrorCategory::Configuration
            );
            Ok(())
        });
    }

    #[test]
    fn builder_setters() {
        let config = ContextConfig::default()
            .with_array_change(ArrayChangePolicy::Always)
            .with_strict_scalars(true);
        assert_eq!(config.array_change, ArrayChangePolicy::Always);
        assert!(config.strict_scalars);
    }
}
