//! Loading a `ContextConfig` from disk and running a context under it.

use std::fs;

use fieldstate::{
    ArrayChangePolicy, Context, ContextConfig, ContextError, Patch, RawFieldDef, RawSchema,
};
use serde_json::json;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn strict_scalars_from_yaml_file() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "fieldstate.yaml", "strict_scalars: true\n");

    let config = ContextConfig::load_from(&path).unwrap();
    let ctx = Context::with_config(
        RawSchema::new().field("age", RawFieldDef::number().required(0)),
        config,
    )
    .unwrap();

    let err = ctx.update(Patch::new().set("age", "old")).unwrap_err();
    assert!(matches!(err, ContextError::KindMismatch { .. }));
    assert_eq!(ctx.update(Patch::new().set("age", 4)).unwrap().len(), 1);
}

#[test]
fn array_policy_from_toml_file() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "fieldstate.toml", "array_change = \"always\"\n");

    let config = ContextConfig::load_from(&path).unwrap();
    assert_eq!(config.array_change, ArrayChangePolicy::Always);

    let ctx = Context::with_config(
        RawSchema::new().field("tags", RawFieldDef::array().required(json!(["a"]))),
        config,
    )
    .unwrap();
    let delta = ctx.update(Patch::new().set("tags", json!(["a"]))).unwrap();
    assert!(delta.contains("tags"));
}

#[test]
fn malformed_file_is_a_configuration_error() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "fieldstate.json", r#"{"strict_scalars": "maybe"}"#);

    let err = ContextConfig::load_from(&path).unwrap_err();
    assert!(matches!(err, ContextError::Config(_)));
}
