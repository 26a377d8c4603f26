//! Layered YAML loading: parse, deep-merge, env-interpolate, canonicalize,
//! hash (§6A "Configuration loader").
//!
//! Adapted from the teacher's `load_layered_yaml`: same deep-merge +
//! canonicalization + SHA-256 content-hash shape, with env interpolation
//! (`env_interp`) inserted after merge and before hashing, since a config
//! hash should capture the *resolved* config an operator is running, not the
//! placeholder text.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::env_interp;

pub struct LoadedConfig {
    pub config_json: Value,
    pub canonical_json: String,
    pub config_hash: String,
}

/// Load and merge YAML files in order (later files override earlier ones),
/// interpolate `${VAR}` placeholders, and hash the canonical result.
pub fn load_layered_yaml(paths: &[&Path]) -> Result<LoadedConfig> {
    let mut merged = Value::Object(Default::default());
    for path in paths {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let layer: Value = serde_yaml::from_str(&text)
            .with_context(|| format!("parsing YAML in {}", path.display()))?;
        deep_merge(&mut merged, layer);
    }
    finish_load(merged)
}

/// Same as [`load_layered_yaml`] but takes YAML text directly; used by tests
/// that don't want to write temp files.
pub fn load_layered_yaml_from_strings(layers: &[&str]) -> Result<LoadedConfig> {
    let mut merged = Value::Object(Default::default());
    for (i, text) in layers.iter().enumerate() {
        let layer: Value =
            serde_yaml::from_str(text).with_context(|| format!("parsing YAML layer {i}"))?;
        deep_merge(&mut merged, layer);
    }
    finish_load(merged)
}

fn finish_load(mut merged: Value) -> Result<LoadedConfig> {
    env_interp::interpolate(&mut merged).context("interpolating env placeholders in config")?;
    let canonical = canonicalize_json(&merged);
    let canonical_json = serde_json::to_string(&canonical).context("serializing canonical config")?;
    let mut hasher = Sha256::new();
    hasher.update(canonical_json.as_bytes());
    let config_hash = hex::encode(hasher.finalize());
    Ok(LoadedConfig {
        config_json: merged,
        canonical_json,
        config_hash,
    })
}

fn deep_merge(dst: &mut Value, src: Value) {
    match (dst, src) {
        (Value::Object(dst_map), Value::Object(src_map)) => {
            for (k, v) in src_map {
                match dst_map.get_mut(&k) {
                    Some(existing) => deep_merge(existing, v),
                    None => {
                        dst_map.insert(k, v);
                    }
                }
            }
        }
        (dst_slot, src_value) => {
            *dst_slot = src_value;
        }
    }
}

/// Recursively sort object keys so semantically-identical configs hash
/// identically regardless of source key ordering.
fn canonicalize_json(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut sorted: Vec<(&String, &Value)> = map.iter().collect();
            sorted.sort_by_key(|(k, _)| k.as_str());
            let mut out = serde_json::Map::new();
            for (k, v) in sorted {
                out.insert(k.clone(), canonicalize_json(v));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize_json).collect()),
        other => other.clone(),
    }
}
