//! Configuration loading and merging logic
//!
//! Handles loading configuration from multiple sources and merging them
//! according to precedence rules.

use super::{paths, schema::ExtractConfig};
use anyhow::{Context, Result};
use serde_yaml::Value;
use std::path::Path;

/// Comma-separated `host=target` pairs added to `registryAliases`
pub const REGISTRY_ALIASES_ENV: &str = "FLUX_EXTRACT_REGISTRY_ALIASES";
/// `true`/`false` override for `batchSourceIndex`
pub const BATCH_SOURCE_INDEX_ENV: &str = "FLUX_EXTRACT_BATCH_SOURCE_INDEX";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with all layers merged
    ///
    /// Precedence order (highest to lowest):
    /// 1. Environment variable overrides
    /// 2. Explicit config file (`--config`)
    /// 3. Root config
    /// 4. Built-in defaults
    pub fn load(explicit: Option<&Path>) -> Result<ExtractConfig> {
        Self::load_layers(&paths::root_config_path(), explicit, |key| {
            std::env::var(key).ok()
        })
    }

    fn load_layers(
        root: &Path,
        explicit: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<ExtractConfig> {
        let mut layered = Value::Mapping(Default::default());

        if root.exists() {
            match Self::load_file(root) {
                Ok(root_config) => layered = Self::merge_config(layered, root_config),
                Err(e) => tracing::warn!("Ignoring root config: {:#}", e),
            }
        }

        if let Some(path) = explicit {
            let explicit_config = Self::load_file(path)?;
            layered = Self::merge_config(layered, explicit_config);
        }

        let config: ExtractConfig =
            serde_yaml::from_value(layered).context("Invalid configuration")?;
        Ok(Self::apply_env_overrides(config, env))
    }

    /// Load one configuration layer from a file
    ///
    /// The layer is kept as raw YAML so that keys it leaves out do not reset
    /// values set by lower layers.
    pub fn load_file(path: &Path) -> Result<Value> {
        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found: {}", path.display()));
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let layer: Value = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        match layer {
            Value::Null => Ok(Value::Mapping(Default::default())),
            Value::Mapping(_) => {
                // Type errors surface here rather than after merging
                serde_yaml::from_value::<ExtractConfig>(layer.clone())
                    .with_context(|| format!("Invalid config file: {}", path.display()))?;
                Ok(layer)
            }
            _ => Err(anyhow::anyhow!(
                "Config file {} must contain a mapping",
                path.display()
            )),
        }
    }

    /// Merge two configuration layers, with `other` taking precedence
    ///
    /// Mappings merge key by key; anything else is replaced.
    fn merge_config(base: Value, other: Value) -> Value {
        match (base, other) {
            (Value::Mapping(mut base), Value::Mapping(other)) => {
                for (key, value) in other {
                    let merged = match base.remove(&key) {
                        Some(existing) => Self::merge_config(existing, value),
                        None => value,
                    };
                    base.insert(key, merged);
                }
                Value::Mapping(base)
            }
            (_, other) => other,
        }
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(
        mut config: ExtractConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> ExtractConfig {
        if let Some(aliases) = env(REGISTRY_ALIASES_ENV) {
            for pair in aliases.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                match pair.split_once('=') {
                    Some((host, target)) if !host.trim().is_empty() => {
                        config
                            .registry_aliases
                            .insert(host.trim().to_string(), target.trim().to_string());
                    }
                    _ => tracing::warn!("Ignoring malformed registry alias '{}'", pair),
                }
            }
        }

        if let Some(batch) = env(BATCH_SOURCE_INDEX_ENV) {
            match batch.trim().parse::<bool>() {
                Ok(val) => config.batch_source_index = val,
                Err(_) => tracing::warn!(
                    "Ignoring {}={}: expected true or false",
                    BATCH_SOURCE_INDEX_ENV,
                    batch
                ),
            }
        }

        config
    }
}
