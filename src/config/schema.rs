//! Configuration schema definitions
//!
//! Defines the structure of configuration files using serde for serialization.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Extraction settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExtractConfig {
    /// Registry host rewrites applied to OCI chart and image names
    /// (e.g. `registry.example.com` -> `mirror.example.com/registry`)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub registry_aliases: BTreeMap<String, String>,

    /// Resolve source references across every file of a batch instead of
    /// only within the referencing file
    #[serde(default)]
    pub batch_source_index: bool,

    /// Keys this tool does not interpret
    #[serde(flatten, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl ExtractConfig {
    pub fn with_registry_alias(mut self, host: impl Into<String>, target: impl Into<String>) -> Self {
        self.registry_aliases.insert(host.into(), target.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ExtractConfig::default();
        assert!(config.registry_aliases.is_empty());
        assert!(!config.batch_source_index);
    }

    #[test]
    fn test_config_serialization() {
        let config = ExtractConfig::default().with_registry_alias("ghcr.io", "mirror.local/ghcr");
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(yaml.contains("registryAliases"));
        assert!(yaml.contains("batchSourceIndex: false"));
    }

    #[test]
    fn test_config_deserialization() {
        let yaml = r#"
registryAliases:
  registry.example.com: mirror.example.com/registry
batchSourceIndex: true
ignoredKey: 42
"#;
        let config: ExtractConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.batch_source_index);
        assert_eq!(
            config.registry_aliases.get("registry.example.com").map(String::as_str),
            Some("mirror.example.com/registry")
        );
        assert!(config.extra.contains_key("ignoredKey"));
    }
}
