//! Dependency descriptors produced by the extractor
//!
//! These are handed to an external update engine, so they serialize in the
//! camelCase shape that engine expects and omit every unset field.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Versioning scheme id attached to images found in Helm values
pub const DOCKER_VERSIONING: &str = "docker";

/// Upstream lookup service governing a dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Datasource {
    Helm,
    Docker,
    GitRefs,
    GithubTags,
    GitlabTags,
    BitbucketTags,
    GitTags,
    GithubReleases,
}

impl Datasource {
    pub fn id(&self) -> &'static str {
        match self {
            Datasource::Helm => "helm",
            Datasource::Docker => "docker",
            Datasource::GitRefs => "git-refs",
            Datasource::GithubTags => "github-tags",
            Datasource::GitlabTags => "gitlab-tags",
            Datasource::BitbucketTags => "bitbucket-tags",
            Datasource::GitTags => "git-tags",
            Datasource::GithubReleases => "github-releases",
        }
    }
}

impl fmt::Display for Datasource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Why a dependency was reported but cannot be looked up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    LocalChart,
    UnknownRegistry,
    UnsupportedDatasource,
    UnversionedReference,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::LocalChart => "local-chart",
            SkipReason::UnknownRegistry => "unknown-registry",
            SkipReason::UnsupportedDatasource => "unsupported-datasource",
            SkipReason::UnversionedReference => "unversioned-reference",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extra fields for manifests that do not fit the regular descriptor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerData {
    /// Comma-joined Flux components listed in a system manifest
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<String>,
}

/// One dependency found in a manifest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageDependency {
    pub dep_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_digest: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datasource: Option<Datasource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub versioning: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub registry_urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<SkipReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replace_string: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_replace_string_template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_data: Option<ManagerData>,
}

impl PackageDependency {
    pub fn new(dep_name: impl Into<String>) -> Self {
        Self {
            dep_name: dep_name.into(),
            ..Default::default()
        }
    }

    /// Mark as skipped, keeping whatever identity was already gathered
    pub fn skipped(mut self, reason: SkipReason) -> Self {
        self.skip_reason = Some(reason);
        self
    }
}

/// Dependencies extracted from a single file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageFile {
    pub package_file: String,
    pub deps: Vec<PackageDependency>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_datasource_ids_match_serialization() {
        for datasource in [
            Datasource::Helm,
            Datasource::Docker,
            Datasource::GitRefs,
            Datasource::GithubTags,
            Datasource::GitlabTags,
            Datasource::BitbucketTags,
            Datasource::GitTags,
            Datasource::GithubReleases,
        ] {
            assert_eq!(serde_json::to_value(datasource).unwrap(), json!(datasource.id()));
        }
    }

    #[test]
    fn test_skip_reason_serialization() {
        assert_eq!(
            serde_json::to_value(SkipReason::UnversionedReference).unwrap(),
            json!("unversioned-reference")
        );
        assert_eq!(SkipReason::LocalChart.to_string(), "local-chart");
    }

    #[test]
    fn test_unset_fields_are_omitted() {
        let dep = PackageDependency {
            current_value: Some("2.0.2".to_string()),
            datasource: Some(Datasource::Helm),
            registry_urls: vec!["https://bitnami-labs.github.io/sealed-secrets".to_string()],
            ..PackageDependency::new("sealed-secrets")
        };
        assert_eq!(
            serde_json::to_value(&dep).unwrap(),
            json!({
                "depName": "sealed-secrets",
                "currentValue": "2.0.2",
                "datasource": "helm",
                "registryUrls": ["https://bitnami-labs.github.io/sealed-secrets"],
            })
        );
    }

    #[test]
    fn test_skipped_keeps_identity() {
        let dep = PackageDependency::new("renovate-repo").skipped(SkipReason::UnversionedReference);
        assert_eq!(dep.dep_name, "renovate-repo");
        assert_eq!(dep.skip_reason, Some(SkipReason::UnversionedReference));
        assert!(dep.datasource.is_none());
    }
}
