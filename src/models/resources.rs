//! Typed views of the Flux manifests the extractor reads
//!
//! Only the fields needed to locate a dependency are modelled. Every field is
//! optional so that partially written manifests still deserialize; the
//! extractor decides per kind which missing fields make a document inert.

use serde::{Deserialize, Deserializer};

/// A classified Flux resource: its identity plus the kind-specific spec
#[derive(Debug, Clone, Deserialize)]
pub struct FluxResource<S> {
    pub metadata: ResourceMetadata,
    #[serde(default)]
    pub spec: S,
}

impl<S> FluxResource<S> {
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn namespace(&self) -> Option<&str> {
        self.metadata.namespace.as_deref()
    }
}

/// `metadata` block; a resource without a name is never classified
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResourceMetadata {
    pub name: String,
    #[serde(default)]
    pub namespace: Option<String>,
}

/// Reference from a consumer to a source (`sourceRef`, `chartRef`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SourceReference {
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitRepositorySpec {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, rename = "ref")]
    pub reference: Option<GitRepositoryRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitRepositoryRef {
    #[serde(default, deserialize_with = "scalar_string")]
    pub tag: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub commit: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HelmRepositorySpec {
    #[serde(default)]
    pub url: Option<String>,
    /// `oci` for OCI-backed Helm repositories, `default` or absent otherwise
    #[serde(default, rename = "type")]
    pub repository_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OciRepositorySpec {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, rename = "ref")]
    pub reference: Option<OciRepositoryRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OciRepositoryRef {
    #[serde(default, deserialize_with = "scalar_string")]
    pub tag: Option<String>,
    #[serde(default)]
    pub digest: Option<String>,
}

/// Buckets carry nothing the extractor needs beyond their identity
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BucketSpec {}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelmReleaseSpec {
    #[serde(default)]
    pub chart: Option<HelmChartTemplate>,
    /// Kept untyped: any `chartRef` makes the release defer to the referenced document
    #[serde(default)]
    pub chart_ref: Option<serde_yaml::Value>,
    #[serde(default)]
    pub values: Option<serde_yaml::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HelmChartTemplate {
    #[serde(default)]
    pub spec: Option<HelmChartSpec>,
}

/// Shared by `HelmChart.spec` and `HelmRelease.spec.chart.spec`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelmChartSpec {
    #[serde(default)]
    pub chart: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub version: Option<String>,
    #[serde(default)]
    pub source_ref: Option<SourceReference>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct KustomizationSpec {
    /// Entries are decoded one by one so a single malformed image does not hide the rest
    #[serde(default)]
    pub images: Vec<serde_yaml::Value>,
}

/// One entry of `Kustomization.spec.images`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KustomizeImage {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub new_name: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub new_tag: Option<String>,
    #[serde(default)]
    pub digest: Option<String>,
}

/// Accept unquoted YAML scalars (`version: 1.0`, `tag: 2020`) as strings
pub(crate) fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_yaml::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(scalar_to_string))
}

pub(crate) fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helm_release_spec_deserializes_nested_chart() {
        let yaml = r#"
metadata:
  name: sealed-secrets
  namespace: kube-system
spec:
  chart:
    spec:
      chart: sealed-secrets
      version: "2.0.2"
      sourceRef:
        kind: HelmRepository
        name: sealed-secrets
"#;
        let release: FluxResource<HelmReleaseSpec> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(release.name(), "sealed-secrets");
        assert_eq!(release.namespace(), Some("kube-system"));
        let chart = release.spec.chart.unwrap().spec.unwrap();
        assert_eq!(chart.chart.as_deref(), Some("sealed-secrets"));
        assert_eq!(chart.version.as_deref(), Some("2.0.2"));
        assert_eq!(
            chart.source_ref.unwrap().kind.as_deref(),
            Some("HelmRepository")
        );
    }

    #[test]
    fn test_unquoted_numeric_versions_become_strings() {
        let chart: HelmChartSpec = serde_yaml::from_str("chart: podinfo\nversion: 1.0").unwrap();
        assert_eq!(chart.version.as_deref(), Some("1.0"));

        let image: KustomizeImage = serde_yaml::from_str("name: app\nnewTag: 2020").unwrap();
        assert_eq!(image.new_tag.as_deref(), Some("2020"));
    }

    #[test]
    fn test_missing_spec_defaults() {
        let repo: FluxResource<GitRepositorySpec> =
            serde_yaml::from_str("metadata:\n  name: repo").unwrap();
        assert!(repo.spec.url.is_none());
        assert!(repo.spec.reference.is_none());
        assert!(repo.namespace().is_none());
    }

    #[test]
    fn test_metadata_name_is_required() {
        let result: Result<FluxResource<BucketSpec>, _> =
            serde_yaml::from_str("metadata:\n  namespace: default");
        assert!(result.is_err());
    }
}
