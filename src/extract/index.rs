//! Source index
//!
//! Maps `(kind, namespace, name)` of source documents to their connection
//! details, and resolves consumer references against it.

use std::collections::HashMap;

use crate::extract::classify::FluxDocument;
use crate::extract::docker::{is_oci_url, remove_oci_prefix};
use crate::models::{FluxResourceKind, SourceReference};

/// Identity of an indexed source
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceKey {
    pub kind: FluxResourceKind,
    pub namespace: String,
    pub name: String,
}

/// Connection details of a source document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRecord {
    pub kind: FluxResourceKind,
    pub namespace: String,
    pub name: String,
    pub url: Option<String>,
    pub registry_type: Option<String>,
}

impl SourceRecord {
    /// OCI-backed Helm repository, declared by type or by URL scheme
    pub fn is_oci(&self) -> bool {
        self.registry_type.as_deref() == Some("oci")
            || self.url.as_deref().is_some_and(is_oci_url)
    }

    fn key(&self) -> SourceKey {
        SourceKey {
            kind: self.kind,
            namespace: self.namespace.clone(),
            name: self.name.clone(),
        }
    }
}

/// A url with something after the optional `oci://` scheme
fn usable_url(url: Option<&str>) -> Option<String> {
    url.map(str::trim)
        .filter(|u| !remove_oci_prefix(u).is_empty())
        .map(str::to_string)
}

/// Source records of one file (or one batch)
#[derive(Debug, Clone, Default)]
pub struct SourceIndex {
    records: HashMap<SourceKey, SourceRecord>,
}

impl SourceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every source document, in order
    pub fn from_documents<'a>(documents: impl IntoIterator<Item = &'a FluxDocument>) -> Self {
        let mut index = Self::new();
        for document in documents {
            index.index_document(document);
        }
        index
    }

    /// Register `document` if it is a source with a complete identity
    pub fn index_document(&mut self, document: &FluxDocument) {
        let (metadata, url, registry_type) = match document {
            FluxDocument::HelmRepository(repo) => {
                let Some(url) = usable_url(repo.spec.url.as_deref()) else {
                    tracing::debug!("HelmRepository {} has no url, not indexing", repo.name());
                    return;
                };
                (
                    &repo.metadata,
                    Some(url),
                    repo.spec.repository_type.clone(),
                )
            }
            FluxDocument::GitRepository(repo) => {
                (&repo.metadata, usable_url(repo.spec.url.as_deref()), None)
            }
            FluxDocument::OciRepository(repo) => (
                &repo.metadata,
                usable_url(repo.spec.url.as_deref()),
                Some("oci".to_string()),
            ),
            FluxDocument::Bucket(bucket) => (&bucket.metadata, None, None),
            _ => return,
        };

        let Some(namespace) = metadata.namespace.clone() else {
            tracing::debug!(
                "{} {} has no namespace, not indexing",
                document.kind(),
                metadata.name
            );
            return;
        };

        self.register(SourceRecord {
            kind: document.kind(),
            namespace,
            name: metadata.name.clone(),
            url,
            registry_type,
        });
    }

    /// Insert a record; a later record with the same identity replaces the earlier one
    pub fn register(&mut self, record: SourceRecord) {
        if let Some(previous) = self.records.insert(record.key(), record) {
            tracing::debug!(
                "Duplicate source {}/{}/{}, keeping the last one",
                previous.kind,
                previous.namespace,
                previous.name
            );
        }
    }

    pub fn lookup(
        &self,
        kind: FluxResourceKind,
        namespace: &str,
        name: &str,
    ) -> Option<&SourceRecord> {
        self.records.get(&SourceKey {
            kind,
            namespace: namespace.to_string(),
            name: name.to_string(),
        })
    }

    /// Resolve a consumer's reference
    ///
    /// A reference without a namespace inherits `consumer_namespace`. When
    /// neither is set nothing resolves, and a missing kind defaults to
    /// `default_kind`.
    pub fn resolve(
        &self,
        reference: &SourceReference,
        default_kind: FluxResourceKind,
        consumer_namespace: Option<&str>,
    ) -> Option<&SourceRecord> {
        let kind = match reference.kind.as_deref() {
            Some(kind) => FluxResourceKind::parse_optional(kind)?,
            None => default_kind,
        };
        let name = reference.name.as_deref()?;
        let namespace = reference.namespace.as_deref().or(consumer_namespace)?;
        self.lookup(kind, namespace, name)
    }

    pub fn merge(&mut self, other: SourceIndex) {
        for record in other.records.into_values() {
            self.register(record);
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(kind: FluxResourceKind, namespace: &str, name: &str, url: &str) -> SourceRecord {
        SourceRecord {
            kind,
            namespace: namespace.to_string(),
            name: name.to_string(),
            url: Some(url.to_string()),
            registry_type: None,
        }
    }

    fn reference(kind: Option<&str>, name: &str, namespace: Option<&str>) -> SourceReference {
        SourceReference {
            kind: kind.map(str::to_string),
            name: Some(name.to_string()),
            namespace: namespace.map(str::to_string),
        }
    }

    #[test]
    fn test_namespace_inheritance() {
        let mut index = SourceIndex::new();
        index.register(record(FluxResourceKind::HelmRepository, "x", "charts", "https://a"));

        let reference = reference(Some("HelmRepository"), "charts", None);
        assert!(
            index
                .resolve(&reference, FluxResourceKind::HelmRepository, Some("x"))
                .is_some()
        );
        assert!(
            index
                .resolve(&reference, FluxResourceKind::HelmRepository, Some("y"))
                .is_none()
        );
        assert!(
            index
                .resolve(&reference, FluxResourceKind::HelmRepository, None)
                .is_none()
        );
    }

    #[test]
    fn test_explicit_reference_namespace_wins() {
        let mut index = SourceIndex::new();
        index.register(record(FluxResourceKind::HelmRepository, "flux-system", "charts", "https://a"));

        let reference = reference(None, "charts", Some("flux-system"));
        let resolved = index
            .resolve(&reference, FluxResourceKind::HelmRepository, Some("apps"))
            .unwrap();
        assert_eq!(resolved.url.as_deref(), Some("https://a"));
    }

    #[test]
    fn test_unknown_reference_kind_does_not_resolve() {
        let mut index = SourceIndex::new();
        index.register(record(FluxResourceKind::HelmRepository, "x", "charts", "https://a"));
        let reference = reference(Some("ExternalArtifact"), "charts", None);
        assert!(
            index
                .resolve(&reference, FluxResourceKind::HelmRepository, Some("x"))
                .is_none()
        );
    }

    #[test]
    fn test_last_write_wins() {
        let mut index = SourceIndex::new();
        index.register(record(FluxResourceKind::HelmRepository, "x", "charts", "https://old"));
        index.register(record(FluxResourceKind::HelmRepository, "x", "charts", "https://new"));
        assert_eq!(index.len(), 1);
        assert_eq!(
            index
                .lookup(FluxResourceKind::HelmRepository, "x", "charts")
                .and_then(|r| r.url.as_deref()),
            Some("https://new")
        );
    }

    #[test]
    fn test_kind_is_part_of_identity() {
        let mut index = SourceIndex::new();
        index.register(record(FluxResourceKind::GitRepository, "x", "charts", "https://git"));
        assert!(index.lookup(FluxResourceKind::HelmRepository, "x", "charts").is_none());
    }

    #[test]
    fn test_is_oci() {
        let mut oci = record(FluxResourceKind::HelmRepository, "x", "charts", "https://ghcr.io");
        assert!(!oci.is_oci());
        oci.registry_type = Some("oci".to_string());
        assert!(oci.is_oci());

        let by_scheme = record(FluxResourceKind::HelmRepository, "x", "charts", "oci://ghcr.io/a");
        assert!(by_scheme.is_oci());
    }

    #[test]
    fn test_index_document_requires_namespace_and_url() {
        let docs: Vec<FluxDocument> = [
            "apiVersion: source.toolkit.fluxcd.io/v1\nkind: HelmRepository\nmetadata:\n  name: no-ns\nspec:\n  url: https://a",
            "apiVersion: source.toolkit.fluxcd.io/v1\nkind: HelmRepository\nmetadata:\n  name: no-url\n  namespace: x",
            "apiVersion: source.toolkit.fluxcd.io/v1\nkind: HelmRepository\nmetadata:\n  name: ok\n  namespace: x\nspec:\n  url: https://a",
            "apiVersion: source.toolkit.fluxcd.io/v1\nkind: Bucket\nmetadata:\n  name: bucket\n  namespace: x",
        ]
        .iter()
        .filter_map(|yaml| crate::extract::classify::classify(serde_yaml::from_str(yaml).unwrap()))
        .collect();
        assert_eq!(docs.len(), 4);

        let index = SourceIndex::from_documents(&docs);
        assert_eq!(index.len(), 2);
        assert!(index.lookup(FluxResourceKind::HelmRepository, "x", "ok").is_some());
        assert!(index.lookup(FluxResourceKind::Bucket, "x", "bucket").is_some());
    }

    #[test]
    fn test_blank_helm_repository_url_is_not_indexed() {
        let docs: Vec<FluxDocument> = [
            "apiVersion: source.toolkit.fluxcd.io/v1\nkind: HelmRepository\nmetadata:\n  name: empty\n  namespace: x\nspec:\n  url: \"\"",
            "apiVersion: source.toolkit.fluxcd.io/v1\nkind: HelmRepository\nmetadata:\n  name: blank\n  namespace: x\nspec:\n  url: \"  \"",
            "apiVersion: source.toolkit.fluxcd.io/v1\nkind: HelmRepository\nmetadata:\n  name: scheme-only\n  namespace: x\nspec:\n  type: oci\n  url: oci://",
        ]
        .iter()
        .filter_map(|yaml| crate::extract::classify::classify(serde_yaml::from_str(yaml).unwrap()))
        .collect();
        assert_eq!(docs.len(), 3);
        assert!(SourceIndex::from_documents(&docs).is_empty());
    }
}
