//! Document classification
//!
//! Turns an untyped YAML document into a typed [`FluxDocument`] or rejects it.
//! Nothing past this boundary sees a raw document tree.

use serde::de::DeserializeOwned;
use serde_yaml::Value;

use crate::models::{
    BucketSpec, FluxResource, FluxResourceKind, GitRepositorySpec, HelmChartSpec,
    HelmReleaseSpec, HelmRepositorySpec, KustomizationSpec, OciRepositorySpec,
};

/// A Flux document the extractor knows how to handle
#[derive(Debug, Clone)]
pub enum FluxDocument {
    GitRepository(FluxResource<GitRepositorySpec>),
    HelmRepository(FluxResource<HelmRepositorySpec>),
    OciRepository(FluxResource<OciRepositorySpec>),
    Bucket(FluxResource<BucketSpec>),
    HelmRelease(FluxResource<HelmReleaseSpec>),
    HelmChart(FluxResource<HelmChartSpec>),
    /// `kustomize.toolkit.fluxcd.io` Kustomization, read for its image overrides
    Kustomization(FluxResource<KustomizationSpec>),
}

impl FluxDocument {
    pub fn kind(&self) -> FluxResourceKind {
        match self {
            FluxDocument::GitRepository(_) => FluxResourceKind::GitRepository,
            FluxDocument::HelmRepository(_) => FluxResourceKind::HelmRepository,
            FluxDocument::OciRepository(_) => FluxResourceKind::OCIRepository,
            FluxDocument::Bucket(_) => FluxResourceKind::Bucket,
            FluxDocument::HelmRelease(_) => FluxResourceKind::HelmRelease,
            FluxDocument::HelmChart(_) => FluxResourceKind::HelmChart,
            FluxDocument::Kustomization(_) => FluxResourceKind::Kustomization,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            FluxDocument::GitRepository(r) => r.name(),
            FluxDocument::HelmRepository(r) => r.name(),
            FluxDocument::OciRepository(r) => r.name(),
            FluxDocument::Bucket(r) => r.name(),
            FluxDocument::HelmRelease(r) => r.name(),
            FluxDocument::HelmChart(r) => r.name(),
            FluxDocument::Kustomization(r) => r.name(),
        }
    }
}

/// Classify one parsed document
///
/// Returns `None` for anything that is not a recognised Flux kind under its
/// expected API group, or whose shape does not match that kind.
pub fn classify(document: Value) -> Option<FluxDocument> {
    let kind_str = document.get("kind").and_then(Value::as_str)?;
    let api_version = document.get("apiVersion").and_then(Value::as_str)?;

    let Some(kind) = FluxResourceKind::parse_optional(kind_str) else {
        tracing::trace!("Ignoring unsupported kind {}", kind_str);
        return None;
    };
    if !kind.matches_api_version(api_version) {
        tracing::debug!(
            "Ignoring {} with foreign apiVersion {}",
            kind,
            api_version
        );
        return None;
    }

    let classified = match kind {
        FluxResourceKind::GitRepository => decode(kind, document).map(FluxDocument::GitRepository),
        FluxResourceKind::HelmRepository => {
            decode(kind, document).map(FluxDocument::HelmRepository)
        }
        FluxResourceKind::OCIRepository => decode(kind, document).map(FluxDocument::OciRepository),
        FluxResourceKind::Bucket => decode(kind, document).map(FluxDocument::Bucket),
        FluxResourceKind::HelmRelease => decode(kind, document).map(FluxDocument::HelmRelease),
        FluxResourceKind::HelmChart => decode(kind, document).map(FluxDocument::HelmChart),
        FluxResourceKind::Kustomization => decode(kind, document).map(FluxDocument::Kustomization),
    };
    if let Some(doc) = &classified {
        tracing::trace!("Classified {}/{}", doc.kind(), doc.name());
    }
    classified
}

fn decode<S: DeserializeOwned + Default>(
    kind: FluxResourceKind,
    document: Value,
) -> Option<FluxResource<S>> {
    match serde_yaml::from_value(document) {
        Ok(resource) => Some(resource),
        Err(e) => {
            tracing::debug!("Ignoring malformed {}: {}", kind, e);
            None
        }
    }
}
