//! Flux Resource Kind definitions
//!
//! This module provides a centralized enum for the Flux CRD kinds that can carry
//! or locate a dependency. Each kind knows the API group it must be declared
//! under, so a `Kustomization` from `kustomize.config.k8s.io` is never confused
//! with the Flux one.

use std::fmt;
use std::str::FromStr;

/// Flux API group served by the source-controller
pub const SOURCE_API_GROUP: &str = "source.toolkit.fluxcd.io";
/// Flux API group served by the helm-controller
pub const HELM_API_GROUP: &str = "helm.toolkit.fluxcd.io";
/// Flux API group served by the kustomize-controller
pub const KUSTOMIZE_API_GROUP: &str = "kustomize.toolkit.fluxcd.io";

/// Enumeration of the Flux CRD resource kinds understood by the extractor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FluxResourceKind {
    // Source Controller resources
    GitRepository,
    OCIRepository,
    HelmRepository,
    Bucket,
    HelmChart,
    // Kustomize Controller resources
    Kustomization,
    // Helm Controller resources
    HelmRelease,
}

impl FluxResourceKind {
    /// Get the kind name as written in manifests
    pub fn as_str(&self) -> &'static str {
        match self {
            FluxResourceKind::GitRepository => "GitRepository",
            FluxResourceKind::OCIRepository => "OCIRepository",
            FluxResourceKind::HelmRepository => "HelmRepository",
            FluxResourceKind::Bucket => "Bucket",
            FluxResourceKind::HelmChart => "HelmChart",
            FluxResourceKind::Kustomization => "Kustomization",
            FluxResourceKind::HelmRelease => "HelmRelease",
        }
    }

    /// Try to parse a string into a FluxResourceKind, returning None if invalid
    pub fn parse_optional(s: &str) -> Option<Self> {
        s.parse().ok()
    }

    /// Get all Flux resource kinds
    pub fn all() -> &'static [Self] {
        &[
            FluxResourceKind::GitRepository,
            FluxResourceKind::OCIRepository,
            FluxResourceKind::HelmRepository,
            FluxResourceKind::Bucket,
            FluxResourceKind::HelmChart,
            FluxResourceKind::Kustomization,
            FluxResourceKind::HelmRelease,
        ]
    }

    /// API group this kind is served under
    pub fn api_group(&self) -> &'static str {
        match self {
            FluxResourceKind::GitRepository
            | FluxResourceKind::OCIRepository
            | FluxResourceKind::HelmRepository
            | FluxResourceKind::Bucket
            | FluxResourceKind::HelmChart => SOURCE_API_GROUP,
            FluxResourceKind::Kustomization => KUSTOMIZE_API_GROUP,
            FluxResourceKind::HelmRelease => HELM_API_GROUP,
        }
    }

    /// Whether `api_version` (e.g. `source.toolkit.fluxcd.io/v1beta2`) belongs to this kind's group
    pub fn matches_api_version(&self, api_version: &str) -> bool {
        api_version
            .strip_prefix(self.api_group())
            .is_some_and(|rest| rest.starts_with('/'))
    }
}

impl fmt::Display for FluxResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FluxResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GitRepository" => Ok(FluxResourceKind::GitRepository),
            "OCIRepository" => Ok(FluxResourceKind::OCIRepository),
            "HelmRepository" => Ok(FluxResourceKind::HelmRepository),
            "Bucket" => Ok(FluxResourceKind::Bucket),
            "HelmChart" => Ok(FluxResourceKind::HelmChart),
            "Kustomization" => Ok(FluxResourceKind::Kustomization),
            "HelmRelease" => Ok(FluxResourceKind::HelmRelease),
            _ => Err(format!("Unknown Flux resource kind: {}", s)),
        }
    }
}
