//! Resource kind tests
//!
//! Tests to ensure kind detection follows the Flux API groups.

use flux_extract::models::{
    FluxResourceKind, HELM_API_GROUP, KUSTOMIZE_API_GROUP, SOURCE_API_GROUP,
};

#[test]
fn test_all_kinds_round_trip_names() {
    for kind in FluxResourceKind::all() {
        assert_eq!(
            FluxResourceKind::parse_optional(kind.as_str()),
            Some(*kind),
            "{kind} should parse from its own name"
        );
    }
}

#[test]
fn test_api_groups() {
    assert_eq!(FluxResourceKind::HelmRelease.api_group(), HELM_API_GROUP);
    assert_eq!(FluxResourceKind::Kustomization.api_group(), KUSTOMIZE_API_GROUP);
    for kind in [
        FluxResourceKind::GitRepository,
        FluxResourceKind::OCIRepository,
        FluxResourceKind::HelmRepository,
        FluxResourceKind::Bucket,
        FluxResourceKind::HelmChart,
    ] {
        assert_eq!(kind.api_group(), SOURCE_API_GROUP, "{kind}");
    }
}

#[test]
fn test_api_version_matching_is_by_group() {
    let kind = FluxResourceKind::GitRepository;
    assert!(kind.matches_api_version("source.toolkit.fluxcd.io/v1"));
    assert!(kind.matches_api_version("source.toolkit.fluxcd.io/v1beta2"));
    assert!(!kind.matches_api_version("helm.toolkit.fluxcd.io/v2"));
    assert!(!kind.matches_api_version("source.toolkit.fluxcd.io"));
    assert!(!kind.matches_api_version("v1"));
}

#[test]
fn test_unknown_kind() {
    assert_eq!(FluxResourceKind::parse_optional("ConfigMap"), None);
    assert_eq!(FluxResourceKind::parse_optional("helmrelease"), None);
}
