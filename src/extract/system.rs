//! Flux system manifests (`gotk-components.yaml`)
//!
//! `flux install --export` writes the Flux version and the installed controllers
//! as header comments. Those comments are the only thing read from these files.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{Datasource, ManagerData, PackageDependency};

/// Upstream repository whose releases version a Flux installation
pub const FLUX_REPOSITORY: &str = "fluxcd/flux2";

static SYSTEM_MANIFEST_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|/)gotk-components\.ya?ml$").expect("valid regex"));

static VERSION_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^# Flux Version: (\S+)").expect("valid regex"));

static COMPONENTS_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^# Components: (.+?)\s*$").expect("valid regex"));

pub fn is_system_manifest(package_file: &str) -> bool {
    SYSTEM_MANIFEST_PATH.is_match(package_file)
}

/// Read the Flux release pinned by a system manifest
pub fn extract_system_manifest(content: &str) -> Option<PackageDependency> {
    let Some(version) = VERSION_COMMENT.captures(content).map(|c| c[1].to_string()) else {
        tracing::debug!("System manifest has no Flux version comment");
        return None;
    };
    let components = COMPONENTS_COMMENT
        .captures(content)
        .map(|c| c[1].to_string());

    Some(PackageDependency {
        current_value: Some(version),
        datasource: Some(Datasource::GithubReleases),
        manager_data: Some(ManagerData { components }),
        ..PackageDependency::new(FLUX_REPOSITORY)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_manifest_paths() {
        for path in [
            "clusters/my-cluster/flux-system/gotk-components.yaml",
            "clusters/my-cluster/flux-system/gotk-components.yml",
            "clusters/my-cluster/gotk-components.yaml",
            "clusters/my-cluster/gotk-components.yml",
            "gotk-components.yaml",
        ] {
            assert!(is_system_manifest(path), "{path} should match");
        }
        for path in [
            "gotk-components.json",
            "clusters/my-gotk-components.yaml",
            "gotk-sync.yaml",
        ] {
            assert!(!is_system_manifest(path), "{path} should not match");
        }
    }

    #[test]
    fn test_extracts_version_and_components() {
        let dep = extract_system_manifest(
            "---\n# This manifest was generated by flux. DO NOT EDIT.\n# Flux Version: v0.24.1\n# Components: source-controller,kustomize-controller\napiVersion: v1\n",
        )
        .unwrap();
        assert_eq!(dep.dep_name, "fluxcd/flux2");
        assert_eq!(dep.current_value.as_deref(), Some("v0.24.1"));
        assert_eq!(dep.datasource, Some(Datasource::GithubReleases));
        assert_eq!(
            dep.manager_data.unwrap().components.as_deref(),
            Some("source-controller,kustomize-controller")
        );
    }

    #[test]
    fn test_components_are_optional() {
        let dep = extract_system_manifest("# Flux Version: v0.27.0").unwrap();
        assert_eq!(dep.current_value.as_deref(), Some("v0.27.0"));
        assert_eq!(dep.manager_data.unwrap().components, None);
    }

    #[test]
    fn test_missing_version_yields_nothing() {
        assert_eq!(extract_system_manifest("not actually a system manifest!"), None);
    }
}
