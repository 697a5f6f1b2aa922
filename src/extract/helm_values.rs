//! Image discovery in HelmRelease `spec.values`
//!
//! Two shapes are recognised under any key ending in `image`:
//! a `{registry?, repository, tag|version}` mapping and an inline image string.

use std::collections::BTreeMap;

use serde_yaml::{Mapping, Value};

use crate::extract::docker::{VALUE_TEMPLATE, get_dep};
use crate::models::{DOCKER_VERSIONING, PackageDependency, scalar_to_string};

/// Walk `values` and collect every image dependency in document order
pub fn find_dependencies(
    values: &Value,
    aliases: &BTreeMap<String, String>,
) -> Vec<PackageDependency> {
    let mut deps = Vec::new();
    walk(values, &mut deps, aliases);
    deps
}

fn walk(value: &Value, deps: &mut Vec<PackageDependency>, aliases: &BTreeMap<String, String>) {
    match value {
        Value::Mapping(map) => {
            for (key, child) in map {
                let is_image_key = key
                    .as_str()
                    .is_some_and(|k| k.to_ascii_lowercase().ends_with("image"));

                if is_image_key {
                    if let Some(dep) = image_from_mapping(child, aliases) {
                        deps.push(dep);
                        continue;
                    }
                    if let Some(image) = child.as_str() {
                        deps.extend(get_dep(image, true, aliases));
                        continue;
                    }
                }
                walk(child, deps, aliases);
            }
        }
        Value::Sequence(items) => {
            for item in items {
                walk(item, deps, aliases);
            }
        }
        Value::Tagged(tagged) => walk(&tagged.value, deps, aliases),
        _ => {}
    }
}

fn image_from_mapping(
    value: &Value,
    aliases: &BTreeMap<String, String>,
) -> Option<PackageDependency> {
    let map: &Mapping = value.as_mapping()?;
    let repository = map.get("repository").and_then(scalar_to_string)?;
    let tag = map
        .get("tag")
        .or_else(|| map.get("version"))
        .and_then(scalar_to_string)?;
    if repository.is_empty() || tag.is_empty() {
        return None;
    }
    let registry = map
        .get("registry")
        .and_then(scalar_to_string)
        .filter(|r| !r.is_empty())
        .map(|r| format!("{}/", r.trim_end_matches('/')))
        .unwrap_or_default();

    let mut dep = get_dep(&format!("{registry}{repository}:{tag}"), false, aliases)?;
    dep.replace_string = Some(tag);
    dep.versioning = Some(DOCKER_VERSIONING.to_string());
    dep.auto_replace_string_template = Some(VALUE_TEMPLATE.to_string());
    Some(dep)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::docker::FULL_IMAGE_TEMPLATE;

    fn values(yaml: &str) -> Value {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_repository_and_tag_mapping() {
        let deps = find_dependencies(
            &values(
                r#"
image:
  repository: k8s.gcr.io/external-dns/external-dns
  tag: v0.13.4
"#,
            ),
            &BTreeMap::new(),
        );
        assert_eq!(
            deps,
            vec![PackageDependency {
                package_name: Some("k8s.gcr.io/external-dns/external-dns".to_string()),
                current_value: Some("v0.13.4".to_string()),
                datasource: Some(crate::models::Datasource::Docker),
                versioning: Some("docker".to_string()),
                replace_string: Some("v0.13.4".to_string()),
                auto_replace_string_template: Some(VALUE_TEMPLATE.to_string()),
                ..PackageDependency::new("k8s.gcr.io/external-dns/external-dns")
            }]
        );
    }

    #[test]
    fn test_registry_prefix_and_nested_keys() {
        let deps = find_dependencies(
            &values(
                r#"
controller:
  sidecarImage:
    registry: quay.io
    repository: jetstack/cert-manager-controller
    version: 1.13.2
"#,
            ),
            &BTreeMap::new(),
        );
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].dep_name, "quay.io/jetstack/cert-manager-controller");
        assert_eq!(deps[0].current_value.as_deref(), Some("1.13.2"));
        assert_eq!(deps[0].replace_string.as_deref(), Some("1.13.2"));
    }

    #[test]
    fn test_inline_image_string() {
        let deps = find_dependencies(
            &values("workers:\n  - image: redis:7.2\n  - image: \"\"\n"),
            &BTreeMap::new(),
        );
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].dep_name, "redis");
        assert_eq!(deps[0].current_value.as_deref(), Some("7.2"));
        assert_eq!(deps[0].replace_string.as_deref(), Some("redis:7.2"));
        assert_eq!(
            deps[0].auto_replace_string_template.as_deref(),
            Some(FULL_IMAGE_TEMPLATE)
        );
        assert!(deps[0].versioning.is_none());
    }

    #[test]
    fn test_ignores_unrelated_keys() {
        let deps = find_dependencies(
            &values("replicas: 2\nimagePullPolicy: Always\nrepository: foo\ntag: bar\n"),
            &BTreeMap::new(),
        );
        assert!(deps.is_empty());
    }

    #[test]
    fn test_image_strings_without_name_are_ignored() {
        let deps = find_dependencies(
            &values("image: \"@sha256:abc\"\nsidecarImage: \":1.0\"\nblankImage: \"  \"\n"),
            &BTreeMap::new(),
        );
        assert!(deps.is_empty(), "got {deps:?}");
    }
}
