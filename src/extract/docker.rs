//! Image reference parsing and registry aliasing
//!
//! Shared by OCIRepository sources, OCI-backed Helm repositories, Kustomization
//! image overrides and images discovered in HelmRelease values.

use std::collections::BTreeMap;

use crate::models::{Datasource, PackageDependency};

/// Replace template for a bare tag that may gain a digest after an update
pub const VALUE_TEMPLATE: &str = "{{newValue}}{{#if newDigest}}@{{newDigest}}{{/if}}";

/// Replace template for a tag that may itself carry an embedded digest
pub const OPTIONAL_VALUE_TEMPLATE: &str =
    "{{#if newValue}}{{newValue}}{{/if}}{{#if newDigest}}@{{newDigest}}{{/if}}";

/// Replace template for a full `name:tag@digest` image string
pub const FULL_IMAGE_TEMPLATE: &str =
    "{{depName}}{{#if newValue}}:{{newValue}}{{/if}}{{#if newDigest}}@{{newDigest}}{{/if}}";

const OCI_SCHEME: &str = "oci://";

/// `[registry/]path[:tag][@digest]` split into its parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    pub name: String,
    pub tag: Option<String>,
    pub digest: Option<String>,
}

impl ImageReference {
    pub fn parse(image: &str) -> Self {
        let image = image.trim();
        let (rest, digest) = match image.split_once('@') {
            Some((rest, digest)) if !digest.is_empty() => (rest, Some(digest.to_string())),
            Some((rest, _)) => (rest, None),
            None => (image, None),
        };

        // A colon before the last slash is a registry port, not a tag
        let path_start = rest.rfind('/').map_or(0, |i| i + 1);
        let (name, tag) = match rest[path_start..].rfind(':') {
            Some(i) => {
                let split = path_start + i;
                let tag = &rest[split + 1..];
                (
                    &rest[..split],
                    (!tag.is_empty()).then(|| tag.to_string()),
                )
            }
            None => (rest, None),
        };

        Self {
            name: name.to_string(),
            tag,
            digest,
        }
    }
}

/// Strip the `oci://` scheme from a repository URL
pub fn remove_oci_prefix(url: &str) -> &str {
    url.strip_prefix(OCI_SCHEME).unwrap_or(url)
}

pub fn is_oci_url(url: &str) -> bool {
    url.starts_with(OCI_SCHEME)
}

/// Rewrite the registry prefix of `name` using the configured aliases
///
/// The longest key equal to `name` or followed by `/` wins. Names that match
/// no key are returned unchanged.
pub fn apply_registry_aliases(name: &str, aliases: &BTreeMap<String, String>) -> String {
    let matched = aliases
        .iter()
        .filter(|(key, _)| {
            !key.is_empty()
                && name
                    .strip_prefix(key.as_str())
                    .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
        })
        .max_by_key(|(key, _)| key.len());

    match matched {
        Some((key, replacement)) => {
            tracing::trace!("Aliasing registry {} to {} for {}", key, replacement, name);
            format!("{}{}", replacement.trim_end_matches('/'), &name[key.len()..])
        }
        None => name.to_string(),
    }
}

/// Build a docker dependency from an image string
///
/// With `specify_replace_string` the whole image string becomes the replace
/// string, rebuilt through [`FULL_IMAGE_TEMPLATE`]. Returns `None` when the
/// reference has no name part (`:1.0`, `@sha256:...`).
pub fn get_dep(
    image: &str,
    specify_replace_string: bool,
    aliases: &BTreeMap<String, String>,
) -> Option<PackageDependency> {
    let reference = ImageReference::parse(image);
    if reference.name.is_empty() {
        tracing::debug!("Ignoring image reference without a name: {}", image);
        return None;
    }
    let package_name = apply_registry_aliases(&reference.name, aliases);

    let mut dep = PackageDependency {
        package_name: Some(package_name),
        current_value: reference.tag,
        current_digest: reference.digest,
        datasource: Some(Datasource::Docker),
        ..PackageDependency::new(reference.name)
    };
    if specify_replace_string {
        dep.replace_string = Some(image.trim().to_string());
        dep.auto_replace_string_template = Some(FULL_IMAGE_TEMPLATE.to_string());
    }
    Some(dep)
}
