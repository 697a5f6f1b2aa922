//! Per-kind resolution of consumer documents into dependencies

use std::collections::BTreeMap;

use crate::extract::classify::FluxDocument;
use crate::extract::docker::{
    ImageReference, OPTIONAL_VALUE_TEMPLATE, VALUE_TEMPLATE, get_dep, remove_oci_prefix,
};
use crate::extract::git::GitRemote;
use crate::extract::helm_values;
use crate::extract::index::SourceIndex;
use crate::models::{
    Datasource, FluxResource, FluxResourceKind, GitRepositorySpec, HelmChartSpec,
    HelmReleaseSpec, KustomizationSpec, KustomizeImage, OciRepositorySpec, PackageDependency,
    SkipReason,
};

/// Dependencies contributed by one document, in the order they appear in it
pub fn resolve_document(
    document: &FluxDocument,
    index: &SourceIndex,
    aliases: &BTreeMap<String, String>,
) -> Vec<PackageDependency> {
    match document {
        FluxDocument::HelmRelease(release) => resolve_helm_release(release, index, aliases),
        FluxDocument::HelmChart(chart) => resolve_helm_chart(chart, index, aliases)
            .into_iter()
            .collect(),
        FluxDocument::GitRepository(repo) => resolve_git_repository(repo).into_iter().collect(),
        FluxDocument::OciRepository(repo) => {
            resolve_oci_repository(repo, aliases).into_iter().collect()
        }
        FluxDocument::Kustomization(kustomization) => {
            resolve_kustomization_images(kustomization, aliases)
        }
        FluxDocument::HelmRepository(_) | FluxDocument::Bucket(_) => Vec::new(),
    }
}

fn is_local_chart(chart: &str) -> bool {
    chart.starts_with("./") || chart.starts_with("../") || chart.starts_with('/')
}

/// Resolve HelmRelease.spec.chart
///
/// A release with a `chartRef` defers to the referenced HelmChart or
/// OCIRepository document, which reports the dependency itself.
fn resolve_helm_release(
    release: &FluxResource<HelmReleaseSpec>,
    index: &SourceIndex,
    aliases: &BTreeMap<String, String>,
) -> Vec<PackageDependency> {
    if let Some(chart_ref) = &release.spec.chart_ref {
        let target = chart_ref
            .get("kind")
            .and_then(serde_yaml::Value::as_str)
            .unwrap_or("<none>");
        tracing::debug!(
            "HelmRelease {} uses chartRef to {}, leaving it to the referenced document",
            release.name(),
            target
        );
        return Vec::new();
    }

    let Some(chart_spec) = release.spec.chart.as_ref().and_then(|c| c.spec.as_ref()) else {
        tracing::debug!("HelmRelease {} has no chart", release.name());
        return Vec::new();
    };
    let Some(chart_dep) = resolve_chart_spec(chart_spec, release.namespace(), index, aliases)
    else {
        tracing::debug!("HelmRelease {} has no chart name", release.name());
        return Vec::new();
    };

    let mut deps = vec![chart_dep];
    if let Some(values) = &release.spec.values {
        deps.extend(helm_values::find_dependencies(values, aliases));
    }
    deps
}

/// Resolve a standalone HelmChart
///
/// Charts built from a GitRepository are dropped silently; charts built from
/// a Bucket are reported as unsupported.
fn resolve_helm_chart(
    chart: &FluxResource<HelmChartSpec>,
    index: &SourceIndex,
    aliases: &BTreeMap<String, String>,
) -> Option<PackageDependency> {
    let source_kind = chart
        .spec
        .source_ref
        .as_ref()
        .and_then(|r| r.kind.as_deref())
        .and_then(FluxResourceKind::parse_optional);

    match source_kind {
        Some(FluxResourceKind::GitRepository) => {
            tracing::debug!("HelmChart {} is built from git, ignoring", chart.name());
            None
        }
        Some(FluxResourceKind::Bucket) => {
            let chart_name = chart.spec.chart.as_deref().filter(|c| !c.is_empty())?;
            Some(
                PackageDependency {
                    current_value: chart.spec.version.clone(),
                    ..PackageDependency::new(chart_name)
                }
                .skipped(SkipReason::UnsupportedDatasource),
            )
        }
        _ => resolve_chart_spec(&chart.spec, chart.namespace(), index, aliases),
    }
}

/// Shared chart policy for HelmRelease and HelmChart; `None` without a chart name
fn resolve_chart_spec(
    spec: &HelmChartSpec,
    consumer_namespace: Option<&str>,
    index: &SourceIndex,
    aliases: &BTreeMap<String, String>,
) -> Option<PackageDependency> {
    let chart_name = spec.chart.as_deref().filter(|c| !c.is_empty())?;
    let dep = PackageDependency {
        current_value: spec.version.clone(),
        ..PackageDependency::new(chart_name)
    };

    if is_local_chart(chart_name) {
        return Some(dep.skipped(SkipReason::LocalChart));
    }

    let source = spec.source_ref.as_ref().and_then(|reference| {
        index.resolve(
            reference,
            FluxResourceKind::HelmRepository,
            consumer_namespace,
        )
    });

    let helm_dep = PackageDependency {
        datasource: Some(Datasource::Helm),
        ..dep.clone()
    };
    let Some(source) = source else {
        tracing::debug!("No source found for chart {}", chart_name);
        return Some(helm_dep.skipped(SkipReason::UnknownRegistry));
    };

    match source.kind {
        FluxResourceKind::HelmRepository => {
            let url = source.url.clone().unwrap_or_default();
            if source.is_oci() {
                let image = format!(
                    "{}/{}",
                    remove_oci_prefix(&url).trim_end_matches('/'),
                    chart_name
                );
                let package_name = get_dep(&image, false, aliases).and_then(|d| d.package_name);
                Some(PackageDependency {
                    package_name,
                    datasource: Some(Datasource::Docker),
                    ..dep
                })
            } else {
                Some(PackageDependency {
                    registry_urls: vec![url],
                    ..helm_dep
                })
            }
        }
        FluxResourceKind::Bucket => Some(dep.skipped(SkipReason::UnsupportedDatasource)),
        other => {
            tracing::debug!("Chart {} sourced from unsupported kind {}", chart_name, other);
            Some(helm_dep.skipped(SkipReason::UnknownRegistry))
        }
    }
}

fn resolve_git_repository(repo: &FluxResource<GitRepositorySpec>) -> Option<PackageDependency> {
    let dep = PackageDependency::new(repo.name());
    let reference = repo.spec.reference.as_ref();
    let commit = reference.and_then(|r| r.commit.clone()).filter(|c| !c.is_empty());
    let tag = reference.and_then(|r| r.tag.clone()).filter(|t| !t.is_empty());

    if commit.is_none() && tag.is_none() {
        return Some(dep.skipped(SkipReason::UnversionedReference));
    }

    let Some(url) = repo.spec.url.clone() else {
        tracing::debug!("GitRepository {} has a ref but no url", repo.name());
        return Some(dep.skipped(SkipReason::UnversionedReference));
    };
    let remote = GitRemote::parse(&url);
    let source_url = remote.as_ref().map(GitRemote::source_url);

    if let Some(commit) = commit {
        return Some(PackageDependency {
            current_digest: Some(commit.clone()),
            datasource: Some(Datasource::GitRefs),
            package_name: Some(url),
            replace_string: Some(commit),
            source_url,
            ..dep
        });
    }

    let (datasource, package_name) = match remote.as_ref().and_then(|r| {
        r.tags_datasource()
            .map(|datasource| (datasource, r.project.clone()))
    }) {
        Some(known) => known,
        None => (Datasource::GitTags, url),
    };
    Some(PackageDependency {
        current_value: tag,
        datasource: Some(datasource),
        package_name: Some(package_name),
        source_url,
        ..dep
    })
}

/// Resolve an OCIRepository; an explicit `ref.digest` always beats the tag
fn resolve_oci_repository(
    repo: &FluxResource<OciRepositorySpec>,
    aliases: &BTreeMap<String, String>,
) -> Option<PackageDependency> {
    let Some(container) = repo
        .spec
        .url
        .as_deref()
        .map(|u| remove_oci_prefix(u.trim()))
        .filter(|c| !c.is_empty())
    else {
        tracing::debug!("OCIRepository {} has no url", repo.name());
        return None;
    };
    let reference = repo.spec.reference.as_ref();
    let digest = reference.and_then(|r| r.digest.clone()).filter(|d| !d.is_empty());
    let tag = reference.and_then(|r| r.tag.clone()).filter(|t| !t.is_empty());

    match (digest, tag) {
        (Some(digest), tag) => {
            if let Some(tag) = tag {
                let embedded = ImageReference::parse(&format!("{container}:{tag}")).digest;
                match embedded {
                    Some(embedded) if embedded != digest => tracing::warn!(
                        "OCIRepository {} pins digest {} but its tag embeds {}, using the explicit digest",
                        repo.name(),
                        digest,
                        embedded
                    ),
                    _ => tracing::debug!(
                        "OCIRepository {} has both digest and tag, ignoring tag",
                        repo.name()
                    ),
                }
            }
            get_dep(&format!("{container}@{digest}"), false, aliases)
        }
        (None, Some(tag)) => {
            let mut dep = get_dep(&format!("{container}:{tag}"), false, aliases)?;
            dep.auto_replace_string_template = Some(OPTIONAL_VALUE_TEMPLATE.to_string());
            dep.replace_string = Some(tag);
            Some(dep)
        }
        (None, None) => get_dep(container, false, aliases)
            .map(|dep| dep.skipped(SkipReason::UnversionedReference)),
    }
}

fn resolve_kustomization_images(
    kustomization: &FluxResource<KustomizationSpec>,
    aliases: &BTreeMap<String, String>,
) -> Vec<PackageDependency> {
    kustomization
        .spec
        .images
        .iter()
        .filter_map(|entry| match serde_yaml::from_value::<KustomizeImage>(entry.clone()) {
            Ok(image) => Some(image),
            Err(e) => {
                tracing::debug!(
                    "Ignoring malformed image in Kustomization {}: {}",
                    kustomization.name(),
                    e
                );
                None
            }
        })
        .filter_map(|image| extract_kustomize_image(&image, aliases))
        .collect()
}

/// Split `v1.2.3@sha256:...` into its tag and digest parts
fn split_tag_digest(tag: &str) -> (Option<String>, Option<String>) {
    match tag.split_once('@') {
        Some((value, digest)) => (
            (!value.is_empty()).then(|| value.to_string()),
            (!digest.is_empty()).then(|| digest.to_string()),
        ),
        None => (Some(tag.to_string()), None),
    }
}

/// One `images[]` override; `newTag` and `digest` are reported independently
pub fn extract_kustomize_image(
    image: &KustomizeImage,
    aliases: &BTreeMap<String, String>,
) -> Option<PackageDependency> {
    let name = image.name.as_deref().filter(|n| !n.is_empty())?;
    let new_name = image.new_name.as_deref().filter(|n| !n.is_empty());
    let new_tag = image.new_tag.clone().filter(|t| !t.is_empty());
    let digest = image.digest.clone().filter(|d| !d.is_empty());

    let mut dep = get_dep(new_name.unwrap_or(name), false, aliases)?;
    match (new_tag, digest) {
        (Some(tag), None) => {
            let (value, embedded_digest) = split_tag_digest(&tag);
            dep.current_value = value;
            dep.current_digest = embedded_digest;
            dep.replace_string = Some(tag);
            dep.auto_replace_string_template = Some(VALUE_TEMPLATE.to_string());
        }
        (None, Some(digest)) => {
            dep.current_value = None;
            dep.current_digest = Some(digest.clone());
            dep.replace_string = Some(digest);
        }
        (Some(tag), Some(digest)) => {
            dep.current_value = split_tag_digest(&tag).0;
            dep.current_digest = Some(digest.clone());
            dep.replace_string = Some(digest);
        }
        (None, None) => {
            dep.replace_string = new_name.map(str::to_string);
        }
    }
    Some(dep)
}
