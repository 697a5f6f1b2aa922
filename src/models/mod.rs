//! Model layer
//!
//! Structure:
//! - `flux_resource_kind.rs` - Flux kinds and the API groups they live under
//! - `resources.rs` - Typed views of the manifest fields the extractor reads
//! - `dependency.rs` - Dependency descriptors handed to the update engine

mod dependency;
mod flux_resource_kind;
mod resources;

pub use dependency::{
    DOCKER_VERSIONING, Datasource, ManagerData, PackageDependency, PackageFile, SkipReason,
};
pub use flux_resource_kind::{
    FluxResourceKind, HELM_API_GROUP, KUSTOMIZE_API_GROUP, SOURCE_API_GROUP,
};
pub use resources::{
    BucketSpec, FluxResource, GitRepositoryRef, GitRepositorySpec, HelmChartSpec,
    HelmChartTemplate, HelmReleaseSpec, HelmRepositorySpec, KustomizationSpec, KustomizeImage,
    OciRepositoryRef, OciRepositorySpec, ResourceMetadata, SourceReference,
};
pub(crate) use resources::scalar_to_string;
