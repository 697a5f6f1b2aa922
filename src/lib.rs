//! Flux manifest dependency extraction
//!
//! Reads Flux GitOps manifests (HelmRelease, HelmChart, GitRepository,
//! OCIRepository, Kustomization and the `gotk-components.yaml` system
//! manifest) and reports the Helm charts, OCI artifacts, container images and
//! Git references they pin, resolved against the source objects declared
//! alongside them.

pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod models;

// Re-export commonly used types for convenience
pub use config::ExtractConfig;
pub use error::ExtractError;
pub use extract::{
    FileReader, LocalFileReader, MemoryFileReader, extract_all_package_files,
    extract_package_file, is_system_manifest,
};
pub use models::{Datasource, PackageDependency, PackageFile, SkipReason};
