//! Dependency extraction from Flux manifests
//!
//! Pipeline for one file:
//! 1. Parse every YAML document (`parse_documents`)
//! 2. Classify each into a typed [`FluxDocument`] (`classify`)
//! 3. Index all source documents (`index`)
//! 4. Resolve every document against the index, in file order (`resolve`)
//!
//! `gotk-components.yaml` system manifests skip all of this and are read by
//! `system` instead.

mod batch;
mod classify;
pub mod docker;
pub mod git;
pub mod helm_values;
mod index;
mod resolve;
mod system;

use serde::Deserialize;

use crate::config::ExtractConfig;
use crate::models::{PackageDependency, PackageFile};

#[cfg(test)]
pub use batch::MockFileReader;
pub use batch::{FileReader, LocalFileReader, MemoryFileReader, extract_all_package_files};
pub use classify::{FluxDocument, classify};
pub use index::{SourceIndex, SourceKey, SourceRecord};
pub use resolve::{extract_kustomize_image, resolve_document};
pub use system::{FLUX_REPOSITORY, extract_system_manifest, is_system_manifest};

/// Parse and classify every document of a file
///
/// Returns `None` when the text is not valid YAML. Documents that are empty,
/// not mappings, or not recognised Flux resources are dropped.
pub fn parse_documents(content: &str, package_file: &str) -> Option<Vec<FluxDocument>> {
    let mut documents = Vec::new();
    for document in serde_yaml::Deserializer::from_str(content) {
        let value = match serde_yaml::Value::deserialize(document) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!("Failed to parse {}: {}", package_file, e);
                return None;
            }
        };
        if !value.is_mapping() {
            tracing::trace!("Skipping non-mapping document in {}", package_file);
            continue;
        }
        documents.extend(classify(value));
    }
    Some(documents)
}

/// Resolve already classified documents against `index`
pub fn resolve_documents(
    documents: &[FluxDocument],
    index: &SourceIndex,
    config: &ExtractConfig,
) -> Vec<PackageDependency> {
    documents
        .iter()
        .flat_map(|document| resolve_document(document, index, &config.registry_aliases))
        .collect()
}

/// Extract the dependencies of a single file
///
/// Sources are only looked up among the documents of this file.
pub fn extract_package_file(
    content: &str,
    package_file: &str,
    config: &ExtractConfig,
) -> Option<PackageFile> {
    let deps = if is_system_manifest(package_file) {
        extract_system_manifest(content).into_iter().collect()
    } else {
        let documents = parse_documents(content, package_file)?;
        let index = SourceIndex::from_documents(&documents);
        resolve_documents(&documents, &index, config)
    };

    if deps.is_empty() {
        tracing::debug!("No dependencies found in {}", package_file);
        return None;
    }
    tracing::debug!("Found {} dependencies in {}", deps.len(), package_file);
    Some(PackageFile {
        package_file: package_file.to_string(),
        deps,
    })
}
