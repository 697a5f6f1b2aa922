//! Batch extraction over many files
//!
//! Files are read concurrently through a [`FileReader`] and parsed on the
//! blocking pool. Results keep the input order; files that yield nothing are
//! left out.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use futures::future::try_join_all;

use crate::config::ExtractConfig;
use crate::error::ExtractError;
use crate::extract::{
    FluxDocument, SourceIndex, extract_system_manifest, is_system_manifest, parse_documents,
    resolve_documents,
};
use crate::models::{PackageDependency, PackageFile};

/// Source of file contents for a batch
///
/// `Ok(None)` means the file does not exist; it is skipped rather than
/// reported. Errors abort the whole batch.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FileReader: Send + Sync {
    async fn read_file(&self, path: &str) -> Result<Option<String>, ExtractError>;
}

/// Reads files from disk, relative to a base directory
#[derive(Debug, Clone)]
pub struct LocalFileReader {
    base_dir: PathBuf,
}

impl LocalFileReader {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }
}

impl Default for LocalFileReader {
    fn default() -> Self {
        Self::new(".")
    }
}

#[async_trait]
impl FileReader for LocalFileReader {
    async fn read_file(&self, path: &str) -> Result<Option<String>, ExtractError> {
        let full_path = self.base_dir.join(path);
        match tokio::fs::read_to_string(&full_path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("File {} does not exist", full_path.display());
                Ok(None)
            }
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                tracing::warn!("File {} is not valid UTF-8, skipping", full_path.display());
                Ok(None)
            }
            Err(source) => Err(ExtractError::Read {
                path: path.to_string(),
                source,
            }),
        }
    }
}

/// In-memory file set
#[derive(Debug, Clone, Default)]
pub struct MemoryFileReader {
    files: HashMap<String, String>,
}

impl MemoryFileReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<String>) {
        self.files.insert(path.into(), content.into());
    }
}

#[async_trait]
impl FileReader for MemoryFileReader {
    async fn read_file(&self, path: &str) -> Result<Option<String>, ExtractError> {
        Ok(self.files.get(path).cloned())
    }
}

/// A file after parsing, before resolution
enum ParsedFile {
    System(Option<PackageDependency>),
    Resources(Option<Vec<FluxDocument>>),
}

fn parse_file(package_file: &str, content: &str) -> ParsedFile {
    if is_system_manifest(package_file) {
        ParsedFile::System(extract_system_manifest(content))
    } else {
        ParsedFile::Resources(parse_documents(content, package_file))
    }
}

/// Extract every file of a batch
///
/// Returns `Ok(None)` when no file yields a dependency. With
/// `batch_source_index` set, sources declared in any file of the batch are
/// visible to every other file.
pub async fn extract_all_package_files(
    config: &ExtractConfig,
    reader: &dyn FileReader,
    package_files: &[String],
) -> Result<Option<Vec<PackageFile>>, ExtractError> {
    let reads = package_files.iter().map(|path| async move {
        let content = reader.read_file(path).await?;
        Ok::<_, ExtractError>((path.clone(), content))
    });
    let loaded = try_join_all(reads).await?;

    let parses = loaded
        .into_iter()
        .filter_map(|(path, content)| match content {
            Some(content) => Some((path, content)),
            None => {
                tracing::debug!("Skipping missing file {}", path);
                None
            }
        })
        .map(|(path, content)| {
            tokio::task::spawn_blocking(move || {
                let parsed = parse_file(&path, &content);
                (path, parsed)
            })
        });
    let parsed = try_join_all(parses).await?;

    let shared_index = config.batch_source_index.then(|| {
        let mut index = SourceIndex::new();
        for (_, file) in &parsed {
            if let ParsedFile::Resources(Some(documents)) = file {
                index.merge(SourceIndex::from_documents(documents));
            }
        }
        tracing::debug!("Built batch source index with {} sources", index.len());
        index
    });

    let mut results = Vec::new();
    for (package_file, file) in parsed {
        let deps: Vec<PackageDependency> = match file {
            ParsedFile::System(dep) => dep.into_iter().collect(),
            ParsedFile::Resources(Some(documents)) => match &shared_index {
                Some(index) => resolve_documents(&documents, index, config),
                None => {
                    let index = SourceIndex::from_documents(&documents);
                    resolve_documents(&documents, &index, config)
                }
            },
            ParsedFile::Resources(None) => Vec::new(),
        };
        if deps.is_empty() {
            tracing::debug!("No dependencies found in {}", package_file);
            continue;
        }
        results.push(PackageFile { package_file, deps });
    }

    tracing::debug!(
        "Extracted {} of {} files",
        results.len(),
        package_files.len()
    );
    Ok((!results.is_empty()).then_some(results))
}
