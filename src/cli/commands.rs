//! CLI command handlers

use anyhow::{Context, Result};
use clap::{Subcommand, ValueEnum};
use std::path::Path;

use crate::config::{ConfigLoader, ExtractConfig, paths};
use crate::extract::{LocalFileReader, extract_all_package_files};
use crate::models::PackageFile;

/// Output encoding for extraction results
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

/// Configuration management subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigSubcommand {
    /// Print the effective configuration
    Show,
    /// Show configuration file path
    Path,
}

/// Handle configuration subcommands
pub fn handle_config_command(cmd: ConfigSubcommand, explicit: Option<&Path>) -> Result<()> {
    match cmd {
        ConfigSubcommand::Show => {
            let config = ConfigLoader::load(explicit).context("Failed to load configuration")?;
            let yaml =
                serde_yaml::to_string(&config).context("Failed to serialize configuration")?;
            print!("{}", yaml);
        }
        ConfigSubcommand::Path => {
            println!("{}", paths::root_config_path().display());
        }
    }

    Ok(())
}

/// Extract `files` (relative to `base_dir`) and render the result
pub async fn run_extract(
    config: &ExtractConfig,
    base_dir: &Path,
    files: &[String],
    format: OutputFormat,
    compact: bool,
) -> Result<String> {
    let reader = LocalFileReader::new(base_dir);
    let result = extract_all_package_files(config, &reader, files)
        .await
        .context("Extraction failed")?;
    render(result.as_deref(), format, compact)
}

fn render(result: Option<&[PackageFile]>, format: OutputFormat, compact: bool) -> Result<String> {
    let rendered = match format {
        OutputFormat::Json if compact => serde_json::to_string(&result)?,
        OutputFormat::Json => serde_json::to_string_pretty(&result)?,
        OutputFormat::Yaml => serde_yaml::to_string(&result)?,
    };
    Ok(rendered)
}
