//! flux-extract - report the dependencies pinned by Flux GitOps manifests

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use flux_extract::cli::{
    ConfigSubcommand, OutputFormat, handle_config_command, init_logging, run_extract,
};
use flux_extract::config::ConfigLoader;

/// Extract Helm chart, OCI image and Git dependencies from Flux manifests
#[derive(Parser, Debug)]
#[command(name = "flux-extract", version, args_conflicts_with_subcommands = true)]
#[command(about = "Extract Helm chart, OCI image and Git dependencies from Flux manifests", long_about = None)]
struct Args {
    /// Enable debug logging on stderr
    #[arg(long, short = 'd', global = true)]
    debug: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Additional configuration file, applied over the root config
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Directory the manifest paths are relative to
    #[arg(long, default_value = ".")]
    base_dir: PathBuf,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Single-line JSON output
    #[arg(long)]
    compact: bool,

    /// Manifest files to extract
    files: Vec<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

/// Main commands
#[derive(Subcommand, Debug)]
enum Command {
    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.debug, args.log_file.as_deref())?;

    if let Some(Command::Config { subcommand }) = args.command {
        return handle_config_command(subcommand, args.config.as_deref());
    }

    if args.files.is_empty() {
        return Err(anyhow::anyhow!("No manifest files given"));
    }

    let config =
        ConfigLoader::load(args.config.as_deref()).context("Failed to load configuration")?;
    tracing::debug!(
        "Extracting {} files from {}",
        args.files.len(),
        args.base_dir.display()
    );

    let output = run_extract(
        &config,
        &args.base_dir,
        &args.files,
        args.format,
        args.compact,
    )
    .await?;
    println!("{}", output);

    Ok(())
}
