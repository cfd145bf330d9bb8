//! Recursive download CLI command.

use std::path::PathBuf;

use clap::Args;

use bucketview_core::config::AppConfig;
use bucketview_core::error::AppError;
use bucketview_core::types::format_megabytes;

use crate::output::{self, OutputFormat};
use crate::progress;

/// Arguments for the download command
#[derive(Debug, Args)]
pub struct DownloadArgs {
    /// File or folder to download; a trailing `/` selects a folder
    pub path: String,

    /// Local directory to download into
    #[arg(short, long, default_value = ".")]
    pub dest: PathBuf,
}

/// Execute the download command
pub async fn execute(
    args: &DownloadArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let session = super::connect(config).await?;
    let node = session.resolve(&args.path)?;

    if format == OutputFormat::Table {
        let size = node.as_node_ref().size_bytes();
        println!(
            "Downloading '{}' ({}) to {}...",
            node.full_key(),
            format_megabytes(size),
            args.dest.display()
        );
    }

    let handle = session.spawn_download(&args.path, &args.dest)?;
    let summary = progress::follow(handle, format == OutputFormat::Table).await?;

    output::print_summary(&summary, format);
    Ok(())
}
