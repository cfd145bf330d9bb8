//! File upload CLI command.

use std::path::PathBuf;

use clap::Args;

use bucketview_core::config::AppConfig;
use bucketview_core::error::AppError;
use bucketview_service::default_upload_key;

use crate::output::{self, OutputFormat};
use crate::progress;

/// Arguments for the upload command
#[derive(Debug, Args)]
pub struct UploadArgs {
    /// Path to the file to upload
    pub file: PathBuf,

    /// Folder to upload into (defaults to the bucket root)
    #[arg(short, long)]
    pub prefix: Option<String>,

    /// Full object key, overriding the file name and prefix
    #[arg(short, long, conflicts_with = "prefix")]
    pub key: Option<String>,
}

/// Execute the upload command
pub async fn execute(
    args: &UploadArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    if !args.file.is_file() {
        return Err(AppError::not_found(format!(
            "File not found: {}",
            args.file.display()
        )));
    }

    let key = match &args.key {
        Some(key) => key.clone(),
        None => default_upload_key(&args.file, args.prefix.as_deref())?,
    };

    let mut session = super::connect(config).await?;
    if format == OutputFormat::Table {
        println!(
            "Uploading '{}' to {}/{}...",
            args.file.display(),
            session.bucket(),
            key
        );
    }

    let handle = session.spawn_upload(&args.file, Some(&key))?;
    let result = progress::follow(handle, format == OutputFormat::Table).await;
    session.refresh().await?;
    let summary = result?;

    output::print_summary(&summary, format);
    if format == OutputFormat::Table {
        output::print_kv("Bucket total", &session.tree().total_size_display());
    }
    Ok(())
}
