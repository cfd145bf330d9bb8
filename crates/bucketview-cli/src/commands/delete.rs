//! Recursive delete CLI command.

use clap::Args;

use bucketview_core::config::AppConfig;
use bucketview_core::error::AppError;
use bucketview_service::TreeNode;

use crate::output::{self, OutputFormat};
use crate::progress;

/// Arguments for the delete command
#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// File or folder to delete; a trailing `/` selects a folder
    pub path: String,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Execute the delete command
pub async fn execute(
    args: &DeleteArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let mut session = super::connect(config).await?;
    let node = session.resolve(&args.path)?;

    let prompt = match &node {
        TreeNode::File(file) => format!("Delete '{}'?", file.full_key),
        TreeNode::Folder(folder) if folder.is_root() => format!(
            "Delete EVERY object in bucket '{}'?",
            session.bucket()
        ),
        TreeNode::Folder(folder) => format!(
            "Delete folder '{}' and everything under '{}'?",
            folder.full_key,
            folder.key_prefix()
        ),
    };

    if !args.yes {
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .map_err(|e| AppError::internal(format!("Input error: {e}")))?;
        if !confirmed {
            output::print_warning("Delete cancelled");
            return Ok(());
        }
    }

    let handle = session.spawn_delete(&args.path)?;
    let result = progress::follow(handle, format == OutputFormat::Table).await;
    session.refresh().await?;
    let summary = result?;

    output::print_summary(&summary, format);
    if format == OutputFormat::Table {
        output::print_kv("Objects remaining", &session.tree().object_count.to_string());
        output::print_kv("Bucket total", &session.tree().total_size_display());
    }
    Ok(())
}
