//! Folder listing command.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use bucketview_core::config::AppConfig;
use bucketview_core::error::AppError;
use bucketview_core::types::format_megabytes;
use bucketview_service::{NodeRef, TreeNode};

use crate::output::{self, OutputFormat};

/// Arguments for the ls command
#[derive(Debug, Args)]
pub struct LsArgs {
    /// Folder to list (defaults to the bucket root)
    #[arg(default_value = "")]
    pub path: String,
}

/// Listing display row
#[derive(Debug, Serialize, Tabled)]
struct EntryRow {
    /// Name
    name: String,
    /// File or folder
    kind: String,
    /// Size in megabytes
    size: String,
    /// Full key
    key: String,
    /// Size in bytes
    #[tabled(skip)]
    size_bytes: u64,
}

impl From<NodeRef<'_>> for EntryRow {
    fn from(node: NodeRef<'_>) -> Self {
        let (name, kind) = match node {
            NodeRef::Folder(folder) => (format!("{}/", folder.name), "folder"),
            NodeRef::File(file) => (file.name.clone(), "file"),
        };
        Self {
            name,
            kind: kind.to_string(),
            size: format_megabytes(node.size_bytes()),
            key: node.full_key().to_string(),
            size_bytes: node.size_bytes(),
        }
    }
}

/// Execute the ls command
pub async fn execute(
    args: &LsArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let session = super::connect(config).await?;

    let rows: Vec<EntryRow> = match session.resolve(&args.path)? {
        TreeNode::Folder(folder) => folder.children().map(EntryRow::from).collect(),
        TreeNode::File(file) => vec![EntryRow::from(NodeRef::File(&file))],
    };

    output::print_list(&rows, format);
    Ok(())
}
