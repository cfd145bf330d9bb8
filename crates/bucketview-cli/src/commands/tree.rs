//! Folder tree display.

use clap::Args;

use bucketview_core::config::AppConfig;
use bucketview_core::error::AppError;
use bucketview_core::types::format_megabytes;
use bucketview_service::{FolderNode, NodeRef, TreeNode};

use crate::output::{self, OutputFormat};

/// Arguments for the tree command
#[derive(Debug, Args)]
pub struct TreeArgs {
    /// Folder to start from (defaults to the bucket root)
    #[arg(default_value = "")]
    pub path: String,

    /// Max depth below the starting folder
    #[arg(short, long)]
    pub depth: Option<usize>,
}

/// Execute the tree command
pub async fn execute(
    args: &TreeArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let session = super::connect(config).await?;

    let folder = match session.resolve(&args.path)? {
        TreeNode::Folder(folder) => folder,
        TreeNode::File(file) => {
            return Err(AppError::validation(format!(
                "'{}' is a file, not a folder",
                file.full_key
            )));
        }
    };

    match format {
        OutputFormat::Json => output::print_json(&folder),
        OutputFormat::Table => {
            let label = if folder.is_root() {
                session.bucket().to_string()
            } else {
                folder.full_key.clone()
            };
            println!("{label}/ ({})", format_megabytes(folder.aggregate_size_bytes));

            let mut lines = Vec::new();
            render(&folder, "", args.depth, 1, &mut lines);
            for line in lines {
                println!("{line}");
            }

            let tree = session.tree();
            println!();
            output::print_kv("Objects", &tree.object_count.to_string());
            output::print_kv("Total size", &tree.total_size_display());
        }
    }
    Ok(())
}

/// Render the children of `folder` as box-drawn lines.
fn render(
    folder: &FolderNode,
    indent: &str,
    max_depth: Option<usize>,
    depth: usize,
    lines: &mut Vec<String>,
) {
    let count = folder.child_count();
    for (i, child) in folder.children().enumerate() {
        let last = i + 1 == count;
        let branch = if last { "└── " } else { "├── " };
        let size = format_megabytes(child.size_bytes());
        match child {
            NodeRef::Folder(sub) => {
                lines.push(format!("{indent}{branch}{}/ ({size})", sub.name));
                if max_depth.is_none_or(|max| depth < max) {
                    let next = format!("{indent}{}", if last { "    " } else { "│   " });
                    render(sub, &next, max_depth, depth + 1, lines);
                }
            }
            NodeRef::File(file) => {
                lines.push(format!("{indent}{branch}{} ({size})", file.name));
            }
        }
    }
}
