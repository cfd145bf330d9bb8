//! CLI command definitions and dispatch.

pub mod config;
pub mod delete;
pub mod download;
pub mod ls;
pub mod tree;
pub mod upload;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use bucketview_core::config::AppConfig;
use bucketview_core::error::AppError;
use bucketview_service::BucketSession;
use bucketview_storage::{S3ObjectStore, TokioFilesystem};

use crate::output::OutputFormat;

/// Bucketview: browse an S3 bucket as a folder tree and move data in and out
#[derive(Debug, Parser)]
#[command(name = "bucketview", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the bucket as a folder tree with sizes
    Tree(tree::TreeArgs),
    /// List the direct children of a folder
    Ls(ls::LsArgs),
    /// Upload a local file
    Upload(upload::UploadArgs),
    /// Download a file or folder
    Download(download::DownloadArgs),
    /// Delete a file or everything under a folder
    Delete(delete::DeleteArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: &AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Tree(args) => tree::execute(args, config, self.format).await,
            Commands::Ls(args) => ls::execute(args, config, self.format).await,
            Commands::Upload(args) => upload::execute(args, config, self.format).await,
            Commands::Download(args) => download::execute(args, config, self.format).await,
            Commands::Delete(args) => delete::execute(args, config, self.format).await,
            Commands::Config(args) => config::execute(args, config, self.format),
        }
    }
}

/// Helper: load configuration from file and environment
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::load(config_path)
}

/// Helper: connect to the configured bucket and list it
pub async fn connect(config: &AppConfig) -> Result<BucketSession, AppError> {
    let store = S3ObjectStore::new(
        &config.storage.s3,
        config.storage.list_page_size,
        &config.transfer,
    )
    .await?;

    BucketSession::connect(
        Arc::new(store),
        Arc::new(TokioFilesystem::new()),
        config.transfer.clone(),
    )
    .await
}
