//! Configuration management CLI commands.

use clap::{Args, Subcommand};

use bucketview_core::config::AppConfig;
use bucketview_core::error::AppError;
use bucketview_core::types::format_bytes;

use crate::output::{self, OutputFormat};

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration with secrets masked
    Show,
}

/// Execute config commands
pub fn execute(
    args: &ConfigArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            let shown = masked(config);
            match format {
                OutputFormat::Json => output::print_json(&shown),
                OutputFormat::Table => {
                    let s3 = &shown.storage.s3;
                    println!("Storage");
                    output::print_kv("Endpoint", or_default(&s3.endpoint, "(AWS)"));
                    output::print_kv("Region", &s3.region);
                    output::print_kv("Bucket", or_default(&s3.bucket, "(not set)"));
                    output::print_kv("Access key", or_default(&s3.access_key, "(not set)"));
                    output::print_kv("Secret key", or_default(&s3.secret_key, "(not set)"));
                    output::print_kv("Path-style", &s3.force_path_style.to_string());
                    output::print_kv("Page size", &shown.storage.list_page_size.to_string());
                    println!("Transfer");
                    let t = &shown.transfer;
                    output::print_kv("Chunk size", &format_bytes(t.chunk_size_bytes as u64));
                    output::print_kv(
                        "Multipart part size",
                        &format_bytes(t.multipart_part_size_bytes as u64),
                    );
                    output::print_kv("Max attempts", &t.max_attempts.to_string());
                    output::print_kv("Retry backoff (ms)", &t.retry_backoff_ms.to_string());
                    output::print_kv("Failure policy", &format!("{:?}", t.failure_policy));
                    println!("Logging");
                    output::print_kv("Level", &shown.logging.level);
                    output::print_kv("Format", &shown.logging.format);
                }
            }
        }
    }

    Ok(())
}

fn or_default<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() { fallback } else { value }
}

/// Copy of `config` with credentials masked for display
fn masked(config: &AppConfig) -> AppConfig {
    let mut shown = config.clone();
    shown.storage.s3.access_key = mask_secret(&shown.storage.s3.access_key);
    shown.storage.s3.secret_key = mask_secret(&shown.storage.s3.secret_key);
    shown
}

/// Keep the first four characters of a secret
fn mask_secret(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    let visible: String = value.chars().take(4).collect();
    format!("{visible}****")
}
