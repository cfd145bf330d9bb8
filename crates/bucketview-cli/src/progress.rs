//! Terminal progress display for background transfers.

use indicatif::{ProgressBar, ProgressStyle};

use bucketview_core::events::TransferEvent;
use bucketview_core::result::AppResult;
use bucketview_core::types::{OperationSummary, format_megabytes};
use bucketview_service::TransferHandle;

use crate::output;

fn file_bar(total_bytes: u64, key: &str) -> ProgressBar {
    let bar = ProgressBar::new(total_bytes);
    let style = ProgressStyle::with_template(
        "{spinner:.cyan} [{bar:40.cyan/blue}] {bytes}/{total_bytes} @ {bytes_per_sec} {percent:>3}% {msg}",
    )
    .map(|s| s.progress_chars("━━╌"))
    .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style);
    bar.set_message(key.to_string());
    bar
}

/// Drive a progress bar from the task's events until it finishes. Ctrl-C
/// cancels the task; the cancellation is reported as its result.
pub async fn follow(
    mut handle: TransferHandle,
    show_progress: bool,
) -> AppResult<OperationSummary> {
    let mut bar: Option<ProgressBar> = None;
    let mut interrupted = false;
    let cancel = handle.cancel.clone();

    loop {
        tokio::select! {
            event = handle.next_event() => {
                let Some(event) = event else { break };
                if !show_progress {
                    continue;
                }
                match event.event {
                    TransferEvent::FileStarted { key, total_bytes } => {
                        if let Some(done) = bar.take() {
                            done.finish_and_clear();
                        }
                        bar = Some(file_bar(total_bytes, &key));
                    }
                    TransferEvent::Progress { file_bytes, .. } => {
                        if let Some(bar) = &bar {
                            bar.set_position(file_bytes);
                        }
                    }
                    TransferEvent::FileCompleted { key, bytes } => {
                        if let Some(done) = bar.take() {
                            done.finish_and_clear();
                        }
                        println!("  {key} ({})", format_megabytes(bytes));
                    }
                    TransferEvent::ObjectDeleted { key } => println!("  deleted {key}"),
                    TransferEvent::ObjectFailed { key, message } => {
                        if let Some(done) = bar.take() {
                            done.abandon();
                        }
                        output::print_warning(&format!("{key}: {message}"));
                    }
                    TransferEvent::Started { .. }
                    | TransferEvent::Finished { .. }
                    | TransferEvent::Aborted { .. } => {}
                }
            }
            _ = tokio::signal::ctrl_c(), if !interrupted => {
                interrupted = true;
                output::print_warning("Cancelling...");
                cancel.cancel();
            }
        }
    }

    if let Some(bar) = bar {
        bar.abandon();
    }
    handle.wait().await
}
