//! Debug CLI: merge message dumps and print the reconciled timeline.
//!
//! Each argument is a JSON file holding an array of messages (for example
//! an exported offline queue next to a captured history page). The merged,
//! deduplicated, chronologically sorted array goes to stdout.

use message_sync::services::{dedup::DedupService, sync};
use message_sync::{error, logging, Message};

fn main() -> Result<(), error::AppError> {
    logging::init_tracing();

    let paths: Vec<String> = std::env::args().skip(1).collect();
    if paths.is_empty() {
        return Err(error::AppError::Config(
            "usage: message-sync <messages.json> [more.json ...]".into(),
        ));
    }

    let mut batches: Vec<Vec<Message>> = Vec::with_capacity(paths.len());
    for path in &paths {
        let data = std::fs::read_to_string(path)?;
        let batch: Vec<Message> = serde_json::from_str(&data)?;
        tracing::info!(file = %path, count = batch.len(), "loaded message batch");
        batches.push(batch);
    }

    let mut merged = DedupService::merge_and_dedup(batches);
    sync::sort_chronological(&mut merged);
    tracing::info!(count = merged.len(), "reconciled timeline");

    serde_json::to_writer_pretty(std::io::stdout().lock(), &merged)?;
    println!();
    Ok(())
}
