//! Reconciliation entry point for the client fetch pipeline.
//!
//! On reconnect a client holds three overlapping views of a conversation:
//! sends still sitting in its offline queue, events that arrived over the
//! realtime feed, and whatever the paged history fetch returned. This
//! module folds them into one duplicate-free, chronologically ordered
//! timeline ready for rendering.

use crate::models::message::Message;
use crate::services::dedup::DedupService;

/// Merge the three message sources into a single timeline. Duplicates are
/// collapsed under all three equivalence rules; the result is sorted by
/// creation instant, undated records last, ties broken by id so reruns
/// render identically.
pub fn reconcile(
    local_queue: Vec<Message>,
    realtime: Vec<Message>,
    history: Vec<Message>,
) -> Vec<Message> {
    tracing::debug!(
        local_queue = local_queue.len(),
        realtime = realtime.len(),
        history = history.len(),
        "reconciling message sources"
    );

    let mut merged = DedupService::merge_and_dedup([local_queue, realtime, history]);
    sort_chronological(&mut merged);
    merged
}

/// Stable render order: parseable timestamps ascending, undated records
/// after them, id as the final tie-break.
pub fn sort_chronological(messages: &mut [Message]) {
    messages.sort_by(|a, b| {
        match (a.created_instant(), b.created_instant()) {
            (Some(ta), Some(tb)) => ta.cmp(&tb),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        }
        .then_with(|| a.id.cmp(&b.id))
    });
}
