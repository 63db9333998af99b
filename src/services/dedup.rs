//! Collapses duplicate copies of the same logical message.
//!
//! The fetch pipeline reads from three places at once (offline queue,
//! realtime feed, paged history), and the same send routinely shows up in
//! more than one of them: an optimistic insert echoed back by the realtime
//! channel, a retried send confirmed twice, a page overlapping the live
//! feed. Three equivalence rules catch these, applied cheapest-last so each
//! pass works on an already-shrunk set. Whichever rule matches, the copy
//! with the earliest `created_at` survives (first write wins).

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::models::message::Message;

/// Absolute time-difference threshold for the pairwise test, in
/// milliseconds.
///
/// Note the asymmetry with [`DedupService::dedup_by_content_window`]: the
/// batch pass buckets timestamps to whole seconds, while this pairwise
/// threshold compares an absolute delta. Two messages 200 ms apart across a
/// second boundary are duplicates here but not there. The two checks grew
/// up separately and consumers depend on both behaviors, so they stay
/// unmerged.
pub const PAIRWISE_WINDOW_MS: i64 = 1_000;

/// Equivalence key for the idempotency-key pass. Keys and ids live in
/// separate variants so an id that happens to equal some other message's
/// idempotency key can never collide with it.
#[derive(Hash, PartialEq, Eq)]
enum MatchKey {
    Idempotency(String),
    Id(String),
}

pub struct DedupService;

impl DedupService {
    /// Collapse messages sharing the same `id`.
    pub fn dedup_by_id(messages: Vec<Message>) -> Vec<Message> {
        Self::collapse(messages, |m| Some(m.id.clone()))
    }

    /// Collapse messages sharing the same non-empty idempotency key.
    /// Messages without a usable key are keyed by `id` instead, so two
    /// keyless messages only merge when their ids already match.
    pub fn dedup_by_idempotency_key(messages: Vec<Message>) -> Vec<Message> {
        Self::collapse(messages, |m| {
            Some(match m.usable_idempotency_key() {
                Some(key) => MatchKey::Idempotency(key.to_owned()),
                None => MatchKey::Id(m.id.clone()),
            })
        })
    }

    /// Collapse messages in the same conversation with byte-identical
    /// content whose timestamps truncate to the same whole second.
    ///
    /// This is a bucketing comparison, not a sliding window: `00.100` and
    /// `00.900` share a bucket, `00.900` and `01.100` do not. Messages whose
    /// timestamp fails to parse never share a bucket and pass through as-is.
    pub fn dedup_by_content_window(messages: Vec<Message>) -> Vec<Message> {
        Self::collapse(messages, |m| {
            m.created_instant()
                .map(|t| (m.conversation_id, m.content.clone(), t.timestamp()))
        })
    }

    /// Merge any number of message batches and apply all three rules:
    /// id first, then idempotency key, then content+time bucket. The order
    /// only matters for cost, not for the result; the earliest-wins
    /// tie-break makes the surviving set the same whichever pass runs
    /// first.
    pub fn merge_and_dedup<I>(batches: I) -> Vec<Message>
    where
        I: IntoIterator<Item = Vec<Message>>,
    {
        let merged: Vec<Message> = batches.into_iter().flatten().collect();
        let before = merged.len();

        let deduped = Self::dedup_by_content_window(Self::dedup_by_idempotency_key(
            Self::dedup_by_id(merged),
        ));

        if deduped.len() < before {
            tracing::debug!(
                input = before,
                output = deduped.len(),
                "collapsed duplicate messages"
            );
        }
        deduped
    }

    /// Pairwise duplicate test under the union of the three rules. Unlike
    /// the batch pass, the time comparison here is an absolute delta of at
    /// most [`PAIRWISE_WINDOW_MS`] rather than whole-second bucketing, so
    /// it can report a pair as duplicate that the batch pass would keep.
    pub fn is_duplicate(a: &Message, b: &Message) -> bool {
        if a.id == b.id {
            return true;
        }

        if let (Some(ka), Some(kb)) = (a.usable_idempotency_key(), b.usable_idempotency_key()) {
            if ka == kb {
                return true;
            }
        }

        if a.conversation_id == b.conversation_id && a.content == b.content {
            if let (Some(ta), Some(tb)) = (a.created_instant(), b.created_instant()) {
                return (ta - tb).num_milliseconds().abs() <= PAIRWISE_WINDOW_MS;
            }
        }

        false
    }

    /// Single dedup pass. `key_of` assigns each message an equivalence key;
    /// `None` means the message can never match anything and is kept
    /// unconditionally. On a key collision the chronologically earlier copy
    /// survives; positions follow first appearance.
    fn collapse<K, F>(messages: Vec<Message>, key_of: F) -> Vec<Message>
    where
        K: std::hash::Hash + Eq,
        F: Fn(&Message) -> Option<K>,
    {
        let mut kept: Vec<Message> = Vec::with_capacity(messages.len());
        let mut seen: HashMap<K, usize> = HashMap::new();

        for msg in messages {
            match key_of(&msg) {
                None => kept.push(msg),
                Some(key) => match seen.entry(key) {
                    Entry::Vacant(slot) => {
                        slot.insert(kept.len());
                        kept.push(msg);
                    }
                    Entry::Occupied(slot) => {
                        let survivor = &mut kept[*slot.get()];
                        if supersedes(&msg, survivor) {
                            *survivor = msg;
                        }
                    }
                },
            }
        }

        kept
    }
}

/// Whether `candidate` should replace `incumbent` as the surviving copy of
/// a duplicate pair: only when it is strictly earlier. A dated copy beats
/// an undated one; on equal or mutually unparseable timestamps the copy
/// seen first stays.
fn supersedes(candidate: &Message, incumbent: &Message) -> bool {
    match (candidate.created_instant(), incumbent.created_instant()) {
        (Some(c), Some(i)) => c < i,
        (Some(_), None) => true,
        _ => false,
    }
}
